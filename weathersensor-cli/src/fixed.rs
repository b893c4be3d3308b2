use async_trait::async_trait;
use serde_json::json;
use weathersensor_core::{Readings, Sensor, SensorError};

/// Stand-in temperature sensor that always reports the same value.
#[derive(Debug, Clone)]
pub struct FixedTemperatureSensor {
    name: String,
    celsius: f64,
}

impl FixedTemperatureSensor {
    pub fn new(name: impl Into<String>, celsius: f64) -> Self {
        Self { name: name.into(), celsius }
    }
}

#[async_trait]
impl Sensor for FixedTemperatureSensor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn readings(&self) -> Result<Readings, SensorError> {
        let mut out = Readings::new();
        out.insert("degrees_celsius".into(), json!(self.celsius));
        Ok(out)
    }
}
