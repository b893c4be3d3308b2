//! The weather sensor component.
//!
//! Each reading fetches current conditions and astronomy for the configured
//! location, then asks the configured temperature sensor for the inside
//! temperature. Steps run in order and the first failure aborts the read.

use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    config::{Config, ConfigError},
    model::{CompositeReading, Readings, WeatherRequest, WeatherSnapshot, celsius_to_fahrenheit},
    provider::{ClientSettings, WeatherProvider, weatherapi::WeatherApiProvider},
    registry::{Component, Model, Registration, Registry, SENSOR_API},
    sensor::{Dependencies, Reconfigurable, ResourceConfig, Sensor, SensorError},
};

/// Field the temperature sensor reports its value under.
pub const DEGREES_CELSIUS: &str = "degrees_celsius";

pub fn model() -> Model {
    Model::new("weathersensor", "weathersensor", "weathersensor")
}

pub fn registration() -> Registration {
    Registration {
        api: SENSOR_API,
        model: model(),
        validate: validate_attributes,
        constructor: construct,
    }
}

/// Announce the weather sensor model to `registry`.
pub fn register(registry: &mut Registry) {
    registry.register(registration());
}

fn validate_attributes(attributes: &Value) -> Result<Vec<String>, ConfigError> {
    Config::from_attributes(attributes)?.validate()
}

fn construct(config: &ResourceConfig, deps: &Dependencies) -> Result<Box<dyn Component>, SensorError> {
    Ok(Box::new(WeatherSensor::new(config, deps)?))
}

#[derive(Debug)]
pub struct WeatherSensor {
    name: String,
    provider: Arc<dyn WeatherProvider>,
    temperature_sensor: Arc<dyn Sensor>,
    request: WeatherRequest,
    closed: AtomicBool,
}

impl WeatherSensor {
    /// Build against weatherapi.com with default client settings.
    pub fn new(config: &ResourceConfig, deps: &Dependencies) -> Result<Self, SensorError> {
        Self::with_settings(config, deps, ClientSettings::default())
    }

    pub fn with_settings(
        config: &ResourceConfig,
        deps: &Dependencies,
        settings: ClientSettings,
    ) -> Result<Self, SensorError> {
        let provider = WeatherApiProvider::new(settings)?;
        Self::with_provider(config, deps, Arc::new(provider))
    }

    pub fn with_provider(
        config: &ResourceConfig,
        deps: &Dependencies,
        provider: Arc<dyn WeatherProvider>,
    ) -> Result<Self, SensorError> {
        let (temperature_sensor, request) = resolve(config, deps)?;

        Ok(Self {
            name: config.name.clone(),
            provider,
            temperature_sensor,
            request,
            closed: AtomicBool::new(false),
        })
    }

    /// One composite reading, typed.
    pub async fn composite_reading(&self) -> Result<CompositeReading, SensorError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SensorError::Closed { name: self.name.clone() });
        }

        let current = self.provider.current_conditions(&self.request).await?;
        let astronomy = self
            .provider
            .astronomy(&self.request, Local::now().date_naive())
            .await?;
        let weather = WeatherSnapshot::from_responses(current, astronomy);

        let inside = self.temperature_sensor.readings().await.map_err(|e| {
            tracing::error!(sensor = %self.name, error = %e, "temp sensor reading failed");
            SensorError::Dependency { source: Box::new(e) }
        })?;
        let celsius = inside
            .get(DEGREES_CELSIUS)
            .and_then(Value::as_f64)
            .ok_or(SensorError::InvalidDependencyReading { field: DEGREES_CELSIUS })?;

        Ok(CompositeReading {
            weather,
            inside_f: celsius_to_fahrenheit(celsius),
        })
    }
}

fn resolve(
    config: &ResourceConfig,
    deps: &Dependencies,
) -> Result<(Arc<dyn Sensor>, WeatherRequest), SensorError> {
    let cfg = Config::from_attributes(&config.attributes)?;
    cfg.validate()?;

    let temperature_sensor = deps.sensor(&cfg.temperature_sensor)?;
    let request = WeatherRequest {
        zipcode: cfg.zipcode,
        api_key: cfg.api_key,
    };
    Ok((temperature_sensor, request))
}

#[async_trait]
impl Sensor for WeatherSensor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn readings(&self) -> Result<Readings, SensorError> {
        Ok(self.composite_reading().await?.into())
    }

    async fn close(&self) -> Result<(), SensorError> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!(sensor = %self.name, "weather sensor closed");
        }
        Ok(())
    }
}

impl Reconfigurable for WeatherSensor {
    /// Swap the dependency and credentials; on error the old ones stay.
    fn reconfigure(
        &mut self,
        config: &ResourceConfig,
        deps: &Dependencies,
    ) -> Result<(), SensorError> {
        let (temperature_sensor, request) = resolve(config, deps)?;
        self.temperature_sensor = temperature_sensor;
        self.request = request;
        tracing::info!(sensor = %self.name, zipcode = self.request.zipcode, "weather sensor reconfigured");
        Ok(())
    }
}
