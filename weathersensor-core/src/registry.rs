use std::{collections::HashMap, fmt, str::FromStr};

use crate::{
    config::ConfigError,
    sensor::{Dependencies, Reconfigurable, ResourceConfig, Sensor, SensorError},
};

/// API a model implements, e.g. `rdk:component:sensor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Api {
    pub namespace: &'static str,
    pub kind: &'static str,
    pub subtype: &'static str,
}

pub const SENSOR_API: Api = Api {
    namespace: "rdk",
    kind: "component",
    subtype: "sensor",
};

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.kind, self.subtype)
    }
}

/// Model triple `namespace:family:name` identifying an implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model {
    pub namespace: String,
    pub family: String,
    pub name: String,
}

impl Model {
    pub fn new(namespace: &str, family: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            family: family.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.family, self.name)
    }
}

impl FromStr for Model {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(':').collect();
        match parts.as_slice() {
            [namespace, family, name] if parts.iter().all(|p| !p.is_empty()) => {
                Ok(Model::new(namespace, family, name))
            }
            _ => Err(anyhow::anyhow!(
                "Invalid model '{value}'. Expected the form namespace:family:name."
            )),
        }
    }
}

/// A sensor the host can both read and reconfigure.
pub trait Component: Sensor + Reconfigurable {}

impl<T: Sensor + Reconfigurable> Component for T {}

pub type Validator = fn(&serde_json::Value) -> Result<Vec<String>, ConfigError>;

pub type Constructor =
    fn(&ResourceConfig, &Dependencies) -> Result<Box<dyn Component>, SensorError>;

/// What a model announces to the host.
#[derive(Debug, Clone)]
pub struct Registration {
    pub api: Api,
    pub model: Model,
    /// Checks raw attributes and returns implicit dependency names.
    pub validate: Validator,
    pub constructor: Constructor,
}

#[derive(Debug, Default)]
pub struct Registry {
    registrations: HashMap<Model, Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration; a later one for the same model replaces it.
    pub fn register(&mut self, registration: Registration) {
        tracing::debug!(api = %registration.api, model = %registration.model, "registering model");
        self.registrations.insert(registration.model.clone(), registration);
    }

    pub fn lookup(&self, model: &Model) -> Option<&Registration> {
        self.registrations.get(model)
    }

    /// Validate `config.attributes`, then build the component.
    pub fn construct(
        &self,
        config: &ResourceConfig,
        deps: &Dependencies,
    ) -> Result<Box<dyn Component>, SensorError> {
        let registration = self
            .lookup(&config.model)
            .ok_or_else(|| SensorError::UnknownModel(config.model.clone()))?;

        (registration.validate)(&config.attributes)?;
        (registration.constructor)(config, deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_display_parse_roundtrip() {
        let model = Model::new("acme", "weathersensor", "weathersensor");
        let parsed: Model = model.to_string().parse().expect("roundtrip should succeed");
        assert_eq!(parsed, model);
    }

    #[test]
    fn model_parse_rejects_short_and_empty_parts() {
        assert!("acme:weathersensor".parse::<Model>().is_err());
        assert!("acme::weathersensor".parse::<Model>().is_err());
        let err = "a:b:c:d".parse::<Model>().unwrap_err();
        assert!(err.to_string().contains("Invalid model"));
    }

    #[test]
    fn sensor_api_display() {
        assert_eq!(SENSOR_API.to_string(), "rdk:component:sensor");
    }

    #[test]
    fn construct_unknown_model_errors() {
        let registry = Registry::new();
        let config = ResourceConfig {
            name: "weather".into(),
            model: Model::new("acme", "nothing", "here"),
            attributes: serde_json::Value::Null,
        };
        let err = registry.construct(&config, &Dependencies::new()).unwrap_err();
        assert!(matches!(err, SensorError::UnknownModel(_)));
    }
}
