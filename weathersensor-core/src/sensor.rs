//! Sensor capability contract between the host and its components.
//!
//! The host constructs components from a [`ResourceConfig`], hands them the
//! [`Dependencies`] they declared during validation, and afterwards calls
//! [`Sensor::readings`] as often as it likes.

use async_trait::async_trait;
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use crate::{
    config::ConfigError,
    model::Readings,
    provider::WeatherError,
    registry::Model,
};

/// Errors surfaced by sensor components.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error("unable to get temperature sensor {name} for weather sensor: resource not found")]
    DependencyNotFound { name: String },

    #[error("error getting reading from temp sensor: {source}")]
    Dependency {
        #[source]
        source: Box<SensorError>,
    },

    #[error("temp sensor reading has no numeric \"{field}\" field")]
    InvalidDependencyReading { field: &'static str },

    #[error("sensor {name} is closed")]
    Closed { name: String },

    #[error("no registration for model {0}")]
    UnknownModel(Model),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait Sensor: Send + Sync + Debug {
    fn name(&self) -> &str;

    async fn readings(&self) -> Result<Readings, SensorError>;

    /// Release whatever the component holds. Safe to call more than once.
    async fn close(&self) -> Result<(), SensorError> {
        Ok(())
    }
}

/// Components the host can reconfigure in place instead of rebuilding.
pub trait Reconfigurable {
    fn reconfigure(
        &mut self,
        config: &ResourceConfig,
        deps: &Dependencies,
    ) -> Result<(), SensorError>;
}

/// Host-supplied description of one component instance.
#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub name: String,
    pub model: Model,
    /// Raw JSON attributes; each model decides their shape.
    pub attributes: serde_json::Value,
}

/// Resolved dependencies, keyed by resource name.
///
/// Entries are shared with the host, which owns their lifecycle.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    sensors: HashMap<String, Arc<dyn Sensor>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, sensor: Arc<dyn Sensor>) {
        self.sensors.insert(name.into(), sensor);
    }

    pub fn with(mut self, name: impl Into<String>, sensor: Arc<dyn Sensor>) -> Self {
        self.insert(name, sensor);
        self
    }

    pub fn sensor(&self, name: &str) -> Result<Arc<dyn Sensor>, SensorError> {
        self.sensors
            .get(name)
            .cloned()
            .ok_or_else(|| SensorError::DependencyNotFound { name: name.to_string() })
    }
}
