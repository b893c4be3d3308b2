//! Core library for the weather sensor component.
//!
//! This crate defines:
//! - Component attributes and their validation
//! - A weatherapi.com client behind the `WeatherProvider` trait
//! - The sensor contract a host uses to build, read and reconfigure components
//! - The weather sensor itself, which merges outside weather with an inside
//!   temperature reading from another sensor
//!
//! It is used by `weathersensor-cli`, but is meant to be embedded by whatever
//! host loads the component.

pub mod config;
pub mod model;
pub mod provider;
pub mod registry;
pub mod sensor;
pub mod weather_sensor;

pub use config::{Config, ConfigError};
pub use model::{CompositeReading, Readings, WeatherRequest, WeatherSnapshot};
pub use provider::{ClientSettings, WeatherError, WeatherProvider, weatherapi::WeatherApiProvider};
pub use registry::{Api, Component, Model, Registration, Registry};
pub use sensor::{Dependencies, Reconfigurable, ResourceConfig, Sensor, SensorError};
pub use weather_sensor::WeatherSensor;
