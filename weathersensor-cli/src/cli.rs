use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use weathersensor_core::{Config, Dependencies, Registry, ResourceConfig, Sensor, weather_sensor};

use crate::fixed::FixedTemperatureSensor;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathersensor", version, about = "Weather sensor component CLI")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the temp sensor name, zipcode and API key.
    Configure,

    /// Check the stored attributes and list implicit dependencies.
    Validate,

    /// Take one composite reading.
    Read {
        /// Inside temperature, in Celsius, reported by a stand-in temp sensor.
        #[arg(long = "inside-c", allow_negative_numbers = true)]
        inside_c: f64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command {
            Command::Configure => configure(&path),
            Command::Validate => validate(&path),
            Command::Read { inside_c } => read(&path, inside_c).await,
        }
    }
}

fn configure(path: &Path) -> anyhow::Result<()> {
    let current = Config::load_from(path)?;

    let temperature_sensor = Text::new("Temperature sensor name:")
        .with_default(&current.temperature_sensor)
        .prompt()
        .context("Failed to read temperature sensor name")?;

    let mut zipcode = CustomType::<i64>::new("Zipcode:")
        .with_error_message("Please enter a numeric zipcode");
    if current.zipcode != 0 {
        zipcode = zipcode.with_default(current.zipcode);
    }
    let zipcode = zipcode.prompt().context("Failed to read zipcode")?;

    let api_key = Password::new("weatherapi.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let cfg = Config {
        temperature_sensor,
        zipcode,
        api_key,
    };
    cfg.validate()?;
    cfg.save_to(path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn validate(path: &Path) -> anyhow::Result<()> {
    let cfg = Config::load_from(path)?;
    let deps = cfg
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    println!("Configuration OK; depends on: {}", deps.join(", "));
    Ok(())
}

async fn read(path: &Path, inside_c: f64) -> anyhow::Result<()> {
    let cfg = Config::load_from(path)?;
    cfg.validate().with_context(|| {
        format!(
            "Invalid configuration in {}.\n\
             Hint: run `weathersensor configure` first.",
            path.display()
        )
    })?;

    let mut registry = Registry::new();
    weather_sensor::register(&mut registry);

    let thermometer = FixedTemperatureSensor::new(&cfg.temperature_sensor, inside_c);
    let deps = Dependencies::new().with(cfg.temperature_sensor.clone(), Arc::new(thermometer));
    let resource = ResourceConfig {
        name: "weather".to_string(),
        model: weather_sensor::model(),
        attributes: serde_json::to_value(&cfg)?,
    };

    let sensor = registry.construct(&resource, &deps)?;
    let result = sensor.readings().await;
    sensor.close().await?;

    let readings = result.context("Failed to take weather reading")?;
    println!("{}", serde_json::to_string_pretty(&readings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_with_negative_temperature() {
        let cli = Cli::try_parse_from(["weathersensor", "read", "--inside-c", "-3.5"])
            .expect("arguments should parse");
        assert!(matches!(cli.command, Command::Read { inside_c } if inside_c == -3.5));
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_global_config_path() {
        let cli = Cli::try_parse_from(["weathersensor", "validate", "--config", "/tmp/ws.toml"])
            .expect("arguments should parse");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/ws.toml")));
    }

    #[test]
    fn validate_reports_missing_attribute() {
        let path = std::env::temp_dir().join(format!("weathersensor-cli-{}.toml", std::process::id()));
        Config {
            temperature_sensor: "inside".into(),
            zipcode: 0,
            api_key: "KEY".into(),
        }
        .save_to(&path)
        .unwrap();

        let err = validate(&path).unwrap_err();
        assert!(format!("{err:#}").contains(r#"expected "zipcode" attribute"#));

        let _ = std::fs::remove_file(path);
    }
}
