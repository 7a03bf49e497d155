//! TOML configuration for the bridge.
//!
//! Configuration is read once at startup. There is no hot-reload; broker
//! credentials, topic templates, and the sensor list are fixed for the
//! process lifetime.

use crate::mac_address::MacAddress;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Root configuration structure, read from a TOML file.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub topics: TopicsConfig,
    #[serde(default)]
    pub sensors: Vec<SensorEntry>,
}

/// Broker address and optional credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default = "default_mqtt_port")]
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_mqtt_port() -> u16 {
    1883
}

/// Topic templates.
///
/// `sensor_format` supports the `${name}` and `${sensor}` placeholders;
/// `home_assistant` is the discovery root prefix (conventionally
/// `homeassistant`).
#[derive(Debug, Deserialize, Clone)]
pub struct TopicsConfig {
    pub sensor_format: String,
    pub home_assistant: String,
}

/// One configured sensor: hardware address plus a short human-readable slug.
#[derive(Debug, Deserialize, Clone)]
pub struct SensorEntry {
    pub mac_address: MacAddress,
    pub name: String,
}

/// Errors raised while loading configuration. All of these are startup-fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Read(#[from] std::io::Error),
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no sensors configured")]
    NoSensors,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse configuration from TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        if config.sensors.is_empty() {
            return Err(ConfigError::NoSensors);
        }
        Ok(config)
    }
}
