use crate::error::ExporterError;
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub devices: HashMap<String, DeviceConfig>,
    #[serde(default)]
    pub features: Features,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds subtracted from the Prometheus scrape timeout
    #[serde(default = "default_timeout_offset")]
    pub timeout_offset: f64,
    /// Skip certificate verification for `https` switches
    #[serde(default)]
    pub insecure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
            timeout_offset: default_timeout_offset(),
            insecure: false,
        }
    }
}

/// A switch reachable through its web UI
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    pub address: String,
    #[serde(default)]
    pub schema: Scheme,
    pub user: String,
    pub password: SecretString,
    /// Overrides the global collector set for this device
    #[serde(default)]
    pub features: Option<Features>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    #[serde(default)]
    pub hwmon: bool,
    #[serde(default)]
    pub poe: bool,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9653
}

fn default_timeout_offset() -> f64 {
    0.5
}

impl DeviceConfig {
    /// Base URL of the switch web UI, without a trailing slash
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.schema.as_str(), self.address)
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("GS1920_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.server.timeout_offset.is_finite() || self.server.timeout_offset < 0.0 {
            return Err(ExporterError::Config(format!(
                "timeout_offset must be a non-negative number of seconds, got {}",
                self.server.timeout_offset
            )));
        }

        for (name, device) in &self.devices {
            if device.address.trim().is_empty() {
                return Err(ExporterError::Config(format!(
                    "device '{}' has an empty address",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Collector set for a device: its own override, else the global features
    pub fn features_for(&self, device: &DeviceConfig) -> Features {
        device.features.unwrap_or(self.features)
    }
}
