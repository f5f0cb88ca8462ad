// src/config/models.rs
use crate::health::{ConstantIndicator, HealthDetails, HealthStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default = "default_indicators")]
    pub indicators: Vec<IndicatorConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            health: HealthConfig::default(),
            indicators: default_indicators(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.health.path.starts_with('/') {
            return Err(ConfigError::InvalidPath(self.health.path.clone()));
        }

        if self.health.timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut seen = HashSet::new();
        for indicator in &self.indicators {
            if indicator.name.trim().is_empty() {
                return Err(ConfigError::EmptyIndicatorName);
            }
            if !seen.insert(indicator.name.as_str()) {
                return Err(ConfigError::DuplicateIndicator(indicator.name.clone()));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_path")]
    pub path: String,

    /// Overall deadline for one evaluation, in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            timeout_ms: None,
        }
    }
}

impl HealthConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// A statically configured indicator reporting a fixed status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub name: String,

    #[serde(default)]
    pub status: HealthStatus,

    #[serde(default)]
    pub details: Option<HealthDetails>,

    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

impl IndicatorConfig {
    pub fn to_indicator(&self) -> ConstantIndicator {
        let mut indicator = ConstantIndicator::new(self.status);
        if let Some(details) = &self.details {
            indicator = indicator.with_details(details.clone());
        }
        if let Some(groups) = &self.groups {
            indicator = indicator.with_groups(groups.clone());
        }
        indicator
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Health path must start with '/': {0}")]
    InvalidPath(String),

    #[error("Health timeout must be greater than zero")]
    ZeroTimeout,

    #[error("Indicator name must not be empty")]
    EmptyIndicatorName,

    #[error("Duplicate indicator name: {0}")]
    DuplicateIndicator(String),
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/actuator/health".to_string()
}

fn default_indicators() -> Vec<IndicatorConfig> {
    vec![IndicatorConfig {
        name: "self".to_string(),
        status: HealthStatus::Up,
        details: None,
        groups: None,
    }]
}
