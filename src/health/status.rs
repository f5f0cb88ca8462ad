// src/health/status.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported by an indicator or by the aggregate.
///
/// Aggregation only cares whether a status is `Down`; `Unknown` is carried
/// through to the report but never turns the aggregate down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    #[default]
    Up,
    Down,
    Unknown,
}

impl HealthStatus {
    pub fn is_down(self) -> bool {
        self == HealthStatus::Down
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Up => write!(f, "UP"),
            HealthStatus::Down => write!(f, "DOWN"),
            HealthStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_upper_case() {
        assert_eq!(serde_json::to_string(&HealthStatus::Up).unwrap(), "\"UP\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Down).unwrap(), "\"DOWN\"");
        assert_eq!(
            serde_json::from_str::<HealthStatus>("\"UNKNOWN\"").unwrap(),
            HealthStatus::Unknown
        );
    }

    #[test]
    fn only_down_is_down() {
        assert!(HealthStatus::Down.is_down());
        assert!(!HealthStatus::Up.is_down());
        assert!(!HealthStatus::Unknown.is_down());
        assert_eq!(HealthStatus::Down.to_string(), "DOWN");
    }
}
