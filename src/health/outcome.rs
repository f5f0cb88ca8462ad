// src/health/outcome.rs
use super::status::HealthStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form diagnostic payload attached to a [`Health`].
pub type HealthDetails = serde_json::Map<String, Value>;

/// Result of evaluating one indicator, or the aggregate over all of them.
///
/// `components` is keyed by indicator name and kept sorted so the serialized
/// report is stable between calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Health {
    pub status: HealthStatus,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, Health>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

impl Health {
    pub fn new(status: HealthStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn up() -> Self {
        Self::new(HealthStatus::Up)
    }

    pub fn down() -> Self {
        Self::new(HealthStatus::Down)
    }

    pub fn unknown() -> Self {
        Self::new(HealthStatus::Unknown)
    }

    pub fn with_details(mut self, details: HealthDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds a single detail entry, creating the details map if needed.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HealthDetails::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// A down outcome carrying `details.error`, but only when details were
    /// asked for.
    pub fn down_with_error(error: impl ToString, with_details: bool) -> Self {
        let health = Self::down();
        if with_details {
            health.with_detail("error", error.to_string())
        } else {
            health
        }
    }

    pub fn is_down(&self) -> bool {
        self.status.is_down()
    }

    /// Stores `component` under `name` and folds its status into this one.
    pub fn add_component(&mut self, name: impl Into<String>, component: Health) {
        if component.is_down() {
            self.status = HealthStatus::Down;
        }
        self.components.insert(name.into(), component);
    }

    /// Removes `details` from this outcome and every nested component.
    pub fn strip_details(&mut self) {
        self.details = None;
        for component in self.components.values_mut() {
            component.strip_details();
        }
    }

    pub fn has_details(&self) -> bool {
        self.details.is_some() || self.components.values().any(Health::has_details)
    }
}
