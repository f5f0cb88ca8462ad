//
// src/health/pool.rs
//

use super::indicator::{DynamicIndicators, HealthIndicator, IndicatorMap};
use dashmap::DashMap;
use std::sync::Arc;

/// A named set of indicators that can grow and shrink at runtime.
///
/// Clones share the same set, so one handle can be given to the actuator as
/// its dynamic source while another is kept by whatever tracks membership.
#[derive(Clone, Default)]
pub struct IndicatorPool {
    indicators: Arc<DashMap<String, Arc<dyn HealthIndicator>>>,
}

impl IndicatorPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<I>(&self, name: impl Into<String>, indicator: I)
    where
        I: HealthIndicator + 'static,
    {
        let name = name.into();
        self.indicators.insert(name.clone(), Arc::new(indicator));
        tracing::info!("Added dynamic health indicator: {}", name);
    }

    pub fn remove(&self, name: &str) -> bool {
        if self.indicators.remove(name).is_some() {
            tracing::info!("Removed dynamic health indicator: {}", name);
            true
        } else {
            false
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.indicators.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

impl DynamicIndicators for IndicatorPool {
    fn indicators(&self) -> IndicatorMap {
        self.indicators
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Actuator, ConstantIndicator, HealthStatus};

    #[test]
    fn add_and_remove_members() {
        let pool = IndicatorPool::new();
        assert!(pool.is_empty());

        pool.add("node-b", ConstantIndicator::up());
        pool.add("node-a", ConstantIndicator::up());
        assert_eq!(pool.names(), vec!["node-a", "node-b"]);

        assert!(pool.remove("node-a"));
        assert!(!pool.remove("node-a"));
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test]
    async fn membership_changes_are_seen_by_the_actuator() {
        let pool = IndicatorPool::new();
        let actuator = Actuator::new();
        actuator.set_dynamic_indicators(pool.clone());

        pool.add("node-1", ConstantIndicator::up());
        let health = actuator.health(false).await;
        assert_eq!(health.status, HealthStatus::Up);
        assert!(health.components.contains_key("node-1"));

        pool.add("node-2", ConstantIndicator::down());
        assert_eq!(actuator.health(false).await.status, HealthStatus::Down);

        pool.remove("node-2");
        let health = actuator.health(false).await;
        assert_eq!(health.status, HealthStatus::Up);
        assert_eq!(health.components.len(), 1);
    }
}
