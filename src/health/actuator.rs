// src/health/actuator.rs
use super::indicator::{DynamicIndicators, HealthIndicator, IndicatorMap};
use super::outcome::Health;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

type DynamicSource = Box<dyn DynamicIndicators>;

/// Component reported when the dynamic source itself fails or overruns the
/// deadline.
pub const DYNAMIC_SOURCE_COMPONENT: &str = "dynamicIndicators";

/// Aborts the task when the handle is dropped, so an abandoned evaluation
/// does not leave indicator tasks running.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

/// Aggregates named indicators into a single health report.
///
/// Indicators come from two places: the static registry filled through
/// [`Actuator::register_indicator`], and an optional dynamic source that is
/// asked for a fresh set on every evaluation. A dynamic entry replaces a
/// static one of the same name.
///
/// Registration is safe while evaluations are in flight.
pub struct Actuator {
    indicators: DashMap<String, Arc<dyn HealthIndicator>>,
    dynamic: ArcSwapOption<DynamicSource>,
    timeout: Option<Duration>,
}

impl Default for Actuator {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator {
    pub fn new() -> Self {
        Self {
            indicators: DashMap::new(),
            dynamic: ArcSwapOption::empty(),
            timeout: None,
        }
    }

    /// Sets the deadline applied by [`Actuator::health`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Registers `indicator` under `name`, replacing any previous entry.
    pub fn register_indicator<I>(&self, name: impl Into<String>, indicator: I)
    where
        I: HealthIndicator + 'static,
    {
        self.register_shared(name, Arc::new(indicator));
    }

    pub fn register_shared(&self, name: impl Into<String>, indicator: Arc<dyn HealthIndicator>) {
        let name = name.into();
        if self.indicators.insert(name.clone(), indicator).is_some() {
            debug!("Replaced health indicator '{}'", name);
        } else {
            debug!("Registered health indicator '{}'", name);
        }
    }

    pub fn deregister_indicator(&self, name: &str) -> bool {
        self.indicators.remove(name).is_some()
    }

    /// Installs the dynamic indicator source, replacing the previous one.
    pub fn set_dynamic_indicators<D>(&self, source: D)
    where
        D: DynamicIndicators + 'static,
    {
        let source: DynamicSource = Box::new(source);
        self.dynamic.store(Some(Arc::new(source)));
    }

    pub fn clear_dynamic_indicators(&self) {
        self.dynamic.store(None);
    }

    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }

    /// Evaluates every indicator using the configured deadline.
    pub async fn health(&self, with_details: bool) -> Health {
        self.health_within(with_details, self.timeout).await
    }

    /// Evaluates every indicator concurrently and folds the outcomes.
    ///
    /// Indicators still running when `timeout` elapses are cancelled and
    /// reported `DOWN`. The fold runs in name order, so the result does not
    /// depend on which indicator finished first.
    pub async fn health_within(&self, with_details: bool, timeout: Option<Duration>) -> Health {
        let deadline = timeout.map(|t| Instant::now() + t);
        let timeout_ms = timeout.unwrap_or_default().as_millis();

        let mut indicators = self.static_indicators();
        let mut source_failure = None;
        match self.dynamic_indicators(deadline).await {
            Ok(Some(dynamic)) => {
                for (name, indicator) in dynamic {
                    if indicators.contains_key(&name) {
                        debug!("Dynamic health indicator '{}' shadows a static one", name);
                    }
                    indicators.insert(name, indicator);
                }
            }
            Ok(None) => {}
            Err(reason) => {
                warn!("Dynamic health indicators unavailable: {}", reason);
                source_failure = Some(reason);
            }
        }

        let tasks = indicators.into_iter().map(|(name, indicator)| {
            let handle = AbortOnDrop(tokio::spawn(async move {
                match deadline {
                    Some(at) => timeout_at(at, indicator.health(with_details)).await.ok(),
                    None => Some(indicator.health(with_details).await),
                }
            }));
            async move { (name, handle.await) }
        });

        let results = futures::future::join_all(tasks).await;

        let mut aggregate = Health::up();
        for (name, result) in results {
            let mut component = match result {
                Ok(Some(health)) => health,
                Ok(None) => {
                    warn!("Health indicator '{}' timed out after {}ms", name, timeout_ms);
                    Health::down_with_error(format!("timed out after {}ms", timeout_ms), with_details)
                }
                Err(e) => {
                    warn!("Health indicator '{}' failed: {}", name, e);
                    Health::down_with_error(format!("indicator failed: {}", e), with_details)
                }
            };

            if !with_details {
                component.strip_details();
            }

            if component.is_down() {
                warn!("Health indicator '{}' is DOWN", name);
            } else {
                debug!("Health indicator '{}' is {}", name, component.status);
            }

            aggregate.add_component(name, component);
        }

        if let Some(reason) = source_failure {
            aggregate.add_component(
                DYNAMIC_SOURCE_COMPONENT,
                Health::down_with_error(reason, with_details),
            );
        }

        debug!(
            "Health evaluation complete: {} components, status {}",
            aggregate.components.len(),
            aggregate.status
        );

        aggregate
    }

    fn static_indicators(&self) -> BTreeMap<String, Arc<dyn HealthIndicator>> {
        self.indicators
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Asks the dynamic source for its current set. The source runs on the
    /// blocking pool under the same deadline as the indicators, so a slow or
    /// panicking source is reported instead of stalling the evaluation.
    async fn dynamic_indicators(&self, deadline: Option<Instant>) -> Result<Option<IndicatorMap>, String> {
        let Some(source) = self.dynamic.load_full() else {
            return Ok(None);
        };

        let lookup = AbortOnDrop(tokio::task::spawn_blocking(move || source.indicators()));
        let joined = match deadline {
            Some(at) => timeout_at(at, lookup)
                .await
                .map_err(|_| "dynamic source timed out".to_string())?,
            None => lookup.await,
        };

        joined
            .map(Some)
            .map_err(|e| format!("dynamic source failed: {}", e))
    }
}

/// An actuator can be nested as a component of another actuator.
#[async_trait]
impl HealthIndicator for Actuator {
    async fn health(&self, with_details: bool) -> Health {
        Actuator::health(self, with_details).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{ConstantIndicator, HealthStatus, IndicatorMap};

    #[tokio::test]
    async fn empty_registry_is_up() {
        let health = Actuator::new().health(true).await;
        assert_eq!(health.status, HealthStatus::Up);
        assert!(health.components.is_empty());
        assert!(health.details.is_none());
    }

    #[tokio::test]
    async fn re_registration_overwrites() {
        let actuator = Actuator::new();
        actuator.register_indicator("db", ConstantIndicator::down());
        actuator.register_indicator("db", ConstantIndicator::up());

        let health = actuator.health(false).await;
        assert_eq!(actuator.indicator_count(), 1);
        assert_eq!(health.status, HealthStatus::Up);
    }

    #[tokio::test]
    async fn deregistered_indicator_is_not_evaluated() {
        let actuator = Actuator::new();
        actuator.register_indicator("db", ConstantIndicator::down());
        assert!(actuator.deregister_indicator("db"));
        assert!(!actuator.deregister_indicator("db"));

        assert_eq!(actuator.health(false).await.status, HealthStatus::Up);
    }

    #[tokio::test]
    async fn cleared_dynamic_source_is_not_consulted() {
        let actuator = Actuator::new();
        actuator.set_dynamic_indicators(|| {
            let mut map = IndicatorMap::new();
            map.insert("peer".into(), Arc::new(ConstantIndicator::down()) as Arc<dyn HealthIndicator>);
            map
        });
        assert_eq!(actuator.health(false).await.status, HealthStatus::Down);

        actuator.clear_dynamic_indicators();
        let health = actuator.health(false).await;
        assert_eq!(health.status, HealthStatus::Up);
        assert!(health.components.is_empty());
    }
}
