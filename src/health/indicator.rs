// src/health/indicator.rs
use super::outcome::{Health, HealthDetails};
use super::status::HealthStatus;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A named health source.
///
/// Failures are reported in-band as a `DOWN` outcome, never as an error, so
/// one broken indicator cannot abort the aggregate. When `with_details` is
/// false the outcome must not carry `details`, and any expensive diagnostic
/// work may be skipped. Implementations are expected to bound their own run
/// time.
#[async_trait]
pub trait HealthIndicator: Send + Sync {
    async fn health(&self, with_details: bool) -> Health;
}

#[async_trait]
impl<T: HealthIndicator + ?Sized> HealthIndicator for Arc<T> {
    async fn health(&self, with_details: bool) -> Health {
        (**self).health(with_details).await
    }
}

/// Indicators keyed by the component name they report under.
pub type IndicatorMap = HashMap<String, Arc<dyn HealthIndicator>>;

/// Supplies a set of indicators that may change between evaluations,
/// e.g. the members of a cluster currently alive.
pub trait DynamicIndicators: Send + Sync {
    fn indicators(&self) -> IndicatorMap;
}

impl<F> DynamicIndicators for F
where
    F: Fn() -> IndicatorMap + Send + Sync,
{
    fn indicators(&self) -> IndicatorMap {
        self()
    }
}

/// Reports a fixed status. Registered as `self` by the binary.
#[derive(Debug, Clone, Default)]
pub struct ConstantIndicator {
    status: HealthStatus,
    details: Option<HealthDetails>,
    groups: Option<Vec<String>>,
}

impl ConstantIndicator {
    pub fn new(status: HealthStatus) -> Self {
        Self {
            status,
            details: None,
            groups: None,
        }
    }

    pub fn up() -> Self {
        Self::new(HealthStatus::Up)
    }

    pub fn down() -> Self {
        Self::new(HealthStatus::Down)
    }

    pub fn with_details(mut self, details: HealthDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = Some(groups);
        self
    }
}

#[async_trait]
impl HealthIndicator for ConstantIndicator {
    async fn health(&self, with_details: bool) -> Health {
        let mut health = Health::new(self.status);
        health.groups = self.groups.clone();

        // An explicit, possibly empty, details object tells the caller that
        // detail was honoured.
        if with_details {
            health.details = Some(self.details.clone().unwrap_or_default());
        }

        health
    }
}

/// Adapts a synchronous check function into an indicator.
///
/// `Ok(details)` reports `UP`; `Err(e)` reports `DOWN` with `details.error`.
/// The function runs on the blocking pool, so a check that blocks does not
/// hold up the runtime and is still cut off by the actuator's deadline.
pub struct FnIndicator<F> {
    check_fn: Arc<F>,
}

impl<F> FnIndicator<F>
where
    F: Fn() -> anyhow::Result<HealthDetails> + Send + Sync + 'static,
{
    pub fn new(check_fn: F) -> Self {
        Self {
            check_fn: Arc::new(check_fn),
        }
    }
}

#[async_trait]
impl<F> HealthIndicator for FnIndicator<F>
where
    F: Fn() -> anyhow::Result<HealthDetails> + Send + Sync + 'static,
{
    async fn health(&self, with_details: bool) -> Health {
        let check_fn = self.check_fn.clone();
        match tokio::task::spawn_blocking(move || (*check_fn)()).await {
            Ok(Ok(details)) if with_details => Health::up().with_details(details),
            Ok(Ok(_)) => Health::up(),
            Ok(Err(e)) => Health::down_with_error(format!("{:#}", e), with_details),
            Err(e) => Health::down_with_error(format!("check failed: {}", e), with_details),
        }
    }
}
