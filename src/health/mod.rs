// src/health/mod.rs
mod actuator;
mod indicator;
mod outcome;
mod pool;
mod status;

pub use actuator::{Actuator, DYNAMIC_SOURCE_COMPONENT};
pub use indicator::{ConstantIndicator, DynamicIndicators, FnIndicator, HealthIndicator, IndicatorMap};
pub use outcome::{Health, HealthDetails};
pub use pool::IndicatorPool;
pub use status::HealthStatus;
