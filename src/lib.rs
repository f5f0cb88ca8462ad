// src/lib.rs
pub mod config;
pub mod health;
pub mod server;

pub use health::{
    Actuator, ConstantIndicator, DynamicIndicators, DYNAMIC_SOURCE_COMPONENT, FnIndicator, Health, HealthDetails,
    HealthIndicator, HealthStatus, IndicatorMap, IndicatorPool,
};
