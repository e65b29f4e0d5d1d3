//! Internal telemetry for the filter analytics service.
//!
//! Structured logging plus in-process counters and health state.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
