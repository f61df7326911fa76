//! Telemetry utilities for the replication lag harness.
//!
//! Provides tracing initialization with environment-aware output and a
//! Prometheus metrics exporter, both tagged with the current run id.

pub mod metrics;
pub mod tracing;

pub use crate::tracing::{
    LogFlusher, TracingError, init_test_tracing, init_tracing, init_tracing_with_run,
};
