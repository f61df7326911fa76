use std::fmt;
use std::sync::Once;

use metrics::{Unit, describe_gauge, gauge};
use tracing::info;

static REGISTER_METRICS: Once = Once::new();

pub const INITIAL_SYNC_LAG_SECONDS: &str = "replag_initial_sync_lag_seconds";
pub const REPLICA_LAG_SECONDS: &str = "replag_replica_lag_seconds";
pub const SUBSCRIBER_STORAGE_BYTES: &str = "replag_subscriber_storage_bytes";
pub const PUBLISHER_STORAGE_BYTES: &str = "replag_publisher_storage_bytes";

/// How a recorded value should be read when comparing runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDirection {
    /// Smaller values indicate a better result.
    LowerIsBetter,
    /// Larger values indicate a better result.
    HigherIsBetter,
}

impl fmt::Display for MetricDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricDirection::LowerIsBetter => f.write_str("lower_is_better"),
            MetricDirection::HigherIsBetter => f.write_str("higher_is_better"),
        }
    }
}

/// Destination for benchmark results.
///
/// The run loop records every measured value through this trait so that tests
/// can capture results instead of publishing them to the metrics recorder.
pub trait BenchSink: Send + Sync {
    /// Records a single measured value.
    fn record(&self, name: &'static str, value: f64, unit: Unit, direction: MetricDirection);
}

/// [`BenchSink`] that publishes values as gauges on the global metrics recorder.
///
/// Every recorded value is also logged so that results survive in the run log
/// even when no scraper is attached.
#[derive(Debug, Default)]
pub struct MetricsSink;

impl MetricsSink {
    pub fn new() -> Self {
        register_metrics();

        Self
    }
}

impl BenchSink for MetricsSink {
    fn record(&self, name: &'static str, value: f64, unit: Unit, direction: MetricDirection) {
        gauge!(name).set(value);

        info!(
            metric = name,
            value,
            unit = unit.as_str(),
            direction = %direction,
            "recorded benchmark result"
        );
    }
}

/// Register metrics emitted by the harness. This should be called before starting a run.
/// It is safe to call this method multiple times. It is guaranteed to register the
/// metrics only once.
pub(crate) fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_gauge!(
            INITIAL_SYNC_LAG_SECONDS,
            Unit::Seconds,
            "Time taken for the subscriber to catch up after the initial data copy"
        );

        describe_gauge!(
            REPLICA_LAG_SECONDS,
            Unit::Seconds,
            "Time taken for the subscriber to catch up with the publisher flush position"
        );

        describe_gauge!(
            SUBSCRIBER_STORAGE_BYTES,
            Unit::Bytes,
            "Synthetic storage size of the subscriber project"
        );

        describe_gauge!(
            PUBLISHER_STORAGE_BYTES,
            Unit::Bytes,
            "Synthetic storage size of the publisher project"
        );
    });
}
