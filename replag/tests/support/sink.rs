use std::sync::Mutex;

use metrics::Unit;
use replag::metrics::{BenchSink, MetricDirection};

/// A single recorded benchmark sample.
#[derive(Debug, Clone)]
pub struct RecordedMetric {
    pub name: &'static str,
    pub value: f64,
    pub unit: Unit,
    pub direction: MetricDirection,
}

/// [`BenchSink`] that keeps samples in memory for assertions.
#[derive(Default)]
pub struct RecordingSink {
    samples: Mutex<Vec<RecordedMetric>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> Vec<RecordedMetric> {
        self.samples.lock().unwrap().clone()
    }

    pub fn values_of(&self, name: &str) -> Vec<f64> {
        self.samples()
            .iter()
            .filter(|sample| sample.name == name)
            .map(|sample| sample.value)
            .collect()
    }
}

impl BenchSink for RecordingSink {
    fn record(&self, name: &'static str, value: f64, unit: Unit, direction: MetricDirection) {
        self.samples.lock().unwrap().push(RecordedMetric {
            name,
            value,
            unit,
            direction,
        });
    }
}
