use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Which endpoint the fault injector restarts during steady state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartTarget {
    /// Restart the endpoint the write workload runs against.
    Publisher,
    /// Restart the endpoint that applies the replicated changes.
    Subscriber,
}

impl fmt::Display for RestartTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartTarget::Publisher => write!(f, "publisher"),
            RestartTarget::Subscriber => write!(f, "subscriber"),
        }
    }
}

/// Configuration for a single benchmark run.
///
/// Contains the replication object names, the steady state schedule, and
/// the pgbench workload parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BenchConfig {
    /// Name of the publication created on the publisher endpoint.
    pub publication_name: String,
    /// Name of the subscription created on the subscriber endpoint.
    pub subscription_name: String,
    /// Which endpoint is restarted on every steady state cycle.
    pub restart_target: RestartTarget,
    /// Total duration of the steady state phase, in seconds.
    pub test_duration_secs: u64,
    /// Seconds between two steady state cycles.
    pub sync_interval_secs: u64,
    /// Maximum seconds to wait for the subscriber to catch up with the publisher.
    pub sync_timeout_secs: u64,
    /// Milliseconds between two subscriber position polls while waiting for catch-up.
    pub poll_interval_ms: u64,
    /// Number of concurrent pgbench clients per workload.
    pub workload_clients: u16,
    /// pgbench scale factor used when seeding the dataset.
    pub seed_scale: u32,
    /// Path to the pgbench binary.
    pub pgbench_path: String,
    /// Whether to verify that both endpoints converged to the same account balance
    /// total after draining the workloads.
    pub check_convergence: bool,
}

impl BenchConfig {
    /// Total duration of the steady state phase.
    pub fn test_duration(&self) -> Duration {
        Duration::from_secs(self.test_duration_secs)
    }

    /// Pause between two steady state cycles.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// Maximum time to wait for the subscriber to catch up.
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    /// Pause between two subscriber position polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Duration passed to pgbench via `-T`.
    ///
    /// Workloads are given twice the steady state duration so that they outlive
    /// the run and are always terminated by the harness rather than by pgbench
    /// itself.
    pub fn workload_duration(&self) -> Duration {
        Duration::from_secs(self.test_duration_secs * 2)
    }

    /// Validates the benchmark configuration.
    ///
    /// Checks that the workload has at least one client and that the steady
    /// state schedule is coherent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workload_clients == 0 {
            return Err(ValidationError::ZeroWorkloadClients);
        }

        if self.sync_interval_secs == 0 {
            return Err(ValidationError::ZeroSyncInterval);
        }

        if self.sync_interval_secs > self.test_duration_secs {
            return Err(ValidationError::SyncIntervalExceedsDuration);
        }

        if self.poll_interval_ms == 0 {
            return Err(ValidationError::ZeroPollInterval);
        }

        Ok(())
    }
}
