//! pgbench workload management.
//!
//! Workloads run as external `pgbench` processes, one per endpoint. The launcher trait
//! is the seam that lets tests substitute scripted workloads for real pgbench
//! invocations.

mod pgbench;

pub use pgbench::*;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BenchResult;
use crate::types::Endpoint;

/// Shape of a workload, shared by both endpoints of a run.
///
/// The flavor of load is derived from the endpoint's role at launch time: the
/// publisher runs the default read/write mix, while the subscriber must not write to
/// replicated tables and runs the built-in select-only script.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadSpec {
    /// Number of concurrent client sessions.
    pub clients: u16,
    /// How long the workload runs before exiting on its own.
    pub duration: Duration,
}

/// Handle to a running workload process.
#[async_trait]
pub trait WorkloadHandle: Send {
    /// Returns whether the workload is still running. A workload that exited on its
    /// own is reported as finished from then on.
    fn is_running(&mut self) -> BenchResult<bool>;

    /// Terminates the workload and waits for it to exit. Safe to call on a workload
    /// that already finished.
    async fn terminate(&mut self) -> BenchResult<()>;
}

/// Starts workloads against endpoints.
#[async_trait]
pub trait WorkloadLauncher: Send + Sync {
    /// Seeds the pgbench schema and data on the endpoint.
    async fn initialize(&self, endpoint: &Endpoint, scale: u32) -> BenchResult<()>;

    /// Launches a workload shaped for the endpoint's role.
    async fn launch(
        &self,
        endpoint: &Endpoint,
        spec: &WorkloadSpec,
    ) -> BenchResult<Box<dyn WorkloadHandle>>;
}
