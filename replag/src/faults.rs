//! Fault injection against provisioned endpoints.

use std::sync::Arc;

use tracing::info;

use crate::cloud::ControlPlane;
use crate::error::{BenchError, BenchResult, ErrorKind};
use crate::types::Endpoint;
use crate::workload::WorkloadHandle;

/// Restarts endpoints through the control plane to exercise replication recovery.
///
/// Only the endpoint passed to [`FaultInjector::restart`] is touched. Anything running
/// against the other endpoint keeps going through the restart.
#[derive(Clone)]
pub struct FaultInjector {
    control_plane: Arc<dyn ControlPlane>,
}

impl FaultInjector {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Restarts the endpoint and waits for the control plane to settle before
    /// returning, so callers can reconnect immediately afterwards.
    ///
    /// The endpoint's workload is terminated first, otherwise its sessions break
    /// mid-statement when the compute goes away. Relaunching the workload is the
    /// caller's responsibility.
    pub async fn restart(
        &self,
        endpoint: &Endpoint,
        workload: &mut dyn WorkloadHandle,
    ) -> BenchResult<()> {
        info!(
            role = %endpoint.role,
            endpoint = %endpoint.endpoint_id,
            "injecting endpoint restart"
        );

        workload
            .terminate()
            .await
            .map_err(|e| fault_error(endpoint, e))?;

        self.control_plane
            .restart_endpoint(&endpoint.project_id, &endpoint.endpoint_id)
            .await
            .map_err(|e| fault_error(endpoint, e))?;

        self.control_plane
            .wait_until_idle(&endpoint.project_id)
            .await
            .map_err(|e| fault_error(endpoint, e))?;

        info!(
            role = %endpoint.role,
            endpoint = %endpoint.endpoint_id,
            "endpoint restart settled"
        );

        Ok(())
    }
}

fn fault_error(endpoint: &Endpoint, source: BenchError) -> BenchError {
    BenchError::from((
        ErrorKind::FaultInjectionFailed,
        "Endpoint restart failed",
        format!(
            "restart of {} endpoint {}: {}",
            endpoint.role, endpoint.endpoint_id, source
        ),
    ))
}
