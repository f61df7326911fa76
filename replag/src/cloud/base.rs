use async_trait::async_trait;
use replag_config::shared::PgConnectionConfig;

use crate::error::BenchResult;
use crate::types::{Endpoint, EndpointId, EndpointRole, ProjectId};

/// A freshly provisioned project with its default endpoint.
///
/// Returned by [`ControlPlane::create_project`] before the project has been
/// assigned a role in the replicated pair.
#[derive(Debug, Clone)]
pub struct CreatedProject {
    /// Identifier of the provisioned project.
    pub project_id: ProjectId,
    /// Identifier of the project's default endpoint.
    pub endpoint_id: EndpointId,
    /// libpq connection URI for the default endpoint, password included.
    pub connection_uri: String,
    /// Structured connection parameters for the default endpoint.
    pub connection: PgConnectionConfig,
}

impl CreatedProject {
    /// Assigns a role to the project's default endpoint.
    pub fn into_endpoint(self, role: EndpointRole) -> Endpoint {
        Endpoint {
            role,
            project_id: self.project_id,
            endpoint_id: self.endpoint_id,
            connection_uri: self.connection_uri,
            connection: self.connection,
        }
    }
}

/// Client interface describing the control plane operations used by the harness.
///
/// Projects are the unit of provisioning and deletion. Endpoint restarts are
/// the only operation below project granularity, used for fault injection.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Provisions a new project running the given Postgres major version.
    ///
    /// The returned project may still have operations in flight. Callers should
    /// invoke [`ControlPlane::wait_until_idle`] before connecting to it.
    async fn create_project(&self, pg_version: u16) -> BenchResult<CreatedProject>;

    /// Waits until all operations on the project have settled.
    ///
    /// Returns an error if any operation finishes unsuccessfully or if the
    /// project does not settle within the configured operation timeout.
    async fn wait_until_idle(&self, project_id: &ProjectId) -> BenchResult<()>;

    /// Restarts a compute endpoint.
    ///
    /// The restart is asynchronous. Callers should invoke
    /// [`ControlPlane::wait_until_idle`] before reconnecting to the endpoint.
    async fn restart_endpoint(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
    ) -> BenchResult<()>;

    /// Returns the synthetic storage size of the project, in bytes.
    async fn storage_size(&self, project_id: &ProjectId) -> BenchResult<u64>;

    /// Deletes the project and everything in it.
    async fn delete_project(&self, project_id: &ProjectId) -> BenchResult<()>;
}
