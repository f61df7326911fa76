use std::fmt;

use replag_config::shared::{PgConnectionConfig, RestartTarget};

/// Identifier of a project provisioned through the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a [`ProjectId`] from the control plane representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a compute endpoint within a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointId(String);

impl EndpointId {
    /// Creates an [`EndpointId`] from the control plane representation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role an endpoint plays in the replicated pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    /// The endpoint the write workload runs against.
    Publisher,
    /// The endpoint that applies the replicated changes.
    Subscriber,
}

impl EndpointRole {
    /// Returns the role name used in log fields and workload labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointRole::Publisher => "publisher",
            EndpointRole::Subscriber => "subscriber",
        }
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RestartTarget> for EndpointRole {
    fn from(target: RestartTarget) -> Self {
        match target {
            RestartTarget::Publisher => EndpointRole::Publisher,
            RestartTarget::Subscriber => EndpointRole::Subscriber,
        }
    }
}

/// A provisioned compute endpoint together with everything needed to reach it.
///
/// Carries both the libpq connection URI, which is handed to pgbench and embedded
/// in the subscription, and the structured connection parameters used for direct
/// client connections.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Role of this endpoint in the replicated pair.
    pub role: EndpointRole,
    /// Project the endpoint belongs to.
    pub project_id: ProjectId,
    /// Identifier of the endpoint within the project.
    pub endpoint_id: EndpointId,
    /// libpq connection URI, password included.
    pub connection_uri: String,
    /// Structured connection parameters.
    pub connection: PgConnectionConfig,
}
