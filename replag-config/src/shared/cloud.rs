use std::time::Duration;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;
use crate::shared::{TlsConfig, ValidationError};

/// Configuration for the control plane that provisions Postgres projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ControlPlaneConfig {
    /// Base URL of the control plane API, without a trailing slash.
    pub base_url: String,
    /// API key sent as a bearer token on every request. This field is sensitive
    /// and redacted in debug output.
    pub api_key: SerializableSecretString,
    /// Postgres major version requested for provisioned projects.
    pub pg_version: u16,
    /// Maximum seconds to wait for project operations to settle.
    pub operation_timeout_secs: u64,
    /// TLS settings applied to connections against provisioned endpoints.
    pub endpoint_tls: TlsConfig,
}

impl ControlPlaneConfig {
    /// Maximum time to wait for project operations to settle.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    /// Validates the control plane configuration.
    ///
    /// Checks that an API key is present and that the endpoint TLS settings
    /// are coherent.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingApiKey);
        }

        self.endpoint_tls.validate()
    }
}
