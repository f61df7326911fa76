use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// TLS is enabled but no trusted root certificates are provided.
    #[error("Invalid TLS config: `trusted_root_certs` must be set when `enabled` is true")]
    MissingTrustedRootCerts,
    /// The control plane API key is missing.
    #[error("`api_key` must be set for the control plane")]
    MissingApiKey,
    /// Workload client count cannot be zero.
    #[error("`workload_clients` cannot be zero")]
    ZeroWorkloadClients,
    /// The steady state interval cannot be zero.
    #[error("`sync_interval_secs` cannot be zero")]
    ZeroSyncInterval,
    /// The steady state interval cannot exceed the total run duration.
    #[error("`sync_interval_secs` cannot exceed `test_duration_secs`")]
    SyncIntervalExceedsDuration,
    /// The catch-up poll interval cannot be zero.
    #[error("`poll_interval_ms` cannot be zero")]
    ZeroPollInterval,
}
