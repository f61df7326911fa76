use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{BenchConfig, ControlPlaneConfig, ValidationError};

/// Complete configuration for the replication lag harness.
///
/// Aggregates the control plane settings and the benchmark settings. Typically
/// loaded from configuration files at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HarnessConfig {
    /// Configuration for the control plane that provisions projects.
    pub control_plane: ControlPlaneConfig,
    /// Configuration for the benchmark run itself.
    pub bench: BenchConfig,
}

impl HarnessConfig {
    /// Validates the complete harness configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.control_plane.validate()?;
        self.bench.validate()
    }
}

impl Config for HarnessConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}
