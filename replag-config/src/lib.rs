//! Configuration management for the replication lag harness.
//!
//! Provides environment detection, configuration loading from YAML files,
//! secret handling, and the shared configuration types consumed by the
//! harness components and the benchmark binary.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::*;
pub use load::*;
pub use secret::*;
