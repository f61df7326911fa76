pub mod cloud;
pub mod db;
pub mod error;
pub mod faults;
mod macros;
pub mod metrics;
pub mod replication;
pub mod run;
pub mod types;
pub mod workload;
