//! Scripted stand-ins for the external surfaces of a benchmark run.
//!
//! Each fake records what was asked of it so tests can assert on ordering and
//! counts without provisioning real infrastructure.

#![allow(dead_code)]

pub mod cloud;
pub mod db;
pub mod sink;
pub mod workload;
