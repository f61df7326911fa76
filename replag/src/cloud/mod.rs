//! Control plane integration for provisioning Postgres projects.
//!
//! This module contains the abstraction and implementation used by the harness
//! to create, restart, inspect, and delete the projects hosting the publisher
//! and subscriber endpoints. Consumers should depend on the trait
//! [`ControlPlane`] and avoid relying on a specific transport.
//!
//! The default client, [`http::HttpControlPlane`], talks to a Neon-style HTTP
//! API using a bearer token. Keeping the abstraction in [`base`] lets us swap
//! implementations in tests and offline environments.

mod base;
pub mod http;

pub use base::*;
