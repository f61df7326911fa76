//! Logical replication setup and lag measurement.
//!
//! Replication is established with plain SQL on both endpoints. Lag is measured by
//! capturing the publisher's flush position and polling the subscriber until its apply
//! worker confirms that position.

mod lag;
mod setup;

pub use lag::*;
pub use setup::*;
