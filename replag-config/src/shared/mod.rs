mod base;
mod bench;
mod cloud;
mod connection;
mod harness;

pub use base::*;
pub use bench::*;
pub use cloud::*;
pub use connection::*;
pub use harness::*;
