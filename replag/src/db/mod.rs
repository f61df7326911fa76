//! Database access for the publisher and subscriber endpoints.
//!
//! The harness only ever issues plain SQL against the endpoints: position
//! queries, replication object creation, and dataset checks. Consumers should
//! depend on the traits [`EndpointDb`] and [`EndpointConnector`] so that tests
//! can script endpoint behavior without a server.
//!
//! The default implementation in [`postgres`] connects with tokio-postgres,
//! using rustls when the endpoint requires TLS.

mod postgres;

pub use postgres::*;

use async_trait::async_trait;
use tokio_postgres::types::PgLsn;

use crate::error::BenchResult;
use crate::types::Endpoint;

/// SQL-level operations the harness performs against a single endpoint.
#[async_trait]
pub trait EndpointDb: Send + Sync {
    /// Returns the last write-ahead log position flushed to disk.
    async fn flush_lsn(&self) -> BenchResult<PgLsn>;

    /// Returns the last write-ahead log position the subscription has received.
    ///
    /// Returns `None` while the subscription exists but has not reported a
    /// position yet, which is normal right after the subscription is created
    /// or while the apply worker is restarting.
    async fn applied_lsn(&self) -> BenchResult<Option<PgLsn>>;

    /// Removes all rows from the named table.
    async fn truncate_table(&self, table: &str) -> BenchResult<()>;

    /// Creates a publication covering the given tables.
    async fn create_publication(&self, name: &str, tables: &[&str]) -> BenchResult<()>;

    /// Creates a subscription to `publication` on the publisher reachable at
    /// `connection_uri`.
    async fn create_subscription(
        &self,
        name: &str,
        connection_uri: &str,
        publication: &str,
    ) -> BenchResult<()>;

    /// Returns the sum of all account balances in the pgbench dataset.
    async fn sum_account_balances(&self) -> BenchResult<i64>;
}

/// Opens SQL connections to endpoints.
#[async_trait]
pub trait EndpointConnector: Send + Sync {
    /// Connects to the endpoint and returns a database handle for it.
    ///
    /// Endpoints restart mid-run, so callers open a fresh handle per cycle
    /// instead of holding one across fault injection.
    async fn connect(&self, endpoint: &Endpoint) -> BenchResult<Box<dyn EndpointDb>>;
}
