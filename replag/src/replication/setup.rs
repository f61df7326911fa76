use crate::db::EndpointDb;
use crate::error::{BenchError, BenchResult, ErrorKind};

/// Tables covered by the publication.
///
/// `pgbench_branches` and `pgbench_tellers` are heavily updated but tiny; the accounts
/// and history tables carry the bulk of the change volume.
pub const REPLICATED_TABLES: &[&str] = &["pgbench_accounts", "pgbench_history"];

/// Wires the subscriber up to the publisher over logical replication.
///
/// Both endpoints are expected to carry identical seeded pgbench schemas. The
/// subscriber's copies of the replicated tables are truncated first so the initial
/// table sync starts from empty tables instead of colliding with seeded rows.
pub async fn establish_replication(
    publisher: &dyn EndpointDb,
    subscriber: &dyn EndpointDb,
    publisher_uri: &str,
    publication: &str,
    subscription: &str,
) -> BenchResult<()> {
    for table in REPLICATED_TABLES {
        subscriber
            .truncate_table(table)
            .await
            .map_err(|e| setup_error("truncate replicated tables", e))?;
    }

    publisher
        .create_publication(publication, REPLICATED_TABLES)
        .await
        .map_err(|e| setup_error("create publication", e))?;

    subscriber
        .create_subscription(subscription, publisher_uri, publication)
        .await
        .map_err(|e| setup_error("create subscription", e))?;

    Ok(())
}

fn setup_error(step: &'static str, source: BenchError) -> BenchError {
    BenchError::from((
        ErrorKind::ReplicationSetupFailed,
        "Replication setup failed",
        format!("{step}: {source}"),
    ))
}
