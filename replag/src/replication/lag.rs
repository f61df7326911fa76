use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_postgres::types::PgLsn;
use tracing::{debug, info};

use crate::bail;
use crate::db::EndpointDb;
use crate::error::{BenchError, BenchResult, ErrorKind};

/// Outcome of a single lag measurement.
#[derive(Debug, Clone, Copy)]
pub struct LagSample {
    /// Publisher flush position the subscriber had to reach.
    pub target: PgLsn,
    /// Time the subscriber took to confirm the target position.
    pub caught_up_in: Duration,
}

impl LagSample {
    pub fn seconds(&self) -> f64 {
        self.caught_up_in.as_secs_f64()
    }
}

/// Measures how long the subscriber takes to reach the publisher's current flush
/// position.
///
/// The publisher position is captured before the first subscriber poll, so writes that
/// land while polling never move the goalpost of this measurement.
pub async fn measure_replication_lag(
    publisher: &dyn EndpointDb,
    subscriber: &dyn EndpointDb,
    timeout: Duration,
    poll_interval: Duration,
) -> BenchResult<LagSample> {
    let target = publisher.flush_lsn().await?;

    let caught_up_in = poll_until_caught_up(subscriber, target, timeout, poll_interval).await?;

    Ok(LagSample {
        target,
        caught_up_in,
    })
}

/// Polls the subscriber until its applied position reaches `target`.
///
/// A subscriber that has not reported a position yet, either because the subscription
/// row is missing or because `latest_end_lsn` is still null while the apply worker
/// starts up, counts as behind and is polled again.
pub async fn poll_until_caught_up(
    subscriber: &dyn EndpointDb,
    target: PgLsn,
    timeout: Duration,
    poll_interval: Duration,
) -> BenchResult<Duration> {
    let started = Instant::now();

    loop {
        match subscriber.applied_lsn().await? {
            Some(applied) if applied >= target => {
                let elapsed = started.elapsed();
                info!(
                    target = %target,
                    applied = %applied,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "subscriber caught up"
                );

                return Ok(elapsed);
            }
            Some(applied) => {
                debug!(target = %target, applied = %applied, "subscriber still behind");
            }
            None => {
                debug!(target = %target, "subscriber has not reported a position yet");
            }
        }

        if started.elapsed() >= timeout {
            bail!(
                ErrorKind::LagTimeout,
                "Subscriber failed to catch up in time",
                format!(
                    "target position {target} not reached within {}s",
                    timeout.as_secs()
                )
            );
        }

        sleep(poll_interval).await;
    }
}
