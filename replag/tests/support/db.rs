use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use replag::db::{EndpointConnector, EndpointDb};
use replag::error::BenchResult;
use replag::types::{Endpoint, EndpointRole};
use tokio_postgres::types::PgLsn;

/// Shared, scripted state for one endpoint's SQL surface.
///
/// Tests tweak the knobs; every connection handed out for the endpoint reads and
/// mutates the same state, mirroring how real connections observe one server.
#[derive(Default)]
pub struct EndpointScript {
    /// Position reported by `flush_lsn`.
    pub flush: AtomicU64,
    /// Position reported by `applied_lsn`, advanced by `apply_step` after every poll.
    pub applied: AtomicU64,
    /// How far `applied` advances per poll, capped at `flush`. Zero keeps it in place.
    pub apply_step: AtomicU64,
    /// Number of polls that report no position before `applied` kicks in.
    pub null_polls: AtomicU32,
    /// Value reported by `sum_account_balances`.
    pub balance_total: AtomicI64,
    /// Every statement executed against the endpoint, in order.
    pub statements: Mutex<Vec<String>>,
    /// Number of connections opened to the endpoint.
    pub connects: AtomicU32,
    /// Optional cross-endpoint call trace, shared between scripts.
    trace: Mutex<Option<(&'static str, Arc<Mutex<Vec<String>>>)>>,
}

impl EndpointScript {
    /// An endpoint already at `position`, with the subscriber side caught up.
    pub fn caught_up(position: u64) -> Arc<Self> {
        let script = Self::default();
        script.flush.store(position, Ordering::SeqCst);
        script.applied.store(position, Ordering::SeqCst);

        Arc::new(script)
    }

    /// A subscriber starting at `start` that applies `step` positions per poll,
    /// against a publisher flush position of `flush`.
    pub fn stepping(flush: u64, start: u64, step: u64) -> Arc<Self> {
        let script = Self::default();
        script.flush.store(flush, Ordering::SeqCst);
        script.applied.store(start, Ordering::SeqCst);
        script.apply_step.store(step, Ordering::SeqCst);

        Arc::new(script)
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn connects(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    /// Labels position reads from this endpoint and appends them to `log`, which
    /// can be shared with another script to assert cross-endpoint call order.
    pub fn trace_position_reads(&self, label: &'static str, log: Arc<Mutex<Vec<String>>>) {
        *self.trace.lock().unwrap() = Some((label, log));
    }

    fn trace_call(&self, call: &str) {
        if let Some((label, log)) = self.trace.lock().unwrap().as_ref() {
            log.lock().unwrap().push(format!("{label} {call}"));
        }
    }

    pub fn db(self: &Arc<Self>) -> FakeEndpointDb {
        FakeEndpointDb {
            script: self.clone(),
        }
    }
}

/// [`EndpointDb`] reading from an [`EndpointScript`].
pub struct FakeEndpointDb {
    script: Arc<EndpointScript>,
}

#[async_trait]
impl EndpointDb for FakeEndpointDb {
    async fn flush_lsn(&self) -> BenchResult<PgLsn> {
        self.script.trace_call("flush_lsn");

        Ok(PgLsn::from(self.script.flush.load(Ordering::SeqCst)))
    }

    async fn applied_lsn(&self) -> BenchResult<Option<PgLsn>> {
        self.script.trace_call("applied_lsn");

        if self.script.null_polls.load(Ordering::SeqCst) > 0 {
            self.script.null_polls.fetch_sub(1, Ordering::SeqCst);

            return Ok(None);
        }

        let current = self.script.applied.load(Ordering::SeqCst);
        let step = self.script.apply_step.load(Ordering::SeqCst);
        if step > 0 {
            let flush = self.script.flush.load(Ordering::SeqCst);
            self.script
                .applied
                .store((current + step).min(flush), Ordering::SeqCst);
        }

        Ok(Some(PgLsn::from(current)))
    }

    async fn truncate_table(&self, table: &str) -> BenchResult<()> {
        self.script
            .statements
            .lock()
            .unwrap()
            .push(format!("truncate {table}"));

        Ok(())
    }

    async fn create_publication(&self, name: &str, tables: &[&str]) -> BenchResult<()> {
        self.script.statements.lock().unwrap().push(format!(
            "create publication {name} for table {}",
            tables.join(", ")
        ));

        Ok(())
    }

    async fn create_subscription(
        &self,
        name: &str,
        connection_uri: &str,
        publication: &str,
    ) -> BenchResult<()> {
        self.script.statements.lock().unwrap().push(format!(
            "create subscription {name} connection '{connection_uri}' publication {publication}"
        ));

        Ok(())
    }

    async fn sum_account_balances(&self) -> BenchResult<i64> {
        Ok(self.script.balance_total.load(Ordering::SeqCst))
    }
}

/// [`EndpointConnector`] that hands out scripted connections per endpoint role.
pub struct FakeEndpointConnector {
    pub publisher: Arc<EndpointScript>,
    pub subscriber: Arc<EndpointScript>,
}

impl FakeEndpointConnector {
    pub fn new(publisher: Arc<EndpointScript>, subscriber: Arc<EndpointScript>) -> Self {
        Self {
            publisher,
            subscriber,
        }
    }
}

#[async_trait]
impl EndpointConnector for FakeEndpointConnector {
    async fn connect(&self, endpoint: &Endpoint) -> BenchResult<Box<dyn EndpointDb>> {
        let script = match endpoint.role {
            EndpointRole::Publisher => &self.publisher,
            EndpointRole::Subscriber => &self.subscriber,
        };
        script.connects.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(script.db()))
    }
}
