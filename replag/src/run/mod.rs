//! Benchmark run orchestration.
//!
//! A run moves through provisioning, replication setup, initial sync, a steady state
//! loop of fault injection and lag measurement, and draining. Resources registered on
//! the [`CleanupStack`] are released at the end no matter how the run finished.

mod cleanup;

pub use cleanup::*;

use std::sync::Arc;

use metrics::Unit;
use replag_config::shared::BenchConfig;
use tokio::time::{Instant, sleep};
use tracing::{Instrument, error, info, info_span};

use crate::cloud::ControlPlane;
use crate::db::EndpointConnector;
use crate::error::{BenchError, BenchResult, ErrorKind};
use crate::faults::FaultInjector;
use crate::metrics::{
    BenchSink, INITIAL_SYNC_LAG_SECONDS, MetricDirection, PUBLISHER_STORAGE_BYTES,
    REPLICA_LAG_SECONDS, SUBSCRIBER_STORAGE_BYTES,
};
use crate::replication::{establish_replication, measure_replication_lag};
use crate::types::{Endpoint, EndpointRole};
use crate::workload::{WorkloadHandle, WorkloadLauncher, WorkloadSpec};
use crate::{bail, bench_error};

/// Drives one full benchmark run against a pair of freshly provisioned endpoints.
///
/// Every external surface the run touches, the control plane, endpoint connections,
/// workloads, and the result sink, is injected so tests can script them.
pub struct LagBench {
    config: BenchConfig,
    pg_version: u16,
    run_id: String,
    control_plane: Arc<dyn ControlPlane>,
    connector: Arc<dyn EndpointConnector>,
    launcher: Arc<dyn WorkloadLauncher>,
    sink: Arc<dyn BenchSink>,
}

impl LagBench {
    pub fn new(
        config: BenchConfig,
        pg_version: u16,
        run_id: String,
        control_plane: Arc<dyn ControlPlane>,
        connector: Arc<dyn EndpointConnector>,
        launcher: Arc<dyn WorkloadLauncher>,
        sink: Arc<dyn BenchSink>,
    ) -> Self {
        Self {
            config,
            pg_version,
            run_id,
            control_plane,
            connector,
            launcher,
            sink,
        }
    }

    /// Runs the benchmark to completion.
    ///
    /// Cleanup actions run regardless of the outcome. After a failed run the
    /// subscriber project is kept so its state can be inspected.
    pub async fn run(self) -> BenchResult<()> {
        let span = info_span!(
            "bench_run",
            run_id = %self.run_id,
            restart_target = %self.config.restart_target
        );

        self.run_inner().instrument(span).await
    }

    async fn run_inner(self) -> BenchResult<()> {
        let mut cleanup = CleanupStack::new();

        let result = self.execute(&mut cleanup).await;

        if let Err(e) = &result {
            error!(error = %e, "benchmark run failed, releasing resources");
        }
        let cleanup_result = cleanup.run(result.is_err()).await;

        match (result, cleanup_result) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(run_err), Ok(())) => Err(run_err),
            (Ok(()), Err(cleanup_err)) => Err(cleanup_err),
            (Err(run_err), Err(cleanup_err)) => Err(vec![run_err, cleanup_err].into()),
        }
    }

    async fn execute(&self, cleanup: &mut CleanupStack) -> BenchResult<()> {
        info!("provisioning publisher and subscriber projects");
        let publisher = self
            .provision_endpoint(EndpointRole::Publisher, cleanup)
            .await?;
        let subscriber = self
            .provision_endpoint(EndpointRole::Subscriber, cleanup)
            .await?;

        info!("seeding pgbench datasets");
        self.launcher
            .initialize(&publisher, self.config.seed_scale)
            .await?;
        self.launcher
            .initialize(&subscriber, self.config.seed_scale)
            .await?;

        info!("establishing logical replication");
        let publisher_db = self.connector.connect(&publisher).await?;
        let subscriber_db = self.connector.connect(&subscriber).await?;
        establish_replication(
            publisher_db.as_ref(),
            subscriber_db.as_ref(),
            &publisher.connection_uri,
            &self.config.publication_name,
            &self.config.subscription_name,
        )
        .await?;

        info!("waiting for the initial table sync");
        let initial_sync = measure_replication_lag(
            publisher_db.as_ref(),
            subscriber_db.as_ref(),
            self.config.sync_timeout(),
            self.config.poll_interval(),
        )
        .await?;
        self.sink.record(
            INITIAL_SYNC_LAG_SECONDS,
            initial_sync.seconds(),
            Unit::Seconds,
            MetricDirection::LowerIsBetter,
        );
        info!(seconds = initial_sync.seconds(), "initial sync complete");

        // Endpoint restarts would sever these sessions anyway. Every later
        // measurement opens fresh connections.
        drop(publisher_db);
        drop(subscriber_db);

        let spec = self.workload_spec();
        let mut publisher_workload = self.launcher.launch(&publisher, &spec).await?;
        let mut subscriber_workload = self.launcher.launch(&subscriber, &spec).await?;

        let steady_result = self
            .steady_state(
                &publisher,
                &subscriber,
                &mut publisher_workload,
                &mut subscriber_workload,
            )
            .await;

        info!("draining workloads");
        let mut drain_errors = Vec::new();
        if let Err(e) = subscriber_workload.terminate().await {
            error!(error = %e, "failed to drain the subscriber workload");
            drain_errors.push(e);
        }
        if let Err(e) = publisher_workload.terminate().await {
            error!(error = %e, "failed to drain the publisher workload");
            drain_errors.push(e);
        }

        steady_result?;

        if !drain_errors.is_empty() {
            return Err(drain_errors.into());
        }

        if self.config.check_convergence {
            self.check_convergence(&publisher, &subscriber).await?;
        }

        Ok(())
    }

    async fn provision_endpoint(
        &self,
        role: EndpointRole,
        cleanup: &mut CleanupStack,
    ) -> BenchResult<Endpoint> {
        let created = self
            .control_plane
            .create_project(self.pg_version)
            .await
            .map_err(|e| provision_error(role, e))?;

        // Registered before waiting so a hung operation still releases the project.
        let (label, policy) = match role {
            EndpointRole::Publisher => ("delete publisher project", CleanupPolicy::Always),
            EndpointRole::Subscriber => {
                ("delete subscriber project", CleanupPolicy::OnSuccessOnly)
            }
        };
        let control_plane = self.control_plane.clone();
        let project_id = created.project_id.clone();
        cleanup.push(label, policy, async move {
            control_plane.delete_project(&project_id).await
        });

        self.control_plane
            .wait_until_idle(&created.project_id)
            .await
            .map_err(|e| provision_error(role, e))?;

        let endpoint = created.into_endpoint(role);
        info!(
            role = %role,
            project = %endpoint.project_id,
            endpoint = %endpoint.endpoint_id,
            "provisioned endpoint"
        );

        Ok(endpoint)
    }

    async fn steady_state(
        &self,
        publisher: &Endpoint,
        subscriber: &Endpoint,
        publisher_workload: &mut Box<dyn WorkloadHandle>,
        subscriber_workload: &mut Box<dyn WorkloadHandle>,
    ) -> BenchResult<()> {
        let fault_injector = FaultInjector::new(self.control_plane.clone());
        let started = Instant::now();
        let mut cycle = 0u32;

        while started.elapsed() < self.config.test_duration() {
            sleep(self.config.sync_interval()).await;
            cycle += 1;

            self.run_cycle(
                cycle,
                &fault_injector,
                publisher,
                subscriber,
                publisher_workload,
                subscriber_workload,
            )
            .await?;
        }

        info!(cycles = cycle, "steady state finished");

        Ok(())
    }

    async fn run_cycle(
        &self,
        cycle: u32,
        fault_injector: &FaultInjector,
        publisher: &Endpoint,
        subscriber: &Endpoint,
        publisher_workload: &mut Box<dyn WorkloadHandle>,
        subscriber_workload: &mut Box<dyn WorkloadHandle>,
    ) -> BenchResult<()> {
        info!(cycle, "starting steady state cycle");

        ensure_running(publisher_workload.as_mut(), EndpointRole::Publisher)?;
        ensure_running(subscriber_workload.as_mut(), EndpointRole::Subscriber)?;

        let (target, target_workload) = match EndpointRole::from(self.config.restart_target) {
            EndpointRole::Publisher => (publisher, &mut *publisher_workload),
            EndpointRole::Subscriber => (subscriber, &mut *subscriber_workload),
        };

        fault_injector.restart(target, target_workload.as_mut()).await?;
        *target_workload = self.launcher.launch(target, &self.workload_spec()).await?;

        let publisher_db = self.connector.connect(publisher).await?;
        let subscriber_db = self.connector.connect(subscriber).await?;

        let sample = measure_replication_lag(
            publisher_db.as_ref(),
            subscriber_db.as_ref(),
            self.config.sync_timeout(),
            self.config.poll_interval(),
        )
        .await?;
        self.sink.record(
            REPLICA_LAG_SECONDS,
            sample.seconds(),
            Unit::Seconds,
            MetricDirection::LowerIsBetter,
        );

        let subscriber_storage = self
            .control_plane
            .storage_size(&subscriber.project_id)
            .await?;
        self.sink.record(
            SUBSCRIBER_STORAGE_BYTES,
            subscriber_storage as f64,
            Unit::Bytes,
            MetricDirection::LowerIsBetter,
        );

        let publisher_storage = self
            .control_plane
            .storage_size(&publisher.project_id)
            .await?;
        self.sink.record(
            PUBLISHER_STORAGE_BYTES,
            publisher_storage as f64,
            Unit::Bytes,
            MetricDirection::LowerIsBetter,
        );

        info!(cycle, lag_secs = sample.seconds(), "completed steady state cycle");

        Ok(())
    }

    /// Compares the account balance totals of both endpoints after the workloads
    /// stopped, once the subscriber has absorbed the tail of the write workload.
    async fn check_convergence(
        &self,
        publisher: &Endpoint,
        subscriber: &Endpoint,
    ) -> BenchResult<()> {
        info!("verifying data convergence");

        let publisher_db = self.connector.connect(publisher).await?;
        let subscriber_db = self.connector.connect(subscriber).await?;

        measure_replication_lag(
            publisher_db.as_ref(),
            subscriber_db.as_ref(),
            self.config.sync_timeout(),
            self.config.poll_interval(),
        )
        .await?;

        let published = publisher_db.sum_account_balances().await?;
        let applied = subscriber_db.sum_account_balances().await?;

        if published != applied {
            bail!(
                ErrorKind::ConvergenceMismatch,
                "Subscriber data diverged from the publisher",
                format!(
                    "publisher balance total {published}, subscriber balance total {applied}"
                )
            );
        }

        info!(balance_total = published, "endpoints converged");

        Ok(())
    }

    fn workload_spec(&self) -> WorkloadSpec {
        WorkloadSpec {
            clients: self.config.workload_clients,
            duration: self.config.workload_duration(),
        }
    }
}

fn ensure_running(workload: &mut dyn WorkloadHandle, role: EndpointRole) -> BenchResult<()> {
    if workload.is_running()? {
        return Ok(());
    }

    Err(bench_error!(
        ErrorKind::WorkloadDied,
        "Workload exited before the run finished",
        role
    ))
}

fn provision_error(role: EndpointRole, source: BenchError) -> BenchError {
    BenchError::from((
        ErrorKind::ProvisionFailed,
        "Endpoint provisioning failed",
        format!("{role}: {source}"),
    ))
}
