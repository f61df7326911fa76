use clap::{Parser, Subcommand, ValueEnum};
use crate::config::load_harness_config;
use replag::cloud::{ControlPlane, HttpControlPlane};
use replag::db::PgConnector;
use replag::metrics::MetricsSink;
use replag::run::LagBench;
use replag::types::ProjectId;
use replag::workload::PgBenchLauncher;
use replag_config::Environment;
use replag_config::shared::{HarnessConfig, RestartTarget};
use replag_telemetry::metrics::init_metrics;
use replag_telemetry::tracing::init_tracing_with_run;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

mod config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to send log output
    #[arg(
        long = "log-target",
        value_enum,
        default_value = "terminal",
        global = true
    )]
    log_target: LogTarget,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Debug, Clone)]
enum LogTarget {
    /// Send logs to terminal with colors and pretty formatting
    Terminal,
    /// Send logs to files in 'logs/' directory
    File,
}

impl From<LogTarget> for Environment {
    fn from(log_target: LogTarget) -> Self {
        match log_target {
            LogTarget::Terminal => Environment::Dev,
            LogTarget::File => Environment::Prod,
        }
    }
}

#[derive(ValueEnum, Debug, Clone)]
enum RestartTargetArg {
    /// Restart the publisher endpoint on every cycle
    Publisher,
    /// Restart the subscriber endpoint on every cycle
    Subscriber,
}

impl From<RestartTargetArg> for RestartTarget {
    fn from(target: RestartTargetArg) -> Self {
        match target {
            RestartTargetArg::Publisher => RestartTarget::Publisher,
            RestartTargetArg::Subscriber => RestartTarget::Subscriber,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the replication lag benchmark
    Run {
        /// Identifier attached to every log line and metric of this run
        #[arg(long)]
        run_id: Option<String>,

        /// Which endpoint the fault injector restarts
        #[arg(long, value_enum)]
        restart_target: Option<RestartTargetArg>,

        /// Steady state duration in seconds
        #[arg(long)]
        test_duration_secs: Option<u64>,

        /// Seconds between two steady state cycles
        #[arg(long)]
        sync_interval_secs: Option<u64>,

        /// Verify that both endpoints converged after draining the workloads
        #[arg(long)]
        check_convergence: bool,
    },
    /// Delete a project left behind by a failed run
    Cleanup {
        /// Identifier of the project to delete
        #[arg(long)]
        project_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The log target also picks the configuration environment.
    let environment: Environment = args.log_target.into();
    environment.set();

    let harness_config = load_harness_config()?;

    match args.command {
        Commands::Run {
            run_id,
            restart_target,
            test_duration_secs,
            sync_interval_secs,
            check_convergence,
        } => {
            let mut harness_config = harness_config;
            if let Some(target) = restart_target {
                harness_config.bench.restart_target = target.into();
            }
            if let Some(secs) = test_duration_secs {
                harness_config.bench.test_duration_secs = secs;
            }
            if let Some(secs) = sync_interval_secs {
                harness_config.bench.sync_interval_secs = secs;
            }
            if check_convergence {
                harness_config.bench.check_convergence = true;
            }
            // Overrides can break the schedule invariants, so validate again.
            harness_config.validate()?;

            let run_id = run_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let _log_flusher =
                init_tracing_with_run(env!("CARGO_BIN_NAME"), Some(run_id.clone()))?;

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(run_benchmark(harness_config, run_id))?;
        }
        Commands::Cleanup { project_id } => {
            let _log_flusher = init_tracing_with_run(env!("CARGO_BIN_NAME"), None)?;

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(cleanup_project(harness_config, project_id))?;
        }
    }

    Ok(())
}

async fn run_benchmark(config: HarnessConfig, run_id: String) -> anyhow::Result<()> {
    // The benchmark runs fine without a scraper attached, results also land in logs.
    if let Err(e) = init_metrics(Some(run_id.clone())) {
        warn!("failed to install the prometheus exporter: {e}");
    }

    let pg_version = config.control_plane.pg_version;
    let control_plane = Arc::new(HttpControlPlane::new(config.control_plane));
    let connector = Arc::new(PgConnector::new());
    let launcher = Arc::new(PgBenchLauncher::new(config.bench.pgbench_path.clone()));
    let sink = Arc::new(MetricsSink::new());

    let bench = LagBench::new(
        config.bench,
        pg_version,
        run_id,
        control_plane,
        connector,
        launcher,
        sink,
    );

    if let Err(err) = bench.run().await {
        error!("an error occurred in the benchmark run: {err}");

        return Err(err.into());
    }

    info!("benchmark run completed");

    Ok(())
}

async fn cleanup_project(config: HarnessConfig, project_id: String) -> anyhow::Result<()> {
    let control_plane = HttpControlPlane::new(config.control_plane);
    let project_id = ProjectId::new(project_id);

    control_plane.delete_project(&project_id).await?;

    info!(project = %project_id, "project deleted");

    Ok(())
}
