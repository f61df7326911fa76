use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use replag_config::shared::PgConnectionConfig;
use secrecy::ExposeSecret;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::error::{BenchError, BenchResult, ErrorKind};
use crate::types::{Endpoint, EndpointRole};
use crate::workload::{WorkloadHandle, WorkloadLauncher, WorkloadSpec};
use crate::{bail, bench_error};

/// How long a terminating workload gets to exit after the kill signal.
const TERMINATE_GRACE: Duration = Duration::from_secs(10);

/// [`WorkloadLauncher`] that shells out to the real `pgbench` binary.
#[derive(Debug, Clone)]
pub struct PgBenchLauncher {
    binary: String,
}

impl PgBenchLauncher {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl WorkloadLauncher for PgBenchLauncher {
    async fn initialize(&self, endpoint: &Endpoint, scale: u32) -> BenchResult<()> {
        info!(role = %endpoint.role, scale, "seeding pgbench tables");

        let output = Command::new(&self.binary)
            .arg("-i")
            .arg(format!("-s{scale}"))
            .envs(connection_env(&endpoint.connection))
            .output()
            .await
            .map_err(|e| {
                bench_error!(
                    ErrorKind::WorkloadStartFailed,
                    "Failed to run pgbench initialization",
                    format!("{}: {e}", self.binary)
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                ErrorKind::WorkloadStartFailed,
                "pgbench initialization failed",
                format!("exit status {}: {}", output.status, stderr.trim())
            );
        }

        Ok(())
    }

    async fn launch(
        &self,
        endpoint: &Endpoint,
        spec: &WorkloadSpec,
    ) -> BenchResult<Box<dyn WorkloadHandle>> {
        let mut command = Command::new(&self.binary);
        command
            .args(workload_args(endpoint.role, spec.clients, spec.duration))
            .envs(connection_env(&endpoint.connection))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            bench_error!(
                ErrorKind::WorkloadStartFailed,
                "Failed to spawn pgbench",
                format!("{}: {e}", self.binary)
            )
        })?;

        info!(
            role = %endpoint.role,
            clients = spec.clients,
            duration_secs = spec.duration.as_secs(),
            "launched pgbench workload"
        );

        Ok(Box::new(PgBenchHandle::new(child, endpoint.role)))
    }
}

/// Builds the pgbench arguments for one endpoint role.
fn workload_args(role: EndpointRole, clients: u16, duration: Duration) -> Vec<String> {
    let mut args = vec![format!("-c{clients}"), format!("-T{}", duration.as_secs())];

    match role {
        EndpointRole::Publisher => args.push("-Mprepared".to_string()),
        EndpointRole::Subscriber => args.push("-S".to_string()),
    }

    args
}

/// Connection environment for a pgbench invocation.
///
/// pgbench reads connection settings from the libpq environment, which keeps the
/// password off the command line.
fn connection_env(connection: &PgConnectionConfig) -> Vec<(&'static str, String)> {
    let ssl_mode = if connection.tls.enabled {
        "require"
    } else {
        "prefer"
    };

    let mut env = vec![
        ("PGHOST", connection.host.clone()),
        ("PGPORT", connection.port.to_string()),
        ("PGDATABASE", connection.name.clone()),
        ("PGUSER", connection.username.clone()),
        ("PGSSLMODE", ssl_mode.to_string()),
    ];

    if let Some(password) = &connection.password {
        env.push(("PGPASSWORD", password.expose_secret().to_string()));
    }

    env
}

/// Handle to a spawned pgbench process.
pub struct PgBenchHandle {
    child: Child,
    role: EndpointRole,
    finished: bool,
}

impl PgBenchHandle {
    pub(crate) fn new(child: Child, role: EndpointRole) -> Self {
        Self {
            child,
            role,
            finished: false,
        }
    }
}

#[async_trait]
impl WorkloadHandle for PgBenchHandle {
    fn is_running(&mut self) -> BenchResult<bool> {
        if self.finished {
            return Ok(false);
        }

        match self.child.try_wait()? {
            Some(status) => {
                self.finished = true;
                warn!(role = %self.role, %status, "pgbench workload exited");

                Ok(false)
            }
            None => Ok(true),
        }
    }

    async fn terminate(&mut self) -> BenchResult<()> {
        if self.finished {
            return Ok(());
        }

        // start_kill errors when the process already exited; the wait below settles it.
        let _ = self.child.start_kill();

        match tokio::time::timeout(TERMINATE_GRACE, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                self.finished = true;
                info!(role = %self.role, %status, "pgbench workload terminated");

                Ok(())
            }
            Err(_) => Err(bench_error!(
                ErrorKind::CleanupFailed,
                "pgbench did not exit after kill",
                format!(
                    "{} workload still running after {}s",
                    self.role,
                    TERMINATE_GRACE.as_secs()
                )
            )),
        }
    }
}
