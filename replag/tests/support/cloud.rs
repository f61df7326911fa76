use std::sync::Mutex;

use async_trait::async_trait;
use replag::bench_error;
use replag::cloud::{ControlPlane, CreatedProject};
use replag::error::{BenchError, BenchResult, ErrorKind};
use replag::types::{EndpointId, ProjectId};
use replag_config::shared::{PgConnectionConfig, TlsConfig};

#[derive(Default)]
struct Inner {
    created: u32,
    wait_calls: u32,
    restarted: Vec<EndpointId>,
    deleted: Vec<ProjectId>,
    storage_queries: Vec<ProjectId>,
    storage_size: u64,
    fail_restart: bool,
    fail_delete: bool,
    create_limit: Option<u32>,
}

/// [`ControlPlane`] that provisions made-up projects and records every call.
///
/// Projects get sequential identifiers: the first `create_project` call returns
/// `proj-1` with endpoint `ep-1`, the second `proj-2` with `ep-2`, and so on.
#[derive(Default)]
pub struct FakeControlPlane {
    inner: Mutex<Inner>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_storage_size(&self, bytes: u64) {
        self.inner.lock().unwrap().storage_size = bytes;
    }

    pub fn fail_restarts(&self) {
        self.inner.lock().unwrap().fail_restart = true;
    }

    pub fn fail_deletes(&self) {
        self.inner.lock().unwrap().fail_delete = true;
    }

    /// Makes every `create_project` call past the first `limit` calls fail.
    pub fn fail_creates_after(&self, limit: u32) {
        self.inner.lock().unwrap().create_limit = Some(limit);
    }

    pub fn created_projects(&self) -> u32 {
        self.inner.lock().unwrap().created
    }

    pub fn restarts(&self) -> Vec<EndpointId> {
        self.inner.lock().unwrap().restarted.clone()
    }

    pub fn deleted_projects(&self) -> Vec<ProjectId> {
        self.inner.lock().unwrap().deleted.clone()
    }

    pub fn storage_queries(&self) -> Vec<ProjectId> {
        self.inner.lock().unwrap().storage_queries.clone()
    }
}

fn connection_config(n: u32) -> PgConnectionConfig {
    PgConnectionConfig {
        host: format!("ep-{n}.example.com"),
        port: 5432,
        name: "neondb".to_string(),
        username: "bench".to_string(),
        password: Some("pw".to_string().into()),
        tls: TlsConfig {
            trusted_root_certs: String::new(),
            enabled: false,
        },
    }
}

#[async_trait]
impl ControlPlane for FakeControlPlane {
    async fn create_project(&self, _pg_version: u16) -> BenchResult<CreatedProject> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(limit) = inner.create_limit
            && inner.created >= limit
        {
            return Err(bench_error!(
                ErrorKind::ControlPlaneRequestFailed,
                "Simulated create failure"
            ));
        }
        inner.created += 1;
        let n = inner.created;

        Ok(CreatedProject {
            project_id: ProjectId::new(format!("proj-{n}")),
            endpoint_id: EndpointId::new(format!("ep-{n}")),
            connection_uri: format!("postgresql://bench:pw@ep-{n}.example.com/neondb"),
            connection: connection_config(n),
        })
    }

    async fn wait_until_idle(&self, _project_id: &ProjectId) -> BenchResult<()> {
        self.inner.lock().unwrap().wait_calls += 1;

        Ok(())
    }

    async fn restart_endpoint(
        &self,
        _project_id: &ProjectId,
        endpoint_id: &EndpointId,
    ) -> BenchResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_restart {
            return Err(bench_error!(
                ErrorKind::ControlPlaneRequestFailed,
                "Simulated restart failure"
            ));
        }
        inner.restarted.push(endpoint_id.clone());

        Ok(())
    }

    async fn storage_size(&self, project_id: &ProjectId) -> BenchResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        inner.storage_queries.push(project_id.clone());

        Ok(inner.storage_size)
    }

    async fn delete_project(&self, project_id: &ProjectId) -> BenchResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete {
            return Err(bench_error!(
                ErrorKind::ControlPlaneRequestFailed,
                "Simulated delete failure"
            ));
        }
        inner.deleted.push(project_id.clone());

        Ok(())
    }
}
