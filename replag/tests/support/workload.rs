use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use replag::error::BenchResult;
use replag::types::{Endpoint, EndpointRole};
use replag::workload::{WorkloadHandle, WorkloadLauncher, WorkloadSpec};

/// [`WorkloadLauncher`] producing in-memory workload handles.
///
/// All launcher and handle activity lands in one ordered event log, so tests can
/// assert not only how often a workload was touched but also when.
#[derive(Default)]
pub struct FakeWorkloadLauncher {
    events: Arc<Mutex<Vec<String>>>,
    publisher_dead: Arc<AtomicBool>,
    subscriber_dead: Arc<AtomicBool>,
}

impl FakeWorkloadLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the role's workload as exited, as if the process died on its own.
    pub fn kill(&self, role: EndpointRole) {
        self.dead_flag(role).store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_of(&self, event: &str) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    fn dead_flag(&self, role: EndpointRole) -> &Arc<AtomicBool> {
        match role {
            EndpointRole::Publisher => &self.publisher_dead,
            EndpointRole::Subscriber => &self.subscriber_dead,
        }
    }
}

#[async_trait]
impl WorkloadLauncher for FakeWorkloadLauncher {
    async fn initialize(&self, endpoint: &Endpoint, scale: u32) -> BenchResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("initialize {} s{scale}", endpoint.role));

        Ok(())
    }

    async fn launch(
        &self,
        endpoint: &Endpoint,
        _spec: &WorkloadSpec,
    ) -> BenchResult<Box<dyn WorkloadHandle>> {
        self.events
            .lock()
            .unwrap()
            .push(format!("launch {}", endpoint.role));

        Ok(Box::new(FakeWorkloadHandle {
            role: endpoint.role,
            events: self.events.clone(),
            dead: self.dead_flag(endpoint.role).clone(),
        }))
    }
}

pub struct FakeWorkloadHandle {
    role: EndpointRole,
    events: Arc<Mutex<Vec<String>>>,
    dead: Arc<AtomicBool>,
}

#[async_trait]
impl WorkloadHandle for FakeWorkloadHandle {
    fn is_running(&mut self) -> BenchResult<bool> {
        Ok(!self.dead.load(Ordering::SeqCst))
    }

    async fn terminate(&mut self) -> BenchResult<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("terminate {}", self.role));

        Ok(())
    }
}
