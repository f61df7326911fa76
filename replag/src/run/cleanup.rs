use std::future::Future;
use std::pin::Pin;

use tracing::{error, info};

use crate::error::{BenchError, BenchResult, ErrorKind};

type CleanupFuture = Pin<Box<dyn Future<Output = BenchResult<()>> + Send>>;

/// When a deferred cleanup action runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Run the action whether the run succeeded or failed.
    Always,
    /// Run the action only when the run succeeded, leaving the resource in place for
    /// inspection after a failure.
    OnSuccessOnly,
}

struct CleanupAction {
    label: &'static str,
    policy: CleanupPolicy,
    action: CleanupFuture,
}

/// Stack of deferred cleanup actions, run in reverse registration order.
///
/// Actions are registered as soon as the resource they release exists, so a failure
/// halfway through provisioning still releases everything created up to that point.
#[derive(Default)]
pub struct CleanupStack {
    actions: Vec<CleanupAction>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cleanup action. Later registrations run first.
    pub fn push<F>(&mut self, label: &'static str, policy: CleanupPolicy, action: F)
    where
        F: Future<Output = BenchResult<()>> + Send + 'static,
    {
        self.actions.push(CleanupAction {
            label,
            policy,
            action: Box::pin(action),
        });
    }

    /// Runs the registered actions in reverse order.
    ///
    /// When `run_failed` is true, [`CleanupPolicy::OnSuccessOnly`] actions are skipped.
    /// Every remaining action runs even if an earlier one fails; failures are collected
    /// into a single [`ErrorKind::CleanupFailed`] error.
    pub async fn run(self, run_failed: bool) -> BenchResult<()> {
        let mut errors = Vec::new();

        for entry in self.actions.into_iter().rev() {
            if run_failed && entry.policy == CleanupPolicy::OnSuccessOnly {
                info!(action = entry.label, "skipping cleanup action after failed run");
                continue;
            }

            info!(action = entry.label, "running cleanup action");
            if let Err(e) = entry.action.await {
                error!(action = entry.label, error = %e, "cleanup action failed");
                errors.push(BenchError::from((
                    ErrorKind::CleanupFailed,
                    "Cleanup action failed",
                    format!("{}: {}", entry.label, e),
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}
