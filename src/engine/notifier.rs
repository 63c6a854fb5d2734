// src/engine/notifier.rs

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::{JobOutcome, RuntimeEvent};
use crate::errors::JobError;
use crate::job::WorkResult;

/// Handle through which executors report job completions.
///
/// Cheap to clone and usable from any thread, including blocking-pool
/// threads: sending never waits. Every report lands in the coordinator's
/// queue and is processed there, one at a time.
#[derive(Debug, Clone)]
pub struct CompletionNotifier {
    tx: mpsc::UnboundedSender<RuntimeEvent>,
}

impl CompletionNotifier {
    /// Create a notifier together with the receiving end for the coordinator.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RuntimeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn notify_success(&self, job: &str) {
        self.send(job, JobOutcome::Success);
    }

    pub fn notify_failure(&self, job: &str, cause: JobError) {
        self.send(job, JobOutcome::Failed(cause));
    }

    /// Report the result of a job body.
    pub fn notify(&self, job: &str, result: WorkResult) {
        self.send(job, result.into());
    }

    fn send(&self, job: &str, outcome: JobOutcome) {
        let event = RuntimeEvent::JobCompleted {
            job: job.to_string(),
            outcome,
        };
        if self.tx.send(event).is_err() {
            debug!(job = %job, "coordinator gone; dropping completion");
        }
    }
}
