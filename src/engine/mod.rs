// src/engine/mod.rs

//! Coordinator for a running orchestration.
//!
//! Job bodies finish on whatever thread their execution context picked.
//! Their completions are funnelled through a [`CompletionNotifier`] into one
//! channel, and a single [`Runtime`] task consumes that channel and drives
//! the [`crate::dag::Dispatcher`]. That task is the only place chunk
//! advancement happens.
//!
//! - [`notifier`] holds the re-entry points used by executors.
//! - [`runtime`] is the async loop around the pure dispatcher.

use std::fmt;
use std::sync::Arc;

use crate::dag::JobFailure;
use crate::errors::JobError;
use crate::job::{JobKey, WorkResult};

pub mod notifier;
pub mod runtime;

pub use notifier::CompletionNotifier;
pub use runtime::Runtime;

/// Outcome of one job body.
#[derive(Debug)]
pub enum JobOutcome {
    Success,
    Failed(JobError),
}

impl From<WorkResult> for JobOutcome {
    fn from(result: WorkResult) -> Self {
        match result {
            Ok(()) => JobOutcome::Success,
            Err(e) => JobOutcome::Failed(e),
        }
    }
}

/// Events flowing into the coordinator.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// A launched job finished.
    JobCompleted { job: JobKey, outcome: JobOutcome },
}

/// Observable state of a run, published by the coordinator.
#[derive(Debug, Clone)]
pub enum RunStatus {
    NotStarted,
    Running,
    Finished,
    Failed(JobFailure),
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Finished | RunStatus::Failed(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RunStatus::Finished)
    }
}

pub type SuccessCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type FailureCallback = Arc<dyn Fn(&str, &JobKey, &JobError) + Send + Sync>;

/// Observer callbacks, each invoked at most once per run.
///
/// Both receive the orchestrator's name as its identity.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub name: String,
    pub on_success: Option<SuccessCallback>,
    pub on_failure: Option<FailureCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("name", &self.name)
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}
