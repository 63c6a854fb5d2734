// src/dag/dispatch_step.rs

//! Result types for single dispatcher steps.

use std::sync::Arc;

use crate::errors::JobError;
use crate::job::JobKey;

/// A job failure as reported by the dispatcher.
#[derive(Debug, Clone)]
pub struct JobFailure {
    pub job: JobKey,
    pub cause: Arc<JobError>,
}

/// Structured result of one dispatcher step.
///
/// The coordinator turns this into IO: launch the listed jobs, fire the
/// success or failure callback.
#[derive(Debug, Clone, Default)]
pub struct DispatchStep {
    /// Jobs that must be launched now, all from the same chunk.
    pub launch: Vec<JobKey>,
    /// Whether this step moved the run to `Finished`.
    pub finished: bool,
    /// Set when this step moved the run to `Failed`. Reported at most once
    /// per run.
    pub failed: Option<JobFailure>,
}

impl DispatchStep {
    /// True when the step requires no action.
    pub fn is_empty(&self) -> bool {
        self.launch.is_empty() && !self.finished && self.failed.is_none()
    }
}
