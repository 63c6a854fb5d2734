// src/dag/dispatcher.rs

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::dag::dispatch_step::{DispatchStep, JobFailure};
use crate::dag::levels::LevelChunk;
use crate::errors::{BootdagError, JobError, Result};
use crate::job::{JobKey, ROOT_JOB_KEY};

/// Public view of where a run stands.
#[derive(Debug, Clone)]
pub enum DispatchState {
    /// Not started yet.
    Idle,
    /// Waiting for the jobs of chunk `chunk` to complete.
    Running { chunk: usize },
    /// The cursor moved past the last chunk.
    Finished,
    /// A job failed; no further chunk will be launched.
    Failed(JobFailure),
}

/// Walks a [`LevelChunk`] sequence one chunk at a time.
///
/// This is a pure state machine: it never runs anything itself. Each call
/// returns a [`DispatchStep`] telling the caller which jobs to launch and
/// whether the run reached a terminal state. All calls must come from a
/// single coordinator.
///
/// The synthetic root is completed as soon as its chunk is entered and is
/// never handed out for launching. A chunk with nothing left to wait for is
/// advanced past immediately.
#[derive(Debug)]
pub struct Dispatcher {
    state: DispatchState,
    /// Cursor. `None` before `start` and once past the last chunk.
    current: Option<LevelChunk>,
    /// Jobs of the current chunk that have not reported success yet.
    pending: HashSet<JobKey>,
    /// Launched jobs whose completion has not arrived, across chunks.
    in_flight: HashSet<JobKey>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            state: DispatchState::Idle,
            current: None,
            pending: HashSet::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    /// True iff the cursor has advanced past the last chunk.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, DispatchState::Finished)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, DispatchState::Failed(_))
    }

    pub fn is_terminal(&self) -> bool {
        self.is_finished() || self.is_failed()
    }

    /// Number of launched jobs still expected to report back.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Jobs of the current chunk still being waited on.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Index of the chunk under the cursor, if any.
    pub fn current_chunk(&self) -> Option<usize> {
        self.current.as_ref().map(LevelChunk::index)
    }

    /// Begin dispatching at `head`.
    ///
    /// Returns the jobs of the first chunk that contains real work.
    pub fn start(&mut self, head: LevelChunk) -> Result<DispatchStep> {
        if !matches!(self.state, DispatchState::Idle) {
            return Err(BootdagError::AlreadyStarted);
        }

        info!(levels = head.depth(), order = %head, "dispatcher starting");
        self.current = Some(head);

        let mut step = DispatchStep::default();
        self.enter_current(&mut step);
        Ok(step)
    }

    /// Record a successful completion of `job`.
    pub fn on_success(&mut self, job: &str) -> DispatchStep {
        let mut step = DispatchStep::default();
        self.in_flight.remove(job);

        match self.state {
            DispatchState::Running { chunk } => {
                if !self.pending.remove(job) {
                    warn!(job = %job, chunk, "success reported for a job not pending in this chunk; ignoring");
                    return step;
                }

                debug!(
                    job = %job,
                    chunk,
                    remaining = self.pending.len(),
                    "job completed successfully"
                );

                if self.pending.is_empty() {
                    info!(chunk, "chunk complete; advancing");
                    self.advance();
                    self.enter_current(&mut step);
                }
            }
            DispatchState::Finished | DispatchState::Failed(_) => {
                debug!(job = %job, "completion after run ended; ignoring");
            }
            DispatchState::Idle => {
                warn!(job = %job, "completion reported before dispatch started; ignoring");
            }
        }

        step
    }

    /// Record a failure of `job`.
    ///
    /// The first failure of a run ends it; anything after that is ignored.
    pub fn on_failure(&mut self, job: &str, cause: JobError) -> DispatchStep {
        let mut step = DispatchStep::default();
        self.in_flight.remove(job);

        match self.state {
            DispatchState::Running { chunk } => {
                if !self.pending.remove(job) {
                    warn!(job = %job, chunk, "failure reported for a job not pending in this chunk; ignoring");
                    return step;
                }

                error!(job = %job, chunk, error = %cause, "job failed; halting dispatch");

                let failure = JobFailure {
                    job: job.to_string(),
                    cause: Arc::new(cause),
                };
                self.state = DispatchState::Failed(failure.clone());
                step.failed = Some(failure);
            }
            DispatchState::Failed(_) | DispatchState::Finished => {
                debug!(job = %job, error = %cause, "failure after run ended; ignoring");
            }
            DispatchState::Idle => {
                warn!(job = %job, "failure reported before dispatch started; ignoring");
            }
        }

        step
    }

    /// Stop expecting completions from launched jobs. Reports that still
    /// arrive are ignored like any other post-terminal report.
    pub fn abandon_in_flight(&mut self) {
        self.in_flight.clear();
    }

    fn advance(&mut self) {
        self.current = self.current.take().and_then(LevelChunk::into_next);
    }

    /// Make the chunk under the cursor the running one, skipping chunks that
    /// have nothing to launch.
    fn enter_current(&mut self, step: &mut DispatchStep) {
        loop {
            let Some(chunk) = self.current.as_ref() else {
                info!("all chunks complete; run finished");
                self.state = DispatchState::Finished;
                step.finished = true;
                return;
            };

            let index = chunk.index();
            self.state = DispatchState::Running { chunk: index };

            let launch: Vec<JobKey> = chunk
                .jobs()
                .iter()
                .filter(|k| k.as_str() != ROOT_JOB_KEY)
                .cloned()
                .collect();

            if chunk.contains(ROOT_JOB_KEY) {
                debug!(chunk = index, "root job completed");
            }

            if launch.is_empty() {
                self.advance();
                continue;
            }

            info!(chunk = index, jobs = ?launch, "launching chunk");
            self.pending = launch.iter().cloned().collect();
            self.in_flight.extend(launch.iter().cloned());
            step.launch = launch;
            return;
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
