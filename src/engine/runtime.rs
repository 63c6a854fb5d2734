// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::dag::{DispatchStep, Dispatcher, Graph, LevelChunk};
use crate::engine::{Callbacks, JobOutcome, RunStatus, RuntimeEvent};
use crate::errors::{JobError, Result};
use crate::exec::JobExecutor;
use crate::job::{Job, JobKey};

/// The coordinator: owns the [`Dispatcher`] and reacts to completions.
///
/// This is a thin IO shell. Every decision is made by the dispatcher; the
/// runtime only launches what it is told to launch, publishes the run
/// status and fires the observer callbacks.
pub struct Runtime<E: JobExecutor> {
    dispatcher: Dispatcher,
    jobs: HashMap<JobKey, Job>,
    event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    executor: E,
    callbacks: Callbacks,
    status_tx: watch::Sender<RunStatus>,
}

impl<E: JobExecutor> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("dispatcher", &self.dispatcher)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl<E: JobExecutor> Runtime<E> {
    pub fn new(
        graph: &Graph,
        event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
        executor: E,
        callbacks: Callbacks,
        status_tx: watch::Sender<RunStatus>,
    ) -> Self {
        let jobs = graph
            .vertices()
            .map(|job| (job.key().to_string(), job.clone()))
            .collect();

        Self {
            dispatcher: Dispatcher::new(),
            jobs,
            event_rx,
            executor,
            callbacks,
            status_tx,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Start dispatching at `head` and launch the first chunk.
    ///
    /// Returns once the first chunk has been handed to the executor; job
    /// bodies keep running in the background.
    pub async fn begin(&mut self, head: LevelChunk) -> Result<()> {
        let step = self.dispatcher.start(head)?;
        self.status_tx.send_replace(RunStatus::Running);
        self.apply(step).await
    }

    /// Main coordinator loop.
    ///
    /// Consumes completions until the run is over and no launched job is
    /// still outstanding. Completions that arrive after a failure are
    /// drained but change nothing.
    pub async fn run(mut self) -> Result<()> {
        debug!("coordinator loop started");

        while !self.is_done() {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("completion channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "coordinator received event");

            let step = self.step(event);
            self.apply(step).await?;
        }

        info!(
            finished = self.dispatcher.is_finished(),
            failed = self.dispatcher.is_failed(),
            "coordinator exiting"
        );
        Ok(())
    }

    /// Feed one event into the dispatcher.
    pub fn step(&mut self, event: RuntimeEvent) -> DispatchStep {
        match event {
            RuntimeEvent::JobCompleted { job, outcome } => match outcome {
                JobOutcome::Success => self.dispatcher.on_success(&job),
                JobOutcome::Failed(cause) => self.dispatcher.on_failure(&job, cause),
            },
        }
    }

    fn is_done(&self) -> bool {
        self.dispatcher.is_terminal() && self.dispatcher.in_flight() == 0
    }

    async fn apply(&mut self, step: DispatchStep) -> Result<()> {
        self.report(&step);

        if step.launch.is_empty() {
            return Ok(());
        }

        let jobs: Vec<Job> = step
            .launch
            .iter()
            .filter_map(|key| {
                let job = self.jobs.get(key).cloned();
                if job.is_none() {
                    warn!(job = %key, "dispatcher asked to launch an unknown job");
                }
                job
            })
            .collect();

        debug!(jobs = ?step.launch, "launching jobs");

        if let Err(err) = self.executor.launch(jobs).await {
            // The whole chunk is blamed on its first job; nothing else of it
            // can be trusted to report back.
            let first = &step.launch[0];
            warn!(job = %first, error = %err, "executor failed to launch chunk");
            let failed = self
                .dispatcher
                .on_failure(first, JobError::msg(format!("launch failed: {err}")));
            self.report(&failed);
            self.dispatcher.abandon_in_flight();
        }

        Ok(())
    }

    /// Publish terminal transitions and fire the matching callback.
    fn report(&self, step: &DispatchStep) {
        if let Some(failure) = &step.failed {
            self.status_tx.send_replace(RunStatus::Failed(failure.clone()));
            if let Some(cb) = &self.callbacks.on_failure {
                cb(&self.callbacks.name, &failure.job, &*failure.cause);
            }
        }

        if step.finished {
            self.status_tx.send_replace(RunStatus::Finished);
            if let Some(cb) = &self.callbacks.on_success {
                cb(&self.callbacks.name);
            }
        }
    }
}
