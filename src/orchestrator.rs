// src/orchestrator.rs

//! The public entry point: register jobs, then start a run.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dag::ExecutionPlan;
use crate::engine::{Callbacks, CompletionNotifier, RunStatus, Runtime};
use crate::errors::{BootdagError, JobError, Result};
use crate::exec::{ContextExecutor, JobExecutor};
use crate::job::{Job, JobKey, JobRegistry};

/// Default orchestrator name, used as its identity in callbacks.
pub const DEFAULT_NAME: &str = "bootdag";

/// Default number of matrix columns per rendered block.
pub const DEFAULT_MATRIX_CHUNK_MAX: usize = 16;

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Identity handed to the observer callbacks.
    pub name: String,
    /// Log the adjacency matrix, every path and the level order on start.
    pub diagnostics: bool,
    /// Matrix columns per block in diagnostic output.
    pub matrix_chunk_max: usize,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            diagnostics: false,
            matrix_chunk_max: DEFAULT_MATRIX_CHUNK_MAX,
        }
    }
}

/// Orders and runs one set of jobs, once.
///
/// An orchestrator is single-use: after a successful [`start`](Self::start)
/// it cannot be started again. A start that fails validation leaves it
/// untouched, so missing jobs can be registered and `start` retried.
pub struct Orchestrator {
    options: OrchestratorOptions,
    registry: JobRegistry,
    callbacks: Callbacks,
    /// Taken by the coordinator on start; `None` means "already started".
    status_tx: Option<watch::Sender<RunStatus>>,
    status_rx: watch::Receiver<RunStatus>,
    coordinator: Option<JoinHandle<Result<()>>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("status", &*self.status_rx.borrow())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(options: OrchestratorOptions) -> Self {
        let (status_tx, status_rx) = watch::channel(RunStatus::NotStarted);
        let callbacks = Callbacks {
            name: options.name.clone(),
            ..Callbacks::default()
        };

        Self {
            options,
            registry: JobRegistry::new(),
            callbacks,
            status_tx: Some(status_tx),
            status_rx,
            coordinator: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Register (or replace) a job. Nothing is validated until `start`.
    ///
    /// Jobs registered after the run started are ignored.
    pub fn register(&mut self, job: Job) -> &mut Self {
        if self.is_started() {
            warn!(job = %job.key(), "run already started; ignoring registration");
            return self;
        }
        self.registry.register(job);
        self
    }

    /// Called once when the run finishes.
    pub fn on_success<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_success = Some(Arc::new(f));
        self
    }

    /// Called once when the first job fails.
    pub fn on_failure<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&str, &JobKey, &JobError) + Send + Sync + 'static,
    {
        self.callbacks.on_failure = Some(Arc::new(f));
        self
    }

    /// Validate the registered jobs and compute the execution order without
    /// running anything.
    pub fn plan(&self) -> Result<ExecutionPlan> {
        ExecutionPlan::build(&self.registry)
    }

    /// Validate, order and launch the first chunk with the default
    /// [`ContextExecutor`].
    ///
    /// Fails before any job runs on missing dependencies, cycles, a reserved
    /// key, or when this orchestrator was already started. Otherwise returns
    /// as soon as the first chunk is launched; the run continues in the
    /// background. Must be called from within a Tokio runtime.
    pub async fn start(&mut self) -> Result<()> {
        self.start_with(ContextExecutor::new).await
    }

    /// Like [`start`](Self::start), with a custom executor built around the
    /// run's completion notifier.
    pub async fn start_with<E, F>(&mut self, make_executor: F) -> Result<()>
    where
        E: JobExecutor + 'static,
        F: FnOnce(CompletionNotifier) -> E,
    {
        if self.is_started() {
            return Err(BootdagError::AlreadyStarted);
        }

        let plan = self.plan()?;
        if self.options.diagnostics {
            plan.log_diagnostics(self.options.matrix_chunk_max);
        }

        let status_tx = self.status_tx.take().ok_or(BootdagError::AlreadyStarted)?;

        info!(
            name = %self.options.name,
            jobs = self.registry.len(),
            levels = plan.levels().len(),
            "starting run"
        );

        let (notifier, event_rx) = CompletionNotifier::channel();
        let executor = make_executor(notifier);
        let (graph, head) = plan.into_parts();

        let mut runtime = Runtime::new(&graph, event_rx, executor, self.callbacks.clone(), status_tx);
        runtime.begin(head).await?;

        self.coordinator = Some(tokio::spawn(runtime.run()));
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.status_tx.is_none()
    }

    /// True iff every chunk has completed.
    pub fn is_finished(&self) -> bool {
        self.status_rx.borrow().is_finished()
    }

    pub fn status(&self) -> RunStatus {
        self.status_rx.borrow().clone()
    }

    /// Wait until the run finishes or fails.
    pub async fn wait(&self) -> Result<RunStatus> {
        if !self.is_started() {
            return Err(BootdagError::NotStarted);
        }

        let mut rx = self.status_rx.clone();
        let status = match rx.wait_for(RunStatus::is_terminal).await {
            Ok(status) => status.clone(),
            // Coordinator gone without a terminal status; report what we have.
            Err(_) => self.status(),
        };
        Ok(status)
    }

    /// Wait for the coordinator task to exit, i.e. for the run to end and
    /// every launched job to have reported back.
    pub async fn join(&mut self) -> Result<()> {
        let handle = self.coordinator.take().ok_or(BootdagError::NotStarted)?;
        handle
            .await
            .map_err(|e| BootdagError::Other(anyhow!("coordinator task failed: {e}")))?
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OrchestratorOptions::default())
    }
}
