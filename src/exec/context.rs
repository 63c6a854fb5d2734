// src/exec/context.rs

//! Production executor: runs each job in its declared execution context.

use std::any::Any;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::Pin;

use tokio::runtime::Handle;
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::engine::CompletionNotifier;
use crate::errors::{JobError, Result};
use crate::exec::JobExecutor;
use crate::job::{Job, Work, WorkResult};
use crate::types::ExecutionContext;

/// Runs job bodies on Tokio according to [`ExecutionContext`].
///
/// - `Inline` bodies run before `launch` returns, one after another, so the
///   coordinator does not look at any completion until they are done.
/// - `Spawn` bodies become Tokio tasks.
/// - `Blocking` bodies go to the blocking thread pool.
///
/// Panics are caught and reported as [`JobError::Panicked`].
#[derive(Debug, Clone)]
pub struct ContextExecutor {
    notifier: CompletionNotifier,
}

impl ContextExecutor {
    pub fn new(notifier: CompletionNotifier) -> Self {
        Self { notifier }
    }

    async fn run_inline(&self, job: &Job) {
        debug!(job = %job.key(), "running job inline");
        let result = match job.work() {
            Work::Blocking(f) => catch_unwind(AssertUnwindSafe(|| f()))
                .unwrap_or_else(|payload| Err(JobError::Panicked(panic_message(payload)))),
            Work::Async(_) => joined(tokio::spawn(job.work().invoke()).await),
        };
        self.notifier.notify(job.key(), result);
    }

    fn spawn(&self, job: Job) {
        let notifier = self.notifier.clone();
        let fut = job.work().invoke();
        tokio::spawn(async move {
            let result = joined(tokio::spawn(fut).await);
            notifier.notify(job.key(), result);
        });
    }

    fn spawn_blocking(&self, job: Job) {
        let notifier = self.notifier.clone();
        let handle = Handle::current();
        let work = job.work().clone();
        let task = tokio::task::spawn_blocking(move || work.invoke_blocking(&handle));
        tokio::spawn(async move {
            let result = joined(task.await);
            notifier.notify(job.key(), result);
        });
    }
}

impl JobExecutor for ContextExecutor {
    fn launch(&mut self, jobs: Vec<Job>) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            for job in jobs {
                info!(job = %job.key(), context = %job.context(), "launching job");
                match job.context() {
                    ExecutionContext::Inline => self.run_inline(&job).await,
                    ExecutionContext::Spawn => self.spawn(job),
                    ExecutionContext::Blocking => self.spawn_blocking(job),
                }
            }
            Ok(())
        })
    }
}

/// Flatten the result of a joined job task.
fn joined(res: std::result::Result<WorkResult, JoinError>) -> WorkResult {
    match res {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(JobError::Panicked(panic_message(e.into_panic()))),
        Err(_) => Err(JobError::msg("job task was cancelled")),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
