// src/job/work.rs

//! Job bodies.
//!
//! Every body is invoked the same way and yields a [`WorkResult`]. Whether
//! the body is synchronous or asynchronous only matters to the executor,
//! which picks a thread for it based on the job's execution context.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::JobError;

pub type WorkResult = Result<(), JobError>;

pub type WorkFuture = Pin<Box<dyn Future<Output = WorkResult> + Send + 'static>>;

/// The invocable part of a job.
#[derive(Clone)]
pub enum Work {
    /// A synchronous body.
    Blocking(Arc<dyn Fn() -> WorkResult + Send + Sync>),
    /// A body producing a future.
    Async(Arc<dyn Fn() -> WorkFuture + Send + Sync>),
}

impl Work {
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn() -> WorkResult + Send + Sync + 'static,
    {
        Work::Blocking(Arc::new(f))
    }

    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = WorkResult> + Send + 'static,
    {
        Work::Async(Arc::new(move || Box::pin(f())))
    }

    /// A body that succeeds immediately.
    pub fn noop() -> Self {
        Work::blocking(|| Ok(()))
    }

    /// Run a shell command; see [`crate::job::command`].
    pub fn command(cmd: impl Into<String>) -> Self {
        let cmd: String = cmd.into();
        Work::future(move || crate::job::command::run_command(cmd.clone()))
    }

    /// Invoke the body as a future.
    ///
    /// Synchronous bodies run when the returned future is first polled, on
    /// whichever thread polls it.
    pub fn invoke(&self) -> WorkFuture {
        match self {
            Work::Blocking(f) => {
                let f = Arc::clone(f);
                Box::pin(async move { f() })
            }
            Work::Async(f) => f(),
        }
    }

    /// Invoke the body on the current thread, blocking until it finishes.
    ///
    /// Async bodies are driven with `handle`, so this must not be called from
    /// inside an async context.
    pub fn invoke_blocking(&self, handle: &tokio::runtime::Handle) -> WorkResult {
        match self {
            Work::Blocking(f) => f(),
            Work::Async(f) => handle.block_on(f()),
        }
    }
}

impl fmt::Debug for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Work::Blocking(_) => f.write_str("Work::Blocking"),
            Work::Async(_) => f.write_str("Work::Async"),
        }
    }
}
