// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The coordinator talks to a `JobExecutor` instead of running job bodies
//! itself. This keeps the threading model out of the core and makes it easy
//! to swap in a fake executor in tests.
//!
//! - [`ContextExecutor`](super::ContextExecutor) is the production
//!   implementation; it honours each job's execution context.
//! - Tests can provide their own `JobExecutor` that, for example, records
//!   which jobs were launched and reports scripted outcomes.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::job::Job;

/// Trait abstracting how launched jobs are executed.
///
/// Implementations must report every launched job exactly once through the
/// [`CompletionNotifier`](crate::engine::CompletionNotifier) they were built
/// with, from any thread. The returned future should resolve once the jobs
/// are *launched*, not once they are done.
pub trait JobExecutor: Send {
    fn launch(&mut self, jobs: Vec<Job>) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
