// src/job/mod.rs

//! Jobs: the units of work the orchestrator orders and runs.
//!
//! A [`Job`] is a plain record: a unique key, the keys it depends on, the
//! [`ExecutionContext`] it wants to run in, and a [`Work`] item. What a job
//! *does* lives entirely in the work item; the core only ever looks at the
//! key and the dependency list.
//!
//! - [`work`] defines the uniform invocation contract for job bodies.
//! - [`command`] provides shell-command work items (used by config files).
//! - [`registry`] keeps the registered jobs for one orchestrator.

pub mod command;
pub mod registry;
pub mod work;

use std::fmt;

use crate::types::ExecutionContext;

pub use registry::JobRegistry;
pub use work::{Work, WorkFuture, WorkResult};

/// Canonical job key type used throughout the crate.
pub type JobKey = String;

/// Key of the synthetic root job. Every job without explicit dependencies
/// hangs off this vertex.
pub const ROOT_JOB_KEY: &str = "<root>";

/// A uniquely keyed unit of work with declared dependencies.
#[derive(Clone)]
pub struct Job {
    key: JobKey,
    deps: Vec<JobKey>,
    context: ExecutionContext,
    work: Work,
}

impl Job {
    /// New job with no dependencies, running in the default context.
    pub fn new(key: impl Into<JobKey>, work: Work) -> Self {
        Self {
            key: key.into(),
            deps: Vec::new(),
            context: ExecutionContext::default(),
            work,
        }
    }

    /// Add a single dependency.
    pub fn after(mut self, dep: impl Into<JobKey>) -> Self {
        self.deps.push(dep.into());
        self
    }

    /// Add several dependencies at once.
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<JobKey>,
    {
        self.deps.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Choose the execution context for this job's body.
    pub fn in_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared dependency keys, in declaration order.
    pub fn deps(&self) -> &[JobKey] {
        &self.deps
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    pub fn work(&self) -> &Work {
        &self.work
    }

    pub fn is_root(&self) -> bool {
        self.key == ROOT_JOB_KEY
    }

    /// The synthetic root job for one run.
    pub(crate) fn root() -> Self {
        Job::new(ROOT_JOB_KEY, Work::noop()).in_context(ExecutionContext::Inline)
    }

    /// Drop repeated dependency keys, keeping the first occurrence.
    pub(crate) fn dedup_deps(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.deps.retain(|d| seen.insert(d.clone()));
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("key", &self.key)
            .field("deps", &self.deps)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
