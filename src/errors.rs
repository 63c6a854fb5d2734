// src/errors.rs

//! Crate-wide error types.
//!
//! [`BootdagError`] covers everything that can go wrong *before* a job runs
//! (validation, config loading, misuse of the orchestrator). [`JobError`] is
//! what a job body reports when it fails at runtime; it reaches the caller
//! through the failure callback and [`crate::orchestrator::RunStatus`].

use thiserror::Error;

use crate::job::JobKey;

#[derive(Error, Debug)]
pub enum BootdagError {
    #[error("missing jobs: {}", .0.join(", "))]
    MissingDependency(Vec<JobKey>),

    #[error("cycle exists: {}", render_cycles(.0))]
    CycleDetected(Vec<Vec<JobKey>>),

    #[error("job key '{0}' is reserved for the synthetic root job")]
    ReservedKey(JobKey),

    #[error("orchestrator has already been started")]
    AlreadyStarted,

    #[error("orchestrator has not been started")]
    NotStarted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure reported by a job body.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("{0}")]
    Failed(String),

    #[error("process exited with status {0}")]
    Exited(i32),

    #[error("job panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JobError {
    /// Convenience constructor for ad-hoc failures.
    pub fn msg(msg: impl Into<String>) -> Self {
        JobError::Failed(msg.into())
    }
}

fn render_cycles(cycles: &[Vec<JobKey>]) -> String {
    cycles
        .iter()
        .map(|c| format!("[{}]", c.join(" -> ")))
        .collect::<Vec<_>>()
        .join(", ")
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BootdagError>;
