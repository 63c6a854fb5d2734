// src/exec/mod.rs

//! Job execution layer.
//!
//! This module is responsible for actually running job bodies and reporting
//! back to the coordinator through a
//! [`CompletionNotifier`](crate::engine::CompletionNotifier).
//!
//! - [`backend`] provides the `JobExecutor` trait the coordinator talks to.
//! - [`context`] provides `ContextExecutor`, which honours each job's
//!   execution context and is what the orchestrator uses by default.

pub mod backend;
pub mod context;

pub use backend::JobExecutor;
pub use context::ContextExecutor;
