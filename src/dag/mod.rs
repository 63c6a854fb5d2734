// src/dag/mod.rs

//! Dependency graph, ordering and dispatch.
//!
//! - [`graph`] holds the weighted dependency graph and its in-degree cache.
//! - [`paths`] enumerates root-to-leaf paths and detects cycles.
//! - [`levels`] decomposes the graph into ordered chunks of concurrent jobs.
//! - [`plan`] bundles the three into a validated execution plan.
//! - [`dispatcher`] is the per-run state machine that walks the chunks.
//! - [`dispatch_step`] defines the result type for dispatcher steps.

pub mod dispatch_step;
pub mod dispatcher;
pub mod edge;
pub mod graph;
pub mod levels;
pub mod paths;
pub mod plan;

pub use dispatch_step::{DispatchStep, JobFailure};
pub use dispatcher::{DispatchState, Dispatcher};
pub use edge::Edge;
pub use graph::Graph;
pub use levels::{LevelChunk, decompose};
pub use paths::{PathReport, enumerate_paths};
pub use plan::ExecutionPlan;
