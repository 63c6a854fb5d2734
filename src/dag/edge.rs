// src/dag/edge.rs

use crate::job::JobKey;

/// Directed dependency arc: `to` depends on `from`.
///
/// `weight` is the number of in-degree units this arc contributes to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: JobKey,
    pub to: JobKey,
    pub weight: u32,
}

impl Edge {
    pub fn new(from: impl Into<JobKey>, to: impl Into<JobKey>) -> Self {
        Self::with_weight(from, to, 1)
    }

    pub fn with_weight(from: impl Into<JobKey>, to: impl Into<JobKey>, weight: u32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight: weight.max(1),
        }
    }
}
