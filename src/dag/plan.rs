// src/dag/plan.rs

//! A validated execution plan: graph, path report and level order.

use std::collections::HashMap;
use std::fmt::Write as _;

use tracing::info;

use crate::dag::graph::Graph;
use crate::dag::levels::{LevelChunk, decompose};
use crate::dag::paths::{PathReport, enumerate_paths};
use crate::errors::Result;
use crate::job::{JobKey, JobRegistry, ROOT_JOB_KEY};

/// Everything computed before dispatch starts.
///
/// Building a plan runs, in order: graph construction (with the
/// missing-dependency check), path enumeration (failing on cycles) and level
/// decomposition. Decomposition is never reached for a cyclic graph.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    graph: Graph,
    paths: PathReport,
    chunks: LevelChunk,
}

impl ExecutionPlan {
    pub fn build(registry: &JobRegistry) -> Result<Self> {
        let graph = Graph::build(registry)?;

        let paths = enumerate_paths(&graph);
        paths.ensure_acyclic()?;

        let chunks = decompose(&graph);

        Ok(Self {
            graph,
            paths,
            chunks,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Head of the chunk sequence, root chunk included.
    pub fn chunks(&self) -> &LevelChunk {
        &self.chunks
    }

    /// All root-to-leaf orderings found during cycle detection.
    pub fn complete_paths(&self) -> &[Vec<JobKey>] {
        &self.paths.complete_paths
    }

    /// Job keys per level, without the synthetic root level.
    pub fn levels(&self) -> Vec<Vec<JobKey>> {
        self.chunks
            .iter()
            .map(|c| {
                c.jobs()
                    .iter()
                    .filter(|k| k.as_str() != ROOT_JOB_KEY)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .filter(|jobs| !jobs.is_empty())
            .collect()
    }

    /// Chunk index of `key`. The root sits at 0, so the first real level is
    /// 1.
    pub fn level_of(&self, key: &str) -> Option<usize> {
        self.chunks.iter().find(|c| c.contains(key)).map(LevelChunk::index)
    }

    /// Chunk index of every vertex.
    pub fn level_index(&self) -> HashMap<JobKey, usize> {
        self.chunks
            .iter()
            .flat_map(|c| c.jobs().iter().map(move |k| (k.clone(), c.index())))
            .collect()
    }

    /// Hand over the graph and the chunk sequence for dispatch.
    pub fn into_parts(self) -> (Graph, LevelChunk) {
        (self.graph, self.chunks)
    }

    /// Human-readable dump: adjacency matrix, every path, the level order.
    pub fn render(&self, matrix_chunk_max: usize) -> String {
        let mut out = self.graph.debug_matrix(matrix_chunk_max);

        let _ = writeln!(out, "all paths ({}):", self.paths.complete_paths.len());
        for path in &self.paths.complete_paths {
            let _ = writeln!(out, "  {}", path.join(" -> "));
        }

        let _ = writeln!(out, "init order: {}", self.chunks);
        out
    }

    /// Emit the same information as [`render`](Self::render) through
    /// tracing.
    pub fn log_diagnostics(&self, matrix_chunk_max: usize) {
        info!("\n{}", self.graph.debug_matrix(matrix_chunk_max));
        info!(count = self.paths.complete_paths.len(), "all paths:");
        for path in &self.paths.complete_paths {
            info!("  {}", path.join(" -> "));
        }
        info!(order = %self.chunks, "init order");
    }
}
