// src/dag/levels.rs

//! Level-order decomposition of the dependency graph.
//!
//! The graph is peeled Kahn-style: every vertex whose remaining in-degree is
//! zero is ready, and the vertices that become ready while a level is being
//! drained form the next level. The result is a forward-linked sequence of
//! [`LevelChunk`]s; jobs inside one chunk may run concurrently, and a chunk
//! may only start once the previous one has fully completed.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use tracing::{debug, warn};

use crate::dag::graph::Graph;
use crate::job::JobKey;

/// One level of the execution order, linked to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelChunk {
    index: usize,
    jobs: Vec<JobKey>,
    next: Option<Box<LevelChunk>>,
}

impl LevelChunk {
    /// Zero-based position of this chunk in the sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Jobs of this level. Their order carries no meaning.
    pub fn jobs(&self) -> &[JobKey] {
        &self.jobs
    }

    pub fn contains(&self, key: &str) -> bool {
        self.jobs.iter().any(|k| k == key)
    }

    pub fn next(&self) -> Option<&LevelChunk> {
        self.next.as_deref()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Detach and return the following chunk, consuming this one.
    pub fn into_next(self) -> Option<LevelChunk> {
        self.next.map(|b| *b)
    }

    /// Iterate over this chunk and every chunk after it.
    pub fn iter(&self) -> Chunks<'_> {
        Chunks { cursor: Some(self) }
    }

    /// Number of chunks from this one to the end of the sequence.
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// Link a list of levels into a chunk sequence. `levels` must not be
    /// empty.
    fn link(levels: Vec<Vec<JobKey>>) -> Option<LevelChunk> {
        levels
            .into_iter()
            .enumerate()
            .rev()
            .fold(None::<LevelChunk>, |next, (index, jobs)| {
                Some(LevelChunk {
                    index,
                    jobs,
                    next: next.map(Box::new),
                })
            })
    }
}

impl fmt::Display for LevelChunk {
    /// `[<root>] -> [X] -> [Y, Z]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .iter()
            .map(|c| format!("[{}]", c.jobs.join(", ")))
            .collect();
        f.write_str(&rendered.join(" -> "))
    }
}

/// Iterator over a chunk sequence.
pub struct Chunks<'a> {
    cursor: Option<&'a LevelChunk>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a LevelChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = current.next();
        Some(current)
    }
}

/// Decompose `graph` into level chunks.
///
/// Works on a copy of the graph's in-degree cache, so the graph itself is
/// left untouched. Must only be called on a graph that passed cycle
/// detection; on a cyclic graph the vertices on (or behind) a cycle never
/// become ready and are silently left out.
pub fn decompose(graph: &Graph) -> LevelChunk {
    let mut in_degrees: HashMap<JobKey, u32> = graph.in_degrees().clone();

    let mut ready: VecDeque<JobKey> = graph
        .vertices()
        .map(|job| job.key().to_string())
        .filter(|key| in_degrees.get(key).copied() == Some(0))
        .collect();
    let mut staged: VecDeque<JobKey> = VecDeque::new();

    let mut levels: Vec<Vec<JobKey>> = vec![Vec::new()];

    while !ready.is_empty() || !staged.is_empty() {
        if ready.is_empty() {
            levels.push(Vec::new());
            ready.append(&mut staged);
        }

        let Some(vertex) = ready.pop_front() else {
            continue;
        };

        for edge in graph.outgoing(&vertex) {
            let degree = in_degrees.entry(edge.to.clone()).or_insert(0);
            let before = *degree;
            *degree = before.saturating_sub(edge.weight);
            if before > 0 && *degree == 0 {
                staged.push_back(edge.to);
            }
        }

        if let Some(current) = levels.last_mut() {
            current.push(vertex);
        }
    }

    let stalled: Vec<&JobKey> = in_degrees
        .iter()
        .filter(|(_, d)| **d > 0)
        .map(|(k, _)| k)
        .collect();
    if !stalled.is_empty() {
        warn!(?stalled, "level decomposition stalled; graph is not acyclic");
    }

    let head = LevelChunk::link(levels).unwrap_or(LevelChunk {
        index: 0,
        jobs: Vec::new(),
        next: None,
    });

    debug!(levels = head.depth(), order = %head, "level decomposition finished");
    head
}
