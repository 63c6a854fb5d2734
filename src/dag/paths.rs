// src/dag/paths.rs

//! Cycle detection by depth-first path enumeration.
//!
//! Every path starting at the root is walked to its end. A path that reaches
//! a vertex already on it ends in a *loopback* (the cyclic suffix is
//! recorded); a path that reaches a vertex without outgoing edges is a
//! *complete path*. The complete paths double as a diagnostic listing of
//! every root-to-leaf ordering.
//!
//! Jobs whose every ancestor declares dependencies are not reachable from the
//! root when they sit on a cycle, so after the root walk the enumeration is
//! restarted from each vertex that was never visited.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::dag::graph::Graph;
use crate::errors::{BootdagError, Result};
use crate::job::JobKey;

/// Outcome of a full path enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathReport {
    /// Root-to-leaf paths, in discovery order.
    pub complete_paths: Vec<Vec<JobKey>>,
    /// Cyclic suffixes, e.g. `["A", "B", "A"]`. Each distinct suffix is
    /// listed once.
    pub loopbacks: Vec<Vec<JobKey>>,
}

impl PathReport {
    pub fn has_cycles(&self) -> bool {
        !self.loopbacks.is_empty()
    }

    /// `Err(CycleDetected)` if any loopback was found.
    pub fn ensure_acyclic(&self) -> Result<()> {
        if self.has_cycles() {
            warn!(cycles = ?self.loopbacks, "dependency cycle detected");
            return Err(BootdagError::CycleDetected(self.loopbacks.clone()));
        }
        Ok(())
    }
}

/// Enumerate every path of `graph`, starting at the root.
pub fn enumerate_paths(graph: &Graph) -> PathReport {
    let mut walk = Walk {
        graph,
        visited: HashSet::new(),
        report: PathReport::default(),
    };

    walk.visit(graph.root().key(), Vec::new());

    let unreached: Vec<JobKey> = graph
        .vertices()
        .map(|job| job.key().to_string())
        .filter(|key| !walk.visited.contains(key))
        .collect();

    for key in unreached {
        // An earlier restart may already have covered this vertex.
        if walk.visited.contains(&key) {
            continue;
        }
        debug!(job = %key, "vertex unreachable from root; enumerating paths from it");
        walk.visit(&key, Vec::new());
    }

    debug!(
        complete_paths = walk.report.complete_paths.len(),
        loopbacks = walk.report.loopbacks.len(),
        "path enumeration finished"
    );

    walk.report
}

struct Walk<'a> {
    graph: &'a Graph,
    visited: HashSet<JobKey>,
    report: PathReport,
}

impl Walk<'_> {
    /// `path` is owned by this call; siblings each get their own copy.
    fn visit(&mut self, vertex: &str, mut path: Vec<JobKey>) {
        self.visited.insert(vertex.to_string());

        let earlier = path.iter().position(|k| k == vertex);
        path.push(vertex.to_string());

        if let Some(start) = earlier {
            let cycle = path[start..].to_vec();
            if !self.report.loopbacks.contains(&cycle) {
                self.report.loopbacks.push(cycle);
            }
            return;
        }

        let outgoing = self.graph.outgoing(vertex);
        if outgoing.is_empty() {
            self.report.complete_paths.push(path);
            return;
        }

        for edge in outgoing {
            self.visit(&edge.to, path.clone());
        }
    }
}
