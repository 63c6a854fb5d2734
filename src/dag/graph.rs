// src/dag/graph.rs

use std::collections::HashMap;
use std::fmt::Write as _;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, warn};

use crate::dag::edge::Edge;
use crate::errors::{BootdagError, Result};
use crate::job::{Job, JobKey, JobRegistry, ROOT_JOB_KEY};

/// Dependency graph over the registered jobs plus the synthetic root.
///
/// Edge weights live on the petgraph edges; the in-degree of every vertex
/// (sum of incoming weights) is cached as edges are added. Vertices keep
/// insertion order: the root first, then jobs in registration order.
#[derive(Debug, Clone)]
pub struct Graph {
    inner: DiGraph<Job, u32>,
    index: HashMap<JobKey, NodeIndex>,
    in_degree: HashMap<JobKey, u32>,
}

impl Graph {
    /// Empty graph containing only the root vertex.
    pub fn new() -> Self {
        let mut graph = Self {
            inner: DiGraph::new(),
            index: HashMap::new(),
            in_degree: HashMap::new(),
        };
        graph.add_vertex(Job::root());
        graph
    }

    /// Build the graph for one run from the registered jobs.
    ///
    /// Fails when a job uses the reserved root key or when a declared
    /// dependency has no registered job. Jobs without dependencies get a
    /// single edge from the root.
    pub fn build(registry: &JobRegistry) -> Result<Self> {
        if registry.contains(ROOT_JOB_KEY) {
            return Err(BootdagError::ReservedKey(ROOT_JOB_KEY.to_string()));
        }

        let missing = registry.missing_dependencies();
        if !missing.is_empty() {
            warn!(?missing, "jobs depend on keys nobody registered");
            return Err(BootdagError::MissingDependency(missing));
        }

        let mut graph = Graph::new();
        for job in registry.iter() {
            graph.add_vertex(job.clone());
        }

        for job in registry.iter() {
            if job.deps().is_empty() {
                graph.add_edge(Edge::new(ROOT_JOB_KEY, job.key()))?;
            } else {
                for dep in job.deps() {
                    graph.add_edge(Edge::new(dep.as_str(), job.key()))?;
                }
            }
        }

        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );

        Ok(graph)
    }

    /// Add a vertex; a key that is already present is left untouched.
    pub fn add_vertex(&mut self, job: Job) {
        if self.index.contains_key(job.key()) {
            return;
        }
        let key = job.key().to_string();
        let idx = self.inner.add_node(job);
        self.index.insert(key.clone(), idx);
        self.in_degree.insert(key, 0);
    }

    /// Add an edge between two existing vertices.
    ///
    /// Adding an arc that already exists accumulates its weight.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        let from = self.node(&edge.from)?;
        let to = self.node(&edge.to)?;

        match self.inner.find_edge(from, to) {
            Some(existing) => self.inner[existing] += edge.weight,
            None => {
                self.inner.add_edge(from, to, edge.weight);
            }
        }

        *self.in_degree.entry(edge.to).or_insert(0) += edge.weight;
        Ok(())
    }

    pub fn root(&self) -> &Job {
        // The root is always the first vertex.
        &self.inner[NodeIndex::new(0)]
    }

    pub fn vertex_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All vertices, root first, then registration order.
    pub fn vertices(&self) -> impl Iterator<Item = &Job> {
        self.inner.node_indices().map(|idx| &self.inner[idx])
    }

    pub fn job(&self, key: &str) -> Option<&Job> {
        self.index.get(key).map(|idx| &self.inner[*idx])
    }

    pub fn in_degree(&self, key: &str) -> Option<u32> {
        self.in_degree.get(key).copied()
    }

    /// The cached in-degree of every vertex.
    pub fn in_degrees(&self) -> &HashMap<JobKey, u32> {
        &self.in_degree
    }

    /// Outgoing edges of `key`, ordered by target insertion order.
    pub fn outgoing(&self, key: &str) -> Vec<Edge> {
        let Some(&idx) = self.index.get(key) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
            .collect();
        edges.sort_by_key(|(target, _)| target.index());

        edges
            .into_iter()
            .map(|(target, weight)| Edge::with_weight(key, self.inner[target].key(), weight))
            .collect()
    }

    pub fn has_outgoing(&self, key: &str) -> bool {
        self.index.get(key).is_some_and(|idx| {
            self.inner
                .edges_directed(*idx, Direction::Outgoing)
                .next()
                .is_some()
        })
    }

    /// Every edge in the graph.
    pub fn edges(&self) -> Vec<Edge> {
        self.vertices().flat_map(|job| self.outgoing(job.key())).collect()
    }

    pub fn weight(&self, from: &str, to: &str) -> Option<u32> {
        let from = *self.index.get(from)?;
        let to = *self.index.get(to)?;
        self.inner.find_edge(from, to).map(|e| self.inner[e])
    }

    /// Text rendering of the adjacency matrix.
    ///
    /// Cell `(row, col)` is the weight of the edge `row -> col`, or `.` when
    /// there is none. Columns are split into blocks of at most `chunk_max`
    /// so wide graphs stay readable in a terminal.
    pub fn debug_matrix(&self, chunk_max: usize) -> String {
        let chunk_max = chunk_max.max(1);
        let n = self.vertex_count();
        let max_weight = self.inner.edge_weights().copied().max().unwrap_or(1);
        let width = n.saturating_sub(1).to_string().len().max(max_weight.to_string().len()) + 1;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "adjacency matrix ({} vertices, {} edges):",
            n,
            self.edge_count()
        );
        for (i, job) in self.vertices().enumerate() {
            let _ = writeln!(out, "  [{i}] {}", job.key());
        }

        let indices: Vec<NodeIndex> = self.inner.node_indices().collect();
        for block in indices.chunks(chunk_max) {
            let _ = write!(out, "{:>width$}", "");
            for col in block {
                let _ = write!(out, "{:>width$}", col.index());
            }
            out.push('\n');

            for row in &indices {
                let _ = write!(out, "{:>width$}", row.index());
                for col in block {
                    match self.inner.find_edge(*row, *col) {
                        Some(e) => {
                            let _ = write!(out, "{:>width$}", self.inner[e]);
                        }
                        None => {
                            let _ = write!(out, "{:>width$}", ".");
                        }
                    }
                }
                out.push('\n');
            }
        }

        out
    }

    fn node(&self, key: &str) -> Result<NodeIndex> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| BootdagError::MissingDependency(vec![key.to_string()]))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
