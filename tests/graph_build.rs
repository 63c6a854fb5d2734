// tests/graph_build.rs

use std::error::Error;

use bootdag::dag::{Edge, Graph};
use bootdag::errors::BootdagError;
use bootdag::job::JobRegistry;
use bootdag::{Job, ROOT_JOB_KEY, Work};
use bootdag_test_utils::builders::noop_job;
use bootdag_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

/// X has no deps; Y and Z depend on X.
fn fan_out() -> JobRegistry {
    let mut reg = JobRegistry::new();
    reg.register(noop_job("X", &[]));
    reg.register(noop_job("Y", &["X"]));
    reg.register(noop_job("Z", &["X"]));
    reg
}

#[test]
fn jobs_without_deps_hang_off_the_root() -> TestResult {
    init_tracing();

    let graph = Graph::build(&fan_out())?;

    assert_eq!(graph.vertex_count(), 4);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.root().key(), ROOT_JOB_KEY);

    assert_eq!(graph.weight(ROOT_JOB_KEY, "X"), Some(1));
    assert_eq!(graph.weight("X", "Y"), Some(1));
    assert_eq!(graph.weight("X", "Z"), Some(1));
    assert_eq!(graph.weight(ROOT_JOB_KEY, "Y"), None);

    let targets: Vec<String> = graph.outgoing("X").into_iter().map(|e| e.to).collect();
    assert_eq!(targets, vec!["Y".to_string(), "Z".to_string()]);
    assert!(graph.outgoing("Y").is_empty());
    assert!(!graph.has_outgoing("Z"));

    Ok(())
}

#[test]
fn in_degree_cache_sums_incoming_weights() -> TestResult {
    init_tracing();

    let mut reg = fan_out();
    reg.register(noop_job("W", &["Y", "Z"]));
    let graph = Graph::build(&reg)?;

    assert_eq!(graph.in_degree(ROOT_JOB_KEY), Some(0));
    assert_eq!(graph.in_degree("X"), Some(1));
    assert_eq!(graph.in_degree("Y"), Some(1));
    assert_eq!(graph.in_degree("W"), Some(2));
    assert_eq!(graph.in_degree("nope"), None);

    Ok(())
}

#[test]
fn duplicate_dependency_keys_count_once() -> TestResult {
    init_tracing();

    let mut reg = JobRegistry::new();
    reg.register(noop_job("A", &[]));
    reg.register(Job::new("B", Work::noop()).after("A").after("A"));

    assert_eq!(reg.get("B").map(|j| j.deps().len()), Some(1));

    let graph = Graph::build(&reg)?;
    assert_eq!(graph.weight("A", "B"), Some(1));
    assert_eq!(graph.in_degree("B"), Some(1));

    Ok(())
}

#[test]
fn adding_an_existing_edge_accumulates_weight() -> TestResult {
    init_tracing();

    let mut graph = Graph::new();
    graph.add_vertex(noop_job("A", &[]));
    graph.add_vertex(noop_job("B", &[]));

    graph.add_edge(Edge::new("A", "B"))?;
    graph.add_edge(Edge::new("A", "B"))?;

    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.weight("A", "B"), Some(2));
    assert_eq!(graph.in_degree("B"), Some(2));

    match graph.add_edge(Edge::new("A", "ghost")) {
        Err(BootdagError::MissingDependency(keys)) => assert_eq!(keys, vec!["ghost".to_string()]),
        other => panic!("expected MissingDependency, got {other:?}"),
    }

    Ok(())
}

#[test]
fn re_registering_a_key_replaces_the_job_in_place() {
    init_tracing();

    let mut reg = JobRegistry::new();
    reg.register(noop_job("A", &[]));
    reg.register(noop_job("B", &[]));
    let replaced = reg.register(noop_job("A", &["B"]));

    assert!(replaced.is_some());
    assert_eq!(reg.len(), 2);

    let order: Vec<&str> = reg.iter().map(|j| j.key()).collect();
    assert_eq!(order, vec!["A", "B"]);
    assert_eq!(reg.get("A").map(|j| j.deps().to_vec()), Some(vec!["B".to_string()]));
}

#[test]
fn unregistered_dependency_is_reported_as_missing() {
    init_tracing();

    let mut reg = JobRegistry::new();
    reg.register(noop_job("A", &["ghost"]));

    match Graph::build(&reg) {
        Err(BootdagError::MissingDependency(keys)) => {
            assert_eq!(keys, vec!["ghost".to_string()]);
        }
        other => panic!("expected MissingDependency, got {other:?}"),
    }
}

#[test]
fn every_missing_key_is_listed_once_and_sorted() {
    init_tracing();

    let mut reg = JobRegistry::new();
    reg.register(noop_job("A", &["phantom", "ghost"]));
    reg.register(noop_job("B", &["ghost"]));
    reg.register(noop_job("C", &["A"]));

    match Graph::build(&reg) {
        Err(BootdagError::MissingDependency(keys)) => {
            assert_eq!(keys, vec!["ghost".to_string(), "phantom".to_string()]);
        }
        other => panic!("expected MissingDependency, got {other:?}"),
    }
}

#[test]
fn root_key_is_reserved() {
    init_tracing();

    let mut reg = JobRegistry::new();
    reg.register(noop_job(ROOT_JOB_KEY, &[]));

    assert!(matches!(
        Graph::build(&reg),
        Err(BootdagError::ReservedKey(_))
    ));
}

#[test]
fn debug_matrix_lists_vertices_and_weights() -> TestResult {
    init_tracing();

    let graph = Graph::build(&fan_out())?;
    let matrix = graph.debug_matrix(16);

    assert!(matrix.contains("adjacency matrix (4 vertices, 3 edges)"));
    assert!(matrix.contains("[0] <root>"));
    assert!(matrix.contains("[3] Z"));
    // Row 0 (root) has a single edge, to column 1 (X).
    assert!(matrix.contains("\n 0 . 1 . .\n"), "matrix was:\n{matrix}");
    // Row 1 (X) points at Y and Z.
    assert!(matrix.contains("\n 1 . . 1 1\n"), "matrix was:\n{matrix}");

    Ok(())
}

#[test]
fn debug_matrix_splits_wide_graphs_into_blocks() -> TestResult {
    init_tracing();

    let graph = Graph::build(&fan_out())?;
    let matrix = graph.debug_matrix(2);

    // Two blocks, each with a header and four rows.
    assert!(matrix.contains("\n   0 1\n"), "matrix was:\n{matrix}");
    assert!(matrix.contains("\n   2 3\n"), "matrix was:\n{matrix}");
    assert!(matrix.contains("\n 0 . 1\n"), "matrix was:\n{matrix}");
    assert!(matrix.contains("\n 1 1 1\n"), "matrix was:\n{matrix}");

    Ok(())
}
