//! Integration tests for the matching engines.
//!
//! Both engines run against real graphs built through the loader; the
//! parallel engine is exercised at several worker counts. Invariants are
//! checked through `SuitorState::verify_consistency` plus explicit degree
//! and weight-conservation checks over the settled pairs.

use std::collections::HashMap;
use std::collections::HashSet;
use std::io::Cursor;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use suitor_core::{run_parallel, run_sequential, EngineConfig, GraphStore, SuitorState};

fn graph_from(edges: &[(u64, u64, u32)]) -> GraphStore {
    let mut text = String::new();
    for &(a, b, w) in edges {
        text.push_str(&format!("{a} {b} {w}\n"));
    }
    GraphStore::from_reader(Cursor::new(text)).expect("test graph must parse")
}

fn random_graph(vertices: u64, target_edges: usize, seed: u64) -> GraphStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    while edges.len() < target_edges {
        let a = rng.gen_range(0..vertices);
        let b = rng.gen_range(0..vertices);
        if a == b {
            continue;
        }
        let pair = (a.min(b), a.max(b));
        if !seen.insert(pair) {
            continue;
        }
        edges.push((pair.0, pair.1, rng.gen_range(1..=100u32)));
    }
    graph_from(&edges)
}

/// Degree of each external id in the settled pairs must respect its capacity.
fn assert_degree_bounds(pairs: &[(u64, u64, u32)], caps: impl Fn(u64) -> u32) {
    let mut degree: HashMap<u64, u32> = HashMap::new();
    for &(a, b, _) in pairs {
        *degree.entry(a).or_insert(0) += 1;
        *degree.entry(b).or_insert(0) += 1;
    }
    for (&v, &d) in &degree {
        assert!(
            d <= caps(v),
            "vertex {v} matched {d} times but has capacity {}",
            caps(v)
        );
    }
}

// ========== Reference scenarios ==========

#[test]
fn test_triangle_matches_heaviest_pair() {
    // A-B 5, B-C 3, A-C 1, all capacities 1: the heaviest compatible pair
    // wins and C stays unmatched.
    let graph = graph_from(&[(0, 1, 5), (1, 2, 3), (0, 2, 1)]);
    let mut state = SuitorState::for_graph(&graph);
    state.reset(&graph, &|_m: u32, _v: u64| 1, 0);

    let outcome = run_sequential(&graph, &state);
    assert_eq!(outcome.total_weight, 5);
    assert_eq!(state.matched_pairs(&graph), vec![(0, 1, 5)]);
}

#[test]
fn test_star_center_with_capacity_two() {
    // Center 0 (capacity 2) connected to 1, 2, 3 with weights 10, 8, 1;
    // leaves have capacity 1. The two heaviest spokes are matched.
    let graph = graph_from(&[(0, 1, 10), (0, 2, 8), (0, 3, 1)]);
    let caps = |_m: u32, v: u64| if v == 0 { 2 } else { 1 };
    let mut state = SuitorState::for_graph(&graph);
    state.reset(&graph, &caps, 0);

    let outcome = run_sequential(&graph, &state);
    assert_eq!(outcome.total_weight, 18);
    assert_eq!(
        state.matched_pairs(&graph),
        vec![(0, 1, 10), (0, 2, 8)]
    );
}

#[test]
fn test_scenarios_hold_for_all_worker_counts() {
    let graph = graph_from(&[(0, 1, 5), (1, 2, 3), (0, 2, 1)]);
    let star = graph_from(&[(0, 1, 10), (0, 2, 8), (0, 3, 1)]);
    let star_caps = |_m: u32, v: u64| if v == 0 { 2 } else { 1 };

    for workers in [1, 2, 8] {
        let config = EngineConfig::with_workers(workers);

        let mut state = SuitorState::for_graph(&graph);
        state.reset(&graph, &|_m: u32, _v: u64| 1, 0);
        let outcome = run_parallel(&graph, &state, &config).unwrap();
        assert_eq!(outcome.total_weight, 5, "triangle with {workers} workers");

        let mut state = SuitorState::for_graph(&star);
        state.reset(&star, &star_caps, 0);
        let outcome = run_parallel(&star, &state, &config).unwrap();
        assert_eq!(outcome.total_weight, 18, "star with {workers} workers");
    }
}

// ========== Tie handling ==========

#[test]
fn test_weight_ties_resolve_toward_smaller_id() {
    // Path 0-1 and 1-2, both weight 10, capacities 1. One consistent total
    // order must drive both preference and eviction; the smaller external
    // id wins the tie, so 0-1 settles and 2 stays unmatched.
    let graph = graph_from(&[(0, 1, 10), (1, 2, 10)]);
    let mut state = SuitorState::for_graph(&graph);
    state.reset(&graph, &|_m: u32, _v: u64| 1, 0);

    let outcome = run_sequential(&graph, &state);
    assert_eq!(outcome.total_weight, 10);
    assert_eq!(state.matched_pairs(&graph), vec![(0, 1, 10)]);
}

// ========== Eviction and requeue ==========

#[test]
fn test_displaced_vertex_requeued_and_rematched() {
    // All capacities 1. Vertices 0 and 1 settle their weight-9 edge first,
    // so 2 falls back to proposing to 4 (weight 5). Vertex 3 then displaces
    // that proposal with its heavier bid (weight 6); 2 is retracted,
    // requeued, and settles with 5 on the next queue pass.
    let graph = graph_from(&[(0, 1, 9), (0, 2, 8), (2, 4, 5), (3, 4, 6), (2, 5, 3)]);
    let mut state = SuitorState::for_graph(&graph);
    state.reset(&graph, &|_m: u32, _v: u64| 1, 0);

    let outcome = run_sequential(&graph, &state);
    assert_eq!(outcome.total_weight, 18);
    assert_eq!(
        state.matched_pairs(&graph),
        vec![(0, 1, 9), (2, 5, 3), (3, 4, 6)]
    );
    assert_eq!(outcome.evictions, 1);
    assert_eq!(outcome.requeue_passes, 1);
    state.verify_consistency(&graph).unwrap();
}

// ========== Capacity semantics ==========

#[test]
fn test_capacity_zero_vertex_never_matched() {
    // Resolved ambiguity: a capacity-0 vertex is excluded both as an
    // initiator and as a proposal target. Vertex 1 is the only connection
    // between 0 and 2, so nothing can settle.
    let graph = graph_from(&[(0, 1, 10), (1, 2, 10)]);
    let caps = |_m: u32, v: u64| if v == 1 { 0 } else { 1 };
    let mut state = SuitorState::for_graph(&graph);
    state.reset(&graph, &caps, 0);

    let outcome = run_sequential(&graph, &state);
    assert_eq!(outcome.total_weight, 0);
    assert!(state.matched_pairs(&graph).is_empty());
    state.verify_consistency(&graph).unwrap();
}

#[test]
fn test_all_capacities_zero_yields_empty_matching() {
    let graph = graph_from(&[(0, 1, 5), (1, 2, 3)]);
    let mut state = SuitorState::for_graph(&graph);
    state.reset(&graph, &|_m: u32, _v: u64| 0, 0);

    let outcome = run_sequential(&graph, &state);
    assert_eq!(outcome.total_weight, 0);
    assert_eq!(outcome.proposals, 0);
}

// ========== Determinism ==========

#[test]
fn test_sequential_runs_are_bit_identical() {
    let graph = random_graph(60, 240, 7);
    let caps = |_m: u32, v: u64| (v % 4) as u32;
    let mut state = SuitorState::for_graph(&graph);

    state.reset(&graph, &caps, 1);
    let first = run_sequential(&graph, &state);
    let first_pairs = state.matched_pairs(&graph);

    state.reset(&graph, &caps, 1);
    let second = run_sequential(&graph, &state);
    let second_pairs = state.matched_pairs(&graph);

    assert_eq!(first.total_weight, second.total_weight);
    assert_eq!(first_pairs, second_pairs);
}

#[test]
fn test_single_worker_parallel_matches_sequential() {
    let graph = random_graph(40, 160, 11);
    let caps = |_m: u32, v: u64| (v % 3) as u32 + 1;
    let mut state = SuitorState::for_graph(&graph);

    state.reset(&graph, &caps, 0);
    let sequential = run_sequential(&graph, &state);
    let sequential_pairs = state.matched_pairs(&graph);

    state.reset(&graph, &caps, 0);
    let parallel = run_parallel(&graph, &state, &EngineConfig::with_workers(1)).unwrap();
    let parallel_pairs = state.matched_pairs(&graph);

    assert_eq!(sequential.total_weight, parallel.total_weight);
    assert_eq!(sequential_pairs, parallel_pairs);
}

// ========== Invariants under concurrency ==========

#[test]
fn test_worker_counts_preserve_invariants() {
    let graph = random_graph(80, 400, 23);
    // Includes capacity-0 vertices.
    let caps = |_m: u32, v: u64| (v % 3) as u32;

    for workers in [1, 2, 8] {
        let mut state = SuitorState::for_graph(&graph);
        state.reset(&graph, &caps, 2);
        let outcome = run_parallel(&graph, &state, &EngineConfig::with_workers(workers)).unwrap();

        state.verify_consistency(&graph).unwrap();

        let pairs = state.matched_pairs(&graph);
        assert_degree_bounds(&pairs, |v| caps(0, v));

        // Weight conservation: the doubled S sum halves back to the sum of
        // the settled edges.
        let pair_sum: u64 = pairs.iter().map(|&(_, _, w)| w as u64).sum();
        assert_eq!(outcome.total_weight, pair_sum);

        // Every surviving proposal was accepted once; displaced proposals
        // are counted as evictions.
        assert_eq!(
            outcome.proposals - outcome.evictions,
            2 * pairs.len() as u64,
            "accepted minus displaced must equal surviving proposals"
        );
    }
}

#[test]
fn test_equal_weight_contention_preserves_invariants() {
    // Near-worst case for the locking protocol: every edge ties, so
    // eviction and retraction churn is maximal and workers constantly
    // displace each other. Any nested T-lock acquisition would deadlock
    // under this load; repeated rounds give interleavings room to vary.
    let mut edges = Vec::new();
    for a in 0..24u64 {
        for b in (a + 1)..24 {
            edges.push((a, b, 7u32));
        }
    }
    let graph = graph_from(&edges);
    // Includes capacity-0 vertices.
    let caps = |_m: u32, v: u64| (v % 4) as u32;
    let config = EngineConfig::with_workers(8);

    for round in 0..200 {
        let mut state = SuitorState::for_graph(&graph);
        state.reset(&graph, &caps, 0);
        let outcome = run_parallel(&graph, &state, &config).unwrap();

        state.verify_consistency(&graph).unwrap();
        let pairs = state.matched_pairs(&graph);
        assert_degree_bounds(&pairs, |v| caps(0, v));
        let pair_sum: u64 = pairs.iter().map(|&(_, _, w)| w as u64).sum();
        assert_eq!(outcome.total_weight, pair_sum, "round {round}");
    }
}

#[test]
fn test_round_state_reset_between_methods() {
    // Reusing the same state across capacity methods must not leak
    // proposals from the previous round.
    let graph = graph_from(&[(0, 1, 5), (1, 2, 3), (0, 2, 1)]);
    let caps = |method: u32, _v: u64| if method == 0 { 1 } else { 0 };
    let mut state = SuitorState::for_graph(&graph);

    state.reset(&graph, &caps, 0);
    assert_eq!(run_sequential(&graph, &state).total_weight, 5);

    state.reset(&graph, &caps, 1);
    assert_eq!(run_sequential(&graph, &state).total_weight, 0);
    assert!(state.matched_pairs(&graph).is_empty());
}

#[test]
fn test_rejects_zero_workers_before_any_work() {
    let graph = graph_from(&[(0, 1, 5)]);
    let mut state = SuitorState::for_graph(&graph);
    state.reset(&graph, &|_m: u32, _v: u64| 1, 0);
    let err = run_parallel(&graph, &state, &EngineConfig::with_workers(0)).unwrap_err();
    assert!(err.to_string().contains("at least 1"));
    // No proposals were made.
    assert!(state.matched_pairs(&graph).is_empty());
}
