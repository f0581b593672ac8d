//! Sweep driver: load the graph once, run one matching round per capacity
//! method, collect the total matched weight of each.

use std::path::PathBuf;

use tracing::info;

use suitor_core::{
    run_parallel, run_sequential, EngineConfig, GraphStore, MatchResult, SuitorState,
};

use crate::capacity::bvalue;

/// One sweep over capacity methods `0..=b_limit` on a single input file.
#[derive(Debug, Clone)]
pub struct Sweep {
    /// Engine configuration (worker count).
    pub config: EngineConfig,
    /// Edge-list input file.
    pub input: PathBuf,
    /// Highest capacity-method id, inclusive.
    pub b_limit: u32,
    /// Force the single-threaded reference engine.
    pub sequential: bool,
}

/// Execute the sweep and return the total matched weight per method, in
/// method order.
///
/// Configuration is validated and the graph loaded before any round runs,
/// so a failure leaves no partial output. The suitor state is allocated
/// once and reset between rounds.
///
/// # Errors
///
/// `InvalidConfig` for a bad worker count, `MalformedInput`/`Io` from the
/// loader.
pub fn execute_sweep(sweep: &Sweep) -> MatchResult<Vec<u64>> {
    sweep.config.validate()?;

    let graph = GraphStore::from_path(&sweep.input)?;
    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        input = %sweep.input.display(),
        "graph loaded"
    );

    let mut state = SuitorState::for_graph(&graph);
    let mut weights = Vec::with_capacity(sweep.b_limit as usize + 1);

    for method in 0..=sweep.b_limit {
        state.reset(&graph, &bvalue, method);
        let outcome = if sweep.sequential {
            run_sequential(&graph, &state)
        } else {
            run_parallel(&graph, &state, &sweep.config)?
        };
        info!(
            method,
            weight = outcome.total_weight,
            proposals = outcome.proposals,
            evictions = outcome.evictions,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "round complete"
        );
        weights.push(outcome.total_weight);
    }

    Ok(weights)
}
