//! Single-threaded reference strategy.

use std::time::Instant;

use tracing::debug;

use super::{Engine, MatchOutcome};
use crate::graph::GraphStore;
use crate::state::SuitorState;

/// Run one matching round to its fixed point on the current thread.
///
/// Deterministic: given the same graph and capacities, two runs produce
/// identical final state and identical reported weight. Vertices are
/// processed best-edge-first, and every comparison breaks weight ties by
/// external id, so no ordering is left to chance.
///
/// The state must have been [`reset`](SuitorState::reset) for this round.
pub fn run_sequential(graph: &GraphStore, state: &SuitorState) -> MatchOutcome {
    let started = Instant::now();
    let engine = Engine::new(graph, state);
    engine.drain();
    let outcome = engine.finish(started);
    debug!(
        weight = outcome.total_weight,
        proposals = outcome.proposals,
        evictions = outcome.evictions,
        passes = outcome.requeue_passes,
        elapsed_us = outcome.elapsed.as_micros() as u64,
        "sequential round complete"
    );
    outcome
}
