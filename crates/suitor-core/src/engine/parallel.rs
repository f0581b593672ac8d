//! Lock-based parallel strategy.

use std::thread;
use std::time::Instant;

use tracing::{debug, trace};

use super::{Engine, MatchOutcome};
use crate::config::EngineConfig;
use crate::error::MatchResult;
use crate::graph::GraphStore;
use crate::state::SuitorState;

/// Run one matching round on a fixed pool of worker threads.
///
/// All workers share the queue pair and the per-vertex lock domains; each
/// exits once it observes both queues empty, and the round is complete when
/// every worker has exited. Workers block only on short-lived mutexes,
/// never on condition variables or IO.
///
/// The capacity and mutual-consistency invariants hold for any worker
/// count; the reported weight may differ slightly across worker counts
/// because eligibility ties under contention resolve in arrival order.
///
/// # Errors
///
/// `MatchError::InvalidConfig` if the configuration fails validation.
/// The round itself has no failure paths.
pub fn run_parallel(
    graph: &GraphStore,
    state: &SuitorState,
    config: &EngineConfig,
) -> MatchResult<MatchOutcome> {
    config.validate()?;
    let started = Instant::now();
    let engine = Engine::new(graph, state);
    thread::scope(|scope| {
        for worker in 0..config.workers {
            let engine = &engine;
            scope.spawn(move || {
                trace!(worker, "matching worker started");
                engine.drain();
                trace!(worker, "matching worker exited");
            });
        }
    });
    let outcome = engine.finish(started);
    debug!(
        workers = config.workers,
        weight = outcome.total_weight,
        proposals = outcome.proposals,
        evictions = outcome.evictions,
        passes = outcome.requeue_passes,
        elapsed_us = outcome.elapsed.as_micros() as u64,
        "parallel round complete"
    );
    Ok(outcome)
}
