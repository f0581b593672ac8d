//! Greedy Suitor matching engine.
//!
//! One shared core drives both execution strategies: a vertex popped from
//! the work queue proposes to its best eligible neighbors until its
//! outgoing capacity is filled or no eligible neighbor remains; a proposal
//! that displaces a weaker suitor retracts the loser's side and requeues
//! it. The round reaches a fixed point when the work queue and the requeue
//! buffer are both empty.
//!
//! # Locking protocol
//!
//! - The queue pair has a single lock; the requeue buffer is folded into
//!   the active queue only when the active queue is observed empty under
//!   that lock, mirroring the sequential round boundary.
//! - Each vertex has two independent lock domains: its suitor set (S) and
//!   its sent set (T). A worker holds the popped vertex's T-lock across its
//!   inner loop, acquires a target's S-lock only for a single proposal
//!   attempt, and re-validates eligibility under it before mutating.
//! - T-locks are never nested: a retraction releases the proposer's own
//!   T-lock before taking the loser's. Holding both admits an AB-BA cycle
//!   when two workers evict each other's vertices. Re-acquiring the T-lock
//!   re-evaluates the loop condition, so duplicate queue entries and
//!   interleaved owners stay safe.
//!
//! Lock tiers, outermost first: T(own vertex), S(target), queue. No lock
//! is ever taken in the opposite direction.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use crate::graph::{DenseId, Edge, GraphStore};
use crate::state::{Admission, OrderKey, SentSet, SuitorState};

mod parallel;
mod sequential;

pub use parallel::run_parallel;
pub use sequential::run_sequential;

/// Statistics of one completed matching round.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Total matched weight, each settled edge counted once.
    pub total_weight: u64,
    /// Accepted proposals over the whole round, including later-displaced ones.
    pub proposals: u64,
    /// Proposals displaced by heavier ones.
    pub evictions: u64,
    /// Times the requeue buffer was folded back into the work queue.
    pub requeue_passes: u64,
    /// Wall-clock duration of the round.
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct QueuePair {
    active: VecDeque<DenseId>,
    requeued: VecDeque<DenseId>,
    passes: u64,
}

/// FIFO work queue with a round-based requeue buffer behind one lock.
struct WorkQueue {
    inner: Mutex<QueuePair>,
}

impl WorkQueue {
    fn seed(order: impl Iterator<Item = DenseId>) -> Self {
        Self {
            inner: Mutex::new(QueuePair {
                active: order.collect(),
                requeued: VecDeque::new(),
                passes: 0,
            }),
        }
    }

    /// Pop the next vertex, folding the requeue buffer in only once the
    /// active queue drains. Returns `None` when both are empty, which is
    /// the per-worker exit condition.
    fn pop(&self) -> Option<DenseId> {
        let mut queues = self.inner.lock();
        if queues.active.is_empty() && !queues.requeued.is_empty() {
            // Split the guard's borrow once so both buffers can be swapped.
            let QueuePair {
                active, requeued, ..
            } = &mut *queues;
            std::mem::swap(active, requeued);
            queues.passes += 1;
            trace!(
                pass = queues.passes,
                pending = queues.active.len(),
                "requeue buffer folded into work queue"
            );
        }
        queues.active.pop_front()
    }

    fn requeue(&self, v: DenseId) {
        self.inner.lock().requeued.push_back(v);
    }
}

/// Shared machinery of one matching round over one graph and state.
struct Engine<'a> {
    graph: &'a GraphStore,
    state: &'a SuitorState,
    queue: WorkQueue,
    proposals: AtomicU64,
    evictions: AtomicU64,
}

impl<'a> Engine<'a> {
    fn new(graph: &'a GraphStore, state: &'a SuitorState) -> Self {
        let queue = WorkQueue::seed(
            graph
                .processing_order()
                .into_iter()
                .filter(|&v| state.capacity(v) > 0),
        );
        Self {
            graph,
            state,
            queue,
            proposals: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Drain the queue to the fixed point. Safe to run from any number of
    /// threads concurrently; each caller exits once it observes both
    /// queues empty.
    fn drain(&self) {
        while let Some(u) = self.queue.pop() {
            self.process_vertex(u);
        }
    }

    /// Run `u`'s proposal loop until its capacity is filled or no eligible
    /// neighbor remains.
    fn process_vertex(&self, u: DenseId) {
        let cap = self.state.capacity(u) as usize;
        let u_ext = self.graph.external_id(u);
        let mut sent = self.state.sent(u).lock();
        loop {
            if sent.len() >= cap {
                break;
            }
            let Some(candidate) = self.find_best_eligible(u, u_ext, &sent) else {
                break;
            };
            let bid = OrderKey {
                weight: candidate.weight,
                id: u_ext,
            };
            let mut suitors = self.state.received(candidate.to).lock();
            // Re-validate under the S-lock: another worker may have filled
            // or re-ranked the target between the scan and this point.
            match suitors.admit(u, bid) {
                Admission::Rejected => {
                    drop(suitors);
                    // Candidate invalidated under contention; re-run the
                    // whole scan rather than patching this one candidate.
                    continue;
                }
                Admission::Accepted => {
                    sent.insert(candidate.to);
                    drop(suitors);
                    self.proposals.fetch_add(1, Ordering::Relaxed);
                }
                Admission::AcceptedEvicting { evicted } => {
                    sent.insert(candidate.to);
                    drop(suitors);
                    self.proposals.fetch_add(1, Ordering::Relaxed);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    // Release our own T-lock before taking the loser's;
                    // T-locks are never nested.
                    drop(sent);
                    self.retract(evicted, candidate.to);
                    sent = self.state.sent(u).lock();
                }
            }
        }
    }

    /// Full linear scan of `u`'s neighbors tracking the strongest eligible
    /// candidate. Earlier (heavier) neighbors may all be ineligible, so the
    /// scan cannot stop at the first weight match.
    ///
    /// Eligibility of neighbor `x`: positive capacity, not already proposed
    /// to, and either spare room in S(x) or a bid that beats its weakest
    /// member. Each probe takes x's S-lock only for the comparison; the
    /// result is a candidate, not a claim, and is re-validated on use.
    fn find_best_eligible(&self, u: DenseId, u_ext: u64, sent: &SentSet) -> Option<Edge> {
        let mut best: Option<(OrderKey, Edge)> = None;
        for &edge in self.graph.neighbors(u) {
            if edge.to == u {
                // Self-loops can never settle.
                continue;
            }
            if self.state.capacity(edge.to) == 0 {
                // Capacity-0 vertices neither initiate nor receive.
                continue;
            }
            if sent.contains(edge.to) {
                continue;
            }
            let strength = OrderKey {
                weight: edge.weight,
                id: self.graph.external_id(edge.to),
            };
            if let Some((current, _)) = best {
                if strength <= current {
                    continue;
                }
            }
            let suitors = self.state.received(edge.to).lock();
            let bid = OrderKey {
                weight: edge.weight,
                id: u_ext,
            };
            let eligible = !suitors.is_full() || suitors.weakest().is_some_and(|w| bid > w);
            drop(suitors);
            if eligible {
                best = Some((strength, edge));
            }
        }
        best.map(|(_, edge)| edge)
    }

    fn retract(&self, loser: DenseId, target: DenseId) {
        {
            let mut sent = self.state.sent(loser).lock();
            sent.remove(target);
        }
        self.queue.requeue(loser);
        trace!(
            loser = self.graph.external_id(loser),
            target = self.graph.external_id(target),
            "proposal displaced, loser requeued"
        );
    }

    /// Collect round statistics. Debug builds verify the quiescent-state
    /// invariants first; a violation is a locking-protocol defect.
    fn finish(self, started: Instant) -> MatchOutcome {
        #[cfg(debug_assertions)]
        if let Err(violation) = self.state.verify_consistency(self.graph) {
            panic!("matching state inconsistent after drain: {violation}");
        }
        MatchOutcome {
            total_weight: self.state.total_weight(),
            proposals: self.proposals.into_inner(),
            evictions: self.evictions.into_inner(),
            requeue_passes: self.queue.inner.into_inner().passes,
            elapsed: started.elapsed(),
        }
    }
}
