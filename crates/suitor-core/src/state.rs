//! Per-vertex mutable matching state.
//!
//! Every vertex carries two independent lock domains:
//!
//! - `Suitors` (S): the bounded set of currently accepted incoming
//!   proposals, exposing the weakest member in O(log capacity);
//! - `SentSet` (T): the set of neighbors this vertex currently holds an
//!   accepted outgoing proposal to.
//!
//! Both engines (sequential and parallel) run over this same state and
//! locking contract; the sequential engine simply never contends.
//! Locks are `parking_lot` mutexes (non-poisoning, cheap when uncontended).

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use parking_lot::Mutex;

use crate::capacity::CapacityFn;
use crate::graph::{DenseId, GraphStore};

/// Total order on proposals: weight major, smaller external id wins ties.
///
/// The same order drives neighbor preference during the scan, the weakest
/// member of a suitor set, and the bump comparison. Mixing tie directions
/// lets two vertices rank the same pair of equal-weight edges oppositely,
/// and the round then settles on an asymmetric (invalid) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    /// Edge weight.
    pub weight: u32,
    /// External id of the competing endpoint (proposer or candidate).
    pub id: u64,
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a bounded insert into a suitor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Spare capacity was available.
    Accepted,
    /// The set was full; the weakest member was displaced.
    AcceptedEvicting {
        /// Dense index of the displaced proposer.
        evicted: DenseId,
    },
    /// The set is full and the proposal does not beat the weakest member,
    /// or the vertex has capacity 0. Only reachable under contention: the
    /// caller validated eligibility before taking the lock.
    Rejected,
}

/// Bounded min-structure of accepted incoming proposals (the `S` set).
#[derive(Debug)]
pub struct Suitors {
    cap: usize,
    heap: BinaryHeap<Reverse<(OrderKey, DenseId)>>,
}

impl Suitors {
    fn new() -> Self {
        Self {
            cap: 0,
            heap: BinaryHeap::new(),
        }
    }

    /// Clear the set and rebind it to a new capacity for the next round.
    pub fn reset(&mut self, cap: usize) {
        self.cap = cap;
        self.heap.clear();
    }

    /// Number of currently accepted proposals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no proposals are currently held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether the set holds `capacity` proposals already.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.cap
    }

    /// Key of the weakest currently accepted proposal.
    #[must_use]
    pub fn weakest(&self) -> Option<OrderKey> {
        self.heap.peek().map(|&Reverse((key, _))| key)
    }

    /// Bounded insert honoring the total order.
    ///
    /// Never grows past the bound capacity; the displaced proposer, if any,
    /// is returned so the caller can retract its side of the proposal.
    pub fn admit(&mut self, proposer: DenseId, key: OrderKey) -> Admission {
        if self.cap == 0 {
            return Admission::Rejected;
        }
        if self.heap.len() < self.cap {
            self.heap.push(Reverse((key, proposer)));
            return Admission::Accepted;
        }
        if let Some(&Reverse((weakest, _))) = self.heap.peek() {
            if key > weakest {
                if let Some(Reverse((_, evicted))) = self.heap.pop() {
                    self.heap.push(Reverse((key, proposer)));
                    return Admission::AcceptedEvicting { evicted };
                }
            }
        }
        Admission::Rejected
    }

    /// Sum of accepted proposal weights.
    #[must_use]
    pub fn sum_weights(&self) -> u64 {
        self.heap
            .iter()
            .map(|&Reverse((key, _))| key.weight as u64)
            .sum()
    }

    /// Iterate over `(proposer, key)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (DenseId, OrderKey)> + '_ {
        self.heap.iter().map(|&Reverse((key, p))| (p, key))
    }

    /// Whether `proposer` currently holds an accepted proposal here.
    #[must_use]
    pub fn contains(&self, proposer: DenseId) -> bool {
        self.heap.iter().any(|&Reverse((_, p))| p == proposer)
    }
}

/// Set of neighbors a vertex holds an accepted outgoing proposal to
/// (the `T` set). Bounded by the vertex capacity, so a small vec wins
/// over a hash set.
#[derive(Debug, Default)]
pub struct SentSet {
    targets: Vec<DenseId>,
}

impl SentSet {
    /// Number of currently accepted outgoing proposals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no outgoing proposals are currently accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether an accepted proposal to `target` is currently held.
    #[must_use]
    pub fn contains(&self, target: DenseId) -> bool {
        self.targets.contains(&target)
    }

    /// Record an accepted outgoing proposal. A vertex never proposes to the
    /// same target twice without an intervening eviction.
    pub fn insert(&mut self, target: DenseId) {
        debug_assert!(
            !self.contains(target),
            "duplicate outgoing proposal to the same target"
        );
        self.targets.push(target);
    }

    /// Retract the proposal to `target`. Tolerates an absent target: the
    /// retraction may race with the owner re-running its scan.
    pub fn remove(&mut self, target: DenseId) {
        self.targets.retain(|&t| t != target);
    }

    /// Drop all outgoing proposals (between rounds).
    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Iterate over current targets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = DenseId> + '_ {
        self.targets.iter().copied()
    }
}

/// Arena of per-vertex matching state, indexed by dense vertex id.
///
/// Capacities are written only between rounds (via `&mut self`) and read
/// freely during a round; the `S` and `T` sets are mutated only under their
/// own per-vertex locks.
pub struct SuitorState {
    received: Vec<Mutex<Suitors>>,
    sent: Vec<Mutex<SentSet>>,
    capacities: Vec<u32>,
}

impl SuitorState {
    /// Allocate empty state for `vertex_count` vertices.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            received: (0..vertex_count).map(|_| Mutex::new(Suitors::new())).collect(),
            sent: (0..vertex_count)
                .map(|_| Mutex::new(SentSet::default()))
                .collect(),
            capacities: vec![0; vertex_count],
        }
    }

    /// Allocate state sized for a graph.
    #[must_use]
    pub fn for_graph(graph: &GraphStore) -> Self {
        Self::new(graph.vertex_count())
    }

    /// Re-evaluate capacities for a new round and clear all per-vertex sets.
    ///
    /// Requires exclusive access, so no round can observe a half-reset
    /// state; `get_mut` bypasses the locks entirely.
    pub fn reset<C: CapacityFn + ?Sized>(&mut self, graph: &GraphStore, caps: &C, method: u32) {
        for (v, slot) in self.capacities.iter_mut().enumerate() {
            *slot = caps.capacity(method, graph.external_id(v as DenseId));
        }
        for (v, cell) in self.received.iter_mut().enumerate() {
            cell.get_mut().reset(self.capacities[v] as usize);
        }
        for cell in self.sent.iter_mut() {
            cell.get_mut().clear();
        }
    }

    /// Number of vertices covered by this state.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.capacities.len()
    }

    /// Capacity of `v` for the current round.
    #[must_use]
    pub fn capacity(&self, v: DenseId) -> u32 {
        self.capacities[v as usize]
    }

    /// The `S` lock domain of `v`.
    #[must_use]
    pub fn received(&self, v: DenseId) -> &Mutex<Suitors> {
        &self.received[v as usize]
    }

    /// The `T` lock domain of `v`.
    #[must_use]
    pub fn sent(&self, v: DenseId) -> &Mutex<SentSet> {
        &self.sent[v as usize]
    }

    /// Total matched weight at quiescence.
    ///
    /// Every settled edge is held in both endpoints' `S` sets, so the raw
    /// sum counts each edge twice.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        let sum: u64 = self.received.iter().map(|c| c.lock().sum_weights()).sum();
        debug_assert!(sum % 2 == 0, "settled edges must be counted from both endpoints");
        sum / 2
    }

    /// Settled pairs `(smaller external id, larger external id, weight)`,
    /// sorted, one entry per matched edge. Only meaningful at quiescence.
    #[must_use]
    pub fn matched_pairs(&self, graph: &GraphStore) -> Vec<(u64, u64, u32)> {
        let mut pairs = Vec::new();
        for v in 0..self.received.len() {
            let own_ext = graph.external_id(v as DenseId);
            let suitors = self.received[v].lock();
            for (proposer, key) in suitors.iter() {
                let proposer_ext = graph.external_id(proposer);
                if proposer_ext <= own_ext {
                    pairs.push((proposer_ext, own_ext, key.weight));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Check the quiescent-state invariants: capacity bounds, `T`
    /// uniqueness, mutual consistency of both set directions, and edge
    /// agreement with the graph. Returns the first violation found.
    ///
    /// Used by the test suite and asserted by the engines in debug builds.
    /// A violation indicates a defect in the locking protocol.
    pub fn verify_consistency(&self, graph: &GraphStore) -> Result<(), String> {
        for v in 0..self.vertex_count() {
            let v = v as DenseId;
            let cap = self.capacity(v) as usize;
            let suitors = self.received(v).lock();
            if suitors.len() > cap {
                return Err(format!(
                    "vertex {}: {} accepted proposals exceed capacity {}",
                    graph.external_id(v),
                    suitors.len(),
                    cap
                ));
            }
            for (proposer, key) in suitors.iter() {
                if !graph
                    .neighbors(proposer)
                    .iter()
                    .any(|e| e.to == v && e.weight == key.weight)
                {
                    return Err(format!(
                        "proposal {} -> {} carries weight {} not present in the graph",
                        graph.external_id(proposer),
                        graph.external_id(v),
                        key.weight
                    ));
                }
                if !self.sent(proposer).lock().contains(v) {
                    return Err(format!(
                        "one-sided proposal: {} in S({}) but {} not in T({})",
                        graph.external_id(proposer),
                        graph.external_id(v),
                        graph.external_id(v),
                        graph.external_id(proposer)
                    ));
                }
            }
            let sent = self.sent(v).lock();
            if sent.len() > cap {
                return Err(format!(
                    "vertex {}: {} outgoing proposals exceed capacity {}",
                    graph.external_id(v),
                    sent.len(),
                    cap
                ));
            }
            let mut seen = Vec::with_capacity(sent.len());
            for target in sent.iter() {
                if seen.contains(&target) {
                    return Err(format!(
                        "vertex {}: duplicate outgoing proposal to {}",
                        graph.external_id(v),
                        graph.external_id(target)
                    ));
                }
                seen.push(target);
                if !self.received(target).lock().contains(v) {
                    return Err(format!(
                        "one-sided proposal: {} in T({}) but {} not in S({})",
                        graph.external_id(target),
                        graph.external_id(v),
                        graph.external_id(v),
                        graph.external_id(target)
                    ));
                }
            }
        }
        Ok(())
    }
}
