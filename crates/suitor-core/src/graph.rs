//! Immutable graph store built once per input file.
//!
//! The store owns per-vertex adjacency lists sorted by descending weight
//! (ties broken by ascending external neighbor id) and the precomputed
//! per-vertex maximum edge weight. External vertex ids from the input are
//! arbitrary and not necessarily dense; they are interned into dense `u32`
//! indices at load time so the matching state can live in a flat arena.
//!
//! # Input format
//!
//! One record per line: three whitespace-separated unsigned integers
//! `from to weight` describing an undirected edge (the reciprocal edge is
//! inserted for both endpoints). A line whose first non-whitespace
//! character is `#` is a full-line comment. Whitespace-only lines are
//! skipped. Anything else fails the load with `MalformedInput`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{MatchError, MatchResult};

/// Dense vertex index assigned at load time.
pub type DenseId = u32;

/// A directed half of an undirected edge, as stored in an adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Dense index of the neighbor.
    pub to: DenseId,
    /// Edge weight.
    pub weight: u32,
}

/// Immutable adjacency representation of the input graph.
///
/// Built once per input file and shared read-only by every matching round
/// and every worker thread for the lifetime of the process.
#[derive(Debug, Default)]
pub struct GraphStore {
    external_ids: Vec<u64>,
    dense_index: HashMap<u64, DenseId>,
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
}

impl GraphStore {
    /// Load a graph from an edge-list file.
    ///
    /// # Errors
    ///
    /// `MatchError::Io` if the file cannot be opened or read,
    /// `MatchError::MalformedInput` on the first unparseable record.
    pub fn from_path<P: AsRef<Path>>(path: P) -> MatchResult<Self> {
        let file = File::open(path.as_ref())?;
        let store = Self::from_reader(BufReader::new(file))?;
        debug!(path = %path.as_ref().display(), "edge list loaded");
        Ok(store)
    }

    /// Load a graph from any buffered reader of edge-list text.
    ///
    /// # Errors
    ///
    /// Same as [`GraphStore::from_path`].
    pub fn from_reader<R: BufRead>(reader: R) -> MatchResult<Self> {
        let mut store = GraphStore::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let record = line.trim();
            if record.is_empty() || record.starts_with('#') {
                continue;
            }
            let (from, to, weight) =
                parse_record(record).map_err(|reason| MatchError::MalformedInput {
                    line: index + 1,
                    reason,
                })?;
            store.insert_edge(from, to, weight);
        }
        store.finalize();
        debug!(
            vertices = store.vertex_count(),
            edges = store.edge_count,
            "graph store built"
        );
        Ok(store)
    }

    /// Number of distinct vertices seen in the input.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.external_ids.len()
    }

    /// Number of undirected edges loaded.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Pre-sorted adjacency list of a vertex: weight descending, external
    /// neighbor id ascending on ties. Fixed after load.
    #[must_use]
    pub fn neighbors(&self, v: DenseId) -> &[Edge] {
        &self.adjacency[v as usize]
    }

    /// Weight of the heaviest edge incident to `v`, or 0 if `v` has none.
    #[must_use]
    pub fn max_weight(&self, v: DenseId) -> u32 {
        self.adjacency[v as usize]
            .first()
            .map(|e| e.weight)
            .unwrap_or(0)
    }

    /// External (input-domain) id of a dense vertex index.
    #[must_use]
    pub fn external_id(&self, v: DenseId) -> u64 {
        self.external_ids[v as usize]
    }

    /// Dense index of an external id, if the vertex exists.
    #[must_use]
    pub fn dense_id(&self, external: u64) -> Option<DenseId> {
        self.dense_index.get(&external).copied()
    }

    /// Vertices ordered by descending best-possible edge weight, external
    /// id ascending on ties.
    ///
    /// Vertices with a higher best edge get first chance to propose. This
    /// improves the greedy approximation empirically and makes the
    /// sequential engine reproducible; it is not required for correctness.
    #[must_use]
    pub fn processing_order(&self) -> Vec<DenseId> {
        let mut order: Vec<DenseId> = (0..self.vertex_count() as DenseId).collect();
        order.sort_by(|&a, &b| {
            self.max_weight(b)
                .cmp(&self.max_weight(a))
                .then_with(|| self.external_id(a).cmp(&self.external_id(b)))
        });
        order
    }

    fn intern(&mut self, external: u64) -> DenseId {
        if let Some(&dense) = self.dense_index.get(&external) {
            return dense;
        }
        debug_assert!(
            self.external_ids.len() <= DenseId::MAX as usize,
            "dense index space exhausted"
        );
        let dense = self.external_ids.len() as DenseId;
        self.external_ids.push(external);
        self.dense_index.insert(external, dense);
        self.adjacency.push(Vec::new());
        dense
    }

    fn insert_edge(&mut self, from: u64, to: u64, weight: u32) {
        let a = self.intern(from);
        let b = self.intern(to);
        self.adjacency[a as usize].push(Edge { to: b, weight });
        self.adjacency[b as usize].push(Edge { to: a, weight });
        self.edge_count += 1;
    }

    fn finalize(&mut self) {
        let ids = &self.external_ids;
        for adj in &mut self.adjacency {
            adj.sort_by(|x, y| {
                y.weight
                    .cmp(&x.weight)
                    .then_with(|| ids[x.to as usize].cmp(&ids[y.to as usize]))
            });
        }
    }
}

fn parse_record(record: &str) -> Result<(u64, u64, u32), String> {
    let mut fields = record.split_whitespace();
    let mut next = |name: &str| {
        fields
            .next()
            .ok_or_else(|| format!("missing field '{name}'"))
    };
    let from = next("from")?;
    let to = next("to")?;
    let weight = next("weight")?;
    if fields.next().is_some() {
        return Err("expected exactly three fields".to_string());
    }
    let from = from
        .parse::<u64>()
        .map_err(|e| format!("bad 'from' id '{from}': {e}"))?;
    let to = to
        .parse::<u64>()
        .map_err(|e| format!("bad 'to' id '{to}': {e}"))?;
    let weight = weight
        .parse::<u32>()
        .map_err(|e| format!("bad weight '{weight}': {e}"))?;
    Ok((from, to, weight))
}
