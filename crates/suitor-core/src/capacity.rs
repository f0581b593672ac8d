//! Capacity function seam.
//!
//! The per-vertex capacity `b(v)` is supplied by an external collaborator
//! and re-evaluated at the start of every matching round. The engine only
//! requires purity: the same `(method, vertex)` pair must map to the same
//! capacity for the duration of a round, which is why capacities are
//! snapshotted into the matching state at reset time.

/// Pure mapping from a capacity-method id and an external vertex id to a
/// non-negative capacity.
///
/// A capacity of 0 removes the vertex from the round entirely: it neither
/// initiates proposals nor is a valid proposal target.
pub trait CapacityFn {
    /// Capacity of `vertex` under capacity method `method`.
    fn capacity(&self, method: u32, vertex: u64) -> u32;
}

impl<F> CapacityFn for F
where
    F: Fn(u32, u64) -> u32,
{
    fn capacity(&self, method: u32, vertex: u64) -> u32 {
        self(method, vertex)
    }
}
