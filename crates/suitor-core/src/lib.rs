//! # suitor-core
//!
//! Greedy maximum-weight **b-matching** on weighted undirected graphs via
//! the Suitor algorithm. Each vertex `v` is matched to at most `b(v)`
//! distinct neighbors; vertices "propose" to their best available
//! neighbors and proposals are displaced by heavier ones until the round
//! reaches a fixed point.
//!
//! Two execution strategies run over the same per-vertex state and locking
//! contract:
//!
//! - [`run_sequential`]: deterministic single-threaded reference engine;
//! - [`run_parallel`]: fine-grained lock-based engine over a fixed pool of
//!   worker threads.
//!
//! # Quick start
//!
//! ```no_run
//! use suitor_core::{EngineConfig, GraphStore, SuitorState, run_parallel};
//!
//! # fn main() -> suitor_core::MatchResult<()> {
//! let graph = GraphStore::from_path("graph.txt")?;
//! let mut state = SuitorState::for_graph(&graph);
//! let config = EngineConfig::with_workers(4);
//!
//! // Sweep capacity methods; the capacity function is a pure collaborator.
//! for method in 0..=2 {
//!     state.reset(&graph, &|_m: u32, _v: u64| 2, method);
//!     let outcome = run_parallel(&graph, &state, &config)?;
//!     println!("{}", outcome.total_weight);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! All matching state is in-memory and reset between rounds; nothing is
//! persisted.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capacity;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod state;

pub use capacity::CapacityFn;
pub use config::EngineConfig;
pub use engine::{run_parallel, run_sequential, MatchOutcome};
pub use error::{MatchError, MatchResult};
pub use graph::{DenseId, Edge, GraphStore};
pub use state::SuitorState;
