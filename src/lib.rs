//! Cross-example macro caching and pruning for semantic-parse search
//!
//! Exhaustive grammar-driven search over logical-form derivations is
//! expensive per example, but many examples in a dataset share structurally
//! identical solutions. This crate learns, from examples already solved, a
//! small set of likely-useful grammar rules to try first on a new example
//! (the **exploit** pass), falls back to full search only when that fails
//! (the **explore** pass), and records newly discovered solutions so later
//! examples benefit from earlier ones.
//!
//! This crate provides:
//! - **[`PatternStore`]**: the monotonically growing macro-grammar knowledge
//!   base (best pattern per example, global pattern pool, pattern → rule map)
//! - **[`PatternPredictor`]**: neighbor-biased ranking of candidate patterns
//!   and the rule union that parameterizes the restricted grammar
//! - **[`PruningController`]**: the per-example explore/exploit policy and
//!   the learning loop
//! - **[`NeighborIndex`]** and **[`RunStats`]**: the static similarity input
//!   and the counters the policy depends on
//!
//! Parsing itself is external: implement [`SearchEngine`] and
//! [`ValueEvaluator`] over your grammar and executor, and the controller
//! decides *when* and *with what reduced search space* to invoke them.

pub mod controller;
pub mod engine;
pub mod example;
pub mod formula;
mod io;
pub mod neighbors;
pub mod predict;
pub mod stats;
pub mod store;

pub use controller::{ExampleOutcome, PruningController};
pub use engine::{ExactMatch, GrammarScope, SearchEngine, ValueEvaluator};
pub use example::{Derivation, Example, ExampleId, RuleId, Value};
pub use formula::{canonicalize, indexed_pattern, Category, Formula, Pattern};
pub use neighbors::NeighborIndex;
pub use predict::{PatternPredictor, Prediction};
pub use stats::RunStats;
pub use store::PatternStore;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the pruning layer
///
/// Search failures, missing correctness signals, and budget exhaustion are
/// first-class outcomes, not errors; only configuration and I/O problems
/// surface here, and they abort the run.
#[derive(Error, Debug)]
pub enum PruneError {
    /// Neighbor file line without a tab separator
    #[error("malformed neighbor file: missing tab separator at line {line}")]
    MalformedNeighborFile {
        /// 1-based line number
        line: usize,
    },
    /// File system operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Store persistence failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration for the pruning layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrunerConfig {
    /// Maximum number of nearest-neighbor examples to consult (K); a value
    /// <= 0 switches prediction to the global pattern pool
    pub max_num_neighbors: i32,
    /// Path to the cached-neighbors file; unset disables neighbor lookup
    pub neighbor_file_path: Option<PathBuf>,
    /// Truncation bound on the ranked predicted patterns
    pub max_predicted_patterns: usize,
    /// Per-pass derivation cap handed to the search engine
    pub max_derivations: usize,
    /// Run-level cap on explore attempts
    pub max_exploration_iters: usize,
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self {
            max_num_neighbors: -1,
            neighbor_file_path: None,
            max_predicted_patterns: usize::MAX,
            max_derivations: 5000,
            max_exploration_iters: usize::MAX,
        }
    }
}
