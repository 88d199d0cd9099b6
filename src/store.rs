//! The learned pattern store
//!
//! Process-wide knowledge base that grows monotonically as examples are
//! solved in dataset order. Three tables:
//!
//! - `best_for_example`: per example, the highest-scoring consistent pattern
//!   seen so far; replaced only on a strictly greater score
//! - `all_patterns`: every distinct pattern string ever stored as a best;
//!   never shrinks
//! - `rules_for_pattern`: for each pattern, every rule descriptor ever
//!   associated with it, across all examples; never evicts
//!
//! Rule accumulation is unbounded: these tables *are* the learned macro
//! grammar. The store is never reset between phases.

use crate::example::{ExampleId, RuleId};
use crate::formula::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Accumulated pattern and rule knowledge, shared across all examples
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PatternStore {
    best_for_example: HashMap<ExampleId, Pattern>,
    all_patterns: BTreeSet<String>,
    rules_for_pattern: HashMap<String, BTreeSet<RuleId>>,
}

impl PatternStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Best known pattern for an example, if any
    pub fn best_pattern(&self, id: &ExampleId) -> Option<&Pattern> {
        self.best_for_example.get(id)
    }

    /// Whether a derivation score would improve the stored best
    ///
    /// True when no entry exists or the score is strictly greater; equal
    /// scores never replace the incumbent.
    pub fn improves(&self, id: &ExampleId, score: f64) -> bool {
        match self.best_for_example.get(id) {
            Some(old) => score > old.score,
            None => true,
        }
    }

    /// Record a consistent pattern for an example
    ///
    /// No-op (returning `false`) unless the pattern's score improves the
    /// stored best. On improvement the rules are unioned into
    /// `rules_for_pattern`, the pattern string joins `all_patterns`, and the
    /// per-example best is overwritten.
    pub fn record(&mut self, id: &ExampleId, pattern: Pattern, rules: Vec<RuleId>) -> bool {
        if !self.improves(id, pattern.score) {
            return false;
        }
        self.rules_for_pattern
            .entry(pattern.pattern.clone())
            .or_default()
            .extend(rules);
        self.all_patterns.insert(pattern.pattern.clone());
        tracing::debug!(example = %id, pattern = %pattern.pattern, score = pattern.score, "stored best pattern");
        self.best_for_example.insert(id.clone(), pattern);
        true
    }

    /// Every distinct pattern string ever stored, in lexicographic order
    pub fn all_patterns(&self) -> impl Iterator<Item = &str> {
        self.all_patterns.iter().map(String::as_str)
    }

    /// Rule descriptors accumulated for a pattern
    pub fn rules_for(&self, pattern: &str) -> Option<&BTreeSet<RuleId>> {
        self.rules_for_pattern.get(pattern)
    }

    /// Number of examples with a stored best pattern
    pub fn len(&self) -> usize {
        self.best_for_example.len()
    }

    /// Whether no example has been solved yet
    pub fn is_empty(&self) -> bool {
        self.best_for_example.is_empty()
    }

    /// Number of distinct patterns ever stored
    pub fn pattern_count(&self) -> usize {
        self.all_patterns.len()
    }

    /// Persist the store to a JSON file (atomic write-then-rename)
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), crate::PruneError> {
        crate::io::write_json_atomic(path, self)
    }

    /// Load a store from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, crate::PruneError> {
        crate::io::read_json(path)
    }

    /// Load a store if the file exists, otherwise return an empty one
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, crate::PruneError> {
        match std::fs::metadata(path.as_ref()) {
            Ok(_) => Self::load_from_file(path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}
