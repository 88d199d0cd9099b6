//! Neighbor-based pattern prediction
//!
//! Given an example, rank the patterns its neighbors were solved with and
//! collect the union of grammar rules that realize them. The rule union, not
//! the patterns, is what parameterizes the restricted grammar for the
//! exploit pass.
//!
//! Ranking is deterministic by construction: frequency descending, ties
//! broken by the pattern string. The tie-break is a correctness requirement:
//! candidate frequencies live in an unordered map and a frequency-only sort
//! would leave tie order unspecified.

use crate::example::{Example, RuleId};
use crate::formula::Pattern;
use crate::neighbors::NeighborIndex;
use crate::store::PatternStore;
use crate::PrunerConfig;
use std::collections::{HashMap, HashSet};

/// Output of one prediction: ranked patterns and their rule union
#[derive(Debug, Clone, Default)]
pub struct Prediction {
    /// Candidate patterns, most frequent first
    pub patterns: Vec<Pattern>,
    /// Union of rule descriptors across the surviving patterns, in rank
    /// order, deduplicated by descriptor identity
    pub rules: Vec<RuleId>,
}

impl Prediction {
    /// Whether no rules were predicted (exploit will trivially fail)
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Ranks candidate patterns for an example from store and neighbor state
///
/// Read-only over both; predicting never mutates the store.
#[derive(Debug)]
pub struct PatternPredictor<'a> {
    config: &'a PrunerConfig,
    store: &'a PatternStore,
    neighbors: Option<&'a NeighborIndex>,
}

impl<'a> PatternPredictor<'a> {
    /// Create a predictor over the current store and neighbor index
    pub fn new(
        config: &'a PrunerConfig,
        store: &'a PatternStore,
        neighbors: Option<&'a NeighborIndex>,
    ) -> Self {
        Self {
            config,
            store,
            neighbors,
        }
    }

    /// Predict patterns and rules for an example
    ///
    /// With a neighbor cap K > 0 and a loaded index, the first K neighbors
    /// (in file order) that have a stored best pattern each contribute one
    /// frequency count; neighbors without a stored pattern are skipped and
    /// do not count toward K, and an example the index has no record for
    /// predicts nothing. With K <= 0, or when no index was loaded at all,
    /// every pattern in the global pool is a frequency-1 candidate.
    pub fn predict(&self, example: &Example) -> Prediction {
        let mut freq: HashMap<String, u32> = HashMap::new();

        let index = match self.neighbors {
            Some(index) if self.config.max_num_neighbors > 0 => Some(index),
            _ => None,
        };
        if let Some(index) = index {
            let cap = self.config.max_num_neighbors as usize;
            let list = index.neighbors(&example.id).unwrap_or(&[]);
            let mut contributed = 0usize;
            for nid in list {
                let Some(best) = self.store.best_pattern(nid) else {
                    continue;
                };
                *freq.entry(best.pattern.clone()).or_insert(0) += 1;
                contributed += 1;
                if contributed >= cap {
                    break;
                }
            }
        } else {
            for pattern in self.store.all_patterns() {
                freq.insert(pattern.to_string(), 1);
            }
        }

        let mut patterns: Vec<Pattern> = freq
            .into_iter()
            .map(|(pattern, frequency)| Pattern {
                pattern,
                frequency,
                score: 0.0,
            })
            .collect();
        patterns.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.pattern.cmp(&b.pattern))
        });
        patterns.truncate(self.config.max_predicted_patterns);

        let mut rules = Vec::new();
        let mut seen: HashSet<&RuleId> = HashSet::new();
        for pattern in &patterns {
            if let Some(pattern_rules) = self.store.rules_for(&pattern.pattern) {
                for rule in pattern_rules {
                    if seen.insert(rule) {
                        rules.push(rule.clone());
                    }
                }
            }
        }

        for (rank, pattern) in patterns.iter().enumerate() {
            tracing::debug!(example = %example.id, rank = rank + 1, pattern = %pattern, "predicted pattern");
        }

        Prediction { patterns, rules }
    }
}
