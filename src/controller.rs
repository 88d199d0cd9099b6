//! The per-example explore/exploit controller
//!
//! For each example: try an exploit pass first (search restricted to the
//! predicted rules), and only fall back to an explore pass (full grammar)
//! when exploit fails, correctness is being computed, the run is still in
//! its first phase, and the run-level explore budget is not exhausted.
//! Whichever pass runs, every consistent root derivation it produces feeds
//! the pattern store, so later examples benefit from earlier ones.
//!
//! Processing is single-threaded and sequential: dataset order is
//! significant, and every pass is fully drained before the next decision.

use crate::engine::{GrammarScope, SearchEngine, ValueEvaluator};
use crate::example::{Derivation, Example, ExampleId};
use crate::formula::{canonicalize, Pattern};
use crate::neighbors::NeighborIndex;
use crate::predict::PatternPredictor;
use crate::stats::RunStats;
use crate::store::PatternStore;
use crate::{PruneError, PrunerConfig};

/// Result of processing one example
#[derive(Debug, Clone)]
pub struct ExampleOutcome {
    /// Derivations from the winning pass (explore output replaces exploit
    /// output when explore runs)
    pub derivations: Vec<Derivation>,
    /// Whether the exploit pass found a consistent derivation
    pub exploit_succeeded: bool,
    /// Whether an explore pass was attempted
    pub explored: bool,
    /// Whether the explore pass found a consistent derivation
    pub explore_succeeded: bool,
}

impl ExampleOutcome {
    /// Whether either pass found a consistent derivation
    pub fn found_consistent(&self) -> bool {
        self.exploit_succeeded || self.explore_succeeded
    }
}

/// Orchestrates exploit/explore passes and pattern learning per example
///
/// Owns the process-wide mutable state: the pattern store (never reset), the
/// run stats (reset per phase), and the lazily loaded neighbor index.
#[derive(Debug)]
pub struct PruningController {
    config: PrunerConfig,
    store: PatternStore,
    stats: RunStats,
    neighbors: Option<NeighborIndex>,
    neighbors_loaded: bool,
    first_phase: Option<String>,
}

impl PruningController {
    /// Create a controller with an empty store
    pub fn new(config: PrunerConfig) -> Self {
        Self::with_store(config, PatternStore::new())
    }

    /// Create a controller resuming from a previously learned store
    pub fn with_store(config: PrunerConfig, store: PatternStore) -> Self {
        Self {
            config,
            store,
            stats: RunStats::new(),
            neighbors: None,
            neighbors_loaded: false,
            first_phase: None,
        }
    }

    /// Begin a named phase (e.g. `"0.train"`)
    ///
    /// Resets the per-phase stats; the first name ever begun is remembered
    /// as the first training phase for explore gating. Also triggers the
    /// one-time neighbor load so a bad file fails the run up front.
    pub fn begin_phase(&mut self, name: &str) -> Result<(), PruneError> {
        self.ensure_neighbors()?;
        if self.first_phase.is_none() {
            self.first_phase = Some(name.to_string());
        }
        self.stats.begin_phase(name);
        Ok(())
    }

    /// Process one example: exploit, then conditionally explore
    pub fn run_example<E, V>(
        &mut self,
        engine: &mut E,
        evaluator: &V,
        example: &Example,
        compute_correctness: bool,
    ) -> Result<ExampleOutcome, PruneError>
    where
        E: SearchEngine,
        V: ValueEvaluator,
    {
        self.ensure_neighbors()?;

        let (derivations, exploit_succeeded) =
            self.exploit(engine, evaluator, example, compute_correctness);
        let mut outcome = ExampleOutcome {
            derivations,
            exploit_succeeded,
            explored: false,
            explore_succeeded: false,
        };

        if self.should_explore(compute_correctness, exploit_succeeded) {
            let (derivations, explore_succeeded) =
                self.explore(engine, evaluator, example, compute_correctness);
            outcome.derivations = derivations;
            outcome.explored = true;
            outcome.explore_succeeded = explore_succeeded;
        }

        tracing::debug!(example = %example.id, "{}", self.stats.summary());
        Ok(outcome)
    }

    /// Best known pattern for an example, if one was ever found consistent
    pub fn best_pattern_for(&self, id: &ExampleId) -> Option<&Pattern> {
        self.store.best_pattern(id)
    }

    /// The accumulated pattern store
    pub fn store(&self) -> &PatternStore {
        &self.store
    }

    /// Current run statistics
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Active configuration
    pub fn config(&self) -> &PrunerConfig {
        &self.config
    }

    /// Consume the controller and keep the learned store (for persistence)
    pub fn into_store(self) -> PatternStore {
        self.store
    }

    /// Load the neighbor index at most once, lazily
    ///
    /// Absent a configured path the index stays `None` and prediction falls
    /// back to the global pattern pool.
    fn ensure_neighbors(&mut self) -> Result<(), PruneError> {
        if self.neighbors_loaded {
            return Ok(());
        }
        self.neighbors_loaded = true;
        match &self.config.neighbor_file_path {
            Some(path) => {
                self.neighbors = Some(NeighborIndex::load(path)?);
            }
            None => {
                tracing::debug!("no neighbor file configured; using global pattern pool");
            }
        }
        Ok(())
    }

    /// Explore only when correctness is computed, exploit failed, the run is
    /// still in its first phase, and the run-level attempt budget allows it.
    ///
    /// A controller that never began a phase counts as being in its first
    /// phase.
    fn should_explore(&self, compute_correctness: bool, exploit_succeeded: bool) -> bool {
        let in_first_phase = match &self.first_phase {
            Some(first) => first == self.stats.phase(),
            None => true,
        };
        compute_correctness
            && !exploit_succeeded
            && in_first_phase
            && (self.stats.lifetime_explore_attempts as usize) <= self.config.max_exploration_iters
    }

    fn exploit<E, V>(
        &mut self,
        engine: &mut E,
        evaluator: &V,
        example: &Example,
        compute_correctness: bool,
    ) -> (Vec<Derivation>, bool)
    where
        E: SearchEngine,
        V: ValueEvaluator,
    {
        let predictor = PatternPredictor::new(&self.config, &self.store, self.neighbors.as_ref());
        let prediction = predictor.predict(example);
        tracing::debug!(
            example = %example.id,
            patterns = prediction.patterns.len(),
            rules = prediction.rules.len(),
            "exploit pass"
        );

        let scope = GrammarScope::Restricted(prediction.rules);
        let mut derivations = engine.search(&scope, example, self.config.max_derivations);

        let mut found = false;
        if compute_correctness {
            for derivation in derivations.iter_mut() {
                if self.learn(engine, evaluator, example, derivation) {
                    found = true;
                }
            }
        }
        self.stats.record_exploit(found);
        (derivations, found)
    }

    fn explore<E, V>(
        &mut self,
        engine: &mut E,
        evaluator: &V,
        example: &Example,
        compute_correctness: bool,
    ) -> (Vec<Derivation>, bool)
    where
        E: SearchEngine,
        V: ValueEvaluator,
    {
        tracing::debug!(example = %example.id, "explore pass (full grammar)");
        let mut derivations = engine.search(&GrammarScope::Full, example, self.config.max_derivations);

        let mut found = false;
        if compute_correctness {
            for derivation in derivations.iter_mut() {
                if self.learn(engine, evaluator, example, derivation) {
                    found = true;
                }
            }
        }
        self.stats.record_explore(found);
        (derivations, found)
    }

    /// Pattern/rule induction from one derivation
    ///
    /// Returns whether the derivation was consistent (root category,
    /// compatibility 1.0), regardless of whether it improved the stored
    /// best. Rules are extracted only on improvement.
    fn learn<E, V>(
        &mut self,
        engine: &mut E,
        evaluator: &V,
        example: &Example,
        derivation: &mut Derivation,
    ) -> bool
    where
        E: SearchEngine,
        V: ValueEvaluator,
    {
        if !derivation.is_root() {
            return false;
        }
        let Some(target) = &example.target_value else {
            // No correctness signal: learning is skipped for this example
            return false;
        };

        let compatibility = match derivation.compatibility {
            Some(c) => c,
            None => {
                let c = derivation
                    .value
                    .as_ref()
                    .map(|v| evaluator.compatibility(target, v))
                    .unwrap_or(0.0);
                derivation.compatibility = Some(c);
                c
            }
        };
        if compatibility < 1.0 {
            return false;
        }

        let pattern_string = canonicalize(&derivation.category, &derivation.formula);
        tracing::debug!(
            example = %example.id,
            pattern = %pattern_string,
            score = derivation.score,
            "found consistent derivation"
        );
        if self.store.improves(&example.id, derivation.score) {
            let rules = engine.extract_rules(derivation, example);
            let pattern = Pattern::with_score(pattern_string, derivation.score);
            self.store.record(&example.id, pattern, rules);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ExactMatch;
    use crate::example::RuleId;
    use crate::formula::{Category, Formula};

    /// Engine whose full-grammar pass always finds a consistent derivation
    /// and whose restricted pass never does
    struct ExploreOnlyEngine {
        searches: Vec<GrammarScope>,
    }

    impl ExploreOnlyEngine {
        fn new() -> Self {
            Self {
                searches: Vec::new(),
            }
        }
    }

    impl SearchEngine for ExploreOnlyEngine {
        fn search(
            &mut self,
            scope: &GrammarScope,
            _example: &Example,
            _max_derivations: usize,
        ) -> Vec<Derivation> {
            self.searches.push(scope.clone());
            match scope {
                GrammarScope::Full => vec![Derivation::new(
                    Category::root(),
                    Formula::app(vec![Formula::atom("count"), Formula::atom("river")]),
                    1.0,
                )
                .with_value("(number 3)")],
                GrammarScope::Restricted(_) => Vec::new(),
            }
        }

        fn extract_rules(&mut self, _derivation: &Derivation, _example: &Example) -> Vec<RuleId> {
            vec![RuleId::from("R_full")]
        }
    }

    fn supervised(id: &str) -> Example {
        Example::new(id, "how many rivers").with_target("(number 3)")
    }

    #[test]
    fn explore_requires_correctness() {
        let mut controller = PruningController::new(PrunerConfig::default());
        let mut engine = ExploreOnlyEngine::new();
        let outcome = controller
            .run_example(&mut engine, &ExactMatch, &supervised("ex1"), false)
            .unwrap();
        assert!(!outcome.explored);
        assert_eq!(controller.stats().explore_attempts, 0);
    }

    #[test]
    fn explore_requires_exploit_failure() {
        // Engine that succeeds under any scope: exploit wins, explore is skipped
        struct AlwaysSucceeds;
        impl SearchEngine for AlwaysSucceeds {
            fn search(
                &mut self,
                _scope: &GrammarScope,
                _example: &Example,
                _max: usize,
            ) -> Vec<Derivation> {
                vec![Derivation::new(Category::root(), Formula::atom("x"), 1.0)
                    .with_value("(number 3)")]
            }
            fn extract_rules(&mut self, _d: &Derivation, _e: &Example) -> Vec<RuleId> {
                vec![RuleId::from("R1")]
            }
        }

        let mut controller = PruningController::new(PrunerConfig::default());
        let outcome = controller
            .run_example(&mut AlwaysSucceeds, &ExactMatch, &supervised("ex1"), true)
            .unwrap();
        assert!(outcome.exploit_succeeded);
        assert!(!outcome.explored);
    }

    #[test]
    fn explore_requires_first_phase() {
        let mut controller = PruningController::new(PrunerConfig::default());
        let mut engine = ExploreOnlyEngine::new();

        controller.begin_phase("0.train").unwrap();
        let outcome = controller
            .run_example(&mut engine, &ExactMatch, &supervised("ex1"), true)
            .unwrap();
        assert!(outcome.explored);

        controller.begin_phase("1.train").unwrap();
        let outcome = controller
            .run_example(&mut engine, &ExactMatch, &supervised("ex2"), true)
            .unwrap();
        assert!(!outcome.explored);
    }

    #[test]
    fn explore_respects_run_budget() {
        let config = PrunerConfig {
            max_exploration_iters: 0,
            ..PrunerConfig::default()
        };
        let mut controller = PruningController::new(config);
        let mut engine = ExploreOnlyEngine::new();
        controller.begin_phase("0.train").unwrap();

        // Budget 0 admits exactly one explore attempt (attempts-so-far <= cap)
        let first = controller
            .run_example(&mut engine, &ExactMatch, &supervised("ex1"), true)
            .unwrap();
        assert!(first.explored);

        let second = controller
            .run_example(&mut engine, &ExactMatch, &supervised("ex2"), true)
            .unwrap();
        assert!(!second.explored);
        assert_eq!(controller.stats().lifetime_explore_attempts, 1);
    }

    #[test]
    fn explore_output_replaces_exploit_output() {
        let mut controller = PruningController::new(PrunerConfig::default());
        let mut engine = ExploreOnlyEngine::new();
        controller.begin_phase("0.train").unwrap();

        let outcome = controller
            .run_example(&mut engine, &ExactMatch, &supervised("ex1"), true)
            .unwrap();
        assert!(outcome.explored);
        assert!(outcome.explore_succeeded);
        assert_eq!(outcome.derivations.len(), 1);
        assert!(outcome.found_consistent());
        // Learning happened from the explore pass
        assert_eq!(
            controller
                .best_pattern_for(&crate::example::ExampleId::from("ex1"))
                .unwrap()
                .pattern,
            "(@1 @2)"
        );
    }

    #[test]
    fn unsupervised_examples_never_learn() {
        struct AlwaysSucceeds;
        impl SearchEngine for AlwaysSucceeds {
            fn search(
                &mut self,
                _scope: &GrammarScope,
                _example: &Example,
                _max: usize,
            ) -> Vec<Derivation> {
                vec![Derivation::new(Category::root(), Formula::atom("x"), 1.0)
                    .with_value("(number 3)")]
            }
            fn extract_rules(&mut self, _d: &Derivation, _e: &Example) -> Vec<RuleId> {
                vec![RuleId::from("R1")]
            }
        }

        let mut controller = PruningController::new(PrunerConfig::default());
        let example = Example::new("ex1", "no target here");
        let outcome = controller
            .run_example(&mut AlwaysSucceeds, &ExactMatch, &example, true)
            .unwrap();
        assert!(!outcome.exploit_succeeded);
        assert!(controller.store().is_empty());
    }

    #[test]
    fn bad_neighbor_file_fails_begin_phase() {
        let config = PrunerConfig {
            neighbor_file_path: Some("/nonexistent/neighbors.tsv".into()),
            ..PrunerConfig::default()
        };
        let mut controller = PruningController::new(config);
        assert!(controller.begin_phase("0.train").is_err());
    }
}
