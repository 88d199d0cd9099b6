//! Collaborator interfaces to the surrounding parser
//!
//! The pruner decides *when* and *with what search space* to parse; the
//! actual parsing, rule extraction, and value comparison are capabilities it
//! calls into. A restricted grammar is a pure value ([`GrammarScope`]), not a
//! stateful grammar object, so exploit passes are testable without a real
//! engine.

use crate::example::{Derivation, Example, RuleId, Value};

/// The search space for one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarScope {
    /// The full grammar, used by explore passes
    Full,
    /// Exactly these rules, in this order, used by exploit passes
    Restricted(Vec<RuleId>),
}

impl GrammarScope {
    /// Number of rules in a restricted scope; `None` for the full grammar
    pub fn rule_count(&self) -> Option<usize> {
        match self {
            GrammarScope::Full => None,
            GrammarScope::Restricted(rules) => Some(rules.len()),
        }
    }

    /// Whether this is a restricted scope with no rules at all
    pub fn is_empty_restriction(&self) -> bool {
        matches!(self, GrammarScope::Restricted(rules) if rules.is_empty())
    }
}

/// Grammar-driven search over an example
///
/// Implementations are expected to drain search synchronously and honor the
/// derivation cap by stopping early; exceeding the cap is a normal outcome,
/// not a fault.
pub trait SearchEngine {
    /// Produce up to `max_derivations` derivations for the example within
    /// the given grammar scope.
    fn search(
        &mut self,
        scope: &GrammarScope,
        example: &Example,
        max_derivations: usize,
    ) -> Vec<Derivation>;

    /// Extract the grammar rules that realize a consistent derivation.
    ///
    /// Called only when a derivation improves an example's best pattern.
    fn extract_rules(&mut self, derivation: &Derivation, example: &Example) -> Vec<RuleId>;
}

/// Graded correctness of a derived value against a target
pub trait ValueEvaluator {
    /// Compatibility in `[0, 1]`; exactly `1.0` means fully correct.
    fn compatibility(&self, target: &Value, derived: &Value) -> f64;
}

/// Evaluator that accepts only exact value matches
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl ValueEvaluator for ExactMatch {
    fn compatibility(&self, target: &Value, derived: &Value) -> f64 {
        if target == derived {
            1.0
        } else {
            0.0
        }
    }
}
