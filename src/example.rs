//! Examples, derivations, and rule descriptors
//!
//! These are the data the surrounding parsing pipeline hands to the pruner:
//! examples are read-only inputs, derivations are search outputs, and rule
//! descriptors are opaque handles to grammar rules extracted from consistent
//! derivations.

use crate::formula::{Category, Formula};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a dataset example
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExampleId(pub String);

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExampleId {
    fn from(s: &str) -> Self {
        ExampleId(s.to_string())
    }
}

/// Opaque denotation of a formula; compared by the value evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value(pub String);

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value(s.to_string())
    }
}

/// Opaque, string-identified grammar rule descriptor
///
/// Many descriptors may realize one pattern; a restricted grammar is just a
/// set of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub String);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleId {
    fn from(s: &str) -> Self {
        RuleId(s.to_string())
    }
}

/// A dataset example; owned by the surrounding pipeline, read-only here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    /// Stable identifier
    pub id: ExampleId,
    /// Natural-language context used by search
    pub utterance: String,
    /// Target denotation, when supervision is available
    pub target_value: Option<Value>,
}

impl Example {
    /// Create an unsupervised example
    pub fn new(id: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            id: ExampleId(id.into()),
            utterance: utterance.into(),
            target_value: None,
        }
    }

    /// Attach a target value
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_value = Some(Value(target.into()));
        self
    }
}

/// A scored candidate parse produced by the search engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Derivation {
    /// Grammar category this derivation reached
    pub category: Category,
    /// The logical form
    pub formula: Formula,
    /// Search score
    pub score: f64,
    /// Denotation, if the formula was executed
    pub value: Option<Value>,
    /// Correctness against the target; computed lazily, once, for root
    /// derivations during learning
    pub compatibility: Option<f64>,
}

impl Derivation {
    /// Create a derivation without a denotation
    pub fn new(category: Category, formula: Formula, score: f64) -> Self {
        Self {
            category,
            formula,
            score,
            value: None,
            compatibility: None,
        }
    }

    /// Attach a denotation
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(Value(value.into()));
        self
    }

    /// Whether this derivation reached the root category
    pub fn is_root(&self) -> bool {
        self.category.is_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_builder() {
        let ex = Example::new("ex1", "how many rivers").with_target("(number 3)");
        assert_eq!(ex.id, ExampleId::from("ex1"));
        assert_eq!(ex.target_value, Some(Value::from("(number 3)")));
    }

    #[test]
    fn root_detection() {
        let root = Derivation::new(Category::root(), Formula::atom("x"), 0.0);
        let other = Derivation::new(Category::from("$Entity"), Formula::atom("x"), 0.0);
        assert!(root.is_root());
        assert!(!other.is_root());
    }
}
