//! Formula trees, grammar categories, and canonical pattern strings
//!
//! A [`Pattern`] is the cache key that lets structurally identical solutions
//! from different examples collapse to one entry: the derivation's formula
//! with every leaf replaced by an indexed placeholder. Two derivations that
//! differ only in which entities or predicates they mention canonicalize to
//! the same pattern string.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

/// Grammar category of a derivation (e.g. `$ROOT`, `$TOKEN`, `$Entity`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(pub String);

impl Category {
    /// The root category; only root derivations participate in learning
    pub const ROOT: &'static str = "$ROOT";

    /// Create the root category
    pub fn root() -> Self {
        Category(Self::ROOT.to_string())
    }

    /// Whether this is the root category
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    /// Whether this is a lexical leaf category
    ///
    /// Lexical derivations canonicalize to their category string rather
    /// than through structural placeholder replacement.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self.0.as_str(),
            "$TOKEN" | "$PHRASE" | "$LEMMA_TOKEN" | "$LEMMA_PHRASE"
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category(s.to_string())
    }
}

/// A logical-form tree produced by search
///
/// Rendered as an s-expression; leaves are opaque atoms (predicates,
/// entities, constants).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formula {
    /// A leaf symbol
    Atom(String),
    /// An application of subformulas
    App(Vec<Formula>),
}

impl Formula {
    /// Create a leaf formula
    pub fn atom(s: impl Into<String>) -> Self {
        Formula::Atom(s.into())
    }

    /// Create an application node
    pub fn app(args: Vec<Formula>) -> Self {
        Formula::App(args)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Atom(s) => write!(f, "{}", s),
            Formula::App(args) => {
                write!(f, "(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A canonical pattern with its prediction-time frequency and search score
///
/// Equality and hashing consider only the canonical string: `frequency` is
/// scratch state used while ranking predictions, and `score` is the
/// underlying derivation's search score, meaningful only once the pattern
/// is stored as an example's best.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    /// Canonical pattern string
    pub pattern: String,
    /// Occurrence count among the consulted neighbors
    pub frequency: u32,
    /// Search score of the derivation this pattern was induced from
    pub score: f64,
}

impl Pattern {
    /// Create a pattern carrying a derivation score
    pub fn with_score(pattern: impl Into<String>, score: f64) -> Self {
        Self {
            pattern: pattern.into(),
            frequency: 0,
            score,
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Pattern {}

impl std::hash::Hash for Pattern {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.pattern, self.frequency)
    }
}

/// Canonicalize a derivation's formula into a pattern string
///
/// Lexical leaf categories map to the category itself; everything else maps
/// through [`indexed_pattern`].
pub fn canonicalize(category: &Category, formula: &Formula) -> String {
    if category.is_lexical() {
        category.0.clone()
    } else {
        indexed_pattern(formula)
    }
}

/// Replace each distinct atom with `@1`, `@2`, … in first-occurrence order
///
/// Repeated atoms reuse their index, so `(count x x)` and `(count y y)`
/// produce the same `(@1 @2 @2)` string while `(count x y)` does not.
pub fn indexed_pattern(formula: &Formula) -> String {
    let mut indices: HashMap<String, usize> = HashMap::new();
    let mut out = String::new();
    render_indexed(formula, &mut indices, &mut out);
    out
}

fn render_indexed(formula: &Formula, indices: &mut HashMap<String, usize>, out: &mut String) {
    match formula {
        Formula::Atom(s) => {
            let next = indices.len() + 1;
            let idx = *indices.entry(s.clone()).or_insert(next);
            let _ = write!(out, "@{}", idx);
        }
        Formula::App(args) => {
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render_indexed(arg, indices, out);
            }
            out.push(')');
        }
    }
}
