//! The pluggable request transform.
//!
//! The business transform applied to each request payload is a
//! placeholder by design: handlers only see the [`Transform`] trait, so
//! the mapping can be swapped without touching call-handling logic.

use std::fmt;
use std::sync::Arc;

/// Pure function mapping one input string to one output string.
///
/// Implementations must be total and deterministic over all inputs,
/// including the empty string, with no observable side effects.
pub trait Transform: Send + Sync + 'static {
    fn apply(&self, input: &str) -> String;
}

/// Reference transform: uppercases the input.
pub struct Uppercase;

impl Transform for Uppercase {
    fn apply(&self, input: &str) -> String {
        input.to_uppercase()
    }
}

/// Variant transform: substitutes the literal `f` with `9`, then
/// uppercases.
pub struct Substitute;

impl Transform for Substitute {
    fn apply(&self, input: &str) -> String {
        input.replace('f', "9").to_uppercase()
    }
}

/// Transform selection, chosen once at startup.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformKind {
    Uppercase,
    Substitute,
}

impl TransformKind {
    /// Builds the selected transform behind a shared trait object.
    pub fn build(self) -> Arc<dyn Transform> {
        match self {
            TransformKind::Uppercase => Arc::new(Uppercase),
            TransformKind::Substitute => Arc::new(Substitute),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::Uppercase => write!(f, "uppercase"),
            TransformKind::Substitute => write!(f, "substitute"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_basic() {
        assert_eq!(Uppercase.apply("hello"), "HELLO");
        assert_eq!(Uppercase.apply("MiXeD"), "MIXED");
    }

    #[test]
    fn uppercase_total_over_empty_input() {
        assert_eq!(Uppercase.apply(""), "");
    }

    #[test]
    fn uppercase_is_idempotent() {
        let once = Uppercase.apply("some request");
        assert_eq!(Uppercase.apply(&once), once);
    }

    #[test]
    fn substitute_replaces_before_upcasing() {
        assert_eq!(Substitute.apply("fof"), "9O9");
        assert_eq!(Substitute.apply("F"), "F"); // only the lowercase literal
        assert_eq!(Substitute.apply(""), "");
    }

    #[test]
    fn kind_builds_matching_transform() {
        assert_eq!(TransformKind::Uppercase.build().apply("f"), "F");
        assert_eq!(TransformKind::Substitute.build().apply("f"), "9");
    }
}
