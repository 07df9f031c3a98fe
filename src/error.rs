//! Error types for parsing and filling.
//!
//! [`ParseError`] is produced when the text at a `{` is not a valid
//! expression. The scanner recovers from it by emitting the `{` literally,
//! so it never escapes [`fill`](crate::fill). [`FillError`] is produced
//! while evaluating a valid expression against a record and aborts the
//! whole fill.

use crate::ast::span::Span;
use thiserror::Error;

// ── Parse errors ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

// ── Fill errors ─────────────────────────────────────────────────────────

/// An error that occurs while filling a template from a record.
///
/// Carries a structured [`FillErrorKind`], a human-readable message and
/// the [`Span`] of the offending `{...}` in the template when known.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FillError {
    pub kind: FillErrorKind,
    pub span: Option<Span>,
    pub message: String,
}

impl FillError {
    pub fn new(kind: FillErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            span: None,
            message: message.into(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a span only if none is set yet, keeping the innermost one.
    pub(crate) fn or_span(self, span: Span) -> Self {
        if self.span.is_none() {
            self.with_span(span)
        } else {
            self
        }
    }

    // Convenience constructors for common error types

    pub fn missing_key(path: &str, key: &str) -> Self {
        Self::new(
            FillErrorKind::FieldLookup,
            format!("field lookup failed at {path}: no key {key:?}"),
        )
    }

    pub fn not_a_map(path: &str, got: &str) -> Self {
        Self::new(
            FillErrorKind::FieldLookup,
            format!("field lookup failed at {path}: expected map, got {got}"),
        )
    }

    pub fn index_out_of_range(path: &str, index: usize, len: usize) -> Self {
        Self::new(
            FillErrorKind::FieldLookup,
            format!("field lookup failed at {path}: index {index} out of range for length {len}"),
        )
    }

    pub fn not_a_list(path: &str, got: &str) -> Self {
        Self::new(
            FillErrorKind::FieldLookup,
            format!("field lookup failed at {path}: indexed a {got}, expected list"),
        )
    }

    pub fn no_dimension(requirements: &str) -> Self {
        Self::new(
            FillErrorKind::NoDimension,
            format!("join has no list to iterate over (fields: {requirements})"),
        )
    }

    pub fn ambiguous_dimension(candidates: &str) -> Self {
        Self::new(
            FillErrorKind::AmbiguousDimension,
            format!("join has more than one list to iterate over: {candidates}"),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillErrorKind {
    /// A `join` references no list-valued field.
    NoDimension,
    /// A `join` references more than one independent list.
    AmbiguousDimension,
    /// A mapping key is absent, an index is out of range, or a path
    /// descends through a scalar.
    FieldLookup,
    /// The fill exceeded a configured resource limit (node count,
    /// iteration cap or output size).
    ResourceLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_span_keeps_innermost() {
        let err = FillError::missing_key(".a", "a").with_span(Span::new(3, 5));
        assert_eq!(err.or_span(Span::new(0, 10)).span, Some(Span::new(3, 5)));
    }

    #[test]
    fn test_error_has_no_cause() {
        let err = FillError::ambiguous_dimension(".a, .b").with_span(Span::new(0, 4));
        assert_eq!(err.clone().to_string(), "join has more than one list to iterate over: .a, .b");
        assert!(std::error::Error::source(&err).is_none());
    }
}
