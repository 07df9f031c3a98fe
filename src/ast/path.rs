use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::ast::span::Span;

/// A dotted sequence of mapping keys, written `.chapters.title`.
///
/// Paths double as the keys of an [`IndexAssignment`](crate::IndexAssignment):
/// a list-valued prefix such as `.chapters` names the dimension a `join`
/// iterates over. Ordering is lexicographic over segments, which keeps
/// requirement sets and discovered dimensions deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Build a path from its key segments. An empty segment list is the
    /// record root.
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path extended by one more key.
    pub fn child(&self, key: &str) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        FieldPath { segments }
    }

    /// Every strict, non-root prefix, shortest first: `.a.b.c` yields
    /// `.a` then `.a.b`.
    pub fn strict_prefixes(&self) -> impl Iterator<Item = FieldPath> + '_ {
        (1..self.segments.len()).map(|n| FieldPath {
            segments: self.segments[..n].to_vec(),
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = ParseError;

    /// Parse the `.a.b.c` field token form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(body) = s.strip_prefix('.') else {
            return Err(ParseError::new(
                Span::new(0, s.len().min(1)),
                format!("field path must start with '.': {s:?}"),
            ));
        };
        let mut segments = Vec::new();
        let mut offset = 1;
        for segment in body.split('.') {
            if !is_identifier(segment) {
                return Err(ParseError::new(
                    Span::new(offset, offset + segment.len()),
                    format!("invalid field segment {segment:?} in {s:?}"),
                ));
            }
            segments.push(segment.to_string());
            offset += segment.len() + 1;
        }
        Ok(FieldPath { segments })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
