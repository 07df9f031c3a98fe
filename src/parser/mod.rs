//! Embedded-expression parser, built on [pest](https://pest.rs/).
//!
//! The grammar is defined in `fill.pest` and matches a single `{...}` span
//! at the start of a template remainder. This module converts pest's parse
//! tree into the typed AST defined in [`crate::ast`] and works out exactly
//! how many bytes the span occupied.
//!
//! Use [`parse_embed`] for one span, or [`crate::CompiledTemplate`] to scan
//! a whole template.

use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;

use crate::ast::expr::*;
use crate::ast::path::FieldPath;
use crate::ast::span::{Span, Spanned};
use crate::error::ParseError;

mod scanner;

pub use scanner::scan;

#[derive(Parser)]
#[grammar = "parser/fill.pest"]
struct FillParser;

/// A successfully parsed `{...}` span.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEmbed {
    /// The expression between the braces. Spans are relative to the start
    /// of the parsed input.
    pub expr: Expr,
    /// Number of bytes consumed, from the opening `{` through the closing
    /// `}` inclusive.
    pub consumed: usize,
}

/// Parse the expression that starts at the first byte of `input`, which
/// must be `{`.
///
/// Anything after the closing brace is ignored; [`ParsedEmbed::consumed`]
/// reports where the span ended. A [`ParseError`] means there is no
/// expression here and the `{` should be treated as plain text.
///
/// ```rust
/// use recfill::parse_embed;
///
/// let parsed = parse_embed(r#"{"ab" * 3} and more"#).unwrap();
/// assert_eq!(parsed.consumed, 10);
/// assert!(parse_embed("{unclosed").is_err());
/// ```
pub fn parse_embed(input: &str) -> Result<ParsedEmbed, ParseError> {
    let mut pairs = FillParser::parse(Rule::embed_span, input).map_err(|e| {
        let span = pest_span_to_span(&e);
        ParseError::new(span, format!("parse error: {e}"))
    })?;

    let whole = Span::new(0, input.len());
    let span_pair = next_pair(&mut pairs, whole)?;
    let mut inner = span_pair.into_inner();

    let expr = build_embed(next_pair(&mut inner, whole)?)?;

    // The grammar reports where trailing text begins (after any whitespace
    // following the closing brace). Scan back to a brace from the end of
    // the first trailing character, so a `}` opening the trailing text is
    // consumed with the embed: `{.a}}x` leaves only `x`.
    let boundary = inner
        .find(|p| p.as_rule() == Rule::rest)
        .map(|p| {
            let first = p.as_str().chars().next().map_or(0, char::len_utf8);
            p.as_span().start() + first
        })
        .unwrap_or(input.len());
    let close = input[..boundary]
        .rfind('}')
        .ok_or_else(|| ParseError::new(whole, "no closing brace before trailing text"))?;

    Ok(ParsedEmbed {
        expr,
        consumed: close + 1,
    })
}

fn pest_span_to_span(e: &pest::error::Error<Rule>) -> Span {
    match &e.location {
        pest::error::InputLocation::Pos(p) => Span::new(*p, *p + 1),
        pest::error::InputLocation::Span((s, e)) => Span::new(*s, *e),
    }
}

fn pair_span(pair: &Pair<Rule>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

/// Take the next child pair, or fail if the tree is shorter than the
/// grammar guarantees.
fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, parent: Span) -> Result<Pair<'i, Rule>, ParseError> {
    pairs
        .next()
        .ok_or_else(|| ParseError::new(parent, "unexpected end of parse tree"))
}

// -- Expression building -------------------------------------------------

fn build_embed(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    match pair.as_rule() {
        Rule::join => build_join(pair),
        Rule::string => build_string(pair),
        rule => Err(ParseError::new(
            pair_span(&pair),
            format!("unexpected rule in embed position: {rule:?}"),
        )),
    }
}

fn build_join(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let span = pair_span(&pair);
    let mut inner = pair.into_inner();
    let data = build_string(next_pair(&mut inner, span)?)?;
    let separator = build_string(next_pair(&mut inner, span)?)?;
    Ok(Spanned::new(
        ExprKind::Join(JoinExpr {
            data: Box::new(data),
            separator: Box::new(separator),
        }),
        span,
    ))
}

/// A single atom stands for itself; two or more become a concatenation.
fn build_string(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let span = pair_span(&pair);
    let mut atoms = pair
        .into_inner()
        .map(build_atom)
        .collect::<Result<Vec<_>, _>>()?;

    match atoms.len() {
        0 => Err(ParseError::new(span, "empty expression")),
        1 => Ok(atoms.remove(0)),
        _ => Ok(Spanned::new(ExprKind::Concat(atoms), span)),
    }
}

fn build_atom(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let span = pair_span(&pair);
    let rule = pair.as_rule();

    match rule {
        Rule::field => {
            let path: FieldPath = pair.as_str().parse()?;
            Ok(Spanned::new(ExprKind::Field(path), span))
        }
        Rule::quoted_string => {
            let s = extract_string_content(pair);
            Ok(Spanned::new(ExprKind::Literal(s), span))
        }
        Rule::repeated => {
            let mut inner = pair.into_inner();
            let text = extract_string_content(next_pair(&mut inner, span)?);
            let count_pair = next_pair(&mut inner, span)?;
            let count: usize = count_pair.as_str().parse().map_err(|_| {
                ParseError::new(
                    pair_span(&count_pair),
                    format!("invalid repeat count: {}", count_pair.as_str()),
                )
            })?;
            Ok(Spanned::new(ExprKind::Repeat { text, count }, span))
        }
        _ => Err(ParseError::new(
            span,
            format!("unexpected rule in atom position: {rule:?}"),
        )),
    }
}

// -- Helpers -------------------------------------------------------------

fn extract_string_content(pair: Pair<Rule>) -> String {
    // quoted_string = ${ "\"" ~ string_inner ~ "\"" }
    let inner = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");

    let mut result = String::new();
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('0') => result.push('\0'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                Some('\\') => result.push('\\'),
                Some(c) => {
                    result.push('\\');
                    result.push(c);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_of(source: &str) -> ExprKind {
        parse_embed(source).expect("parse failed").expr.node
    }

    fn field(path: &str) -> ExprKind {
        ExprKind::Field(path.parse().unwrap())
    }

    #[test]
    fn test_field() {
        assert_eq!(expr_of("{.a.b.c}"), field(".a.b.c"));
    }

    #[test]
    fn test_literal_with_escapes() {
        assert_eq!(
            expr_of(r#"{"say \"hi\"\n\\"}"#),
            ExprKind::Literal("say \"hi\"\n\\".to_string())
        );
    }

    #[test]
    fn test_every_documented_escape() {
        assert_eq!(
            expr_of(r#"{"\t\r\0\'"}"#),
            ExprKind::Literal("\t\r\0'".to_string())
        );
    }

    #[test]
    fn test_unknown_escape_is_kept() {
        assert_eq!(expr_of(r#"{"a\qb"}"#), ExprKind::Literal("a\\qb".to_string()));
    }

    #[test]
    fn test_repeated_literal() {
        assert_eq!(
            expr_of(r#"{ "ab" * 3 }"#),
            ExprKind::Repeat {
                text: "ab".to_string(),
                count: 3
            }
        );
    }

    #[test]
    fn test_concatenation() {
        match expr_of(r#"{.title " by " .author.name}"#) {
            ExprKind::Concat(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0].node, field(".title"));
                assert_eq!(parts[1].node, ExprKind::Literal(" by ".to_string()));
                assert_eq!(parts[2].node, field(".author.name"));
            }
            other => panic!("expected concatenation, got {other:?}"),
        }
    }

    #[test]
    fn test_join() {
        match expr_of(r#"{join .items.name with ", "}"#) {
            ExprKind::Join(join) => {
                assert_eq!(join.data.node, field(".items.name"));
                assert_eq!(join.separator.node, ExprKind::Literal(", ".to_string()));
            }
            other => panic!("expected join, got {other:?}"),
        }
    }

    #[test]
    fn test_join_with_compound_parts() {
        match expr_of(r#"{join "- " .tags.name "\n" with "" "*" * 2}"#) {
            ExprKind::Join(join) => {
                assert!(matches!(&join.data.node, ExprKind::Concat(p) if p.len() == 3));
                assert!(matches!(&join.separator.node, ExprKind::Concat(p) if p.len() == 2));
            }
            other => panic!("expected join, got {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        assert_eq!(expr_of("{ \t.a.b\n}"), field(".a.b"));
    }

    #[test]
    fn test_consumed_without_trailing_text() {
        assert_eq!(parse_embed("{.a}").unwrap().consumed, 4);
        assert_eq!(parse_embed("{.a}   ").unwrap().consumed, 4);
    }

    #[test]
    fn test_consumed_with_trailing_text() {
        assert_eq!(parse_embed("{.a} tail {.b}").unwrap().consumed, 4);
        assert_eq!(parse_embed("{.a}\n\n  x").unwrap().consumed, 4);
    }

    #[test]
    fn test_brace_opening_trailing_text_is_consumed() {
        assert_eq!(parse_embed("{.a}}").unwrap().consumed, 5);
        assert_eq!(parse_embed("{.a}}x").unwrap().consumed, 5);
        assert_eq!(parse_embed("{.a} }x").unwrap().consumed, 6);
        assert_eq!(parse_embed("{.a}}}").unwrap().consumed, 5);
        assert_eq!(parse_embed("{.a} x}").unwrap().consumed, 4);
        assert_eq!(parse_embed("{.a}é}").unwrap().consumed, 4);
    }

    #[test]
    fn test_spans_cover_source() {
        let parsed = parse_embed(r#"{.title "!"}"#).unwrap();
        assert_eq!(parsed.expr.span, Span::new(1, 11));
        match parsed.expr.node {
            ExprKind::Concat(parts) => assert_eq!(parts[0].span, Span::new(1, 7)),
            other => panic!("expected concatenation, got {other:?}"),
        }
    }

    #[test]
    fn test_mismatches() {
        for source in [
            "{unclosed",
            "{}",
            "{.a",
            "{ a.b }",
            "{.a.}",
            "{join .a}",
            "{join .a with}",
            r#"{"open}"#,
            r#"{"ab" * }"#,
            "{{.a}}",
            "x{.a}",
        ] {
            assert!(parse_embed(source).is_err(), "expected mismatch for {source:?}");
        }
    }

    #[test]
    fn test_oversized_repeat_count_is_a_mismatch() {
        assert!(parse_embed(r#"{"a" * 999999999999999999999999}"#).is_err());
    }
}
