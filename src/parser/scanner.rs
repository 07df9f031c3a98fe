//! Template scanning: splits a template into literal runs and embedded
//! expressions.
//!
//! Every `{` is a candidate expression start. When the text from that `{`
//! parses, the span is replaced by an [`NodeKind::Embed`] node; when it
//! does not, the `{` is kept as literal text and scanning resumes at the
//! next byte. Scanning never fails.

use tracing::trace;

use super::parse_embed;
use crate::ast::expr::{Expr, ExprKind, JoinExpr};
use crate::ast::span::{Span, Spanned};
use crate::ast::template::{NodeKind, Template};

/// Scan `source` left to right into a [`Template`].
pub fn scan(source: &str) -> Template {
    let mut template = Template::default();
    let mut pos = 0;

    while pos < source.len() {
        let Some(offset) = source[pos..].find('{') else {
            template.push_literal(&source[pos..], Span::new(pos, source.len()));
            break;
        };

        let brace = pos + offset;
        if brace > pos {
            template.push_literal(&source[pos..brace], Span::new(pos, brace));
        }

        match parse_embed(&source[brace..]) {
            Ok(parsed) => {
                let span = Span::new(brace, brace + parsed.consumed);
                trace!(start = span.start, end = span.end, "embedded expression");
                template
                    .nodes
                    .push(Spanned::new(NodeKind::Embed(rebase(parsed.expr, brace)), span));
                pos = span.end;
            }
            Err(e) => {
                trace!(offset = brace, error = %e.message, "brace kept as literal text");
                template.push_literal("{", Span::new(brace, brace + 1));
                pos = brace + 1;
            }
        }
    }

    template
}

/// Shift every span in `expr` from remainder-relative to template-relative.
fn rebase(expr: Expr, by: usize) -> Expr {
    let span = expr.span.offset(by);
    let node = match expr.node {
        ExprKind::Concat(parts) => {
            ExprKind::Concat(parts.into_iter().map(|p| rebase(p, by)).collect())
        }
        ExprKind::Join(join) => ExprKind::Join(JoinExpr {
            data: Box::new(rebase(*join.data, by)),
            separator: Box::new(rebase(*join.separator, by)),
        }),
        other => other,
    };
    Spanned::new(node, span)
}
