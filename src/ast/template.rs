use super::expr::Expr;
use super::span::Spanned;

/// A scanned template: literal text runs interleaved with the embedded
/// expressions found at `{` positions. Rendering concatenates the text
/// of each node in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub nodes: Vec<Node>,
}

pub type Node = Spanned<NodeKind>;

/// The kinds of content that can appear in a template.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Text copied verbatim, including any `{` that did not start a valid
    /// expression.
    Literal(String),

    /// A parsed `{...}` span. The node's span covers the braces; the
    /// expression's own span covers only what lies between them.
    Embed(Expr),
}

impl Template {
    /// Append literal text, merging with a preceding literal node so that
    /// runs of fallback `{` characters stay one node.
    pub(crate) fn push_literal(&mut self, text: &str, span: crate::ast::span::Span) {
        if let Some(last) = self.nodes.last_mut()
            && let NodeKind::Literal(existing) = &mut last.node
            && last.span.end == span.start
        {
            existing.push_str(text);
            last.span = last.span.merge(span);
            return;
        }
        self.nodes.push(Spanned::new(NodeKind::Literal(text.to_string()), span));
    }

    /// Number of embedded expressions in the template.
    pub fn embed_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.node, NodeKind::Embed(_)))
            .count()
    }
}
