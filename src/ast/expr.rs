use super::path::FieldPath;
use super::span::Spanned;

pub type Expr = Spanned<ExprKind>;

/// The expression forms that can appear between `{` and `}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Quoted literal: "hello", with escapes already processed
    Literal(String),

    /// Static repetition: "ab" * 3. Expanded when rendered, independent of
    /// the record.
    Repeat { text: String, count: usize },

    /// Field reference: .chapters.title
    Field(FieldPath),

    /// Juxtaposed atoms: .title " by " .author.name
    /// Each part is coerced to text and the texts are concatenated.
    Concat(Vec<Expr>),

    /// Join over the inferred list dimension: join .tags.name with ", "
    Join(JoinExpr),
}

/// A `join <data> with <separator>` expression.
///
/// The data part is rendered once per element of the single list dimension
/// its requirements imply. The separator is rendered once with no index
/// assignment, so it cannot vary between elements.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinExpr {
    pub data: Box<Expr>,
    pub separator: Box<Expr>,
}
