//! # recfill
//!
//! Fill text templates from nested data records. A template is ordinary
//! text with embedded expressions in curly braces; each expression is
//! replaced by text taken from the record.
//!
//! The expression language is small:
//!
//! - `.a.b.c` selects a field by descending through mapping keys,
//! - `"text"` is a literal with `\"`, `\'`, `\\`, `\n`, `\t`, `\r` and `\0`
//!   escapes (any other escaped character keeps its backslash),
//! - `"text" * 3` repeats a literal,
//! - juxtaposed atoms are concatenated: `{.title " by " .author.name}`,
//! - `{join <atoms> with <atoms>}` renders the first part once per element
//!   of a list and joins the pieces with the second part.
//!
//! A `join` never names its list. The list is inferred from the fields the
//! expression references, and exactly one list must be reachable through
//! them.
//!
//! ## Quick start
//!
//! ```rust
//! use recfill::{fill, Value};
//!
//! let record: Value = serde_json::json!({
//!     "title": "A Tale",
//!     "tags": [{"name": "adventure"}, {"name": "comedy"}]
//! })
//! .into();
//!
//! let output = fill(r#"{.title} [{join .tags.name with ", "}]"#, &record).unwrap();
//! assert_eq!(output, "A Tale [adventure, comedy]");
//! ```
//!
//! Text at a `{` that is not a valid expression is copied through as is:
//!
//! ```rust
//! use recfill::{fill, Value};
//!
//! assert_eq!(fill("{unclosed", &Value::Null).unwrap(), "{unclosed");
//! ```
//!
//! ## Compiled templates
//!
//! Scanning a template does not depend on the record. For repeated use,
//! compile once with [`CompiledTemplate::compile`] and render against each
//! record:
//!
//! ```rust
//! use recfill::{CompiledTemplate, Value};
//!
//! let template = CompiledTemplate::compile("#{.id}: {.title}");
//!
//! let first: Value = serde_json::json!({"id": 1, "title": "One"}).into();
//! let second: Value = serde_json::json!({"id": 2, "title": "Two"}).into();
//! assert_eq!(template.render(&first).unwrap(), "#1: One");
//! assert_eq!(template.render(&second).unwrap(), "#2: Two");
//! ```

pub mod ast;
pub mod error;
pub mod eval;
mod parser;

pub use ast::path::FieldPath;
pub use ast::span::{Span, Spanned};
pub use ast::template::Template;
pub use ast::value::Value;
pub use error::{FillError, FillErrorKind, ParseError};
pub use eval::{
    Dimension, FillOptions, IndexAssignment, discover_dimension, evaluate, requirement_closure,
    requirements, resolve,
};
pub use parser::{ParsedEmbed, parse_embed};

/// Fill `template` from `record` in a single step.
///
/// Malformed expressions are copied through as literal text. Errors come
/// only from valid expressions: a missing field, an out-of-range index, or
/// a `join` with no list or more than one list to iterate over. On error
/// no output is produced.
pub fn fill(template: &str, record: &Value) -> Result<String, FillError> {
    CompiledTemplate::compile(template).render(record)
}

/// Fill `template` from `record` with custom resource limits.
pub fn fill_with_options(
    template: &str,
    record: &Value,
    options: FillOptions,
) -> Result<String, FillError> {
    CompiledTemplate::compile(template).render_with_options(record, options)
}

/// A scanned template that can be rendered against many records without
/// re-parsing.
///
/// Compilation never fails: every `{` that does not begin a valid
/// expression becomes literal text.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: Template,
}

impl CompiledTemplate {
    /// Scan template text into literal runs and parsed expressions.
    pub fn compile(source: &str) -> Self {
        Self {
            template: parser::scan(source),
        }
    }

    /// Render this template against a record.
    pub fn render(&self, record: &Value) -> Result<String, FillError> {
        eval::render(&self.template, record)
    }

    /// Render this template with custom options.
    pub fn render_with_options(
        &self,
        record: &Value,
        options: FillOptions,
    ) -> Result<String, FillError> {
        eval::render_with_options(&self.template, record, options)
    }

    /// Access the scanned template for inspection.
    pub fn ast(&self) -> &Template {
        &self.template
    }
}
