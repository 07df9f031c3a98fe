//! Syntax tree and record types for recfill.
//!
//! - **Template layer** ([`template`]): a [`Template`] is the scanned form
//!   of a template string, a sequence of literal runs and embedded
//!   expressions.
//! - **Expression layer** ([`expr`]): the parsed content of one `{...}`
//!   span.
//! - **Record layer** ([`value`], [`path`]): the data record expressions
//!   are evaluated against, and the dotted paths that address into it.

pub mod expr;
pub mod path;
pub mod span;
pub mod template;
pub mod value;

// Convenience re-exports
pub use expr::*;
pub use path::FieldPath;
pub use span::{Span, Spanned};
pub use template::*;
pub use value::Value;
