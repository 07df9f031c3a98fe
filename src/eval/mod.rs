//! Expression evaluation.
//!
//! Every expression node has two readings:
//!
//! - [`requirements`]: the set of field paths it depends on, unioned
//!   bottom-up. A `join` discharges its inner requirements and reports
//!   none.
//! - evaluation under an [`IndexAssignment`]: the value it renders to.
//!   Literals and repetitions are constant, fields go through [`resolve`],
//!   concatenations join the text of their parts, and a `join` renders its
//!   data part once per element of the discovered [`Dimension`].
//!
//! Templates are rendered by evaluating each embedded expression under the
//! empty assignment and stitching the text between literal runs.

use std::borrow::Cow;
use std::collections::BTreeSet;

use tracing::debug;

use crate::ast::expr::*;
use crate::ast::path::FieldPath;
use crate::ast::span::Span;
use crate::ast::template::*;
use crate::ast::value::Value;
use crate::error::{FillError, FillErrorKind};

mod dimension;
mod resolve;

pub use dimension::{Dimension, discover_dimension, requirement_closure};
pub use resolve::{IndexAssignment, resolve};

/// Render a scanned template against a record.
pub fn render(template: &Template, record: &Value) -> Result<String, FillError> {
    render_with_options(template, record, FillOptions::default())
}

/// Render a scanned template with custom options.
///
/// ```rust
/// use recfill::{CompiledTemplate, FillErrorKind, FillOptions, Value};
///
/// let record: Value = serde_json::json!({"tags": ["a", "b", "c"]}).into();
/// let template = CompiledTemplate::compile(r#"{join .tags with ","}"#);
///
/// let opts = FillOptions::new().max_iterations(2);
/// let err = template.render_with_options(&record, opts).unwrap_err();
/// assert_eq!(err.kind, FillErrorKind::ResourceLimit);
/// ```
pub fn render_with_options(
    template: &Template,
    record: &Value,
    options: FillOptions,
) -> Result<String, FillError> {
    let mut evaluator = Evaluator::new(record, options);
    evaluator.eval_template(template)
}

/// Evaluate one parsed expression under an index assignment and return
/// the value it selects, without coercing it to text.
///
/// ```rust
/// use recfill::{evaluate, parse_embed, IndexAssignment, Value};
///
/// let record: Value = serde_json::json!({"tags": ["a", "b"]}).into();
/// let expr = parse_embed("{.tags}").unwrap().expr;
///
/// let value = evaluate(&expr, &record, &IndexAssignment::new()).unwrap();
/// assert_eq!(value, Value::from(vec!["a", "b"]));
/// ```
pub fn evaluate(expr: &Expr, record: &Value, indices: &IndexAssignment) -> Result<Value, FillError> {
    let mut evaluator = Evaluator::new(record, FillOptions::default());
    evaluator
        .eval_expr(expr, indices)
        .map(Cow::into_owned)
}

/// The field paths an expression depends on.
///
/// Literals and repetitions need nothing, a field needs itself, a
/// concatenation needs the union of its parts, and a `join` needs nothing
/// because it resolves its own dimension.
pub fn requirements(expr: &Expr) -> BTreeSet<FieldPath> {
    let mut out = BTreeSet::new();
    collect_requirements(expr, &mut out);
    out
}

fn collect_requirements(expr: &Expr, out: &mut BTreeSet<FieldPath>) {
    match &expr.node {
        ExprKind::Literal(_) | ExprKind::Repeat { .. } | ExprKind::Join(_) => {}
        ExprKind::Field(path) => {
            out.insert(path.clone());
        }
        ExprKind::Concat(parts) => {
            for part in parts {
                collect_requirements(part, out);
            }
        }
    }
}

// ── Fill options ────────────────────────────────────────────────────────

/// Default ceiling on the text any single fill may produce: 64 MiB.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024 * 1024;

/// Resource limits for a fill.
///
/// Create with [`FillOptions::new()`] and chain builder methods:
///
/// ```rust
/// use recfill::FillOptions;
///
/// let opts = FillOptions::new()
///     .max_node_evaluations(10_000)
///     .max_iterations(1_000)
///     .max_output_bytes(1 << 20);
/// ```
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Maximum number of expression-node evaluations before the fill
    /// returns a [`ResourceLimit`](FillErrorKind::ResourceLimit) error.
    /// `None` means unlimited.
    pub max_node_evaluations: Option<u64>,

    /// Maximum number of join iterations, summed over every join in the
    /// template. `None` means unlimited.
    pub max_iterations: Option<u64>,

    /// Maximum length in bytes of any rendered text, from a single
    /// repetition up to the whole output. Always enforced; defaults to
    /// [`DEFAULT_MAX_OUTPUT_BYTES`].
    pub max_output_bytes: usize,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            max_node_evaluations: None,
            max_iterations: None,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl FillOptions {
    /// Create a new `FillOptions` with no node or iteration limits and the
    /// default output ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum length of rendered text in bytes.
    pub fn max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    /// Set the maximum number of expression-node evaluations.
    pub fn max_node_evaluations(mut self, limit: u64) -> Self {
        self.max_node_evaluations = Some(limit);
        self
    }

    /// Set the maximum number of join iterations.
    pub fn max_iterations(mut self, limit: u64) -> Self {
        self.max_iterations = Some(limit);
        self
    }
}

// ── Evaluator ───────────────────────────────────────────────────────────

struct Evaluator<'r> {
    record: &'r Value,
    options: FillOptions,
    node_count: u64,
    iteration_count: u64,
}

impl<'r> Evaluator<'r> {
    fn new(record: &'r Value, options: FillOptions) -> Self {
        Self {
            record,
            options,
            node_count: 0,
            iteration_count: 0,
        }
    }

    /// Check the node limit. Called once per expression-node evaluation.
    fn check_limits(&mut self) -> Result<(), FillError> {
        self.node_count += 1;

        if let Some(max) = self.options.max_node_evaluations
            && self.node_count > max
        {
            return Err(FillError::new(
                FillErrorKind::ResourceLimit,
                format!("fill exceeded maximum of {max} node evaluations"),
            ));
        }

        Ok(())
    }

    /// Check the iteration limit. Called once per join element.
    fn check_iteration_limit(&mut self) -> Result<(), FillError> {
        self.iteration_count += 1;

        if let Some(max) = self.options.max_iterations
            && self.iteration_count > max
        {
            return Err(FillError::new(
                FillErrorKind::ResourceLimit,
                format!("fill exceeded maximum of {max} join iterations"),
            ));
        }

        Ok(())
    }

    /// Check that text of `len` bytes fits under the output ceiling.
    /// Called before allocating a repetition and after every append.
    fn check_output_len(&self, len: Option<usize>) -> Result<(), FillError> {
        let max = self.options.max_output_bytes;
        match len {
            Some(len) if len <= max => Ok(()),
            _ => Err(FillError::new(
                FillErrorKind::ResourceLimit,
                format!("fill exceeded maximum of {max} output bytes"),
            )),
        }
    }

    // ── Template rendering ──────────────────────────────────────────────

    fn eval_template(&mut self, template: &Template) -> Result<String, FillError> {
        let mut output = String::new();
        let empty = IndexAssignment::new();

        for node in &template.nodes {
            match &node.node {
                NodeKind::Literal(text) => output.push_str(text),
                NodeKind::Embed(expr) => {
                    let text = self
                        .eval_text(expr, &empty)
                        .map_err(|e| e.or_span(node.span))?;
                    output.push_str(&text);
                }
            }
            self.check_output_len(Some(output.len()))
                .map_err(|e| e.with_span(node.span))?;
        }

        Ok(output)
    }

    // ── Expression evaluation ───────────────────────────────────────────

    fn eval_text(&mut self, expr: &Expr, indices: &IndexAssignment) -> Result<String, FillError> {
        Ok(self.eval_expr(expr, indices)?.to_output_string())
    }

    fn eval_expr(
        &mut self,
        expr: &Expr,
        indices: &IndexAssignment,
    ) -> Result<Cow<'r, Value>, FillError> {
        self.check_limits()?;

        match &expr.node {
            ExprKind::Literal(text) => Ok(Cow::Owned(Value::String(text.clone()))),

            ExprKind::Repeat { text, count } => {
                self.check_output_len(text.len().checked_mul(*count))
                    .map_err(|e| e.with_span(expr.span))?;
                Ok(Cow::Owned(Value::String(text.repeat(*count))))
            }

            ExprKind::Field(path) => resolve(path, self.record, indices)
                .map(Cow::Borrowed)
                .map_err(|e| e.with_span(expr.span)),

            ExprKind::Concat(parts) => {
                let mut text = String::new();
                for part in parts {
                    text.push_str(&self.eval_text(part, indices)?);
                    self.check_output_len(Some(text.len()))
                        .map_err(|e| e.with_span(expr.span))?;
                }
                Ok(Cow::Owned(Value::String(text)))
            }

            ExprKind::Join(join) => self
                .eval_join(join, expr.span)
                .map(|text| Cow::Owned(Value::String(text))),
        }
    }

    /// Render `join.data` once per element of the discovered dimension and
    /// concatenate the fragments with the separator. The outer index
    /// assignment is deliberately not consulted: a join depends on nothing
    /// from its surroundings.
    fn eval_join(&mut self, join: &JoinExpr, span: Span) -> Result<String, FillError> {
        let mut needed = requirements(&join.data);
        needed.extend(requirements(&join.separator));

        let dimension = discover_dimension(self.record, &needed).map_err(|e| e.or_span(span))?;

        let separator = self.eval_text(&join.separator, &IndexAssignment::new())?;

        let mut fragments = Vec::with_capacity(dimension.len);
        let mut total = 0usize;
        for i in 0..dimension.len {
            self.check_iteration_limit()?;
            let indices = IndexAssignment::from([(dimension.path.clone(), i)]);
            let fragment = self.eval_text(&join.data, &indices)?;
            total = total
                .saturating_add(fragment.len())
                .saturating_add(if i > 0 { separator.len() } else { 0 });
            self.check_output_len(Some(total)).map_err(|e| e.with_span(span))?;
            fragments.push(fragment);
        }

        debug!(dimension = %dimension.path, fragments = fragments.len(), "rendered join");
        Ok(fragments.join(&separator))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
