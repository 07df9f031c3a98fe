//! Dimension discovery: which list a `join` iterates over.
//!
//! The axis is never written in the template. It is inferred from the
//! fields the joined expression references: the record is walked along
//! those fields (and their prefixes) only, and every list met on the way
//! is a candidate. Exactly one candidate must remain.

use std::collections::BTreeSet;

use tracing::debug;

use super::resolve::{IndexAssignment, resolve};
use crate::ast::path::FieldPath;
use crate::ast::value::Value;
use crate::error::FillError;

/// The list a `join` iterates over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// List-valued path prefix used as the [`IndexAssignment`] key.
    pub path: FieldPath,
    /// Number of elements, i.e. join iterations.
    pub len: usize,
}

/// Every requirement plus each of its strict prefixes.
pub fn requirement_closure(requirements: &BTreeSet<FieldPath>) -> BTreeSet<FieldPath> {
    let mut closure = requirements.clone();
    for path in requirements {
        closure.extend(path.strict_prefixes());
    }
    closure
}

/// Find the single list dimension implied by `requirements`.
///
/// Fails with [`NoDimension`](crate::FillErrorKind::NoDimension) when the
/// referenced fields cross no list and with
/// [`AmbiguousDimension`](crate::FillErrorKind::AmbiguousDimension) when
/// they cross more than one.
///
/// ```rust
/// use std::collections::BTreeSet;
/// use recfill::{discover_dimension, FieldPath, Value};
///
/// let record: Value = serde_json::json!({"tags": [{"name": "a"}, {"name": "b"}]}).into();
/// let requirements = BTreeSet::from([".tags.name".parse::<FieldPath>().unwrap()]);
///
/// let dimension = discover_dimension(&record, &requirements).unwrap();
/// assert_eq!(dimension.path.to_string(), ".tags");
/// assert_eq!(dimension.len, 2);
/// ```
pub fn discover_dimension(
    record: &Value,
    requirements: &BTreeSet<FieldPath>,
) -> Result<Dimension, FillError> {
    let closure = requirement_closure(requirements);
    let mut candidates = list_candidates(record, &closure).into_iter();

    let path = match (candidates.next(), candidates.next()) {
        (Some(path), None) => path,
        (None, _) => return Err(FillError::no_dimension(&join_paths(requirements.iter()))),
        (Some(first), Some(second)) => {
            let all = [first, second].into_iter().chain(candidates);
            return Err(FillError::ambiguous_dimension(&join_paths(all.collect::<Vec<_>>().iter())));
        }
    };

    // The candidate is the only list on its own path, so resolving it
    // without indices yields the list itself.
    let len = match resolve(&path, record, &IndexAssignment::new())? {
        Value::List(items) => items.len(),
        other => return Err(FillError::not_a_list(&path.to_string(), other.type_name())),
    };

    debug!(dimension = %path, len, "discovered join dimension");
    Ok(Dimension { path, len })
}

/// Walk the record from the root, descending only into keys whose path is
/// in `closure`, and collect the paths at which a list is found. List
/// elements are visited under the list's own path, so nested lists and
/// lists inside list elements are found too.
fn list_candidates(record: &Value, closure: &BTreeSet<FieldPath>) -> BTreeSet<FieldPath> {
    let mut found = BTreeSet::new();
    let mut remaining: Vec<(FieldPath, &Value)> = match record {
        Value::Map(map) => map.iter().map(|(k, v)| (FieldPath::root().child(k), v)).collect(),
        _ => Vec::new(),
    };

    while let Some((path, value)) = remaining.pop() {
        if !closure.contains(&path) {
            continue;
        }

        match value {
            Value::List(items) => {
                remaining.extend(items.iter().map(|item| (path.clone(), item)));
                found.insert(path);
            }
            Value::Map(map) => {
                remaining.extend(map.iter().map(|(k, v)| (path.child(k), v)));
            }
            _ => {}
        }
    }

    found
}

fn join_paths<'a>(paths: impl Iterator<Item = &'a FieldPath>) -> String {
    paths.map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FillErrorKind;
    use serde_json::json;

    fn paths(items: &[&str]) -> BTreeSet<FieldPath> {
        items.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_closure_adds_prefixes() {
        let closure = requirement_closure(&paths(&[".a.b.c", ".x"]));
        assert_eq!(closure, paths(&[".a", ".a.b", ".a.b.c", ".x"]));
    }

    #[test]
    fn test_single_list() {
        let record: Value = json!({"items": [{"name": "a"}, {"name": "b"}, {"name": "c"}]}).into();
        let dimension = discover_dimension(&record, &paths(&[".items.name"])).unwrap();
        assert_eq!(dimension.path.to_string(), ".items");
        assert_eq!(dimension.len, 3);
    }

    #[test]
    fn test_list_below_maps() {
        let record: Value = json!({"story": {"meta": {"tags": ["x", "y"]}}}).into();
        let dimension = discover_dimension(&record, &paths(&[".story.meta.tags"])).unwrap();
        assert_eq!(dimension.path.to_string(), ".story.meta.tags");
        assert_eq!(dimension.len, 2);
    }

    #[test]
    fn test_unrelated_lists_are_not_visited() {
        let record: Value = json!({
            "items": [{"name": "a"}],
            "other": [1, 2, 3],
            "meta": {"list": [1]}
        })
        .into();
        let dimension = discover_dimension(&record, &paths(&[".items.name", ".meta.title"])).unwrap();
        assert_eq!(dimension.path.to_string(), ".items");
    }

    #[test]
    fn test_no_dimension() {
        let record: Value = json!({"title": "t"}).into();
        let err = discover_dimension(&record, &paths(&[".title"])).unwrap_err();
        assert_eq!(err.kind, FillErrorKind::NoDimension);

        let err = discover_dimension(&record, &BTreeSet::new()).unwrap_err();
        assert_eq!(err.kind, FillErrorKind::NoDimension);
    }

    #[test]
    fn test_sibling_lists_are_ambiguous() {
        let record: Value = json!({"a": [1, 2], "b": [3, 4]}).into();
        let err = discover_dimension(&record, &paths(&[".a", ".b"])).unwrap_err();
        assert_eq!(err.kind, FillErrorKind::AmbiguousDimension);
        assert!(err.message.contains(".a, .b"), "{}", err.message);
    }

    #[test]
    fn test_nested_lists_are_ambiguous() {
        let record: Value = json!({"chapters": [{"lines": ["a"]}, {"lines": ["b", "c"]}]}).into();
        let err = discover_dimension(&record, &paths(&[".chapters.lines"])).unwrap_err();
        assert_eq!(err.kind, FillErrorKind::AmbiguousDimension);
    }

    #[test]
    fn test_empty_list_is_a_dimension() {
        let record: Value = json!({"items": []}).into();
        let dimension = discover_dimension(&record, &paths(&[".items.name"])).unwrap();
        assert_eq!(dimension.len, 0);
    }

    #[test]
    fn test_missing_requirement_is_not_a_candidate() {
        let record: Value = json!({"items": ["a"]}).into();
        let dimension = discover_dimension(&record, &paths(&[".items", ".absent.field"])).unwrap();
        assert_eq!(dimension.path.to_string(), ".items");
    }
}
