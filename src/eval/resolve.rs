use std::collections::BTreeMap;

use crate::ast::path::FieldPath;
use crate::ast::value::Value;
use crate::error::FillError;

/// Selected element positions, keyed by the list-valued path prefix they
/// index into. A `join` evaluates its data part under a one-entry
/// assignment per element; everything else sees an empty one.
pub type IndexAssignment = BTreeMap<FieldPath, usize>;

/// Walk `record` along `path`.
///
/// After each key the cumulative prefix is looked up in `indices`; if it
/// has an entry, the current value (which must be a list) is replaced by
/// the element at that position. A list with no entry is kept whole, so
/// `.chapters` with no assignment resolves to the entire list.
///
/// ```rust
/// use recfill::{resolve, FieldPath, IndexAssignment, Value};
///
/// let record: Value = serde_json::json!({"tags": [{"name": "a"}, {"name": "b"}]}).into();
/// let path: FieldPath = ".tags.name".parse().unwrap();
///
/// let mut indices = IndexAssignment::new();
/// indices.insert(".tags".parse().unwrap(), 1);
/// assert_eq!(resolve(&path, &record, &indices).unwrap(), &Value::from("b"));
/// ```
pub fn resolve<'r>(
    path: &FieldPath,
    record: &'r Value,
    indices: &IndexAssignment,
) -> Result<&'r Value, FillError> {
    let mut current = record;
    let mut prefix = FieldPath::root();

    for key in path.segments() {
        prefix = prefix.child(key);
        current = match current {
            Value::Map(map) => map
                .get(key)
                .ok_or_else(|| FillError::missing_key(&prefix.to_string(), key))?,
            other => return Err(FillError::not_a_map(&prefix.to_string(), other.type_name())),
        };

        if let Some(&index) = indices.get(&prefix) {
            current = match current {
                Value::List(items) => items.get(index).ok_or_else(|| {
                    FillError::index_out_of_range(&prefix.to_string(), index, items.len())
                })?,
                other => return Err(FillError::not_a_list(&prefix.to_string(), other.type_name())),
            };
        }
    }

    Ok(current)
}
