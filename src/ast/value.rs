use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// A node of a data record: the nested mapping/list tree that templates
/// are filled from.
///
/// Records usually arrive as JSON and convert losslessly from
/// [`serde_json::Value`]. Numbers keep their JSON representation, so
/// integers beyond 2^53 and floats such as `1.0` render as written.
/// When a `Value` is substituted into a template it is converted to text
/// via [`to_output_string`](Value::to_output_string).
///
/// Conversion from common Rust types is provided via `From` impls:
///
/// ```rust
/// use recfill::Value;
///
/// let s: Value = "hello".into();
/// let n: Value = 42i64.into();
/// let b: Value = true.into();
/// let a: Value = vec!["a", "b"].into();
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// JSON `null`. Renders as an empty string.
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Convert this value to its text form for template output.
    ///
    /// - `String` — returned as-is
    /// - `Number` — integers as integers, floats in shortest round-trip form
    /// - `Bool` — `"true"` or `"false"`
    /// - `List` — elements joined with `", "`
    /// - `Map` — compact JSON
    /// - `Null` — empty string
    pub fn to_output_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::List(items) => items
                .iter()
                .map(|v| v.to_output_string())
                .collect::<Vec<_>>()
                .join(", "),
            Value::Map(_) => serde_json::Value::from(self).to_string(),
            Value::Null => String::new(),
        }
    }

    /// Type name for diagnostic messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a mapping key. `None` for missing keys and non-mappings.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_output_string())
    }
}

// ── serde_json interop ──────────────────────────────────────────────────

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Into::into).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.into())).collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

// ── Rust conversions ────────────────────────────────────────────────────

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Non-finite floats have no JSON form and become [`Value::Null`].
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_string_scalars() {
        assert_eq!(Value::from("x").to_output_string(), "x");
        assert_eq!(Value::from(42i64).to_output_string(), "42");
        assert_eq!(Value::from(2.5).to_output_string(), "2.5");
        assert_eq!(Value::from(false).to_output_string(), "false");
        assert_eq!(Value::Null.to_output_string(), "");
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }

    #[test]
    fn test_numbers_render_as_written() {
        let value = Value::from(json!({"big": 9007199254740993u64, "neg": -12, "whole": 1.0}));
        assert_eq!(value.get("big").unwrap().to_output_string(), "9007199254740993");
        assert_eq!(value.get("neg").unwrap().to_output_string(), "-12");
        assert_eq!(value.get("whole").unwrap().to_output_string(), "1.0");

        let parsed: Value = serde_json::from_str(r#"{"id": 12345678901234567}"#).unwrap();
        assert_eq!(parsed.to_output_string(), r#"{"id":12345678901234567}"#);
    }

    #[test]
    fn test_output_string_containers() {
        assert_eq!(Value::from(vec!["a", "b"]).to_output_string(), "a, b");
        let map: Value = [("k", Value::from(1i64))].into_iter().collect();
        assert_eq!(map.to_output_string(), r#"{"k":1}"#);
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({"id": 7, "tags": [{"name": "x"}], "gone": null}));
        assert_eq!(value.get("id"), Some(&Value::from(7i64)));
        assert_eq!(value.get("gone"), Some(&Value::Null));
        let tags = value.get("tags").and_then(Value::as_list).unwrap();
        assert_eq!(tags[0].get("name").and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn test_deserialize() {
        let value: Value = serde_json::from_str(r#"{"a": {"b": "X"}}"#).unwrap();
        assert_eq!(value.get("a").and_then(|a| a.get("b")), Some(&Value::from("X")));
    }
}
