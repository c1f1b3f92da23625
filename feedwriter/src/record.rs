//! Field-addressable records.
//!
//! Every source item is coerced into a [`Record`] before mapping, and every
//! canonical record handed to views is a [`Record`] too. Coercion is shallow:
//! nested objects and arrays stay as they are.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::error::{MappingError, MappingResult};

/// A field-addressable record: field name to JSON value, in insertion order.
pub type Record = Map<String, Value>;

/// Conversion of a source item into a [`Record`].
///
/// `index` is the zero-based position of the item in the source, used for
/// error reporting.
pub trait IntoRecord {
    fn into_record(self, index: usize) -> MappingResult<Record>;
}

impl IntoRecord for Record {
    fn into_record(self, _index: usize) -> MappingResult<Record> {
        Ok(self)
    }
}

impl IntoRecord for &Record {
    fn into_record(self, _index: usize) -> MappingResult<Record> {
        Ok(self.clone())
    }
}

impl IntoRecord for Value {
    fn into_record(self, index: usize) -> MappingResult<Record> {
        match self {
            Value::Object(map) => Ok(map),
            _ => Err(MappingError::NotARecord { index }),
        }
    }
}

impl IntoRecord for &Value {
    fn into_record(self, index: usize) -> MappingResult<Record> {
        match self.as_object() {
            Some(map) => Ok(map.clone()),
            None => Err(MappingError::NotARecord { index }),
        }
    }
}

impl<V: Into<Value>> IntoRecord for HashMap<String, V> {
    fn into_record(self, _index: usize) -> MappingResult<Record> {
        // HashMap has no stable order; sort so canonical output is reproducible.
        let mut pairs: Vec<(String, V)> = self.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(pairs.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<V: Into<Value>> IntoRecord for BTreeMap<String, V> {
    fn into_record(self, _index: usize) -> MappingResult<Record> {
        Ok(self.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> IntoRecord for Vec<(K, V)> {
    fn into_record(self, _index: usize) -> MappingResult<Record> {
        Ok(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Wrapper that lets any `Serialize` struct act as a source item.
///
/// ```
/// use feedwriter::record::{IntoRecord, Serialized};
///
/// #[derive(serde::Serialize)]
/// struct Post { writer: String }
///
/// let record = Serialized(Post { writer: "brennen".into() }).into_record(0).unwrap();
/// assert_eq!(record["writer"], "brennen");
/// ```
pub struct Serialized<T>(pub T);

impl<T: Serialize> IntoRecord for Serialized<T> {
    fn into_record(self, index: usize) -> MappingResult<Record> {
        serde_json::to_value(&self.0)
            .map_err(|_| MappingError::NotARecord { index })?
            .into_record(index)
    }
}

/// Look up a field, treating JSON `null` the same as an absent key.
pub fn resolve<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    record.get(field).filter(|v| !v.is_null())
}

/// Render a scalar value as plain text (strings unquoted, `null` empty).
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
