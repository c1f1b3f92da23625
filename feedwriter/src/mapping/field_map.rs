//! The field map: how each canonical field is derived from a source
//! record.

use serde_json::Value;
use std::fmt;

use crate::error::{MappingError, MappingResult};
use crate::record::{resolve, Record};

/// A computed field. Receives the normalized source record, never the
/// partially built canonical record.
pub type TransformFn = Box<dyn Fn(&Record) -> MappingResult<Value>>;

/// How one canonical field gets its value.
pub enum MapEntry {
    /// Copy the named field from the source record.
    Field(String),
    /// Compute the value from the whole source record.
    Transform(TransformFn),
}

impl fmt::Debug for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapEntry::Field(name) => f.debug_tuple("Field").field(name).finish(),
            MapEntry::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Ordered table of canonical field name to [`MapEntry`].
///
/// Keys are unique; inserting an existing key replaces its entry without
/// moving it. Iteration order is insertion order, and canonical records
/// carry their fields in that order.
///
/// ```
/// use feedwriter::FieldMap;
/// use serde_json::{json, Value};
///
/// let map = FieldMap::new()
///     .field("date", "date_created")
///     .transform("author", |r| {
///         Ok(Value::String(r["writer"].as_str().unwrap_or_default().to_uppercase()))
///     });
///
/// let source = json!({"date_created": "2013-02-14", "writer": "brennen"});
/// let item = map.apply(source.as_object().unwrap(), 0).unwrap();
/// assert_eq!(item["author"], "BRENNEN");
/// ```
#[derive(Debug, Default)]
pub struct FieldMap {
    entries: Vec<(String, MapEntry)>,
}

impl FieldMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: alias `output` to the source field `source`.
    pub fn field(mut self, output: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(output, MapEntry::Field(source.into()));
        self
    }

    /// Builder: compute `output` with `f`.
    pub fn transform<F>(mut self, output: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Record) -> MappingResult<Value> + 'static,
    {
        self.insert(output, MapEntry::Transform(Box::new(f)));
        self
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, output: impl Into<String>, entry: MapEntry) {
        let output = output.into();
        match self.entries.iter_mut().find(|(k, _)| *k == output) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((output, entry)),
        }
    }

    pub fn get(&self, output: &str) -> Option<&MapEntry> {
        self.entries.iter().find(|(k, _)| k == output).map(|(_, e)| e)
    }

    pub fn contains(&self, output: &str) -> bool {
        self.get(output).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical field names in map order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Build the canonical record for one normalized source record.
    ///
    /// Stops at the first field that cannot be resolved; transform errors
    /// are returned unchanged.
    pub fn apply(&self, record: &Record, index: usize) -> MappingResult<Record> {
        let mut output = Record::new();

        for (target, entry) in &self.entries {
            let value = match entry {
                MapEntry::Field(name) => resolve(record, name).cloned().ok_or_else(|| {
                    MappingError::UnresolvedField {
                        field: name.clone(),
                        index,
                    }
                })?,
                MapEntry::Transform(f) => f(record)?,
            };
            output.insert(target.clone(), value);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_literal_alias() {
        let map = FieldMap::new().field("date", "date").field("author", "author");
        let item = map
            .apply(&record(json!({"date": "2020-01-01", "author": "A"})), 0)
            .unwrap();
        assert_eq!(item, record(json!({"date": "2020-01-01", "author": "A"})));
    }

    #[test]
    fn test_transform_uppercases_writer() {
        let map = FieldMap::new().transform("author", |r| {
            let writer = r.get("writer").and_then(Value::as_str).unwrap_or_default();
            Ok(Value::String(writer.to_uppercase()))
        });
        let item = map.apply(&record(json!({"writer": "brennen"})), 0).unwrap();
        assert_eq!(item["author"], "BRENNEN");
    }

    #[test]
    fn test_missing_field_stops_resolution() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let map = FieldMap::new()
            .field("title", "headline")
            .transform("late", move |_| {
                seen.set(seen.get() + 1);
                Ok(json!(1))
            });

        let err = map.apply(&record(json!({"text": "x"})), 7).unwrap_err();
        assert_eq!(
            err,
            MappingError::UnresolvedField {
                field: "headline".into(),
                index: 7
            }
        );
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_null_counts_as_missing() {
        let map = FieldMap::new().field("author", "writer");
        assert!(map.apply(&record(json!({"writer": null})), 0).is_err());
    }

    #[test]
    fn test_transform_error_is_not_wrapped() {
        let map = FieldMap::new().transform("x", |_| Err(MappingError::transform("x", "nope")));
        let err = map.apply(&Record::new(), 0).unwrap_err();
        assert_eq!(err, MappingError::transform("x", "nope"));
    }

    #[test]
    fn test_transforms_see_source_not_output() {
        // "author" is produced first, but the transform must still read the
        // source record, where "author" does not exist.
        let forward = FieldMap::new()
            .transform("author", |_| Ok(json!("from map")))
            .transform("echo", |r| Ok(r.get("author").cloned().unwrap_or(Value::Null)));
        let backward = FieldMap::new()
            .transform("echo", |r| Ok(r.get("author").cloned().unwrap_or(Value::Null)))
            .transform("author", |_| Ok(json!("from map")));

        let source = record(json!({"writer": "w"}));
        let a = forward.apply(&source, 0).unwrap();
        let b = backward.apply(&source, 0).unwrap();
        assert_eq!(a["echo"], Value::Null);
        assert_eq!(a["echo"], b["echo"]);
        assert_eq!(a["author"], b["author"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let map = FieldMap::new()
            .field("a", "x")
            .field("b", "y")
            .field("a", "z");
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(matches!(map.get("a"), Some(MapEntry::Field(s)) if s == "z"));
    }

    #[test]
    fn test_output_follows_map_order() {
        let map = FieldMap::new().field("z", "a").field("a", "z");
        let item = map.apply(&record(json!({"a": 1, "z": 2})), 0).unwrap();
        let keys: Vec<&String> = item.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
