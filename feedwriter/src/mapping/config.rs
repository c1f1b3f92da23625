//! Declarative map files.
//!
//! A map file is a JSON object from canonical field name to either a source
//! field name or a [`FieldTransform`]. Key order in the file is the field
//! order of the canonical records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field_map::{FieldMap, MapEntry};
use super::operations::Operation;
use crate::error::{MappingError, MappingResult};
use crate::record::{resolve, value_to_text, Record};

/// One entry of a map file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryConfig {
    /// `"author": "writer"`
    Field(String),
    /// `"author": { "source": "writer", "operations": [...] }`
    Transform(FieldTransform),
}

/// Computed field rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldTransform {
    /// Source field (mutually exclusive with sources and constant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Several source fields, joined (mutually exclusive with source and constant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,

    /// Separator used to join `sources`
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Fixed value (mutually exclusive with source/sources)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,

    /// Operations applied in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<Operation>,

    /// Value used when the source is missing or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Fail the pass instead of producing `null`
    #[serde(default)]
    pub required: bool,
}

fn default_separator() -> String {
    " ".to_string()
}

impl FieldTransform {
    pub fn from_source(source: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            ..Self::empty()
        }
    }

    pub fn from_sources(sources: Vec<String>, separator: &str) -> Self {
        Self {
            sources: Some(sources),
            separator: separator.to_string(),
            ..Self::empty()
        }
    }

    pub fn from_constant(value: Value) -> Self {
        Self {
            constant: Some(value),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            source: None,
            sources: None,
            separator: default_separator(),
            constant: None,
            operations: Vec::new(),
            default: None,
            required: false,
        }
    }

    pub fn with_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Check that exactly one input is named and that every operation is usable.
    pub fn validate(&self, field: &str) -> MappingResult<()> {
        let inputs = [
            self.source.is_some(),
            self.sources.is_some(),
            self.constant.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if inputs != 1 {
            return Err(MappingError::InvalidConfig(format!(
                "'{}' needs exactly one of source, sources or constant",
                field
            )));
        }
        for op in &self.operations {
            op.validate()
                .map_err(|e| MappingError::InvalidConfig(format!("'{}': {}", field, e)))?;
        }
        Ok(())
    }

    /// Compute the value for `field` from a source record.
    pub fn resolve(&self, field: &str, record: &Record) -> MappingResult<Value> {
        let mut value = if let Some(source) = &self.source {
            resolve(record, source).cloned()
        } else if let Some(sources) = &self.sources {
            let parts: Vec<String> = sources
                .iter()
                .filter_map(|s| resolve(record, s))
                .map(|v| value_to_text(v).trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (!parts.is_empty()).then(|| Value::String(parts.join(&self.separator)))
        } else {
            self.constant.clone()
        };

        if value.as_ref().map_or(true, is_empty) {
            if let Some(default) = &self.default {
                value = Some(default.clone());
            }
        }

        let value = value.map(|v| self.operations.iter().fold(v, |acc, op| op.apply(&acc)));

        match value {
            Some(v) if !is_empty(&v) => Ok(v),
            _ => match (&self.default, self.required) {
                (Some(default), _) => Ok(default.clone()),
                (None, true) => Err(MappingError::transform(field, "no value and no default")),
                (None, false) => Ok(Value::Null),
            },
        }
    }
}

/// Check if a value is "empty" (null, blank string, empty array or object).
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// A whole map file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapConfig {
    pub fields: Vec<(String, EntryConfig)>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append one entry.
    pub fn with(mut self, field: impl Into<String>, entry: EntryConfig) -> Self {
        self.fields.push((field.into(), entry));
        self
    }

    /// Parse a map from JSON text.
    pub fn from_json(json: &str) -> MappingResult<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| MappingError::InvalidConfig(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse a map from a JSON object.
    pub fn from_value(value: Value) -> MappingResult<Self> {
        let Value::Object(object) = value else {
            return Err(MappingError::InvalidConfig(
                "a map must be a JSON object".to_string(),
            ));
        };

        let fields = object
            .into_iter()
            .map(|(field, raw)| {
                serde_json::from_value::<EntryConfig>(raw)
                    .map(|entry| (field.clone(), entry))
                    .map_err(|e| MappingError::InvalidConfig(format!("'{}': {}", field, e)))
            })
            .collect::<MappingResult<Vec<_>>>()?;

        Ok(Self { fields })
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> MappingResult<String> {
        let mut object = Map::new();
        for (field, entry) in &self.fields {
            let value = serde_json::to_value(entry)
                .map_err(|e| MappingError::InvalidConfig(e.to_string()))?;
            object.insert(field.clone(), value);
        }
        serde_json::to_string_pretty(&Value::Object(object))
            .map_err(|e| MappingError::InvalidConfig(e.to_string()))
    }

    /// Compile into a [`FieldMap`], validating every transform first.
    pub fn into_field_map(self) -> MappingResult<FieldMap> {
        let mut map = FieldMap::new();
        for (field, entry) in self.fields {
            let entry = match entry {
                EntryConfig::Field(source) => MapEntry::Field(source),
                EntryConfig::Transform(transform) => {
                    transform.validate(&field)?;
                    let name = field.clone();
                    MapEntry::Transform(Box::new(move |record: &Record| {
                        transform.resolve(&name, record)
                    }))
                }
            };
            map.insert(field, entry);
        }
        Ok(map)
    }
}

/// A sample map for blog-post shaped records, shown by `feedwriter example-map`.
pub fn example_map() -> MapConfig {
    MapConfig::new()
        .with(
            "date",
            EntryConfig::Transform(
                FieldTransform::from_source("date_created")
                    .with_operation(Operation::FormatDate { format: None })
                    .required(),
            ),
        )
        .with("author", EntryConfig::Field("writer".to_string()))
        .with(
            "title",
            EntryConfig::Transform(
                FieldTransform::from_source("headline")
                    .with_operation(Operation::Trim)
                    .with_default(Value::String("Untitled".to_string())),
            ),
        )
        .with(
            "link",
            EntryConfig::Transform(
                FieldTransform::from_source("slug")
                    .with_operation(Operation::EnsurePrefix {
                        value: "https://example.com/posts/".to_string(),
                    })
                    .required(),
            ),
        )
        .with("content", EntryConfig::Field("text".to_string()))
}
