//! JSON list view.

use serde_json::Value;

use super::{required, View};
use crate::error::ViewResult;
use crate::record::Record;

/// Collects a projection of each canonical record into a JSON array.
///
/// Projects `date` and `author` unless configured otherwise.
#[derive(Debug, Clone)]
pub struct JsonView {
    fields: Vec<String>,
    items: Vec<Value>,
    pretty: bool,
}

impl JsonView {
    pub fn new() -> Self {
        Self {
            fields: vec!["date".to_string(), "author".to_string()],
            items: Vec::new(),
            pretty: false,
        }
    }

    /// Project these fields instead; they become the view's requirements.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Render with indentation.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// The collected objects.
    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

impl Default for JsonView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for JsonView {
    fn name(&self) -> &str {
        "json"
    }

    fn required_fields(&self) -> &[String] {
        &self.fields
    }

    fn collect(&mut self, item: &Record) -> ViewResult<()> {
        let mut projected = Record::new();
        for field in &self.fields {
            projected.insert(field.clone(), required(self.name(), item, field)?.clone());
        }
        self.items.push(Value::Object(projected));
        Ok(())
    }

    fn render(&self) -> ViewResult<String> {
        let out = if self.pretty {
            serde_json::to_string_pretty(&self.items)?
        } else {
            serde_json::to_string(&self.items)?
        };
        Ok(out)
    }

    fn collected(&self) -> usize {
        self.items.len()
    }
}
