//! CSV table view.

use super::{required, View};
use crate::error::ViewResult;
use crate::record::{value_to_text, Record};

/// Header row followed by one row per collected record.
///
/// Like the other views it reads `date` and `author` by default, but it
/// declares no requirements: a record without one of its columns fails at
/// collect time instead of at feed construction.
#[derive(Debug, Clone)]
pub struct CsvView {
    columns: Vec<String>,
    delimiter: u8,
    rows: Vec<Vec<String>>,
}

impl CsvView {
    pub fn new() -> Self {
        Self {
            columns: vec!["date".to_string(), "author".to_string()],
            delimiter: b',',
            rows: Vec::new(),
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for CsvView {
    fn name(&self) -> &str {
        "csv"
    }

    fn collect(&mut self, item: &Record) -> ViewResult<()> {
        let row = self
            .columns
            .iter()
            .map(|column| required(self.name(), item, column).map(value_to_text))
            .collect::<ViewResult<Vec<_>>>()?;
        self.rows.push(row);
        Ok(())
    }

    fn render(&self) -> ViewResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }

    fn collected(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_header_then_row() {
        let mut view = CsvView::new();
        view.collect(&record(json!({"date": "2020-01-01", "author": "A"})))
            .unwrap();
        assert_eq!(view.render().unwrap(), "date,author\n2020-01-01,A\n");
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(CsvView::new().render().unwrap(), "date,author\n");
    }

    #[test]
    fn test_quoting_and_scalars() {
        let mut view = CsvView::new().with_columns(["author", "count", "note"]);
        view.collect(&record(
            json!({"author": "Bearnes, Brennen", "count": 3, "note": null}),
        ))
        .unwrap();
        assert_eq!(
            view.render().unwrap(),
            "author,count,note\n\"Bearnes, Brennen\",3,\n"
        );
    }

    #[test]
    fn test_rows_keep_collection_order() {
        let mut view = CsvView::new().with_delimiter(b';');
        for (date, author) in [("d1", "a"), ("d2", "b"), ("d3", "c")] {
            view.collect(&record(json!({"date": date, "author": author})))
                .unwrap();
        }
        let out = view.render().unwrap();
        assert_eq!(out, "date;author\nd1;a\nd2;b\nd3;c\n");
        assert_eq!(out, view.render().unwrap());
    }

    #[test]
    fn test_no_declared_requirements_but_fails_fast() {
        let mut view = CsvView::new();
        assert!(view.required_fields().is_empty());
        let err = view.collect(&record(json!({"date": "d"}))).unwrap_err();
        assert!(matches!(err, ViewError::MissingField { ref field, .. } if field == "author"));
        assert_eq!(view.collected(), 0);
    }
}
