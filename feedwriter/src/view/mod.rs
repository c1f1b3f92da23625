//! Views: output formats fed by canonical records.
//!
//! A view declares which canonical fields it depends on, accumulates
//! records through [`View::collect`], and produces its output with
//! [`View::render`] as many times as the caller likes.
//!
//! - [`JsonView`] - list of projected objects
//! - [`CsvView`] - header row plus one row per record
//! - [`AtomView`] - Atom 1.0 document

pub mod atom;
pub mod csv;
pub mod json;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ViewError, ViewResult};
use crate::record::Record;

pub use self::atom::{AtomView, FeedMeta};
pub use self::csv::CsvView;
pub use self::json::JsonView;

/// Output format collaborator.
pub trait View {
    /// Format name used in messages.
    fn name(&self) -> &str;

    /// Canonical fields this view reads. Checked against the map once, when
    /// the feed is built.
    fn required_fields(&self) -> &[String] {
        &[]
    }

    /// Accumulate one canonical record.
    fn collect(&mut self, item: &Record) -> ViewResult<()>;

    /// Produce the output for everything collected so far.
    fn render(&self) -> ViewResult<String>;

    /// Alias of [`View::render`].
    fn generate_feed(&self) -> ViewResult<String> {
        self.render()
    }

    /// Number of records collected.
    fn collected(&self) -> usize;
}

/// Read a field a view depends on, failing with a descriptive error when the
/// canonical record lacks it.
pub(crate) fn required<'a>(view: &str, item: &'a Record, field: &str) -> ViewResult<&'a Value> {
    item.get(field).ok_or_else(|| ViewError::MissingField {
        view: view.to_string(),
        field: field.to_string(),
    })
}

/// Built-in view formats selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Json,
    Csv,
    Atom,
}

impl ViewKind {
    /// Name the view is registered under in a feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Json => "json",
            ViewKind::Csv => "csv",
            ViewKind::Atom => "atom",
        }
    }

    /// File extension for rendered output.
    pub fn extension(&self) -> &'static str {
        match self {
            ViewKind::Json => "json",
            ViewKind::Csv => "csv",
            ViewKind::Atom => "atom",
        }
    }

    /// Construct a fresh view of this kind.
    pub fn build(&self, meta: &FeedMeta, pretty: bool) -> Box<dyn View> {
        match self {
            ViewKind::Json => {
                let view = JsonView::new();
                Box::new(if pretty { view.pretty() } else { view })
            }
            ViewKind::Csv => Box::new(CsvView::new()),
            ViewKind::Atom => Box::new(AtomView::new(meta.clone())),
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_matches_kind() {
        let meta = FeedMeta::default();
        for kind in [ViewKind::Json, ViewKind::Csv, ViewKind::Atom] {
            let view = kind.build(&meta, false);
            assert_eq!(view.name(), kind.as_str());
            assert_eq!(view.collected(), 0);
        }
    }

    #[test]
    fn test_required_helper_reports_view_and_field() {
        let item = json!({"date": "2020"}).as_object().cloned().unwrap();
        let err = required("csv", &item, "author").unwrap_err();
        assert_eq!(err.to_string(), "csv view: canonical record has no 'author' field");
    }

    #[test]
    fn test_generate_feed_is_render() {
        let mut view = JsonView::new();
        let item = json!({"date": "d", "author": "a"}).as_object().cloned().unwrap();
        view.collect(&item).unwrap();
        assert_eq!(view.generate_feed().unwrap(), view.render().unwrap());
    }
}
