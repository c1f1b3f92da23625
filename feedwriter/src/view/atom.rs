//! Atom 1.0 syndication view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::{required, View};
use crate::config::{DEFAULT_FEED_ID, DEFAULT_FEED_TITLE};
use crate::datetime::{parse_timestamp, to_rfc3339};
use crate::error::{ViewError, ViewResult};
use crate::record::{resolve, value_to_text, Record};

const ATOM_FIELDS: [&str; 5] = ["date", "author", "content", "title", "link"];

/// Feed-level metadata written once per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedMeta {
    pub title: String,
    pub id: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
}

impl Default for FeedMeta {
    fn default() -> Self {
        Self {
            title: DEFAULT_FEED_TITLE.to_string(),
            id: DEFAULT_FEED_ID.to_string(),
            link: None,
            subtitle: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    title: String,
    link: String,
    updated: DateTime<Utc>,
    author: String,
    summary: Option<String>,
    content: String,
}

/// Builds one `<entry>` per canonical record.
///
/// Reads `date`, `author`, `content`, `title` and `link`, plus `summary`
/// when the record has one. The entry id is its link.
#[derive(Debug, Clone)]
pub struct AtomView {
    meta: FeedMeta,
    required: Vec<String>,
    updated: Option<DateTime<Utc>>,
    entries: Vec<Entry>,
}

impl AtomView {
    pub fn new(meta: FeedMeta) -> Self {
        Self {
            meta,
            required: ATOM_FIELDS.iter().map(|f| f.to_string()).collect(),
            updated: None,
            entries: Vec::new(),
        }
    }

    /// Pin the feed's `<updated>` instead of using the newest entry.
    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn meta(&self) -> &FeedMeta {
        &self.meta
    }

    fn text(&self, item: &Record, field: &str) -> ViewResult<String> {
        required(self.name(), item, field).map(value_to_text)
    }

    /// Newest entry date; the Unix epoch for an empty feed so rendering stays
    /// a pure function of collected state.
    fn feed_updated(&self) -> DateTime<Utc> {
        self.updated
            .or_else(|| self.entries.iter().map(|e| e.updated).max())
            .unwrap_or_default()
    }
}

impl Default for AtomView {
    fn default() -> Self {
        Self::new(FeedMeta::default())
    }
}

impl View for AtomView {
    fn name(&self) -> &str {
        "atom"
    }

    fn required_fields(&self) -> &[String] {
        &self.required
    }

    fn collect(&mut self, item: &Record) -> ViewResult<()> {
        let date = required(self.name(), item, "date")?;
        let updated = parse_timestamp(date).ok_or_else(|| ViewError::InvalidDate {
            view: self.name().to_string(),
            value: value_to_text(date),
        })?;

        let entry = Entry {
            title: self.text(item, "title")?,
            link: self.text(item, "link")?,
            updated,
            author: self.text(item, "author")?,
            summary: resolve(item, "summary").map(value_to_text),
            content: self.text(item, "content")?,
        };
        self.entries.push(entry);
        Ok(())
    }

    fn render(&self) -> ViewResult<String> {
        let mut out = String::new();
        write_document(&mut out, &self.meta, self.feed_updated(), &self.entries)?;
        Ok(out)
    }

    fn collected(&self) -> usize {
        self.entries.len()
    }
}

fn write_document(
    out: &mut impl Write,
    meta: &FeedMeta,
    updated: DateTime<Utc>,
    entries: &[Entry],
) -> std::fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(out, r#"<feed xmlns="http://www.w3.org/2005/Atom">"#)?;
    writeln!(out, "  <title>{}</title>", escape(&meta.title))?;
    if let Some(subtitle) = &meta.subtitle {
        writeln!(out, "  <subtitle>{}</subtitle>", escape(subtitle))?;
    }
    if let Some(link) = &meta.link {
        writeln!(out, r#"  <link rel="alternate" href="{}"/>"#, escape(link))?;
    }
    writeln!(out, "  <id>{}</id>", escape(&meta.id))?;
    writeln!(out, "  <updated>{}</updated>", to_rfc3339(&updated))?;

    for entry in entries {
        writeln!(out, "  <entry>")?;
        writeln!(out, "    <title>{}</title>", escape(&entry.title))?;
        writeln!(out, r#"    <link rel="alternate" href="{}"/>"#, escape(&entry.link))?;
        writeln!(out, "    <id>{}</id>", escape(&entry.link))?;
        writeln!(out, "    <updated>{}</updated>", to_rfc3339(&entry.updated))?;
        writeln!(out, "    <author>")?;
        writeln!(out, "      <name>{}</name>", escape(&entry.author))?;
        writeln!(out, "    </author>")?;
        if let Some(summary) = &entry.summary {
            writeln!(out, "    <summary>{}</summary>", escape(summary))?;
        }
        writeln!(out, r#"    <content type="html">{}</content>"#, escape(&entry.content))?;
        writeln!(out, "  </entry>")?;
    }

    writeln!(out, "</feed>")
}

/// Escape text for XML element content and attribute values.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
