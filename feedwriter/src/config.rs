//! Runtime settings.
//!
//! Read from the environment (after loading `.env`, if present). Command
//! line flags take precedence over anything found here.

use std::path::PathBuf;

use crate::view::{FeedMeta, ViewKind};

/// Views rendered when none are requested.
pub const DEFAULT_VIEWS: &[ViewKind] = &[ViewKind::Json];

/// Feed title when neither the environment nor the command line sets one.
pub const DEFAULT_FEED_TITLE: &str = "feedwriter";

/// Feed id when neither the environment nor the command line sets one.
pub const DEFAULT_FEED_ID: &str = "urn:feedwriter:feed";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub feed_title: String,
    pub feed_id: String,
    pub feed_link: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_title: DEFAULT_FEED_TITLE.to_string(),
            feed_id: DEFAULT_FEED_ID.to_string(),
            feed_link: None,
            output_dir: None,
        }
    }
}

impl Settings {
    /// Load `.env` and read `FEEDWRITER_*` variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            feed_title: get("FEEDWRITER_FEED_TITLE").unwrap_or(defaults.feed_title),
            feed_id: get("FEEDWRITER_FEED_ID").unwrap_or(defaults.feed_id),
            feed_link: get("FEEDWRITER_FEED_LINK"),
            output_dir: get("FEEDWRITER_OUTPUT_DIR").map(PathBuf::from),
        }
    }

    /// Atom metadata derived from these settings.
    pub fn feed_meta(&self) -> FeedMeta {
        FeedMeta {
            title: self.feed_title.clone(),
            id: self.feed_id.clone(),
            link: self.feed_link.clone(),
            subtitle: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.feed_meta(), FeedMeta::default());
    }

    #[test]
    fn test_reads_variables() {
        let mut vars = HashMap::new();
        vars.insert("FEEDWRITER_FEED_TITLE", "Posts");
        vars.insert("FEEDWRITER_FEED_LINK", "https://example.com");
        vars.insert("FEEDWRITER_OUTPUT_DIR", "out");
        vars.insert("FEEDWRITER_FEED_ID", "  ");

        let settings = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(settings.feed_title, "Posts");
        assert_eq!(settings.feed_id, DEFAULT_FEED_ID);
        assert_eq!(settings.feed_link.as_deref(), Some("https://example.com"));
        assert_eq!(settings.output_dir, Some(PathBuf::from("out")));
    }
}
