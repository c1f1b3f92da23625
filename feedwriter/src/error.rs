//! Error types for the feedwriter engine.
//!
//! The hierarchy mirrors the stages a run goes through:
//!
//! - [`ConfigError`] - map/view validation at [`crate::Feed`] construction
//! - [`MappingError`] - resolving a source record into a canonical record
//! - [`ViewError`] - collecting into or rendering a view
//! - [`FeedError`] - everything the orchestrator can report
//! - [`InputError`] - reading source files
//! - [`PipelineError`] - top-level file orchestration
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! error boundaries.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors raised while validating a feed configuration, before any record is
/// read from the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The view list was empty.
    #[error("no views supplied")]
    NoViews,

    /// The map had no entries.
    #[error("map must provide values")]
    EmptyMap,

    /// Two views were registered under the same name.
    #[error("view name '{0}' is used more than once")]
    DuplicateView(String),

    /// A view requires a canonical field the map does not produce.
    #[error("map should provide a mapping for {field}")]
    MissingMapping { view: String, field: String },
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors raised while turning a source record into a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A literal field reference could not be resolved on the source record.
    #[error("unable to access {field} on input item {index}")]
    UnresolvedField { field: String, index: usize },

    /// The source yielded something that is not an associative structure.
    #[error("input item {index} is not a record")]
    NotARecord { index: usize },

    /// A transform refused to produce a value.
    #[error("transform for '{field}' failed: {message}")]
    Transform { field: String, message: String },

    /// A declarative map file could not be understood.
    #[error("invalid map configuration: {0}")]
    InvalidConfig(String),
}

impl MappingError {
    /// Shorthand for transforms that want to fail with a message.
    pub fn transform(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// View Errors
// =============================================================================

/// Errors raised by views while collecting or rendering.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A canonical record lacked a field the view reads.
    #[error("{view} view: canonical record has no '{field}' field")]
    MissingField { view: String, field: String },

    /// A date field could not be interpreted.
    #[error("{view} view: cannot interpret '{value}' as a date")]
    InvalidDate { view: String, value: String },

    /// CSV encoder failure.
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoder failure.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing formatted output failed.
    #[error("formatting failed: {0}")]
    Format(#[from] std::fmt::Error),

    /// Rendered bytes were not valid UTF-8.
    #[error("rendered output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

// =============================================================================
// Feed Errors
// =============================================================================

/// Everything [`crate::Feed`] can report, either from construction or from
/// its accessors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Configuration rejected before iteration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The pass stopped on a record that could not be mapped.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// A view failed to collect or render.
    #[error("view error: {0}")]
    View(#[from] ViewError),

    /// Lookup of a view name that was never declared.
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// The pass stopped partway. `views` hold what they collected before the
    /// failing record; `record_count` records reached every view.
    #[error("{cause} (after {record_count} records)")]
    Interrupted {
        #[source]
        cause: Box<FeedError>,
        views: crate::feed::ViewSet,
        record_count: usize,
    },
}

impl FeedError {
    /// The failure itself, looking through [`FeedError::Interrupted`].
    pub fn root(&self) -> &FeedError {
        match self {
            FeedError::Interrupted { cause, .. } => cause.root(),
            other => other,
        }
    }

    /// Views handed back by an interrupted pass.
    pub fn partial_views(&self) -> Option<&crate::feed::ViewSet> {
        match self {
            FeedError::Interrupted { views, .. } => Some(views),
            _ => None,
        }
    }
}

// =============================================================================
// Input Errors
// =============================================================================

/// Errors while reading records from files.
#[derive(Debug, Error)]
pub enum InputError {
    /// Failed to read file.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Could not decode the file content.
    #[error("failed to decode input: {0}")]
    Encoding(String),

    /// Invalid CSV content.
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid JSON content.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed, but was not a list of objects.
    #[error("JSON input must be an array of objects or one object per line")]
    NotRecords,

    /// The file extension is not one we can read.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// The file had no header row.
    #[error("input is empty")]
    Empty,
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::pipeline::render_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input parsing error.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Map file error.
    #[error("map error: {0}")]
    Map(#[from] MappingError),

    /// Feed construction or rendering error.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// Writing outputs failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for feed construction and access.
pub type FeedResult<T> = Result<T, FeedError>;

/// Result type for record mapping.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for view operations.
pub type ViewResult<T> = Result<T, ViewError>;

/// Result type for input parsing.
pub type InputResult<T> = Result<T, InputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let config: FeedError = ConfigError::EmptyMap.into();
        assert!(config.to_string().contains("map must provide values"));

        let mapping = MappingError::UnresolvedField {
            field: "writer".into(),
            index: 3,
        };
        let pipeline: PipelineError = FeedError::from(mapping).into();
        assert!(pipeline.to_string().contains("unable to access writer"));
    }

    #[test]
    fn test_interrupted_keeps_cause_message() {
        let err = FeedError::Interrupted {
            cause: Box::new(MappingError::NotARecord { index: 2 }.into()),
            views: crate::feed::ViewSet::new(),
            record_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "mapping error: input item 2 is not a record (after 2 records)"
        );
        assert!(matches!(
            err.root(),
            FeedError::Mapping(MappingError::NotARecord { index: 2 })
        ));
        assert!(err.partial_views().is_some_and(|v| v.is_empty()));
        assert!(FeedError::UnknownView("rss".into()).partial_views().is_none());
    }

    #[test]
    fn test_missing_mapping_message_names_field() {
        let err = ConfigError::MissingMapping {
            view: "atom".into(),
            field: "link".into(),
        };
        assert_eq!(err.to_string(), "map should provide a mapping for link");
    }
}
