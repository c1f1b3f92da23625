//! # feedwriter - map records once, render many feed formats
//!
//! A single pass over a record source maps each item into a canonical record
//! and hands it to every registered view. Views (JSON, CSV, Atom) then render
//! their output on demand.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│   FieldMap  │────▶│    Views    │────▶│   Render    │
//! │ (iter/file) │     │ (per item)  │     │  (fan-out)  │     │ (on demand) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use feedwriter::{Feed, FieldMap, JsonView, ViewSet};
//! use serde_json::json;
//!
//! let source = vec![json!({"date_created": "2020-01-01", "writer": "A"})];
//! let map = FieldMap::new()
//!     .field("date", "date_created")
//!     .field("author", "writer");
//! let views = ViewSet::new().with("json", JsonView::new());
//!
//! let feed = Feed::new(source, map, views).unwrap();
//! assert_eq!(
//!     feed.render("json").unwrap(),
//!     r#"[{"date":"2020-01-01","author":"A"}]"#
//! );
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`record`] - Canonical records and source normalization
//! - [`source`] - Cursor-style sources
//! - [`mapping`] - Field maps, map files and value operations
//! - [`view`] - View contract and the JSON / CSV / Atom views
//! - [`feed`] - The orchestrator
//! - [`parser`] - CSV / JSON input files
//! - [`pipeline`] - File-to-outputs runs
//! - [`config`] - Settings from the environment
//! - [`logs`] - Run logs

// Core
pub mod error;
pub mod feed;
pub mod mapping;
pub mod record;
pub mod source;
pub mod view;

mod datetime;

// Input
pub mod parser;

// Orchestration
pub mod config;
pub mod logs;
pub mod pipeline;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConfigError, FeedError, FeedResult, InputError, MappingError, MappingResult,
    PipelineError, PipelineResult, ViewError, ViewResult,
};

// =============================================================================
// Re-exports - Core
// =============================================================================

pub use feed::{Feed, ViewSet};
pub use record::{IntoRecord, Record, Serialized};
pub use source::{from_cursor, Cursor, VecCursor};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{
    example_map, operations_description, EntryConfig, FieldMap, FieldTransform, MapConfig,
    MapEntry, Operation,
};

// =============================================================================
// Re-exports - Views
// =============================================================================

pub use view::{AtomView, CsvView, FeedMeta, JsonView, View, ViewKind};

// =============================================================================
// Re-exports - Parsing & Pipeline
// =============================================================================

pub use parser::{parse_file, InputFormat, ParsedInput};
pub use pipeline::{render_file, RenderOptions, RenderResult, RenderedView};
