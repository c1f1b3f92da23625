//! Field maps: how canonical fields are derived from source records.
//!
//! - `field_map`: the in-memory map ([`FieldMap`]) and its per-record application
//! - `operations`: value operations usable from map files
//! - `config`: JSON map files, compiled into a [`FieldMap`]
//!
//! ## Usage Flow
//!
//! ```text
//! map.json → MapConfig::from_json → into_field_map → Feed::new(source, map, views)
//! ```

pub mod config;
pub mod field_map;
pub mod operations;

pub use config::{example_map, EntryConfig, FieldTransform, MapConfig};
pub use field_map::{FieldMap, MapEntry, TransformFn};
pub use operations::{operations_description, Operation};
