//! High-level pipeline: one input file, one map file, several rendered views.
//!
//! # Example
//!
//! ```rust,no_run
//! use feedwriter::pipeline::{render_file, RenderOptions};
//! use feedwriter::ViewKind;
//! use std::path::Path;
//!
//! let options = RenderOptions {
//!     map_path: "map.json".into(),
//!     views: vec![ViewKind::Json, ViewKind::Atom],
//!     ..RenderOptions::default()
//! };
//! let result = render_file(Path::new("posts.csv"), &options).unwrap();
//! for output in &result.outputs {
//!     println!("{}", output.content);
//! }
//! ```

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Settings, DEFAULT_VIEWS};
use crate::error::PipelineResult;
use crate::feed::{Feed, ViewSet};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::mapping::{FieldMap, MapConfig, MapEntry};
use crate::parser::{parse_file, InputFormat, ParsedInput};
use crate::view::{FeedMeta, ViewKind};

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// JSON map file
    pub map_path: PathBuf,

    /// Views to render, in this order; empty means [`DEFAULT_VIEWS`]
    pub views: Vec<ViewKind>,

    /// Write `<stem>.<ext>` files here instead of only returning the output
    pub output_dir: Option<PathBuf>,

    /// Atom feed metadata
    pub meta: FeedMeta,

    /// Indent JSON output
    pub pretty: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            map_path: PathBuf::new(),
            views: Vec::new(),
            output_dir: None,
            meta: FeedMeta::default(),
            pretty: false,
        }
    }
}

impl RenderOptions {
    /// Options seeded from settings; callers fill in the map and views.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            output_dir: settings.output_dir.clone(),
            meta: settings.feed_meta(),
            ..Self::default()
        }
    }
}

/// One rendered view.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedView {
    pub kind: ViewKind,
    pub content: String,
    /// Where the output was written, if anywhere
    pub path: Option<PathBuf>,
}

/// Input file information
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    pub format: String,
    pub encoding: String,
    pub delimiter: Option<char>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RenderResult {
    pub outputs: Vec<RenderedView>,
    pub record_count: usize,
    pub input_info: InputInfo,
}

/// Load a map file and compile it.
pub fn load_map(path: &Path) -> PipelineResult<FieldMap> {
    let content = fs::read_to_string(path)?;
    Ok(MapConfig::from_json(&content)?.into_field_map()?)
}

/// Parse `input`, map it, and render every requested view.
pub fn render_file(input: &Path, options: &RenderOptions) -> PipelineResult<RenderResult> {
    log_info(format!("📖 Reading {}...", input.display()));
    let parsed = parse_file(input)?;
    let input_info = describe_input(&parsed);
    log_success(format!(
        "Read {} records ({}, {})",
        input_info.row_count, input_info.format, input_info.encoding
    ));
    if let Some(delimiter) = parsed.delimiter {
        log_success(format!("Detected separator: '{}'", format_delimiter(delimiter)));
    }
    if parsed.records.is_empty() {
        log_warning("Input has no records; views will be empty");
    }

    log_info(format!("🗺️  Loading map {}...", options.map_path.display()));
    let map = load_map(&options.map_path)?;
    print_map(&map);

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("feed")
        .to_string();
    render_records(parsed.records, map, options, &stem).map(|(outputs, record_count)| {
        RenderResult {
            outputs,
            record_count,
            input_info,
        }
    })
}

/// Run already-loaded records through `map` and render the requested views.
///
/// Returns the rendered views and the number of records mapped.
pub fn render_records<S>(
    source: S,
    map: FieldMap,
    options: &RenderOptions,
    stem: &str,
) -> PipelineResult<(Vec<RenderedView>, usize)>
where
    S: IntoIterator,
    S::Item: crate::record::IntoRecord,
{
    let kinds: Vec<ViewKind> = if options.views.is_empty() {
        DEFAULT_VIEWS.to_vec()
    } else {
        let mut kinds = Vec::with_capacity(options.views.len());
        for kind in &options.views {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    };

    let views: ViewSet = kinds
        .iter()
        .map(|kind| (kind.as_str(), kind.build(&options.meta, options.pretty)))
        .collect();

    log_info(format!(
        "⚙️  Mapping into {} view(s): {}",
        kinds.len(),
        kinds.iter().map(ViewKind::as_str).collect::<Vec<_>>().join(", ")
    ));
    let feed = Feed::new(source, map, views).map_err(|e| {
        log_error(e.to_string());
        e
    })?;
    log_success(format!("Mapped {} records", feed.record_count()));

    if let Some(dir) = &options.output_dir {
        fs::create_dir_all(dir)?;
    }

    let mut outputs = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let content = feed.render(kind.as_str())?;
        let path = match &options.output_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.{}", stem, kind.extension()));
                fs::write(&path, &content)?;
                log_info_indent(format!("💾 {} → {}", kind, path.display()), 1);
                Some(path)
            }
            None => None,
        };
        outputs.push(RenderedView {
            kind,
            content,
            path,
        });
    }

    Ok((outputs, feed.record_count()))
}

fn describe_input(parsed: &ParsedInput) -> InputInfo {
    let format = match parsed.format {
        InputFormat::Csv => "csv",
        InputFormat::Json => "json",
        InputFormat::JsonLines => "json lines",
    };
    InputInfo {
        format: format.to_string(),
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        headers: parsed.headers.clone(),
        row_count: parsed.records.len(),
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

fn print_map(map: &FieldMap) {
    for (field, entry) in map.iter() {
        match entry {
            MapEntry::Field(source) => log_info_indent(format!("{} → {}", source, field), 1),
            MapEntry::Transform(_) => log_info_indent(format!("(transform) → {}", field), 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, FeedError, PipelineError};
    use serde_json::json;

    const POSTS_CSV: &str = "date_created;writer;text;headline;slug\n\
        2013-02-14;Brennen Bearnes;Hate.;On hate;hate\n\
        2013-07-04;Brennen Bearnes;Explosions.;Fireworks;explosions\n";

    const MAP: &str = r#"{
        "date": {"source": "date_created", "operations": [{"type": "format_date"}]},
        "author": "writer",
        "content": "text",
        "title": "headline",
        "link": {
            "source": "slug",
            "operations": [{"type": "ensure_prefix", "value": "https://example.com/"}]
        }
    }"#;

    fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_render_file_all_views() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path(), "posts.csv", POSTS_CSV);
        let map_path = write_fixture(dir.path(), "map.json", MAP);
        let out_dir = dir.path().join("out");

        let options = RenderOptions {
            map_path,
            views: vec![ViewKind::Json, ViewKind::Csv, ViewKind::Atom],
            output_dir: Some(out_dir.clone()),
            ..RenderOptions::default()
        };
        let result = render_file(&input, &options).unwrap();

        assert_eq!(result.record_count, 2);
        assert_eq!(result.input_info.delimiter, Some(';'));
        assert_eq!(result.input_info.headers[0], "date_created");
        assert_eq!(result.outputs.len(), 3);

        let json = &result.outputs[0];
        assert_eq!(json.kind, ViewKind::Json);
        let items: serde_json::Value = serde_json::from_str(&json.content).unwrap();
        assert_eq!(
            items,
            json!([
                {"date": "2013-02-14T00:00:00Z", "author": "Brennen Bearnes"},
                {"date": "2013-07-04T00:00:00Z", "author": "Brennen Bearnes"}
            ])
        );
        assert!(json.content.starts_with(r#"[{"date":"2013-02-14T00:00:00Z","author""#));

        let atom = fs::read_to_string(out_dir.join("posts.atom")).unwrap();
        assert_eq!(atom, result.outputs[2].content);
        assert!(atom.contains("<id>https://example.com/explosions</id>"));

        let csv = fs::read_to_string(out_dir.join("posts.csv")).unwrap();
        assert!(csv.starts_with("date,author\n2013-02-14T00:00:00Z,Brennen Bearnes\n"));
    }

    #[test]
    fn test_default_view_is_json() {
        let map = FieldMap::new().field("date", "d").field("author", "a");
        let (outputs, count) = render_records(
            vec![json!({"d": "2020-01-01", "a": "A"})],
            map,
            &RenderOptions::default(),
            "feed",
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].kind, ViewKind::Json);
        assert!(outputs[0].path.is_none());
    }

    #[test]
    fn test_map_missing_atom_fields() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path(), "posts.csv", POSTS_CSV);
        let map = r#"{"date": "date_created", "author": "writer"}"#;
        let map_path = write_fixture(dir.path(), "map.json", map);

        let options = RenderOptions {
            map_path,
            views: vec![ViewKind::Atom],
            ..RenderOptions::default()
        };
        let err = render_file(&input, &options).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Feed(FeedError::Config(ConfigError::MissingMapping { ref field, .. }))
                if field == "content"
        ));
    }

    #[test]
    fn test_bad_map_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_fixture(dir.path(), "posts.json", r#"[{"writer": "w"}]"#);
        let map_path = write_fixture(dir.path(), "map.json", "[]");

        let options = RenderOptions {
            map_path,
            ..RenderOptions::default()
        };
        assert!(matches!(
            render_file(&input, &options),
            Err(PipelineError::Map(_))
        ));
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings {
            feed_title: "Posts".into(),
            output_dir: Some(PathBuf::from("out")),
            ..Settings::default()
        };
        let options = RenderOptions::from_settings(&settings);
        assert_eq!(options.meta.title, "Posts");
        assert_eq!(options.output_dir, Some(PathBuf::from("out")));
        assert!(options.views.is_empty());
    }
}
