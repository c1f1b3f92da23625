//! Source files to records.
//!
//! CSV (with encoding and delimiter auto-detection) and JSON (an array of
//! objects, or one object per line) are read into [`Record`]s ready to be
//! fed to [`crate::Feed`]. Every CSV value is a string.

use serde_json::Value;
use std::path::Path;

use crate::error::{InputError, InputResult};
use crate::record::Record;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
    JsonLines,
}

impl InputFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> InputResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "tsv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::JsonLines),
            _ => Err(InputError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parsed records plus what was detected along the way.
#[derive(Debug, Clone)]
pub struct ParsedInput {
    pub records: Vec<Record>,
    pub format: InputFormat,
    pub encoding: String,
    /// Only meaningful for CSV
    pub delimiter: Option<char>,
    /// CSV header, or the keys of the first JSON record
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string; unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    [',', ';', '\t', '|']
        .into_iter()
        .map(|sep| (sep, first_line.matches(sep).count()))
        .filter(|(_, count)| *count > 0)
        // max_by_key keeps the last maximum; reverse so earlier candidates win ties
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(sep, _)| sep)
        .unwrap_or(',')
}

/// Parse CSV text with a header row into records.
///
/// Short rows are padded with empty strings, extra cells are dropped and
/// blank lines are skipped.
pub fn parse_csv_str(content: &str, delimiter: char) -> InputResult<(Vec<String>, Vec<Record>)> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| InputError::Encoding(format!("delimiter '{}' is not ASCII", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(String::is_empty) {
        return Err(InputError::Empty);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell = row.get(i).unwrap_or("");
                (header.clone(), Value::String(cell.to_string()))
            })
            .collect();
        records.push(record);
    }

    Ok((headers, records))
}

/// Parse a JSON array of objects, or newline-delimited JSON objects.
pub fn parse_json_str(content: &str) -> InputResult<Vec<Record>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed)?;
        return values.into_iter().map(into_object).collect();
    }

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| into_object(serde_json::from_str(line)?))
        .collect()
}

fn into_object(value: Value) -> InputResult<Record> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(InputError::NotRecords),
    }
}

/// Parse bytes of a known format, detecting encoding (and delimiter for CSV).
pub fn parse_bytes(bytes: &[u8], format: InputFormat) -> InputResult<ParsedInput> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    // Drop a UTF-8 BOM so it does not end up in the first header.
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    match format {
        InputFormat::Csv => {
            let delimiter = detect_delimiter(content);
            let (headers, records) = parse_csv_str(content, delimiter)?;
            Ok(ParsedInput {
                records,
                format,
                encoding,
                delimiter: Some(delimiter),
                headers,
            })
        }
        InputFormat::Json | InputFormat::JsonLines => {
            let records = parse_json_str(content)?;
            let headers = records
                .first()
                .map(|r| r.keys().cloned().collect())
                .unwrap_or_default();
            Ok(ParsedInput {
                records,
                format,
                encoding,
                delimiter: None,
                headers,
            })
        }
    }
}

/// Read and parse a file, choosing the format from its extension.
pub fn parse_file<P: AsRef<Path>>(path: P) -> InputResult<ParsedInput> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    parse_bytes(&bytes, format)
}
