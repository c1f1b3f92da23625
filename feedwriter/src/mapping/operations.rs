//! Value operations for declarative transforms.
//!
//! Map files cannot carry closures, so computed fields are described as a
//! chain of these operations applied to a source value.

use chrono::format::{Item, StrftimeItems};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::datetime::{parse_timestamp, to_rfc3339};

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("static regex"));

/// All available operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Remove leading and trailing whitespace
    Trim,

    /// Convert to uppercase
    Uppercase,

    /// Convert to lowercase
    Lowercase,

    /// Replace using regex pattern
    Replace {
        pattern: String,
        #[serde(default)]
        value: String,
    },

    /// Extract year (4 digits) from a date string
    ExtractYear,

    /// Ensure string starts with given prefix
    EnsurePrefix { value: String },

    /// Ensure string ends with given suffix
    EnsureSuffix { value: String },

    /// Map values using a lookup table
    Map {
        mapping: BTreeMap<String, String>,
        #[serde(default)]
        case_insensitive: bool,
        /// Value to use when nothing matches; without it the input is kept
        #[serde(default)]
        default_unmapped: Option<String>,
    },

    /// Split string into array
    Split {
        #[serde(default = "default_split_separator")]
        separator: String,
    },

    /// Convert to number (integer)
    ToNumber,

    /// Take `length` characters starting at `start`
    Substring {
        start: usize,
        #[serde(default)]
        length: Option<usize>,
    },

    /// Remove all non-digit characters
    DigitsOnly,

    /// Parse a date and re-format it (strftime pattern, RFC 3339 by default)
    FormatDate {
        #[serde(default)]
        format: Option<String>,
    },
}

fn default_split_separator() -> String {
    ",".to_string()
}

impl Operation {
    /// Reject operations whose parameters can never work.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Operation::Replace { pattern, .. } => Regex::new(pattern)
                .map(|_| ())
                .map_err(|e| format!("invalid pattern '{}': {}", pattern, e)),
            Operation::FormatDate { format: Some(f) } => {
                if StrftimeItems::new(f).any(|i| matches!(i, Item::Error)) {
                    Err(format!("invalid date format '{}'", f))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Apply this operation to a value.
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            Operation::Trim => map_text(value, |s| s.trim().to_string()),
            Operation::Uppercase => map_text(value, |s| s.to_uppercase()),
            Operation::Lowercase => map_text(value, |s| s.to_lowercase()),
            Operation::Replace { pattern, value: replacement } => match Regex::new(pattern) {
                Ok(re) => map_text(value, |s| re.replace_all(s, replacement.as_str()).into_owned()),
                Err(_) => value.clone(),
            },
            Operation::ExtractYear => as_text(value)
                .and_then(|s| YEAR.find(&s).and_then(|m| m.as_str().parse::<i64>().ok()))
                .map(Value::from)
                .unwrap_or(Value::Null),
            Operation::EnsurePrefix { value: prefix } => map_text(value, |s| {
                if s.starts_with(prefix.as_str()) {
                    s.to_string()
                } else {
                    format!("{}{}", prefix, s)
                }
            }),
            Operation::EnsureSuffix { value: suffix } => map_text(value, |s| {
                if s.ends_with(suffix.as_str()) {
                    s.to_string()
                } else {
                    format!("{}{}", s, suffix)
                }
            }),
            Operation::Map {
                mapping,
                case_insensitive,
                default_unmapped,
            } => apply_map(value, mapping, *case_insensitive, default_unmapped.as_deref()),
            Operation::Split { separator } => match as_text(value) {
                Some(s) => Value::Array(
                    s.split(separator.as_str())
                        .map(|p| Value::String(p.trim().to_string()))
                        .collect(),
                ),
                None => value.clone(),
            },
            Operation::ToNumber => apply_to_number(value),
            Operation::Substring { start, length } => map_text(value, |s| {
                let taken = s.chars().skip(*start);
                match length {
                    Some(n) => taken.take(*n).collect(),
                    None => taken.collect(),
                }
            }),
            Operation::DigitsOnly => {
                map_text(value, |s| s.chars().filter(char::is_ascii_digit).collect())
            }
            Operation::FormatDate { format } => apply_format_date(value, format.as_deref()),
        }
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Apply `f` to textual values; leave anything else untouched.
fn map_text(value: &Value, f: impl FnOnce(&str) -> String) -> Value {
    match as_text(value) {
        Some(s) => Value::String(f(&s)),
        None => value.clone(),
    }
}

fn apply_map(
    value: &Value,
    mapping: &BTreeMap<String, String>,
    case_insensitive: bool,
    default_unmapped: Option<&str>,
) -> Value {
    let Some(s) = as_text(value) else {
        return value.clone();
    };

    // Exact key first; otherwise the first key, in sorted order, that matches
    // ignoring case.
    let found = mapping.get(&s).or_else(|| {
        if !case_insensitive {
            return None;
        }
        let key = s.to_lowercase();
        mapping
            .iter()
            .find(|(k, _)| k.to_lowercase() == key)
            .map(|(_, v)| v)
    });

    match (found, default_unmapped) {
        (Some(v), _) => Value::String(v.clone()),
        (None, Some(d)) => Value::String(d.to_string()),
        (None, None) => value.clone(),
    }
}

fn apply_to_number(value: &Value) -> Value {
    if value.is_number() {
        return value.clone();
    }
    as_text(value)
        .and_then(|s| {
            let negative = s.trim().starts_with('-');
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                return None;
            }
            let n = digits.parse::<i64>().ok()?;
            Some(Value::from(if negative { -n } else { n }))
        })
        .unwrap_or(Value::Null)
}

fn apply_format_date(value: &Value, format: Option<&str>) -> Value {
    let Some(dt) = parse_timestamp(value) else {
        return value.clone();
    };
    match format {
        None => Value::String(to_rfc3339(&dt)),
        Some(f) => {
            let mut out = String::new();
            match write!(out, "{}", dt.format(f)) {
                Ok(()) => Value::String(out),
                Err(_) => value.clone(),
            }
        }
    }
}

/// Describe the available operations, for `feedwriter operations`.
pub fn operations_description() -> String {
    r#"Available transformation operations:

| Operation | Description | Parameters |
|-----------|-------------|------------|
| trim | Remove leading/trailing whitespace | - |
| uppercase | Convert to uppercase | - |
| lowercase | Convert to lowercase | - |
| replace | Regex pattern replacement | pattern: regex, value: replacement |
| extract_year | Extract 4-digit year from date | - |
| ensure_prefix | Add prefix if not present | value: prefix string |
| ensure_suffix | Add suffix if not present | value: suffix string |
| map | Map values using lookup table | mapping: {source: target}, case_insensitive: bool, default_unmapped: string |
| split | Split into array | separator: split string (default ",") |
| to_number | Convert to integer | - |
| substring | Extract substring | start: start index, length: optional length |
| digits_only | Keep only digits | - |
| format_date | Normalize a date | format: strftime pattern (default RFC 3339) |

Example operations in JSON:
[
  {"type": "trim"},
  {"type": "replace", "pattern": "\\s+", "value": " "},
  {"type": "map", "mapping": {"bb": "Brennen Bearnes"}, "case_insensitive": true},
  {"type": "format_date"}
]"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trim_and_case() {
        assert_eq!(Operation::Trim.apply(&json!("  hello  ")), json!("hello"));
        assert_eq!(Operation::Uppercase.apply(&json!("brennen")), json!("BRENNEN"));
        assert_eq!(Operation::Lowercase.apply(&json!("ABC")), json!("abc"));
        // Non-text values pass through.
        assert_eq!(Operation::Trim.apply(&json!(null)), json!(null));
    }

    #[test]
    fn test_replace() {
        let op = Operation::Replace {
            pattern: "[-. ]".into(),
            value: String::new(),
        };
        assert_eq!(op.apply(&json!("T-123.456 7")), json!("T1234567"));
    }

    #[test]
    fn test_map_keeps_unmatched_without_default() {
        let mut mapping = BTreeMap::new();
        mapping.insert("bb".to_string(), "Brennen Bearnes".to_string());

        let op = Operation::Map {
            mapping: mapping.clone(),
            case_insensitive: true,
            default_unmapped: None,
        };
        assert_eq!(op.apply(&json!("BB")), json!("Brennen Bearnes"));
        assert_eq!(op.apply(&json!("zz")), json!("zz"));

        let op = Operation::Map {
            mapping,
            case_insensitive: false,
            default_unmapped: Some("Anonymous".into()),
        };
        assert_eq!(op.apply(&json!("BB")), json!("Anonymous"));
    }

    #[test]
    fn test_case_insensitive_map_is_deterministic() {
        let mut mapping = BTreeMap::new();
        mapping.insert("bb".to_string(), "lower".to_string());
        mapping.insert("BB".to_string(), "upper".to_string());
        mapping.insert("Cc".to_string(), "mixed".to_string());
        mapping.insert("cC".to_string(), "other".to_string());

        let op = Operation::Map {
            mapping,
            case_insensitive: true,
            default_unmapped: None,
        };
        assert_eq!(op.apply(&json!("bb")), json!("lower"));
        assert_eq!(op.apply(&json!("BB")), json!("upper"));
        // "Cc" sorts before "cC"
        for _ in 0..10 {
            assert_eq!(op.apply(&json!("CC")), json!("mixed"));
        }
    }

    #[test]
    fn test_to_number_and_extract_year() {
        assert_eq!(Operation::ToNumber.apply(&json!("123-456")), json!(123456));
        assert_eq!(Operation::ToNumber.apply(&json!("-42")), json!(-42));
        assert_eq!(Operation::ToNumber.apply(&json!("none")), json!(null));
        assert_eq!(Operation::ExtractYear.apply(&json!("15/03/2024")), json!(2024));
    }

    #[test]
    fn test_split_and_substring() {
        let split = Operation::Split { separator: ",".into() };
        assert_eq!(split.apply(&json!("a, b,c")), json!(["a", "b", "c"]));

        let sub = Operation::Substring { start: 1, length: Some(3) };
        assert_eq!(sub.apply(&json!("écrire")), json!("cri"));
    }

    #[test]
    fn test_prefix_suffix_digits() {
        let op = Operation::EnsurePrefix { value: "https://".into() };
        assert_eq!(op.apply(&json!("example.com")), json!("https://example.com"));
        assert_eq!(op.apply(&json!("https://x")), json!("https://x"));

        let op = Operation::EnsureSuffix { value: "/".into() };
        assert_eq!(op.apply(&json!("a")), json!("a/"));

        assert_eq!(Operation::DigitsOnly.apply(&json!("a1b2")), json!("12"));
    }

    #[test]
    fn test_format_date() {
        let rfc = Operation::FormatDate { format: None };
        assert_eq!(rfc.apply(&json!("2013-02-14")), json!("2013-02-14T00:00:00Z"));

        let custom = Operation::FormatDate {
            format: Some("%d/%m/%Y".into()),
        };
        assert_eq!(custom.apply(&json!("2013-02-14")), json!("14/02/2013"));
        assert_eq!(custom.apply(&json!("soon")), json!("soon"));
    }

    #[test]
    fn test_validate() {
        let bad = Operation::Replace {
            pattern: "(".into(),
            value: String::new(),
        };
        assert!(bad.validate().is_err());
        let bad = Operation::FormatDate {
            format: Some("%Q".into()),
        };
        assert!(bad.validate().is_err());
        assert!(Operation::Trim.validate().is_ok());
    }

    #[test]
    fn test_deserialize_tagged() {
        let ops: Vec<Operation> =
            serde_json::from_value(json!([{"type": "trim"}, {"type": "split"}])).unwrap();
        assert_eq!(
            ops,
            vec![Operation::Trim, Operation::Split { separator: ",".into() }]
        );
    }
}
