//! JSON export source
//!
//! Reads `.jsonl` files (one row per line) and `.json` files holding either
//! an array of rows or a `{ "data": [...] }` envelope.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::AppError;
use crate::source::record::SessionRecord;
use crate::source::{ParsedFile, Source};

/// Session export files matched by a glob pattern
pub(crate) struct JsonSource {
    pattern: String,
}

impl JsonSource {
    pub(crate) fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Default pattern under a data directory
    pub(crate) fn default_pattern(data_dir: &Path) -> String {
        format!("{}/sessions/**/*.json*", data_dir.display())
    }
}

impl Source for JsonSource {
    fn name(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "JSON export"
    }

    fn find_files(&self) -> Result<Vec<PathBuf>, AppError> {
        let entries = match glob::glob(&self.pattern) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(pattern = %self.pattern, "invalid input pattern: {err}");
                return Ok(Vec::new());
            }
        };
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .filter(|p| p.is_file() && is_session_file(p))
            .collect();
        files.sort();
        Ok(files)
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile, AppError> {
        Ok(parse_json_file(path))
    }
}

fn is_session_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("jsonl")
    )
}

/// Parse one export file. Unreadable files and malformed rows are skipped.
pub(crate) fn parse_json_file(path: &Path) -> ParsedFile {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(err) => {
            warn!("Failed to open {}: {}", path.display(), err);
            return ParsedFile::default();
        }
    };

    if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
        parse_lines(path, BufReader::new(file))
    } else {
        parse_document(path, BufReader::new(file))
    }
}

fn parse_lines<R: BufRead>(path: &Path, reader: R) -> ParsedFile {
    let mut records = Vec::new();
    let mut bad_lines = 0;
    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                debug!("Failed to read line {} in {}: {}", line_no + 1, path.display(), err);
                bad_lines += 1;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SessionRecord>(&line) {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!("Skipping line {} in {}: {}", line_no + 1, path.display(), err);
                bad_lines += 1;
            }
        }
    }
    let mut parsed = ParsedFile::from_records(records);
    parsed.skipped += bad_lines;
    parsed
}

fn parse_document<R: BufRead>(path: &Path, reader: R) -> ParsedFile {
    let value: serde_json::Value = match serde_json::from_reader(reader) {
        Ok(v) => v,
        Err(err) => {
            warn!("Failed to parse {}: {}", path.display(), err);
            return ParsedFile::default();
        }
    };
    let rows = match value {
        serde_json::Value::Array(rows) => rows,
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(serde_json::Value::Array(rows)) => rows,
            _ => {
                warn!("No session rows in {}", path.display());
                return ParsedFile::default();
            }
        },
        _ => {
            warn!("No session rows in {}", path.display());
            return ParsedFile::default();
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    let mut bad_rows = 0;
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<SessionRecord>(row) {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!("Skipping row {} in {}: {}", index, path.display(), err);
                bad_rows += 1;
            }
        }
    }
    let mut parsed = ParsedFile::from_records(records);
    parsed.skipped += bad_rows;
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn jsonl_counts_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "a.jsonl",
            concat!(
                r#"{"id":"s1","title":"A","start_time":"2025-01-06T09:00:00Z"}"#,
                "\n\nnot json\n",
                r#"{"title":"no id","start_time":"2025-01-06T09:00:00Z"}"#,
                "\n"
            ),
        );
        let parsed = parse_json_file(&path);
        assert_eq!(parsed.sessions.len(), 1);
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn json_array_and_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let array = write(
            dir.path(),
            "array.json",
            r#"[{"id":"s1","start_time":"2025-01-06T09:00:00Z"},{"id":"s2","start_time":"2025-01-06T10:00:00Z"}]"#,
        );
        let envelope = write(
            dir.path(),
            "envelope.json",
            r#"{"data":[{"id":"s3","start_time":"2025-01-06T09:00:00Z"}],"count":1}"#,
        );
        assert_eq!(parse_json_file(&array).sessions.len(), 2);
        assert_eq!(parse_json_file(&envelope).sessions.len(), 1);
    }

    #[test]
    fn json_without_rows_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "other.json", r#"{"hello":"world"}"#);
        let parsed = parse_json_file(&path);
        assert!(parsed.sessions.is_empty());
    }

    #[test]
    fn find_files_matches_nested_exports() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sessions/2025/01.jsonl", "");
        write(dir.path(), "sessions/extra.json", "[]");
        write(dir.path(), "sessions/notes.txt", "");
        let source = JsonSource::new(JsonSource::default_pattern(dir.path()));
        let files = source.find_files().unwrap();
        assert_eq!(files.len(), 2);
    }
}
