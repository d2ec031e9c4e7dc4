//! Source-specific canonicalization of validated text.
//!
//! Normalization is total: every input yields an output, nothing fails here.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::pipeline::source::{DataSource, SourceLocator};

/// Normalize `data` according to where it came from.
pub fn normalize(source: &DataSource, data: &str) -> String {
    match &source.locator {
        SourceLocator::File { path } => normalize_file(data, path),
        SourceLocator::Database { .. } => data.to_string(),
        SourceLocator::Api { url } => normalize_api(data, url),
        SourceLocator::Stream => normalize_stream(data),
    }
}

/// Dispatch on the (case-insensitive) file extension.
pub fn normalize_file(data: &str, path: &str) -> String {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => normalize_json(data),
        Some("xml") => normalize_xml(data),
        Some("csv") => normalize_csv(data),
        _ => normalize_text(data),
    }
}

pub fn normalize_api(data: &str, url: &str) -> String {
    if url.contains("/json") {
        normalize_json(data)
    } else if url.contains("/xml") {
        normalize_xml(data)
    } else {
        data.to_string()
    }
}

/// Strip every space, newline and carriage return.
pub fn normalize_json(data: &str) -> String {
    data.chars()
        .filter(|c| !matches!(c, ' ' | '\n' | '\r'))
        .collect()
}

/// Collapse whitespace runs sitting between a closing `>` and an opening `<`.
pub fn normalize_xml(data: &str) -> String {
    static BETWEEN_TAGS: OnceLock<Regex> = OnceLock::new();
    let re = BETWEEN_TAGS.get_or_init(|| Regex::new(r">\s+<").expect("static regex is valid"));
    re.replace_all(data, "><").into_owned()
}

/// Trim every field of every line; lines split on `\n` or `\r\n`.
pub fn normalize_csv(data: &str) -> String {
    data.split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            line.split(',').map(str::trim).collect::<Vec<_>>().join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn normalize_text(data: &str) -> String {
    data.trim().replace("\r\n", "\n")
}

/// Drop ASCII control characters (0x00-0x1F), then trim.
pub fn normalize_stream(data: &str) -> String {
    let cleaned: String = data.chars().filter(|c| !matches!(c, '\u{00}'..='\u{1F}')).collect();
    cleaned.trim().to_string()
}
