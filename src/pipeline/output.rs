//! Serializes the per-source results into one aggregated document.
//!
//! Keys are written as-is; only values are escaped.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::constants::{FORMAT_CSV, FORMAT_JSON, FORMAT_XML, FORMAT_YAML};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Xml,
    Csv,
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => FORMAT_JSON,
            OutputFormat::Xml => FORMAT_XML,
            OutputFormat::Csv => FORMAT_CSV,
            OutputFormat::Yaml => FORMAT_YAML,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            FORMAT_JSON => Ok(OutputFormat::Json),
            FORMAT_XML => Ok(OutputFormat::Xml),
            FORMAT_CSV => Ok(OutputFormat::Csv),
            FORMAT_YAML => Ok(OutputFormat::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `results` (in the given order) as a single document.
pub fn format_output(results: &[(String, String)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let entries: Vec<String> = results
                .iter()
                .map(|(name, value)| format!("\"{}\": \"{}\"", name, escape_quoted(value)))
                .collect();
            format!("{{\"results\": {{{}}}}}", entries.join(","))
        }
        OutputFormat::Xml => {
            let entries: String = results
                .iter()
                .map(|(name, value)| {
                    format!(
                        "<Result><Name>{}</Name><Value>{}</Value></Result>",
                        name,
                        escape_xml(value)
                    )
                })
                .collect();
            format!("<Results>{}</Results>", entries)
        }
        OutputFormat::Csv => {
            let lines: Vec<String> = results
                .iter()
                .map(|(name, value)| format!("{},\"{}\"", name, value.replace('"', "\"\"")))
                .collect();
            format!("Name,Value\n{}", lines.join("\n"))
        }
        OutputFormat::Yaml => {
            let lines: Vec<String> = results
                .iter()
                .map(|(name, value)| format!("  {}: \"{}\"", name, escape_quoted(value)))
                .collect();
            format!("results:\n{}", lines.join("\n"))
        }
    }
}

/// Escaping shared by the JSON and YAML writers. Backslash goes first.
pub fn escape_quoted(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
