use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_FORMAT, DEFAULT_TIMEOUT_MS};
use crate::error::{ConfigError, Result};
use crate::pipeline::processing::validate::ValidationRules;
use crate::pipeline::{DataSource, RunRequest};

/// A pipeline run described in TOML.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub sources: Vec<DataSource>,
    pub chain: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_compression_level")]
    pub compression_level: i64,
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Stream source name → literal payload.
    #[serde(default)]
    pub streams: HashMap<String, String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Query → result text served by the database stand-in.
    #[serde(default)]
    pub fixtures: HashMap<String, String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the rolling JSON log file; console only when unset.
    pub dir: Option<String>,
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: Option<String>,
}

/// Declarative validation rule.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    #[serde(flatten)]
    pub check: RuleCheck,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RuleCheck {
    NonEmpty,
    MinLength { min: usize },
    MaxLength { max: usize },
    Contains { needle: String },
    Matches { pattern: String },
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_compression_level() -> i64 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_cache_enabled() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Compile the declarative rules, in file order.
    pub fn validation_rules(&self) -> Result<ValidationRules> {
        let mut rules = ValidationRules::new();
        for spec in &self.rules {
            spec.register(&mut rules)?;
        }
        Ok(rules)
    }

    pub fn to_request(&self) -> Result<RunRequest> {
        Ok(RunRequest::new(self.sources.clone(), self.chain.clone())
            .rules(self.validation_rules()?)
            .format(self.format.clone())
            .compression_level(self.compression_level)
            .cache_enabled(self.cache_enabled)
            .timeout_ms(self.timeout_ms))
    }
}

impl RuleSpec {
    fn register(&self, rules: &mut ValidationRules) -> Result<()> {
        let name = self.name.clone();
        match self.check.clone() {
            RuleCheck::NonEmpty => rules.add(name, |s: &str| !s.is_empty()),
            RuleCheck::MinLength { min } => rules.add(name, move |s: &str| s.chars().count() >= min),
            RuleCheck::MaxLength { max } => rules.add(name, move |s: &str| s.chars().count() <= max),
            RuleCheck::Contains { needle } => rules.add(name, move |s: &str| s.contains(needle.as_str())),
            RuleCheck::Matches { pattern } => {
                let re = Regex::new(&pattern).map_err(|e| ConfigError::InvalidRule {
                    name: self.name.clone(),
                    message: e.to_string(),
                })?;
                rules.add(name, move |s: &str| re.is_match(s));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::validate::Verdict;
    use crate::pipeline::SourceKind;

    const SAMPLE: &str = r#"
        chain = ["uppercase", "reverse"]
        format = "xml"
        compression_level = 0

        [[sources]]
        name = "notes"
        kind = "file"
        path = "data/notes.txt"

        [[sources]]
        name = "users"
        kind = "database"
        query = "SELECT name FROM users"

        [[sources]]
        name = "ticker"
        kind = "stream"

        [[rules]]
        name = "not_empty"
        check = "non_empty"

        [[rules]]
        name = "short"
        check = "max_length"
        max = 5

        [database.fixtures]
        "SELECT name FROM users" = "ann,bob"

        [streams]
        ticker = "tick"
    "#;

    #[test]
    fn test_parses_full_config() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.chain, vec!["uppercase", "reverse"]);
        assert_eq!(config.sources.len(), 3);
        assert_eq!(config.sources[1].kind(), SourceKind::Database);
        assert_eq!(config.format, "xml");
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.cache_enabled);
        assert_eq!(config.database.fixtures["SELECT name FROM users"], "ann,bob");
        assert_eq!(config.streams["ticker"], "tick");
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_defaults_apply() {
        let config = Config::from_toml(
            r#"
            chain = ["hash"]
            [[sources]]
            name = "s"
            kind = "stream"
            "#,
        )
        .unwrap();
        assert_eq!(config.format, "json");
        assert_eq!(config.compression_level, 5);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_rules_compile_in_file_order() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let rules = config.validation_rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.validate("abc"), Verdict::Pass);
        assert_eq!(rules.validate(""), Verdict::Fail { rule: "not_empty".into() });
        assert_eq!(rules.validate("abcdef"), Verdict::Fail { rule: "short".into() });
    }

    #[test]
    fn test_regex_rule() {
        let config = Config::from_toml(
            r#"
            chain = ["uppercase"]
            [[sources]]
            name = "s"
            kind = "stream"
            [[rules]]
            name = "digits"
            check = "matches"
            pattern = "^[0-9]+$"
            "#,
        )
        .unwrap();
        let rules = config.validation_rules().unwrap();
        assert_eq!(rules.validate("123"), Verdict::Pass);
        assert_eq!(rules.validate("12a"), Verdict::Fail { rule: "digits".into() });
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let config = Config::from_toml(
            r#"
            chain = ["uppercase"]
            [[sources]]
            name = "s"
            kind = "stream"
            [[rules]]
            name = "broken"
            check = "matches"
            pattern = "(unclosed"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.validation_rules(),
            Err(ConfigError::InvalidRule { ref name, .. }) if name == "broken"
        ));
    }

    #[test]
    fn test_unknown_source_kind_is_rejected() {
        let result = Config::from_toml(
            r#"
            chain = ["uppercase"]
            [[sources]]
            name = "s"
            kind = "ftp"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
