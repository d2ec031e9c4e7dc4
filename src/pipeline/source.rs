use serde::{Deserialize, Serialize};
use std::fmt;

/// The four kinds of source the pipeline can read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    File,
    Database,
    Api,
    Stream,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::File => "File",
            SourceKind::Database => "Database",
            SourceKind::Api => "Api",
            SourceKind::Stream => "Stream",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific locator for a source.
///
/// Each variant carries exactly the field its kind requires, so a source can
/// never hold a locator for the wrong kind. Emptiness is still checked at fetch
/// time since the value comes from user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceLocator {
    File { path: String },
    Database { query: String },
    Api { url: String },
    Stream,
}

/// One named unit of input to a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    #[serde(flatten)]
    pub locator: SourceLocator,
}

impl DataSource {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: SourceLocator::File { path: path.into() },
        }
    }

    pub fn database(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: SourceLocator::Database {
                query: query.into(),
            },
        }
    }

    pub fn api(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: SourceLocator::Api { url: url.into() },
        }
    }

    pub fn stream(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: SourceLocator::Stream,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self.locator {
            SourceLocator::File { .. } => SourceKind::File,
            SourceLocator::Database { .. } => SourceKind::Database,
            SourceLocator::Api { .. } => SourceKind::Api,
            SourceLocator::Stream => SourceKind::Stream,
        }
    }
}
