use crate::app::ports::DatabasePort;
use async_trait::async_trait;
use std::collections::HashMap;

/// Database stand-in that answers queries from a fixed query → text table.
#[derive(Debug, Default, Clone)]
pub struct StaticDatabase {
    fixtures: HashMap<String, String>,
}

impl StaticDatabase {
    pub fn new(fixtures: HashMap<String, String>) -> Self {
        Self { fixtures }
    }

    pub fn with(mut self, query: impl Into<String>, text: impl Into<String>) -> Self {
        self.fixtures.insert(query.into(), text.into());
        self
    }
}

#[async_trait]
impl DatabasePort for StaticDatabase {
    async fn execute(&self, query: &str) -> Result<String, String> {
        self.fixtures
            .get(query)
            .cloned()
            .ok_or_else(|| format!("no result configured for query: {}", query))
    }
}
