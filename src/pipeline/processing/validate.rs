use std::fmt;
use std::sync::Arc;

pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Named predicates over transformed text, evaluated in insertion order.
#[derive(Clone, Default)]
pub struct ValidationRules {
    rules: Vec<(String, Predicate)>,
}

/// Outcome of validating one source's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail { rule: String },
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.add(name, predicate);
        self
    }

    pub fn add<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let predicate: Predicate = Arc::new(predicate);
        self.rules.push((name.into(), predicate));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Stops at the first failing rule. An empty rule set always passes.
    pub fn validate(&self, text: &str) -> Verdict {
        self.rules
            .iter()
            .find(|(_, predicate)| !predicate(text))
            .map_or(Verdict::Pass, |(name, _)| Verdict::Fail { rule: name.clone() })
    }
}

impl fmt::Debug for ValidationRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|(name, _)| name))
            .finish()
    }
}
