//! Source to destination user name mapping.

use std::collections::HashMap;

/// Static table translating Jira user names into GitLab user names.
///
/// Names without an entry pass through [`IdentityMap::resolve`] unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    names: HashMap<String, String>,
}

impl IdentityMap {
    /// Creates a map from `(jira name, gitlab name)` pairs.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        }
    }

    /// Returns the mapped GitLab name, if the Jira name has an entry.
    pub fn get(&self, source_name: &str) -> Option<&str> {
        self.names.get(source_name).map(String::as_str)
    }

    /// Returns the mapped GitLab name, or the Jira name itself when unmapped.
    pub fn resolve<'a>(&'a self, source_name: &'a str) -> &'a str {
        self.get(source_name).unwrap_or(source_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<HashMap<String, String>> for IdentityMap {
    fn from(names: HashMap<String, String>) -> Self {
        Self { names }
    }
}
