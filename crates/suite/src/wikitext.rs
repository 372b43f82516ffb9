//! Wikitext fixtures

use std::fmt;

use chrono::Utc;

/// Prefix of throwaway articles created by the suite
pub const ARTICLE_NAME_PREFIX: &str = "QAarticle";

/// `QAarticle<millis>`, unique per call site in practice
pub fn article_name() -> String {
    format!("{}{}", ARTICLE_NAME_PREFIX, Utc::now().timestamp_millis())
}

/// A category link as it appears in article source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryWikiText {
    pub name: String,
    pub sort_key: Option<String>,
}

impl CategoryWikiText {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort_key: None,
        }
    }

    pub fn with_sort_key(name: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort_key: Some(sort_key.into()),
        }
    }
}

impl fmt::Display for CategoryWikiText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sort_key {
            Some(key) => write!(f, "[[Category:{}|{}]]", self.name, key),
            None => write!(f, "[[Category:{}]]", self.name),
        }
    }
}
