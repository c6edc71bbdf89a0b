//! Context-aware token filtering for low-weight text

use catalog_core::ShopId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Shop and language the analysis runs for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContext {
    pub shop_id: ShopId,
    pub language: String,
}

impl SearchContext {
    pub fn new(shop_id: ShopId, language: impl Into<String>) -> Self {
        Self {
            shop_id,
            language: language.into(),
        }
    }
}

/// Removes tokens that carry no search relevance in a context
pub trait SearchFilter: Send + Sync {
    fn filter(&self, tokens: Vec<String>, context: &SearchContext) -> Vec<String>;
}

/// Keeps every token
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughFilter;

impl SearchFilter for PassThroughFilter {
    fn filter(&self, tokens: Vec<String>, _context: &SearchContext) -> Vec<String> {
        tokens
    }
}

/// Drops short tokens and per-language stopwords
#[derive(Debug, Clone, Default)]
pub struct StopwordFilter {
    min_length: usize,
    stopwords: Vec<(String, HashSet<String>)>,
}

impl StopwordFilter {
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            stopwords: Vec::new(),
        }
    }

    /// Register stopwords for `language`, compared case-insensitively
    pub fn with_stopwords<I, S>(mut self, language: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words.into_iter().map(|w| w.as_ref().to_lowercase());
        match self.stopwords.iter_mut().find(|(lang, _)| lang == language) {
            Some((_, set)) => set.extend(words),
            None => self
                .stopwords
                .push((language.to_string(), words.collect())),
        }
        self
    }

    fn stopwords_for(&self, language: &str) -> Option<&HashSet<String>> {
        self.stopwords
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, set)| set)
    }
}

impl SearchFilter for StopwordFilter {
    fn filter(&self, tokens: Vec<String>, context: &SearchContext) -> Vec<String> {
        let stopwords = self.stopwords_for(&context.language);
        tokens
            .into_iter()
            .filter(|token| token.chars().count() >= self.min_length)
            .filter(|token| stopwords.is_none_or(|set| !set.contains(&token.to_lowercase())))
            .collect()
    }
}
