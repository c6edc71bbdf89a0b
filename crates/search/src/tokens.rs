//! Weighted token maps

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Text sources of a product and the score each contributes to its tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankedField {
    Name,
    Keywords,
    MetaTitle,
    ManufacturerName,
    ManufacturerMetaTitle,
    /// Short and long description, tokenized together and filtered once
    Description,
}

impl RankedField {
    /// All fields in descending weight order
    pub const ALL: [RankedField; 6] = [
        RankedField::Name,
        RankedField::Keywords,
        RankedField::MetaTitle,
        RankedField::ManufacturerName,
        RankedField::ManufacturerMetaTitle,
        RankedField::Description,
    ];

    pub fn weight(self) -> f32 {
        match self {
            RankedField::Name => 500.0,
            RankedField::Keywords => 400.0,
            RankedField::MetaTitle => 200.0,
            RankedField::ManufacturerName => 100.0,
            RankedField::ManufacturerMetaTitle => 50.0,
            RankedField::Description => 5.0,
        }
    }
}

/// Token to score, in first-seen order
///
/// Merging keeps the maximum score per token; scores never add up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenScoreMap(IndexMap<String, f32>);

impl TokenScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `tokens` at `weight`, keeping the higher score for known tokens
    pub fn merge<I>(&mut self, tokens: I, weight: f32)
    where
        I: IntoIterator<Item = String>,
    {
        for token in tokens {
            let score = self.0.entry(token).or_insert(weight);
            *score = score.max(weight);
        }
    }

    pub fn get(&self, token: &str) -> Option<f32> {
        self.0.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(token, score)| (token.as_str(), *score))
    }

    /// Tokens sorted by descending score, ties in first-seen order
    pub fn ranked(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl FromIterator<(String, f32)> for TokenScoreMap {
    fn from_iter<T: IntoIterator<Item = (String, f32)>>(iter: T) -> Self {
        let mut map = TokenScoreMap::new();
        for (token, weight) in iter {
            map.merge([token], weight);
        }
        map
    }
}
