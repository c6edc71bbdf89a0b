//! Text tokenization

/// Splits text into search tokens
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Lowercases and splits on every character that is not alphanumeric
///
/// Tokens shorter than `min_length` characters are dropped. Duplicates are kept;
/// the score map collapses them.
#[derive(Debug, Clone)]
pub struct WhitespaceTokenizer {
    min_length: usize,
}

impl WhitespaceTokenizer {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for WhitespaceTokenizer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| word.chars().count() >= self.min_length.max(1))
            .map(str::to_lowercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_splits_and_lowercases() {
        let tokens = WhitespaceTokenizer::default().tokenize("Red Shoes, size-42!");
        assert_eq!(tokens, vec!["red", "shoes", "size", "42"]);
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        assert!(WhitespaceTokenizer::default().tokenize("").is_empty());
        assert!(WhitespaceTokenizer::default().tokenize("  -- ").is_empty());
    }

    #[test]
    fn test_min_length_counts_characters() {
        let tokens = WhitespaceTokenizer::new(3).tokenize("ab über xyz");
        assert_eq!(tokens, vec!["über", "xyz"]);
    }
}
