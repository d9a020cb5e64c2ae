//! Unicode-aware word segmentation
//!
//! This module provides UAX #29 compliant word segmentation. The tokenizer
//! only decides *where* words are; everything between two words (whitespace,
//! punctuation) is kept verbatim so that a perturbed text can be rebuilt
//! exactly around its substituted words.

use crate::types::WordSpan;
use unicode_segmentation::UnicodeSegmentation;

/// A Unicode-aware word tokenizer following UAX #29
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Minimum word length (in chars) to treat a segment as a word
    min_token_length: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Create a new tokenizer with default settings
    pub fn new() -> Self {
        Self {
            min_token_length: 1,
        }
    }

    /// Set minimum token length
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_token_length = min_length.max(1);
        self
    }

    /// Segment `text` into word spans (byte offsets, in document order).
    ///
    /// Pure punctuation and symbol segments are never words. Contractions
    /// such as "don't" stay a single word.
    pub fn words(&self, text: &str) -> Vec<WordSpan> {
        text.unicode_word_indices()
            .filter(|(_, word)| word.chars().count() >= self.min_token_length)
            .filter(|(_, word)| word.chars().any(|c| c.is_alphanumeric()))
            .map(|(start, word)| WordSpan::new(start, start + word.len()))
            .collect()
    }

    /// Check whether `word` would be kept as a single word by this tokenizer.
    ///
    /// Replacement words that fail this check would change the tokenization
    /// of the perturbed text.
    pub fn is_single_word(&self, word: &str) -> bool {
        let spans = self.words(word);
        spans.len() == 1 && spans[0].start == 0 && spans[0].end == word.len()
    }
}
