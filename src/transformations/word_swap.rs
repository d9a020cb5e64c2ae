//! Position iteration shared by every word-level transformation.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use crate::errors::Result;
use crate::nlp::stopwords::StopwordFilter;
use crate::nlp::tokenizer::Tokenizer;
use crate::pipeline::traits::{Transformation, WordSwap};
use crate::types::{AttackConfig, AttackInput, Candidate};

/// Turns a [`WordSwap`] into a [`Transformation`].
///
/// For every position that is neither visited nor a stop-word, asks the swap
/// for replacements and keeps at most `max_candidates` of them after
/// dropping:
///
/// - the original word itself
/// - anything the tokenizer would not keep as exactly one word (empty
///   strings, whitespace, trailing punctuation)
/// - repeats of an earlier replacement
///
/// Candidates come out in position order, then in the swap's order.
#[derive(Debug, Clone)]
pub struct WordSwapTransformation<S> {
    swap: S,
    stopwords: StopwordFilter,
    max_candidates: usize,
    tokenizer: Tokenizer,
}

impl<S: WordSwap> WordSwapTransformation<S> {
    /// Wrap `swap` with the default configuration.
    pub fn new(swap: S) -> Self {
        Self::from_config(swap, &AttackConfig::default())
    }

    /// Wrap `swap`, taking the stop-word list and per-word cap from `config`.
    pub fn from_config(swap: S, config: &AttackConfig) -> Self {
        Self {
            swap,
            stopwords: config.stopword_filter(),
            max_candidates: config.max_candidates,
            tokenizer: Tokenizer::new(),
        }
    }

    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn swap(&self) -> &S {
        &self.swap
    }

    fn replacements_for(&self, word: &str) -> Result<Vec<String>> {
        let mut seen = FxHashSet::default();
        let mut kept = Vec::new();
        for replacement in self.swap.get_replacements(word)? {
            if kept.len() >= self.max_candidates {
                break;
            }
            if replacement == word || !self.tokenizer.is_single_word(&replacement) {
                continue;
            }
            if seen.insert(replacement.clone()) {
                kept.push(replacement);
            }
        }
        Ok(kept)
    }
}

impl<S: WordSwap> Transformation for WordSwapTransformation<S> {
    fn generate(&self, input: &AttackInput, visited: &BTreeSet<usize>) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for (position, word) in input.words().into_iter().enumerate() {
            if visited.contains(&position) || self.stopwords.is_stopword(word) {
                continue;
            }
            for replacement in self.replacements_for(word)? {
                candidates.push(Candidate::new(input, position, replacement)?);
            }
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformations::WordSwapLexicon;

    fn lexicon() -> WordSwapLexicon {
        WordSwapLexicon::new()
            .with_entry("Worst", ["Best", "Great", "Grandest"])
            .with_entry("hot", ["hot", "warm", "warm", "very warm", "", "cold!"])
            .with_entry("ever", ["never"])
    }

    #[test]
    fn test_generation_order_and_filtering() {
        let transformation = WordSwapTransformation::new(lexicon());
        let input = AttackInput::new("Worst hot dog ever.");
        let texts: Vec<String> = transformation
            .generate(&input, &BTreeSet::new())
            .unwrap()
            .iter()
            .map(|c| c.text().to_string())
            .collect();

        // "ever" is a stop-word; "hot" keeps only the first "warm".
        assert_eq!(
            texts,
            vec![
                "Best hot dog ever.",
                "Great hot dog ever.",
                "Grandest hot dog ever.",
                "Worst warm dog ever.",
            ]
        );
    }

    #[test]
    fn test_visited_positions_skipped() {
        let transformation = WordSwapTransformation::new(lexicon());
        let input = AttackInput::new("Worst hot dog ever.");
        let visited: BTreeSet<usize> = [0].into_iter().collect();
        let candidates = transformation.generate(&input, &visited).unwrap();

        assert!(candidates.iter().all(|c| c.position != 0));
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_stopwords_can_be_disabled() {
        let config = AttackConfig::default().with_skip_stopwords(false);
        let transformation = WordSwapTransformation::from_config(lexicon(), &config);
        let input = AttackInput::new("Worst hot dog ever.");
        let candidates = transformation.generate(&input, &BTreeSet::new()).unwrap();

        assert!(candidates.iter().any(|c| c.replacement == "never"));
    }

    #[test]
    fn test_max_candidates_cap() {
        let transformation = WordSwapTransformation::new(lexicon()).with_max_candidates(2);
        let input = AttackInput::new("Worst");
        let candidates = transformation.generate(&input, &BTreeSet::new()).unwrap();

        let replacements: Vec<&str> = candidates.iter().map(|c| c.replacement.as_str()).collect();
        assert_eq!(replacements, vec!["Best", "Great"]);
    }

    #[test]
    fn test_deterministic() {
        let transformation = WordSwapTransformation::new(lexicon());
        let input = AttackInput::new("Worst hot dog ever.");
        let a = transformation.generate(&input, &BTreeSet::new()).unwrap();
        let b = transformation.generate(&input, &BTreeSet::new()).unwrap();
        assert_eq!(a, b);
    }
}
