//! Several word swaps combined into one.

use rustc_hash::FxHashSet;

use crate::errors::Result;
use crate::pipeline::traits::WordSwap;

/// Concatenates the replacements of several swaps, in order.
///
/// A replacement produced by more than one swap is kept at its first
/// occurrence only.
#[derive(Default)]
pub struct CompositeWordSwap {
    swaps: Vec<Box<dyn WordSwap + Send + Sync>>,
}

impl std::fmt::Debug for CompositeWordSwap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeWordSwap")
            .field("swaps", &self.swaps.len())
            .finish()
    }
}

impl CompositeWordSwap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, swap: impl WordSwap + Send + Sync + 'static) {
        self.swaps.push(Box::new(swap));
    }

    pub fn with(mut self, swap: impl WordSwap + Send + Sync + 'static) -> Self {
        self.push(swap);
        self
    }

    pub fn len(&self) -> usize {
        self.swaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }
}

impl WordSwap for CompositeWordSwap {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for swap in &self.swaps {
            for replacement in swap.get_replacements(word)? {
                if seen.insert(replacement.clone()) {
                    out.push(replacement);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformations::{RandomCharacterDeletion, WordSwapLexicon};

    #[test]
    fn test_concatenates_in_order_and_dedups() {
        let composite = CompositeWordSwap::new()
            .with(WordSwapLexicon::new().with_entry("abc", ["bc", "xyz"]))
            .with(RandomCharacterDeletion::new().with_random_one(false));

        assert_eq!(composite.len(), 2);
        assert_eq!(
            composite.get_replacements("abc").unwrap(),
            vec!["bc", "xyz", "ac", "ab"]
        );
    }

    #[test]
    fn test_empty_composite() {
        let composite = CompositeWordSwap::new();
        assert!(composite.is_empty());
        assert!(composite.get_replacements("abc").unwrap().is_empty());
    }
}
