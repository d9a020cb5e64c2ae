//! Part-of-speech constraint.

use std::sync::Arc;

use crate::cache::FeatureCache;
use crate::errors::Result;
use crate::pipeline::traits::{Constraint, Tagger};
use crate::types::{AttackInput, Candidate};

/// Requires a substituted word to keep the tag of the word it replaced.
///
/// The comparison is between the candidate and the text it was derived
/// from, so earlier committed swaps do not count against it. Both texts
/// come from the shared [`FeatureCache`]; the current text is usually a
/// hit since every sibling candidate shares it.
pub struct PartOfSpeechConstraint<T> {
    cache: Arc<FeatureCache<T>>,
}

impl<T> PartOfSpeechConstraint<T> {
    pub fn new(cache: Arc<FeatureCache<T>>) -> Self {
        Self { cache }
    }
}

impl<T: Tagger + Send + Sync> Constraint for PartOfSpeechConstraint<T> {
    fn name(&self) -> &str {
        "part_of_speech"
    }

    fn satisfies(&self, _original: &AttackInput, candidate: &Candidate) -> Result<bool> {
        let current = candidate
            .input
            .replace_word(candidate.position, &candidate.original_word)?;

        let before = self.cache.get_or_compute(current.text())?;
        let after = self.cache.get_or_compute(candidate.text())?;
        if before.len() != after.len() {
            return Ok(false);
        }

        Ok(before
            .iter()
            .zip(after.iter())
            .filter(|(a, b)| a.word != b.word)
            .all(|(a, b)| a.tag == b.tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::traits::TaggedWord;

    /// Toy tagger: a handful of adjectives and nouns, everything else "X".
    struct ToyTagger;

    impl Tagger for ToyTagger {
        fn tag(&self, sentence: &str) -> Result<Vec<TaggedWord>> {
            Ok(sentence
                .split_whitespace()
                .map(|w| {
                    let tag = match w {
                        "good" | "great" | "fine" | "bad" => "ADJ",
                        "film" | "movie" | "plot" => "NOUN",
                        _ => "X",
                    };
                    TaggedWord::new(w, tag)
                })
                .collect())
        }

        fn is_entity(&self, _tag: &str) -> bool {
            false
        }
    }

    fn constraint() -> PartOfSpeechConstraint<ToyTagger> {
        PartOfSpeechConstraint::new(Arc::new(FeatureCache::new(ToyTagger, 16).unwrap()))
    }

    #[test]
    fn test_same_tag_accepted() {
        let original = AttackInput::new("a good film");
        let candidate = Candidate::new(&original, 1, "bad").unwrap();
        assert!(constraint().satisfies(&original, &candidate).unwrap());
    }

    #[test]
    fn test_changed_tag_rejected() {
        let original = AttackInput::new("a good film");
        let candidate = Candidate::new(&original, 1, "plot").unwrap();
        assert!(!constraint().satisfies(&original, &candidate).unwrap());
    }

    #[test]
    fn test_compares_against_current_text() {
        let original = AttackInput::new("a good film");
        // "film" -> "plot" was committed earlier; only the new swap is checked.
        let current = original.replace_word(2, "plot").unwrap();
        let candidate = Candidate::new(&current, 1, "fine").unwrap();
        assert!(constraint().satisfies(&original, &candidate).unwrap());
    }
}
