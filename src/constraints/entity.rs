//! Named-entity constraint.
//!
//! Only lets a candidate through when every word it changed is a named
//! entity in both texts, so entities can be swapped for other entities
//! while the rest of the sentence stays intact.

use std::sync::Arc;

use crate::cache::FeatureCache;
use crate::errors::Result;
use crate::pipeline::traits::{Constraint, TaggedWord, Tagger};
use crate::types::{AttackInput, Candidate};

/// Restricts substitutions to named-entity positions.
///
/// A candidate is rejected when:
///
/// - the original text contains no entity at all
/// - the two texts contain a different number of entities
/// - the tagger produced tag sequences of different lengths
/// - any differing word is not an entity in both texts
pub struct NamedEntityConstraint<T> {
    cache: Arc<FeatureCache<T>>,
}

impl<T> NamedEntityConstraint<T> {
    pub fn new(cache: Arc<FeatureCache<T>>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<FeatureCache<T>> {
        &self.cache
    }
}

impl<T: Tagger> NamedEntityConstraint<T> {
    fn entity_count(&self, tags: &[TaggedWord]) -> usize {
        tags.iter().filter(|t| self.cache.is_entity(&t.tag)).count()
    }
}

impl<T: Tagger + Send + Sync> Constraint for NamedEntityConstraint<T> {
    fn name(&self) -> &str {
        "named_entity"
    }

    fn satisfies(&self, original: &AttackInput, candidate: &Candidate) -> Result<bool> {
        let before = self.cache.get_or_compute(original.text())?;
        let original_entities = self.entity_count(&before);
        if original_entities == 0 {
            return Ok(false);
        }

        let after = self.cache.get_or_compute(candidate.text())?;
        if self.entity_count(&after) != original_entities {
            return Ok(false);
        }
        if before.len() != after.len() {
            return Ok(false);
        }

        let accepted = before.iter().zip(after.iter()).all(|(a, b)| {
            a.word == b.word || (self.cache.is_entity(&a.tag) && self.cache.is_entity(&b.tag))
        });
        Ok(accepted)
    }
}
