//! Candidate constraints.
//!
//! Every constraint compares a candidate against the unmodified input of the
//! attack. [`ConstraintSet`] applies a list of them through their batch form,
//! in order.

pub mod entity;
pub mod overlap;
pub mod pos;

pub use entity::NamedEntityConstraint;
pub use overlap::{LevenshteinEditDistance, MaxWordsPerturbed};
pub use pos::PartOfSpeechConstraint;

use crate::errors::Result;
use crate::pipeline::traits::Constraint;
use crate::types::{AttackInput, Candidate};

/// An ordered list of constraints, all of which must accept a candidate.
#[derive(Default)]
pub struct ConstraintSet {
    constraints: Vec<Box<dyn Constraint>>,
}

impl std::fmt::Debug for ConstraintSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.constraints.iter().map(|c| c.name()))
            .finish()
    }
}

impl ConstraintSet {
    /// An empty set, which accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, constraint: impl Constraint + 'static) {
        self.constraints.push(Box::new(constraint));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, constraint: impl Constraint + 'static) -> Self {
        self.push(constraint);
        self
    }

    pub fn push_boxed(&mut self, constraint: Box<dyn Constraint>) {
        self.constraints.push(constraint);
    }

    /// Run every constraint's batch predicate, stopping once nothing is left.
    pub fn filter(
        &self,
        original: &AttackInput,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<Candidate>> {
        let mut remaining = candidates;
        for constraint in &self.constraints {
            if remaining.is_empty() {
                break;
            }
            let before = remaining.len();
            remaining = constraint.satisfies_many(original, remaining)?;
            tracing::trace!(
                constraint = constraint.name(),
                before,
                after = remaining.len(),
                "constraint applied"
            );
        }
        Ok(remaining)
    }

    pub fn names(&self) -> Vec<&str> {
        self.constraints.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
