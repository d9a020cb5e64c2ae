//! Attack runner: wires the four components together and drives one input
//! (or a whole dataset) to a terminal [`AttackResult`].
//!
//! # Static dispatch
//!
//! [`Attack`] is generic over its transformation, goal function, and search
//! method, so each combination is monomorphized. Constraints are the one
//! open-ended list and are stored as trait objects in a [`ConstraintSet`].
//! [`DynAttack`] is the fully boxed form used when components are chosen at
//! runtime.
//!
//! # Outcomes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | goal already met on the original | `Ok(Skipped)`, transformation never called |
//! | goal reached by the search | `Ok(Succeeded)` |
//! | candidates or positions exhausted | `Ok(Failed)` |
//! | model / tagger / lookup fault | `Err(..)` for this input only |

use rayon::prelude::*;

use crate::constraints::ConstraintSet;
use crate::errors::{AttackError, Result};
use crate::pipeline::observer::{AttackObserver, NoopObserver};
use crate::pipeline::traits::{GoalFunction, SearchMethod, Transformation};
use crate::search::{SearchOutcome, SearchSpace, SearchState};
use crate::types::{AttackInput, AttackResult};

/// One configured attack.
#[derive(Debug)]
pub struct Attack<T, G, S> {
    transformation: T,
    constraints: ConstraintSet,
    goal: G,
    search: S,
}

/// An attack assembled from boxed components.
pub type DynAttack = Attack<
    Box<dyn Transformation + Send + Sync>,
    Box<dyn GoalFunction + Send + Sync>,
    Box<dyn SearchMethod + Send + Sync>,
>;

impl<T, G, S> Attack<T, G, S>
where
    T: Transformation,
    G: GoalFunction,
    S: SearchMethod,
{
    pub fn new(transformation: T, constraints: ConstraintSet, goal: G, search: S) -> Self {
        Self {
            transformation,
            constraints,
            goal,
            search,
        }
    }

    pub fn transformation(&self) -> &T {
        &self.transformation
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn goal(&self) -> &G {
        &self.goal
    }

    pub fn search_method(&self) -> &S {
        &self.search
    }

    /// Take the attack apart, e.g. to re-box its components.
    pub fn into_parts(self) -> (T, ConstraintSet, G, S) {
        (self.transformation, self.constraints, self.goal, self.search)
    }

    /// Attack one input.
    pub fn attack(&self, input: &AttackInput) -> Result<AttackResult> {
        self.attack_observed(input, &mut NoopObserver)
    }

    /// Attack one input, reporting progress to `observer`.
    pub fn attack_observed<O: AttackObserver>(
        &self,
        input: &AttackInput,
        observer: &mut O,
    ) -> Result<AttackResult> {
        let _span = tracing::info_span!("attack", words = input.num_words()).entered();

        if input.num_words() == 0 {
            return Err(AttackError::empty_input(format!(
                "no words to perturb in {:?}",
                input.text()
            )));
        }
        observer.on_attack_start(input);

        let prediction = self.goal.predict(input)?;
        let reference = self.goal.reference(input, prediction);
        let initial = self.goal.score(&reference, &reference.prediction);

        let (state, result) = if initial.goal_achieved {
            let result = AttackResult::Skipped {
                original: input.clone(),
                original_prediction: reference.prediction.clone(),
                queries: 1,
            };
            (SearchState::Skipped, result)
        } else {
            let mut space = SearchSpace::new(
                input,
                &reference,
                initial,
                &self.transformation,
                &self.constraints,
                &self.goal,
                observer,
            );
            let outcome = self.search.search(&mut space)?;
            let queries = space.queries();
            match outcome {
                SearchOutcome::Succeeded {
                    perturbed,
                    prediction,
                } => (
                    SearchState::Succeeded,
                    AttackResult::Succeeded {
                        original: input.clone(),
                        perturbed,
                        original_prediction: reference.prediction.clone(),
                        perturbed_prediction: prediction,
                        queries,
                    },
                ),
                SearchOutcome::Failed { perturbed } => (
                    SearchState::Failed,
                    AttackResult::Failed {
                        original: input.clone(),
                        perturbed,
                        original_prediction: reference.prediction.clone(),
                        queries,
                    },
                ),
            }
        };

        tracing::info!(
            outcome = ?state,
            queries = result.queries(),
            reference = %reference.label,
            "attack finished"
        );
        observer.on_attack_end(&result);
        Ok(result)
    }

    /// Attack a sequence of inputs lazily, one at a time, in order.
    ///
    /// Each item is the outcome for one input; an `Err` affects only that
    /// input. Dropping the iterator stops the run.
    pub fn attack_dataset<I>(&self, inputs: I) -> AttackIter<'_, T, G, S, I::IntoIter>
    where
        I: IntoIterator<Item = AttackInput>,
    {
        AttackIter {
            attack: self,
            inputs: inputs.into_iter(),
            index: 0,
        }
    }

    /// Attack every input in parallel. Results keep the input order.
    pub fn attack_parallel(&self, inputs: &[AttackInput]) -> Vec<Result<AttackResult>>
    where
        T: Sync,
        G: Sync,
        S: Sync,
    {
        inputs.par_iter().map(|input| self.attack(input)).collect()
    }
}

/// Lazy iterator returned by [`Attack::attack_dataset`].
pub struct AttackIter<'a, T, G, S, I> {
    attack: &'a Attack<T, G, S>,
    inputs: I,
    index: usize,
}

impl<'a, T, G, S, I> Iterator for AttackIter<'a, T, G, S, I>
where
    T: Transformation,
    G: GoalFunction,
    S: SearchMethod,
    I: Iterator<Item = AttackInput>,
{
    type Item = Result<AttackResult>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.inputs.next()?;
        let index = self.index;
        self.index += 1;

        let result = self.attack.attack(&input);
        if let Err(err) = &result {
            tracing::warn!(index, error = %err, "attack aborted");
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inputs.size_hint()
    }
}
