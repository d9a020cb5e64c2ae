//! Search methods and the shared search space.
//!
//! A [`SearchMethod`](crate::pipeline::traits::SearchMethod) only sees the
//! attack components through a [`SearchSpace`], which also counts model
//! queries and forwards per-iteration reports to the observer.

pub mod greedy;
pub mod greedy_wir;

use std::collections::{BTreeMap, BTreeSet};

use crate::constraints::ConstraintSet;
use crate::errors::Result;
use crate::pipeline::observer::{AttackObserver, IterationReport};
use crate::pipeline::traits::{GoalFunction, SearchMethod, Transformation};
use crate::types::{
    AttackConfig, AttackInput, Candidate, Evaluation, Prediction, Reference, Score, SearchKind,
};

pub use greedy::GreedyWordSwap;
pub use greedy_wir::GreedyWordSwapWir;

// ============================================================================
// Outcome & state
// ============================================================================

/// What a search method returns for an input whose goal was not already met.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Goal reached; `prediction` is the model output on `perturbed`.
    Succeeded {
        perturbed: AttackInput,
        prediction: Prediction,
    },
    /// Candidates or positions ran out; `perturbed` is the last committed
    /// state (the original if nothing was committed).
    Failed { perturbed: AttackInput },
}

/// Lifecycle of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchState::Running)
    }
}

/// Committed replacements and visited positions of one search call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerturbationState {
    replacements: BTreeMap<usize, String>,
    visited: BTreeSet<usize>,
}

impl PerturbationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `replacement` at `position` and mark the position visited.
    pub fn commit(&mut self, position: usize, replacement: impl Into<String>) {
        self.replacements.insert(position, replacement.into());
        self.visited.insert(position);
    }

    /// Mark a position visited without changing it.
    pub fn mark_visited(&mut self, position: usize) {
        self.visited.insert(position);
    }

    pub fn visited(&self) -> &BTreeSet<usize> {
        &self.visited
    }

    pub fn num_visited(&self) -> usize {
        self.visited.len()
    }

    pub fn replacements(&self) -> &BTreeMap<usize, String> {
        &self.replacements
    }
}

/// A constraint-accepted candidate together with its evaluation.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub evaluation: Evaluation,
}

impl ScoredCandidate {
    pub fn score(&self) -> Score {
        self.evaluation.score
    }
}

/// Index of the candidate to commit.
///
/// Goal-achieving candidates win over all others; within the chosen group
/// the lowest fitness wins and the earliest candidate wins ties.
pub fn select_best(scored: &[ScoredCandidate]) -> Option<usize> {
    let any_achieved = scored.iter().any(|s| s.score().goal_achieved);
    let mut best: Option<usize> = None;
    for (i, s) in scored.iter().enumerate() {
        if any_achieved && !s.score().goal_achieved {
            continue;
        }
        match best {
            Some(b) if s.score().fitness.total_cmp(&scored[b].score().fitness).is_ge() => {}
            _ => best = Some(i),
        }
    }
    best
}

// ============================================================================
// SearchSpace
// ============================================================================

/// The components of one attack, as seen by a search method.
pub struct SearchSpace<'a> {
    original: &'a AttackInput,
    reference: &'a Reference,
    initial_score: Score,
    transformation: &'a dyn Transformation,
    constraints: &'a ConstraintSet,
    goal: &'a dyn GoalFunction,
    observer: &'a mut dyn AttackObserver,
    queries: usize,
}

impl<'a> SearchSpace<'a> {
    /// `queries` starts at one: the reference prediction on the original.
    pub fn new(
        original: &'a AttackInput,
        reference: &'a Reference,
        initial_score: Score,
        transformation: &'a dyn Transformation,
        constraints: &'a ConstraintSet,
        goal: &'a dyn GoalFunction,
        observer: &'a mut dyn AttackObserver,
    ) -> Self {
        Self {
            original,
            reference,
            initial_score,
            transformation,
            constraints,
            goal,
            observer,
            queries: 1,
        }
    }

    pub fn original(&self) -> &'a AttackInput {
        self.original
    }

    pub fn reference(&self) -> &'a Reference {
        self.reference
    }

    /// Score of the unmodified input
    pub fn initial_score(&self) -> Score {
        self.initial_score
    }

    /// Model queries spent so far
    pub fn queries(&self) -> usize {
        self.queries
    }

    /// Candidates for `current` outside `visited`.
    pub fn generate(
        &self,
        current: &AttackInput,
        visited: &BTreeSet<usize>,
    ) -> Result<Vec<Candidate>> {
        self.transformation.generate(current, visited)
    }

    /// Apply every constraint, relative to the unmodified input.
    pub fn filter(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
        self.constraints.filter(self.original, candidates)
    }

    /// One model query for `input`, scored against the reference.
    pub fn evaluate(&mut self, input: &AttackInput) -> Result<Evaluation> {
        self.queries += 1;
        self.goal.evaluate(self.reference, input)
    }

    /// Evaluate each candidate in order.
    pub fn evaluate_candidates(
        &mut self,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<ScoredCandidate>> {
        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let evaluation = self.evaluate(&candidate.input)?;
            scored.push(ScoredCandidate {
                candidate,
                evaluation,
            });
        }
        Ok(scored)
    }

    /// Forward an iteration report to the observer.
    pub fn report(&mut self, report: &IterationReport) {
        self.observer.on_iteration(report);
    }
}

/// Build the search method selected by `config.search`.
pub fn search_from_config(config: &AttackConfig) -> Box<dyn SearchMethod + Send + Sync> {
    match config.search {
        SearchKind::Greedy => Box::new(GreedyWordSwap::new()),
        SearchKind::GreedyWir => Box::new(GreedyWordSwapWir::from_config(config)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Small deterministic components shared by the search tests.

    use super::*;
    use crate::errors::AttackError;
    use rustc_hash::FxHashMap;

    /// Looks up per-word replacement lists; ignores stop-words.
    pub struct TableSwap {
        pub table: FxHashMap<String, Vec<String>>,
    }

    impl TableSwap {
        pub fn new(entries: &[(&str, &[&str])]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|(w, rs)| (w.to_string(), rs.iter().map(|r| r.to_string()).collect()))
                    .collect(),
            }
        }
    }

    impl Transformation for TableSwap {
        fn generate(&self, input: &AttackInput, visited: &BTreeSet<usize>) -> Result<Vec<Candidate>> {
            let mut out = Vec::new();
            for (i, word) in input.words().into_iter().enumerate() {
                if visited.contains(&i) {
                    continue;
                }
                if let Some(rs) = self.table.get(word) {
                    for r in rs {
                        out.push(Candidate::new(input, i, r.as_str())?);
                    }
                }
            }
            Ok(out)
        }
    }

    /// Positive-probability goal: "pos" mass is the product of per-word
    /// weights; the goal is met below 0.5.
    pub struct WeightGoal {
        pub weights: FxHashMap<String, f64>,
    }

    impl WeightGoal {
        pub fn new(weights: &[(&str, f64)]) -> Self {
            Self {
                weights: weights.iter().map(|(w, p)| (w.to_string(), *p)).collect(),
            }
        }
    }

    impl GoalFunction for WeightGoal {
        fn predict(&self, input: &AttackInput) -> Result<Prediction> {
            if input.text().contains("FAIL") {
                return Err(AttackError::model("scripted failure"));
            }
            let p: f64 = input
                .words()
                .iter()
                .map(|w| self.weights.get(*w).copied().unwrap_or(1.0))
                .product();
            Prediction::from_distribution(
                input.text(),
                vec![("pos".into(), p), ("neg".into(), 1.0 - p)],
            )
        }

        fn reference(&self, _original: &AttackInput, prediction: Prediction) -> Reference {
            Reference {
                label: "pos".into(),
                prediction,
            }
        }

        fn score(&self, reference: &Reference, prediction: &Prediction) -> Score {
            Score::new(
                prediction.probability(&reference.label),
                prediction.label() != reference.label,
            )
        }
    }

    pub fn reference_for(goal: &WeightGoal, input: &AttackInput) -> (Reference, Score) {
        let prediction = goal.predict(input).unwrap();
        let reference = goal.reference(input, prediction.clone());
        let score = goal.score(&reference, &prediction);
        (reference, score)
    }
}
