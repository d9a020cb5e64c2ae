//! Greedy word-swap search.
//!
//! Every round re-generates candidates at all unvisited positions of the
//! current text, keeps those that pass the constraints, and commits the
//! best one. Each commit marks one more position visited, so the search
//! ends after at most `num_words` rounds.

use crate::errors::Result;
use crate::pipeline::observer::{IterationClock, IterationReport};
use crate::pipeline::traits::SearchMethod;
use crate::search::{select_best, PerturbationState, SearchOutcome, SearchSpace, SearchState};

/// Plain greedy search over all unvisited positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyWordSwap;

impl GreedyWordSwap {
    pub fn new() -> Self {
        Self
    }
}

impl SearchMethod for GreedyWordSwap {
    fn search(&self, space: &mut SearchSpace<'_>) -> Result<SearchOutcome> {
        let original = space.original();
        let num_words = original.num_words();
        let mut current = original.clone();
        let mut state = PerturbationState::new();
        let mut status = SearchState::Running;
        let mut outcome_prediction = None;
        let mut iteration = 0;

        while !status.is_terminal() {
            if state.num_visited() >= num_words {
                status = SearchState::Failed;
                break;
            }

            let clock = IterationClock::start();
            let generated = space.generate(&current, state.visited())?;
            let num_generated = generated.len();
            let accepted = space.filter(generated)?;
            let num_accepted = accepted.len();

            if accepted.is_empty() {
                tracing::debug!(
                    iteration,
                    generated = num_generated,
                    "no candidate passed the constraints"
                );
                space.report(&IterationReport {
                    iteration,
                    generated: num_generated,
                    accepted: 0,
                    best_fitness: None,
                    committed: None,
                    elapsed: clock.elapsed(),
                });
                status = SearchState::Failed;
                break;
            }

            let mut scored = space.evaluate_candidates(accepted)?;
            let Some(best) = select_best(&scored) else {
                status = SearchState::Failed;
                break;
            };
            let chosen = scored.swap_remove(best);
            let position = chosen.candidate.position;
            let score = chosen.score();

            state.commit(position, chosen.candidate.replacement.as_str());
            current = chosen.candidate.input;

            tracing::debug!(
                iteration,
                generated = num_generated,
                accepted = num_accepted,
                position,
                fitness = score.fitness,
                goal_achieved = score.goal_achieved,
                "greedy step"
            );
            space.report(&IterationReport {
                iteration,
                generated: num_generated,
                accepted: num_accepted,
                best_fitness: Some(score.fitness),
                committed: Some(position),
                elapsed: clock.elapsed(),
            });

            if score.goal_achieved {
                outcome_prediction = Some(chosen.evaluation.prediction);
                status = SearchState::Succeeded;
            }
            iteration += 1;
        }

        match (status, outcome_prediction) {
            (SearchState::Succeeded, Some(prediction)) => Ok(SearchOutcome::Succeeded {
                perturbed: current,
                prediction,
            }),
            _ => Ok(SearchOutcome::Failed { perturbed: current }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSet;
    use crate::pipeline::observer::RecordingObserver;
    use crate::search::test_support::*;
    use crate::types::AttackInput;

    fn run(
        input: &AttackInput,
        swap: &TableSwap,
        goal: &WeightGoal,
        constraints: &ConstraintSet,
    ) -> (SearchOutcome, usize, RecordingObserver) {
        let (reference, score) = reference_for(goal, input);
        let mut observer = RecordingObserver::default();
        let mut space =
            SearchSpace::new(input, &reference, score, swap, constraints, goal, &mut observer);
        let outcome = GreedyWordSwap::new().search(&mut space).unwrap();
        let queries = space.queries();
        (outcome, queries, observer)
    }

    #[test]
    fn test_first_flipping_candidate_wins() {
        let input = AttackInput::new("Worst hot dog ever.");
        let swap = TableSwap::new(&[("Worst", &["Best", "Great", "Grandest"])]);
        let goal = WeightGoal::new(&[
            ("Worst", 0.9),
            ("Best", 0.6),
            ("Great", 0.55),
            ("Grandest", 0.2),
        ]);

        let (outcome, queries, observer) = run(&input, &swap, &goal, &ConstraintSet::new());

        match outcome {
            SearchOutcome::Succeeded { perturbed, prediction } => {
                assert_eq!(perturbed.text(), "Grandest hot dog ever.");
                assert_eq!(prediction.label(), "neg");
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(queries, 4);
        assert_eq!(observer.iterations.len(), 1);
        assert_eq!(observer.iterations[0].committed, Some(0));
    }

    #[test]
    fn test_commits_progress_across_rounds() {
        let input = AttackInput::new("good great film");
        let swap = TableSwap::new(&[("good", &["fine"]), ("great", &["okay"])]);
        // Each swap alone keeps "pos" above 0.5; both together flip it.
        let goal = WeightGoal::new(&[
            ("good", 0.9),
            ("great", 0.9),
            ("fine", 0.7),
            ("okay", 0.6),
        ]);

        let (outcome, _, observer) = run(&input, &swap, &goal, &ConstraintSet::new());

        match outcome {
            SearchOutcome::Succeeded { perturbed, .. } => {
                assert_eq!(perturbed.text(), "fine okay film");
            }
            other => panic!("expected success, got {:?}", other),
        }
        // Round one commits "okay" (lower fitness), round two commits "fine".
        assert_eq!(observer.iterations[0].committed, Some(1));
        assert_eq!(observer.iterations[1].committed, Some(0));
    }

    #[test]
    fn test_fails_when_no_candidates() {
        let input = AttackInput::new("good film");
        let swap = TableSwap::new(&[]);
        let goal = WeightGoal::new(&[]);

        let (outcome, queries, _) = run(&input, &swap, &goal, &ConstraintSet::new());

        assert_eq!(
            outcome,
            SearchOutcome::Failed {
                perturbed: input.clone()
            }
        );
        assert_eq!(queries, 1);
    }

    #[test]
    fn test_fails_after_all_positions_visited() {
        let input = AttackInput::new("good film");
        let swap = TableSwap::new(&[("good", &["fine"]), ("film", &["movie"])]);
        let goal = WeightGoal::new(&[("fine", 0.95), ("movie", 0.9)]);

        let (outcome, _, observer) = run(&input, &swap, &goal, &ConstraintSet::new());

        match outcome {
            SearchOutcome::Failed { perturbed } => {
                assert_eq!(perturbed.text(), "fine movie");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(observer.iterations.len(), 2);
    }

    #[test]
    fn test_model_error_propagates() {
        let input = AttackInput::new("good film");
        let swap = TableSwap::new(&[("good", &["FAIL"])]);
        let goal = WeightGoal::new(&[]);
        let (reference, score) = reference_for(&goal, &input);
        let constraints = ConstraintSet::new();
        let mut observer = RecordingObserver::default();
        let mut space =
            SearchSpace::new(&input, &reference, score, &swap, &constraints, &goal, &mut observer);

        assert!(GreedyWordSwap::new().search(&mut space).is_err());
    }
}
