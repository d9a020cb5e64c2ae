//! Greedy search with word importance ranking.
//!
//! Positions are ranked once, up front, by how much replacing the word with
//! a placeholder lowers the fitness (leave-one-out). The search then visits
//! positions in that order, each exactly once, and keeps a substitution
//! only when it improves on the current text.

use std::collections::BTreeSet;

use crate::errors::Result;
use crate::pipeline::observer::{IterationClock, IterationReport};
use crate::pipeline::traits::SearchMethod;
use crate::search::{select_best, SearchOutcome, SearchSpace};
use crate::types::{AttackConfig, AttackInput};

/// Greedy search visiting positions in word-importance order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreedyWordSwapWir {
    unk_token: String,
    max_depth: Option<usize>,
}

impl Default for GreedyWordSwapWir {
    fn default() -> Self {
        Self::new("[UNK]")
    }
}

impl GreedyWordSwapWir {
    pub fn new(unk_token: impl Into<String>) -> Self {
        Self {
            unk_token: unk_token.into(),
            max_depth: None,
        }
    }

    pub fn from_config(config: &AttackConfig) -> Self {
        Self {
            unk_token: config.unk_token.clone(),
            max_depth: config.max_depth,
        }
    }

    /// Visit at most `depth` positions.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn unk_token(&self) -> &str {
        &self.unk_token
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Positions ordered from most to least important.
    ///
    /// Costs one model query per word.
    fn rank_positions(
        &self,
        space: &mut SearchSpace<'_>,
        current: &AttackInput,
    ) -> Result<Vec<usize>> {
        let mut ranked = Vec::with_capacity(current.num_words());
        for position in 0..current.num_words() {
            let masked = current.replace_word(position, &self.unk_token)?;
            let evaluation = space.evaluate(&masked)?;
            ranked.push((position, evaluation.score.fitness));
        }
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        Ok(ranked.into_iter().map(|(position, _)| position).collect())
    }
}

impl SearchMethod for GreedyWordSwapWir {
    fn search(&self, space: &mut SearchSpace<'_>) -> Result<SearchOutcome> {
        let original = space.original();
        let num_words = original.num_words();
        let mut current = original.clone();
        let mut current_fitness = space.initial_score().fitness;

        let order = self.rank_positions(space, &current)?;
        let depth = self.max_depth.unwrap_or(num_words).min(num_words);
        tracing::debug!(?order, depth, "word importance ranking");

        for (iteration, &position) in order.iter().take(depth).enumerate() {
            let clock = IterationClock::start();
            let frozen: BTreeSet<usize> = (0..num_words).filter(|&i| i != position).collect();

            let generated = space.generate(&current, &frozen)?;
            let num_generated = generated.len();
            let accepted = space.filter(generated)?;
            let num_accepted = accepted.len();

            let mut scored = space.evaluate_candidates(accepted)?;
            let Some(best) = select_best(&scored) else {
                space.report(&IterationReport {
                    iteration,
                    generated: num_generated,
                    accepted: num_accepted,
                    best_fitness: None,
                    committed: None,
                    elapsed: clock.elapsed(),
                });
                continue;
            };
            let chosen = scored.swap_remove(best);
            let score = chosen.score();

            let committed = score.goal_achieved || score.fitness < current_fitness;
            tracing::debug!(
                iteration,
                position,
                accepted = num_accepted,
                fitness = score.fitness,
                committed,
                "importance-ranked step"
            );
            space.report(&IterationReport {
                iteration,
                generated: num_generated,
                accepted: num_accepted,
                best_fitness: Some(score.fitness),
                committed: committed.then_some(position),
                elapsed: clock.elapsed(),
            });

            if score.goal_achieved {
                return Ok(SearchOutcome::Succeeded {
                    perturbed: chosen.candidate.input,
                    prediction: chosen.evaluation.prediction,
                });
            }
            if committed {
                current = chosen.candidate.input;
                current_fitness = score.fitness;
            }
        }

        Ok(SearchOutcome::Failed { perturbed: current })
    }
}
