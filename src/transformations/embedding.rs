//! Nearest-neighbour word swap.

use crate::errors::Result;
use crate::pipeline::traits::{NeighborLookup, WordSwap};

/// Replaces a word with its nearest neighbours in an embedding space.
///
/// The lowercase form of the word is looked up, and each neighbour is
/// re-cased to match the original (`Great` -> `Good`, `GREAT` -> `GOOD`).
#[derive(Debug, Clone)]
pub struct WordSwapEmbedding<N> {
    lookup: N,
    max_neighbors: usize,
}

impl<N: NeighborLookup> WordSwapEmbedding<N> {
    pub fn new(lookup: N) -> Self {
        Self {
            lookup,
            max_neighbors: 50,
        }
    }

    /// Ask the lookup for at most `max_neighbors` words.
    pub fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    pub fn lookup(&self) -> &N {
        &self.lookup
    }
}

fn match_case(template: &str, word: &str) -> String {
    let mut letters = template.chars().filter(|c| c.is_alphabetic());
    let Some(first) = letters.next() else {
        return word.to_string();
    };
    let rest: Vec<char> = letters.collect();

    if first.is_uppercase() && !rest.is_empty() && rest.iter().all(|c| c.is_uppercase()) {
        return word.to_uppercase();
    }
    if first.is_uppercase() {
        let mut chars = word.chars();
        return match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    word.to_string()
}

impl<N: NeighborLookup> WordSwap for WordSwapEmbedding<N> {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        let neighbors = self
            .lookup
            .neighbors(&word.to_lowercase(), self.max_neighbors)?;
        Ok(neighbors
            .into_iter()
            .take(self.max_neighbors)
            .map(|n| match_case(word, &n))
            .collect())
    }
}
