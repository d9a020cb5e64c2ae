//! Overlap constraints: how far a candidate may drift from the original.

use crate::errors::{AttackError, Result};
use crate::pipeline::traits::Constraint;
use crate::types::{AttackInput, Candidate};

// ============================================================================
// LevenshteinEditDistance
// ============================================================================

/// Caps the character edit distance between original and candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevenshteinEditDistance {
    max_edit_distance: usize,
}

impl LevenshteinEditDistance {
    pub fn new(max_edit_distance: usize) -> Self {
        Self { max_edit_distance }
    }

    pub fn max_edit_distance(&self) -> usize {
        self.max_edit_distance
    }
}

/// Levenshtein distance over `char`s, two-row dynamic programming.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

impl Constraint for LevenshteinEditDistance {
    fn name(&self) -> &str {
        "levenshtein_edit_distance"
    }

    fn satisfies(&self, original: &AttackInput, candidate: &Candidate) -> Result<bool> {
        Ok(levenshtein(original.text(), candidate.text()) <= self.max_edit_distance)
    }
}

// ============================================================================
// MaxWordsPerturbed
// ============================================================================

/// Caps how many word positions may differ from the original.
///
/// With both limits set, the stricter one applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxWordsPerturbed {
    max_num_words: Option<usize>,
    max_percent: Option<f64>,
}

impl MaxWordsPerturbed {
    /// Bound the absolute number of changed words.
    pub fn words(max_num_words: usize) -> Self {
        Self {
            max_num_words: Some(max_num_words),
            max_percent: None,
        }
    }

    /// Bound the fraction (0.0..=1.0) of changed words.
    pub fn percent(max_percent: f64) -> Result<Self> {
        Self::new(None, Some(max_percent))
    }

    pub fn new(max_num_words: Option<usize>, max_percent: Option<f64>) -> Result<Self> {
        if max_num_words.is_none() && max_percent.is_none() {
            return Err(AttackError::invalid_config(
                "MaxWordsPerturbed needs max_num_words or max_percent",
            ));
        }
        if let Some(p) = max_percent {
            if !(0.0..=1.0).contains(&p) {
                return Err(AttackError::invalid_config(format!(
                    "max_percent must be in [0, 1], got {}",
                    p
                )));
            }
        }
        Ok(Self {
            max_num_words,
            max_percent,
        })
    }

    /// Largest number of changed words allowed for an input of `num_words`.
    fn limit(&self, num_words: usize) -> usize {
        let by_percent = self
            .max_percent
            .map(|p| (p * num_words as f64).floor() as usize);
        match (self.max_num_words, by_percent) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => usize::MAX,
        }
    }
}

impl Constraint for MaxWordsPerturbed {
    fn name(&self) -> &str {
        "max_words_perturbed"
    }

    fn satisfies(&self, original: &AttackInput, candidate: &Candidate) -> Result<bool> {
        let changed = original.diff_positions(&candidate.input).len();
        Ok(changed <= self.limit(original.num_words()))
    }
}
