//! Core types for rapid_textattack
//!
//! This module defines the fundamental data structures used throughout the
//! library: tokenized attack inputs, candidates, model predictions, scores,
//! terminal attack results, and configuration.

use crate::errors::{AttackError, Result};
use crate::nlp::stopwords::StopwordFilter;
use crate::nlp::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};

// ============================================================================
// Word spans
// ============================================================================

/// Byte range of one word inside an [`AttackInput`] text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordSpan {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl WordSpan {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// ============================================================================
// AttackInput
// ============================================================================

/// An immutable text together with the word tokenization fixed at ingestion.
///
/// Perturbed inputs are derived with [`AttackInput::replace_word`], which
/// keeps the word count and the positions of all other words stable. The
/// text is never re-tokenized after construction, so position `i` always
/// refers to the same word slot across an attack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAttackInput")]
pub struct AttackInput {
    text: String,
    spans: Vec<WordSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ground_truth: Option<String>,
}

/// Serialized form of [`AttackInput`]; spans are checked before use.
///
/// Missing spans mean the text is tokenized afresh.
#[derive(Deserialize)]
struct RawAttackInput {
    text: String,
    #[serde(default)]
    spans: Option<Vec<WordSpan>>,
    #[serde(default)]
    ground_truth: Option<String>,
}

impl TryFrom<RawAttackInput> for AttackInput {
    type Error = AttackError;

    fn try_from(raw: RawAttackInput) -> Result<Self> {
        let Some(spans) = raw.spans else {
            let input = AttackInput::new(raw.text);
            return Ok(match raw.ground_truth {
                Some(label) => input.with_ground_truth(label),
                None => input,
            });
        };

        let mut previous_end = 0;
        for span in &spans {
            let valid = span.start < span.end
                && span.start >= previous_end
                && span.end <= raw.text.len()
                && raw.text.is_char_boundary(span.start)
                && raw.text.is_char_boundary(span.end);
            if !valid {
                return Err(AttackError::serialization(format!(
                    "word span {}..{} is not valid for a text of {} bytes",
                    span.start,
                    span.end,
                    raw.text.len()
                )));
            }
            previous_end = span.end;
        }

        Ok(Self {
            text: raw.text,
            spans,
            ground_truth: raw.ground_truth,
        })
    }
}

impl AttackInput {
    /// Tokenize `text` with the default [`Tokenizer`].
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_tokenizer(text, &Tokenizer::new())
    }

    /// Tokenize `text` with a custom tokenizer.
    pub fn with_tokenizer(text: impl Into<String>, tokenizer: &Tokenizer) -> Self {
        let text = text.into();
        let spans = tokenizer.words(&text);
        Self {
            text,
            spans,
            ground_truth: None,
        }
    }

    /// Attach the ground-truth label for this input.
    pub fn with_ground_truth(mut self, label: impl Into<String>) -> Self {
        self.ground_truth = Some(label.into());
        self
    }

    /// The full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ground-truth label, if one was supplied
    pub fn ground_truth(&self) -> Option<&str> {
        self.ground_truth.as_deref()
    }

    /// Word spans in document order
    pub fn spans(&self) -> &[WordSpan] {
        &self.spans
    }

    /// Number of words
    pub fn num_words(&self) -> usize {
        self.spans.len()
    }

    /// Word at `idx`
    pub fn word(&self, idx: usize) -> Option<&str> {
        self.spans.get(idx).map(|s| &self.text[s.start..s.end])
    }

    /// All words in document order
    pub fn words(&self) -> Vec<&str> {
        self.spans
            .iter()
            .map(|s| &self.text[s.start..s.end])
            .collect()
    }

    /// Return a new input with the word at `idx` replaced by `replacement`.
    ///
    /// All text outside the replaced span is preserved; spans after `idx`
    /// shift by the length difference. The ground-truth label carries over.
    pub fn replace_word(&self, idx: usize, replacement: &str) -> Result<Self> {
        let span = *self.spans.get(idx).ok_or_else(|| {
            AttackError::internal(format!(
                "word index {} out of range for input with {} words",
                idx,
                self.spans.len()
            ))
        })?;

        let mut text = String::with_capacity(self.text.len() + replacement.len());
        text.push_str(&self.text[..span.start]);
        text.push_str(replacement);
        text.push_str(&self.text[span.end..]);

        let new_end = span.start + replacement.len();
        let spans = self
            .spans
            .iter()
            .enumerate()
            .map(|(i, s)| match i.cmp(&idx) {
                std::cmp::Ordering::Less => *s,
                std::cmp::Ordering::Equal => WordSpan::new(span.start, new_end),
                std::cmp::Ordering::Greater => {
                    WordSpan::new(s.start - span.end + new_end, s.end - span.end + new_end)
                }
            })
            .collect();

        Ok(Self {
            text,
            spans,
            ground_truth: self.ground_truth.clone(),
        })
    }

    /// Word positions at which `self` and `other` differ.
    ///
    /// Positions present in only one of the two inputs count as differing.
    pub fn diff_positions(&self, other: &AttackInput) -> Vec<usize> {
        let longest = self.num_words().max(other.num_words());
        (0..longest)
            .filter(|&i| self.word(i) != other.word(i))
            .collect()
    }
}

impl std::fmt::Display for AttackInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

// ============================================================================
// Candidate
// ============================================================================

/// One proposed single-position substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The derived text
    pub input: AttackInput,
    /// Word position that was replaced
    pub position: usize,
    /// The word that was at `position` before the swap
    pub original_word: String,
    /// The replacement word
    pub replacement: String,
}

impl Candidate {
    /// Build a candidate by replacing the word at `position` in `source`.
    pub fn new(source: &AttackInput, position: usize, replacement: impl Into<String>) -> Result<Self> {
        let replacement = replacement.into();
        let original_word = source
            .word(position)
            .ok_or_else(|| AttackError::internal(format!("no word at position {}", position)))?
            .to_string();
        let input = source.replace_word(position, &replacement)?;
        Ok(Self {
            input,
            position,
            original_word,
            replacement,
        })
    }

    /// The candidate's full text
    pub fn text(&self) -> &str {
        self.input.text()
    }
}

// ============================================================================
// Predictions & scores
// ============================================================================

/// A label distribution returned by the model for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    distribution: Vec<(String, f64)>,
}

impl Prediction {
    /// Wrap a model distribution for `text`.
    ///
    /// An empty distribution violates the model contract and is reported as
    /// [`AttackError::EmptyPrediction`].
    pub fn from_distribution(text: &str, distribution: Vec<(String, f64)>) -> Result<Self> {
        if distribution.is_empty() {
            return Err(AttackError::empty_prediction(text));
        }
        Ok(Self { distribution })
    }

    /// Index of the most probable label (first one wins ties).
    fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, (_, p)) in self.distribution.iter().enumerate().skip(1) {
            if *p > self.distribution[best].1 {
                best = i;
            }
        }
        best
    }

    /// The predicted label
    pub fn label(&self) -> &str {
        &self.distribution[self.argmax()].0
    }

    /// Probability of the predicted label
    pub fn confidence(&self) -> f64 {
        self.distribution[self.argmax()].1
    }

    /// Probability assigned to `label` (0.0 if the model never mentions it)
    pub fn probability(&self, label: &str) -> f64 {
        self.distribution
            .iter()
            .find(|(l, _)| l == label)
            .map_or(0.0, |(_, p)| *p)
    }

    /// The raw distribution, in model order
    pub fn distribution(&self) -> &[(String, f64)] {
        &self.distribution
    }
}

/// Fitness of one text with respect to the attack goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Lower is closer to the goal
    pub fitness: f64,
    /// Whether the goal is met
    pub goal_achieved: bool,
}

impl Score {
    /// Create a new score
    pub fn new(fitness: f64, goal_achieved: bool) -> Self {
        Self {
            fitness,
            goal_achieved,
        }
    }
}

/// A [`Score`] plus the prediction it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: Score,
    pub prediction: Prediction,
}

/// What a goal function measures candidates against: the label fixed on
/// the unmodified input and the model's prediction for that input.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub label: String,
    pub prediction: Prediction,
}

// ============================================================================
// AttackResult
// ============================================================================

/// Terminal outcome of attacking one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttackResult {
    /// A perturbation satisfying every constraint reached the goal.
    Succeeded {
        original: AttackInput,
        perturbed: AttackInput,
        original_prediction: Prediction,
        perturbed_prediction: Prediction,
        queries: usize,
    },
    /// The search ran out of candidates or positions. `perturbed` is the
    /// last committed state.
    Failed {
        original: AttackInput,
        perturbed: AttackInput,
        original_prediction: Prediction,
        queries: usize,
    },
    /// The goal was already met on the unmodified input.
    Skipped {
        original: AttackInput,
        original_prediction: Prediction,
        queries: usize,
    },
}

impl AttackResult {
    /// The unmodified input
    pub fn original(&self) -> &AttackInput {
        match self {
            Self::Succeeded { original, .. }
            | Self::Failed { original, .. }
            | Self::Skipped { original, .. } => original,
        }
    }

    /// The final perturbed input (none for skipped attacks)
    pub fn perturbed(&self) -> Option<&AttackInput> {
        match self {
            Self::Succeeded { perturbed, .. } | Self::Failed { perturbed, .. } => Some(perturbed),
            Self::Skipped { .. } => None,
        }
    }

    /// Model prediction on the unmodified input
    pub fn original_prediction(&self) -> &Prediction {
        match self {
            Self::Succeeded {
                original_prediction,
                ..
            }
            | Self::Failed {
                original_prediction,
                ..
            }
            | Self::Skipped {
                original_prediction,
                ..
            } => original_prediction,
        }
    }

    /// Number of model queries spent on this input
    pub fn queries(&self) -> usize {
        match self {
            Self::Succeeded { queries, .. }
            | Self::Failed { queries, .. }
            | Self::Skipped { queries, .. } => *queries,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Committed substitutions as `(position, original word, new word)`.
    pub fn substitutions(&self) -> Vec<(usize, String, String)> {
        let original = self.original();
        match self.perturbed() {
            Some(perturbed) => original
                .diff_positions(perturbed)
                .into_iter()
                .map(|i| {
                    (
                        i,
                        original.word(i).unwrap_or_default().to_string(),
                        perturbed.word(i).unwrap_or_default().to_string(),
                    )
                })
                .collect(),
            None => Vec::new(),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Which search method an attack uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    /// Re-evaluate every unvisited position each round.
    #[default]
    Greedy,
    /// Visit positions once, in word-importance order.
    GreedyWir,
}

impl SearchKind {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "greedy_wir" | "wir" | "greedy-wir" | "greedywordswapwir" => SearchKind::GreedyWir,
            _ => SearchKind::Greedy,
        }
    }
}

impl std::str::FromStr for SearchKind {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Ok(SearchKind::parse(value))
    }
}

/// Configuration for an attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Maximum replacements proposed per word
    pub max_candidates: usize,
    /// Never substitute stop-words
    pub skip_stopwords: bool,
    /// Additional stop-words (extends the built-in list)
    pub stopwords: Vec<String>,
    /// Language code for the built-in stop-word list
    pub language: String,
    /// Feature cache capacity (entries)
    pub cache_capacity: usize,
    /// Seed for randomized character-level transformations
    pub seed: u64,
    /// Search method
    pub search: SearchKind,
    /// Placeholder used for leave-one-out word importance ranking
    pub unk_token: String,
    /// Maximum number of positions the importance-ranked search visits
    pub max_depth: Option<usize>,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            max_candidates: 50,
            skip_stopwords: true,
            stopwords: Vec::new(),
            language: "en".to_string(),
            cache_capacity: 1 << 14,
            seed: 0,
            search: SearchKind::Greedy,
            unk_token: "[UNK]".to_string(),
            max_depth: None,
        }
    }
}

impl AttackConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AttackConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_candidates == 0 {
            return Err(AttackError::invalid_config("max_candidates must be > 0"));
        }

        if self.cache_capacity == 0 {
            return Err(AttackError::invalid_config("cache_capacity must be > 0"));
        }

        if self.unk_token.trim().is_empty() {
            return Err(AttackError::invalid_config("unk_token must not be empty"));
        }

        if self.max_depth == Some(0) {
            return Err(AttackError::invalid_config(
                "max_depth must be > 0 when set",
            ));
        }

        Ok(())
    }

    /// Build the stop-word filter this config describes.
    pub fn stopword_filter(&self) -> StopwordFilter {
        if !self.skip_stopwords {
            return StopwordFilter::empty();
        }
        let mut filter = StopwordFilter::new(&self.language);
        filter.extend(&self.stopwords);
        filter
    }

    /// Builder method: set max candidates per word
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    /// Builder method: allow or forbid stop-word substitution
    pub fn with_skip_stopwords(mut self, skip: bool) -> Self {
        self.skip_stopwords = skip;
        self
    }

    /// Builder method: add extra stop-words
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords.extend(words.into_iter().map(Into::into));
        self
    }

    /// Builder method: set language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Builder method: set feature cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Builder method: set RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method: set search method
    pub fn with_search(mut self, search: SearchKind) -> Self {
        self.search = search;
        self
    }

    /// Builder method: set the leave-one-out placeholder
    pub fn with_unk_token(mut self, token: impl Into<String>) -> Self {
        self.unk_token = token.into();
        self
    }

    /// Builder method: bound the importance-ranked search depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
