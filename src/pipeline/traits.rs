//! Component and collaborator trait definitions.
//!
//! An attack is assembled from four components, each behind its own trait:
//!
//! - [`Transformation`]: proposes single-word substitutions
//! - [`Constraint`]: rejects candidates that are not valid perturbations
//! - [`GoalFunction`]: scores candidates against the attack goal
//! - [`SearchMethod`]: drives the other three until a terminal outcome
//!
//! The external collaborators the components consume ([`Model`], [`Tagger`],
//! [`NeighborLookup`]) are traits as well, so any classifier, tagging
//! toolkit, or embedding index can be plugged in.
//!
//! Implementations are statically dispatched inside
//! [`Attack`](crate::pipeline::runner::Attack); boxed trait objects implement
//! the same traits for dynamic composition (recipes, Python bindings).

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::errors::{AttackError, Result};
use crate::search::{SearchOutcome, SearchSpace};
use crate::types::{AttackInput, Candidate, Evaluation, Prediction, Reference, Score};

// ============================================================================
// Model: external classifier
// ============================================================================

/// A classification model consumed as a scoring function.
///
/// # Contract
///
/// - Returns an ordered, non-empty `(label, probability)` distribution.
/// - Deterministic for a fixed text.
/// - Failures are reported as `Err` and abort the attack on the current input.
pub trait Model {
    /// Score one text.
    fn predict(&self, text: &str) -> Result<Vec<(String, f64)>>;
}

impl<M: Model + ?Sized> Model for &M {
    fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
        (**self).predict(text)
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
        (**self).predict(text)
    }
}

impl<M: Model + ?Sized> Model for Arc<M> {
    fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
        (**self).predict(text)
    }
}

/// Wraps a model that is not safe to call re-entrantly.
///
/// At most one `predict` call is in flight at a time, which lets a
/// non-reentrant model handle be shared across parallel attacks.
#[derive(Debug)]
pub struct ExclusiveModel<M> {
    inner: Mutex<M>,
}

impl<M> ExclusiveModel<M> {
    pub fn new(model: M) -> Self {
        Self {
            inner: Mutex::new(model),
        }
    }

    /// Unwrap the model.
    pub fn into_inner(self) -> M {
        self.inner.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<M: Model> Model for ExclusiveModel<M> {
    fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
        let model = self
            .inner
            .lock()
            .map_err(|_| AttackError::model("model handle poisoned by an earlier panic"))?;
        model.predict(text)
    }
}

// ============================================================================
// Tagger: external linguistic toolkit
// ============================================================================

/// One `(word, tag)` pair produced by a [`Tagger`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedWord {
    pub word: String,
    pub tag: String,
}

impl TaggedWord {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

/// A part-of-speech or named-entity tagger.
///
/// # Contract
///
/// - `tag` is a pure function of its input string.
/// - `is_entity` decides whether a tag produced by this tagger marks a named
///   entity. Different toolkits spell entity labels differently, so the
///   decision belongs to the tagger and not to the constraints using it.
pub trait Tagger {
    /// Tag a sentence.
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedWord>>;

    /// Whether `tag` denotes a named entity.
    fn is_entity(&self, tag: &str) -> bool;
}

impl<T: Tagger + ?Sized> Tagger for &T {
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedWord>> {
        (**self).tag(sentence)
    }

    fn is_entity(&self, tag: &str) -> bool {
        (**self).is_entity(tag)
    }
}

impl<T: Tagger + ?Sized> Tagger for Box<T> {
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedWord>> {
        (**self).tag(sentence)
    }

    fn is_entity(&self, tag: &str) -> bool {
        (**self).is_entity(tag)
    }
}

impl<T: Tagger + ?Sized> Tagger for Arc<T> {
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedWord>> {
        (**self).tag(sentence)
    }

    fn is_entity(&self, tag: &str) -> bool {
        (**self).is_entity(tag)
    }
}

/// An explicit set of entity labels.
///
/// Taggers can delegate [`Tagger::is_entity`] to one of these so that the
/// accepted spellings (for example `"NE"` vs `"PERSON"`, `"B-PER"`) are a
/// visible configuration point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTagSet {
    tags: FxHashSet<String>,
}

impl EntityTagSet {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact (case-sensitive) membership test.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

// ============================================================================
// NeighborLookup: external embedding index
// ============================================================================

/// Nearest-neighbour lookup in some word embedding space.
///
/// Results are ordered by similarity and deterministic for a fixed word and
/// count.
pub trait NeighborLookup {
    fn neighbors(&self, word: &str, max_count: usize) -> Result<Vec<String>>;
}

impl<N: NeighborLookup + ?Sized> NeighborLookup for &N {
    fn neighbors(&self, word: &str, max_count: usize) -> Result<Vec<String>> {
        (**self).neighbors(word, max_count)
    }
}

impl<N: NeighborLookup + ?Sized> NeighborLookup for Box<N> {
    fn neighbors(&self, word: &str, max_count: usize) -> Result<Vec<String>> {
        (**self).neighbors(word, max_count)
    }
}

impl<N: NeighborLookup + ?Sized> NeighborLookup for Arc<N> {
    fn neighbors(&self, word: &str, max_count: usize) -> Result<Vec<String>> {
        (**self).neighbors(word, max_count)
    }
}

// ============================================================================
// Transformation: candidate generation
// ============================================================================

/// Produces one-word-substitution candidates for an input.
///
/// # Contract
///
/// - **Input**: the current (possibly already perturbed) input and the word
///   positions that must not be touched.
/// - **Output**: candidates, each differing from `input` at exactly one
///   position outside `visited`.
/// - **Deterministic**: same input and configuration, same candidates in the
///   same order.
pub trait Transformation {
    fn generate(&self, input: &AttackInput, visited: &BTreeSet<usize>) -> Result<Vec<Candidate>>;
}

impl<T: Transformation + ?Sized> Transformation for &T {
    fn generate(&self, input: &AttackInput, visited: &BTreeSet<usize>) -> Result<Vec<Candidate>> {
        (**self).generate(input, visited)
    }
}

impl<T: Transformation + ?Sized> Transformation for Box<T> {
    fn generate(&self, input: &AttackInput, visited: &BTreeSet<usize>) -> Result<Vec<Candidate>> {
        (**self).generate(input, visited)
    }
}

/// The single operation a word-level transformation has to provide.
///
/// [`WordSwapTransformation`](crate::transformations::WordSwapTransformation)
/// turns any `WordSwap` into a [`Transformation`] by adding position
/// iteration, stop-word filtering, and the per-word candidate cap.
pub trait WordSwap {
    /// Replacement words for `word`, best first.
    fn get_replacements(&self, word: &str) -> Result<Vec<String>>;
}

impl<S: WordSwap + ?Sized> WordSwap for Box<S> {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        (**self).get_replacements(word)
    }
}

impl<S: WordSwap + ?Sized> WordSwap for Arc<S> {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        (**self).get_replacements(word)
    }
}

// ============================================================================
// Constraint: candidate filtering
// ============================================================================

/// Accepts or rejects a candidate relative to the unmodified input.
///
/// The search always calls [`satisfies_many`](Constraint::satisfies_many).
/// Its default applies [`satisfies`](Constraint::satisfies) to each candidate
/// independently; constraints that can vectorize over a batch override it.
///
/// Constraints must be pure: applying A then B yields the same set as B
/// then A.
pub trait Constraint: Send + Sync {
    /// Short, stable identifier used in logs.
    fn name(&self) -> &str;

    /// Single-pair predicate.
    fn satisfies(&self, original: &AttackInput, candidate: &Candidate) -> Result<bool>;

    /// Batch predicate. Returns the accepted subset in input order.
    fn satisfies_many(
        &self,
        original: &AttackInput,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<Candidate>> {
        let mut accepted = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if self.satisfies(original, &candidate)? {
                accepted.push(candidate);
            }
        }
        Ok(accepted)
    }
}

// ============================================================================
// GoalFunction: scoring
// ============================================================================

/// Wraps a model and decides how close a text is to the attack goal.
///
/// # Contract
///
/// - [`predict`](GoalFunction::predict) is exactly one model query.
/// - [`reference`](GoalFunction::reference) fixes what the attack is
///   measured against, once per attack.
/// - [`score`](GoalFunction::score) is pure: lower fitness is better, and the
///   flag says whether the goal is met.
pub trait GoalFunction {
    /// One forward pass of the wrapped model.
    fn predict(&self, input: &AttackInput) -> Result<Prediction>;

    /// Fix the reference for an attack from the unmodified input.
    fn reference(&self, original: &AttackInput, prediction: Prediction) -> Reference;

    /// Score a prediction against the reference.
    fn score(&self, reference: &Reference, prediction: &Prediction) -> Score;

    /// Query the model for `input` and score the result.
    fn evaluate(&self, reference: &Reference, input: &AttackInput) -> Result<Evaluation> {
        let prediction = self.predict(input)?;
        let score = self.score(reference, &prediction);
        Ok(Evaluation { score, prediction })
    }
}

impl<G: GoalFunction + ?Sized> GoalFunction for Box<G> {
    fn predict(&self, input: &AttackInput) -> Result<Prediction> {
        (**self).predict(input)
    }

    fn reference(&self, original: &AttackInput, prediction: Prediction) -> Reference {
        (**self).reference(original, prediction)
    }

    fn score(&self, reference: &Reference, prediction: &Prediction) -> Score {
        (**self).score(reference, prediction)
    }

    fn evaluate(&self, reference: &Reference, input: &AttackInput) -> Result<Evaluation> {
        (**self).evaluate(reference, input)
    }
}

// ============================================================================
// SearchMethod: the driving loop
// ============================================================================

/// Explores the perturbation space of one input.
///
/// A search method only reaches the other components through the
/// [`SearchSpace`] it is handed, so every search strategy works with every
/// transformation, constraint set, and goal function. Skipped inputs never
/// reach the search method.
pub trait SearchMethod {
    fn search(&self, space: &mut SearchSpace<'_>) -> Result<SearchOutcome>;
}

impl<S: SearchMethod + ?Sized> SearchMethod for Box<S> {
    fn search(&self, space: &mut SearchSpace<'_>) -> Result<SearchOutcome> {
        (**self).search(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingModel {
        calls: Cell<usize>,
    }

    impl Model for CountingModel {
        fn predict(&self, _text: &str) -> Result<Vec<(String, f64)>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![("pos".into(), 1.0)])
        }
    }

    struct UpperTagger;

    impl Tagger for UpperTagger {
        fn tag(&self, sentence: &str) -> Result<Vec<TaggedWord>> {
            Ok(sentence
                .split_whitespace()
                .map(|w| TaggedWord::new(w, w.to_uppercase()))
                .collect())
        }

        fn is_entity(&self, tag: &str) -> bool {
            tag == "BOSTON"
        }
    }

    struct RejectAll;

    impl Constraint for RejectAll {
        fn name(&self) -> &str {
            "reject_all"
        }

        fn satisfies(&self, _original: &AttackInput, _candidate: &Candidate) -> Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_exclusive_model_delegates() {
        let model = ExclusiveModel::new(CountingModel {
            calls: Cell::new(0),
        });
        assert_eq!(model.predict("x").unwrap()[0].0, "pos");
        assert_eq!(model.predict("y").unwrap().len(), 1);
        assert_eq!(model.into_inner().calls.get(), 2);
    }

    #[test]
    fn test_model_through_references() {
        let model = CountingModel {
            calls: Cell::new(0),
        };
        let boxed: Box<dyn Model> = Box::new(&model);
        boxed.predict("a").unwrap();
        (&model).predict("b").unwrap();
        assert_eq!(model.calls.get(), 2);
    }

    #[test]
    fn test_tagger_through_arc() {
        let tagger: Arc<dyn Tagger + Send + Sync> = Arc::new(UpperTagger);
        let tags = tagger.tag("in boston").unwrap();
        assert_eq!(tags[1], TaggedWord::new("boston", "BOSTON"));
        assert!(tagger.is_entity("BOSTON"));
        assert!(!tagger.is_entity("IN"));
    }

    #[test]
    fn test_entity_tag_set() {
        let set = EntityTagSet::new(["PERSON", "ORG", "NE"]);
        assert!(set.contains("ORG"));
        assert!(!set.contains("org"));
        assert!(!set.contains("O"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_default_satisfies_many_filters_each() {
        let original = AttackInput::new("a b c");
        let candidates = vec![
            Candidate::new(&original, 0, "x").unwrap(),
            Candidate::new(&original, 1, "y").unwrap(),
        ];
        let accepted = RejectAll.satisfies_many(&original, candidates).unwrap();
        assert!(accepted.is_empty());
    }
}
