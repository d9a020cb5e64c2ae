//! # rapid_textattack
//!
//! Adversarial perturbation search for text classifiers.
//!
//! Given an input text and a model, the library searches a space of
//! word-level perturbations for a modified text that changes the model's
//! prediction while satisfying a configurable set of validity constraints.
//!
//! An [`Attack`] is assembled from four components:
//!
//! - a [`Transformation`] proposing one-word substitutions
//!   ([`WordSwapLexicon`], [`WordSwapEmbedding`], character-level swaps)
//! - a [`ConstraintSet`] filtering them ([`NamedEntityConstraint`],
//!   [`LevenshteinEditDistance`], ...)
//! - a [`GoalFunction`] wrapping the model ([`UntargetedClassification`],
//!   [`TargetedClassification`])
//! - a [`SearchMethod`] ([`GreedyWordSwap`], [`GreedyWordSwapWir`])
//!
//! Linguistic features used by constraints are memoized in a shared
//! [`FeatureCache`].
//!
//! ```
//! use rapid_textattack::{
//!     Attack, AttackInput, ConstraintSet, GreedyWordSwap, Model, Result,
//!     UntargetedClassification, WordSwapLexicon, WordSwapTransformation,
//! };
//!
//! struct Toy;
//!
//! impl Model for Toy {
//!     fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
//!         let pos = if text.contains("Grandest") { 0.2 } else { 0.9 };
//!         Ok(vec![("pos".into(), pos), ("neg".into(), 1.0 - pos)])
//!     }
//! }
//!
//! let lexicon = WordSwapLexicon::new().with_entry("Worst", ["Best", "Great", "Grandest"]);
//! let attack = Attack::new(
//!     WordSwapTransformation::new(lexicon),
//!     ConstraintSet::new(),
//!     UntargetedClassification::new(Toy),
//!     GreedyWordSwap::new(),
//! );
//!
//! let result = attack.attack(&AttackInput::new("Worst hot dog ever.")).unwrap();
//! assert!(result.is_succeeded());
//! ```

pub mod cache;
pub mod constraints;
pub mod errors;
pub mod goal;
pub mod nlp;
pub mod pipeline;
pub mod recipes;
pub mod search;
pub mod transformations;
pub mod types;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use errors::{AttackError, Result};
pub use types::{
    AttackConfig, AttackInput, AttackResult, Candidate, Evaluation, Prediction, Reference, Score,
    SearchKind, WordSpan,
};

// Re-export main functionality
pub use cache::{CacheStats, FeatureCache};
pub use constraints::{
    ConstraintSet, LevenshteinEditDistance, MaxWordsPerturbed, NamedEntityConstraint,
    PartOfSpeechConstraint,
};
pub use goal::{TargetedClassification, UntargetedClassification};
pub use nlp::{stopwords::StopwordFilter, tokenizer::Tokenizer};
pub use pipeline::{
    Attack, AttackIter, AttackObserver, Constraint, DynAttack, EntityTagSet, ExclusiveModel,
    GoalFunction, IterationReport, Model, NeighborLookup, NoopObserver, RecordingObserver,
    SearchMethod, TaggedWord, Tagger, Transformation, WordSwap,
};
pub use recipes::{deepwordbug, AttackRecipe};
pub use search::{
    search_from_config, GreedyWordSwap, GreedyWordSwapWir, PerturbationState, SearchOutcome,
    SearchSpace, SearchState,
};
pub use transformations::{
    CompositeWordSwap, NeighboringCharacterSwap, RandomCharacterDeletion,
    RandomCharacterInsertion, RandomCharacterSubstitution, WordSwapEmbedding, WordSwapLexicon,
    WordSwapTransformation,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Initialize the Python module
#[cfg(feature = "python")]
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register_module(m)?;
    Ok(())
}
