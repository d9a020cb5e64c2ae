//! Candidate generation.
//!
//! Word-level swaps implement [`WordSwap`](crate::pipeline::traits::WordSwap)
//! and become full transformations through [`WordSwapTransformation`].

pub mod character;
pub mod composite;
pub mod embedding;
pub mod lexicon;
pub mod word_swap;

pub use character::{
    CharacterEditOptions, NeighboringCharacterSwap, RandomCharacterDeletion,
    RandomCharacterInsertion, RandomCharacterSubstitution,
};
pub use composite::CompositeWordSwap;
pub use embedding::WordSwapEmbedding;
pub use lexicon::WordSwapLexicon;
pub use word_swap::WordSwapTransformation;
