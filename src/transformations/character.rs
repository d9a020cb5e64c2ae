//! Character-level word swaps.
//!
//! These produce misspellings rather than synonyms: adjacent characters
//! swapped, one character substituted, deleted, or inserted. Randomness comes
//! from a generator seeded with the configured seed mixed with a hash of the
//! word, so the replacements for a word never change within a run and a
//! search that re-visits a word sees the same candidates.

use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;

use crate::errors::Result;
use crate::pipeline::traits::WordSwap;
use crate::types::AttackConfig;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Options shared by all character-level swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterEditOptions {
    /// Edit one randomly chosen position instead of every position
    pub random_one: bool,
    /// Mixed into the per-word generator seed
    pub seed: u64,
}

impl Default for CharacterEditOptions {
    fn default() -> Self {
        Self {
            random_one: true,
            seed: 0,
        }
    }
}

impl CharacterEditOptions {
    pub fn from_config(config: &AttackConfig) -> Self {
        Self {
            seed: config.seed,
            ..Self::default()
        }
    }

    fn rng(&self, word: &str) -> StdRng {
        let mut hasher = FxHasher::default();
        word.hash(&mut hasher);
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }

    /// Positions to edit out of `0..count`.
    fn positions(&self, rng: &mut StdRng, count: usize) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }
        if self.random_one {
            vec![rng.gen_range(0..count)]
        } else {
            (0..count).collect()
        }
    }
}

fn random_letter(rng: &mut StdRng) -> char {
    char::from(LETTERS[rng.gen_range(0..LETTERS.len())])
}

macro_rules! character_swap {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name {
            options: CharacterEditOptions,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn from_config(config: &AttackConfig) -> Self {
                Self {
                    options: CharacterEditOptions::from_config(config),
                }
            }

            pub fn with_options(options: CharacterEditOptions) -> Self {
                Self { options }
            }

            pub fn with_random_one(mut self, random_one: bool) -> Self {
                self.options.random_one = random_one;
                self
            }

            pub fn with_seed(mut self, seed: u64) -> Self {
                self.options.seed = seed;
                self
            }

            pub fn options(&self) -> CharacterEditOptions {
                self.options
            }
        }
    };
}

character_swap!(
    /// Swaps two adjacent characters (`great` -> `rgeat`, `graet`, ...).
    NeighboringCharacterSwap
);
character_swap!(
    /// Replaces one character with a random letter.
    RandomCharacterSubstitution
);
character_swap!(
    /// Deletes one character.
    RandomCharacterDeletion
);
character_swap!(
    /// Inserts a random letter before one character.
    RandomCharacterInsertion
);

impl WordSwap for NeighboringCharacterSwap {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() <= 1 {
            return Ok(Vec::new());
        }
        let mut rng = self.options.rng(word);
        Ok(self
            .options
            .positions(&mut rng, chars.len() - 1)
            .into_iter()
            .map(|i| {
                let mut swapped = chars.clone();
                swapped.swap(i, i + 1);
                swapped.into_iter().collect()
            })
            .collect())
    }
}

impl WordSwap for RandomCharacterSubstitution {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        let chars: Vec<char> = word.chars().collect();
        let mut rng = self.options.rng(word);
        let positions = self.options.positions(&mut rng, chars.len());
        Ok(positions
            .into_iter()
            .map(|i| {
                let mut edited = chars.clone();
                edited[i] = random_letter(&mut rng);
                edited.into_iter().collect()
            })
            .collect())
    }
}

impl WordSwap for RandomCharacterDeletion {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() <= 1 {
            return Ok(Vec::new());
        }
        let mut rng = self.options.rng(word);
        Ok(self
            .options
            .positions(&mut rng, chars.len())
            .into_iter()
            .map(|i| {
                let mut edited = chars.clone();
                edited.remove(i);
                edited.into_iter().collect()
            })
            .collect())
    }
}

impl WordSwap for RandomCharacterInsertion {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        let chars: Vec<char> = word.chars().collect();
        let mut rng = self.options.rng(word);
        let positions = self.options.positions(&mut rng, chars.len());
        Ok(positions
            .into_iter()
            .map(|i| {
                let mut edited = chars.clone();
                edited.insert(i, random_letter(&mut rng));
                edited.into_iter().collect()
            })
            .collect())
    }
}
