//! Ready-made attack configurations.
//!
//! # DeepWordBug
//!
//! Gao, Lanchantin, Soffa, Qi. *Black-box Generation of Adversarial Text
//! Sequences to Evade Deep Learning Classifiers* (2018).
//!
//! Character-level misspellings (adjacent swap, substitution, deletion,
//! insertion), a character edit-distance budget of 30, and greedy search
//! over words ranked by importance.

use std::str::FromStr;

use crate::constraints::{ConstraintSet, LevenshteinEditDistance};
use crate::errors::{AttackError, Result};
use crate::goal::UntargetedClassification;
use crate::pipeline::runner::{Attack, DynAttack};
use crate::pipeline::traits::Model;
use crate::search::GreedyWordSwapWir;
use crate::transformations::{
    CompositeWordSwap, NeighboringCharacterSwap, RandomCharacterDeletion,
    RandomCharacterInsertion, RandomCharacterSubstitution, WordSwapTransformation,
};
use crate::types::AttackConfig;

/// Edit-distance budget used by DeepWordBug.
pub const DEEPWORDBUG_MAX_EDIT_DISTANCE: usize = 30;

/// Named attack recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackRecipe {
    /// All four character edits
    DeepWordBug,
    /// Random substitution only
    DeepWordBugSubstitution,
}

impl AttackRecipe {
    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            AttackRecipe::DeepWordBug => "deepwordbug",
            AttackRecipe::DeepWordBugSubstitution => "deepwordbug_substitution",
        }
    }

    /// Build this recipe around `model`, boxed for runtime composition.
    pub fn build<M>(&self, model: M, config: &AttackConfig) -> Result<DynAttack>
    where
        M: Model + Send + Sync + 'static,
    {
        let use_all = matches!(self, AttackRecipe::DeepWordBug);
        let (transformation, constraints, goal, search) =
            deepwordbug(model, use_all, config)?.into_parts();
        Ok(DynAttack::new(
            Box::new(transformation),
            constraints,
            Box::new(goal),
            Box::new(search),
        ))
    }
}

impl FromStr for AttackRecipe {
    type Err = AttackError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().replace('-', "_").as_str() {
            "deepwordbug" | "deep_word_bug" | "gao2018" | "gao_2018" => {
                Ok(AttackRecipe::DeepWordBug)
            }
            "deepwordbug_substitution" | "deepwordbug_sub" => {
                Ok(AttackRecipe::DeepWordBugSubstitution)
            }
            other => Err(AttackError::invalid_config(format!(
                "unknown attack recipe {:?}",
                other
            ))),
        }
    }
}

/// Statically-typed DeepWordBug attack.
pub type DeepWordBugAttack<M> = Attack<
    WordSwapTransformation<CompositeWordSwap>,
    UntargetedClassification<M>,
    GreedyWordSwapWir,
>;

/// Build DeepWordBug around `model`.
///
/// With `use_all_transformations` off, only random character substitution
/// is used. `config` supplies the seed, stop-words, per-word cap, and the
/// search placeholder / depth.
pub fn deepwordbug<M: Model>(
    model: M,
    use_all_transformations: bool,
    config: &AttackConfig,
) -> Result<DeepWordBugAttack<M>> {
    config.validate()?;

    let swap = if use_all_transformations {
        CompositeWordSwap::new()
            .with(NeighboringCharacterSwap::from_config(config))
            .with(RandomCharacterSubstitution::from_config(config))
            .with(RandomCharacterDeletion::from_config(config))
            .with(RandomCharacterInsertion::from_config(config))
    } else {
        CompositeWordSwap::new().with(RandomCharacterSubstitution::from_config(config))
    };

    let constraints =
        ConstraintSet::new().with(LevenshteinEditDistance::new(DEEPWORDBUG_MAX_EDIT_DISTANCE));

    tracing::debug!(use_all_transformations, seed = config.seed, "building deepwordbug");
    Ok(Attack::new(
        WordSwapTransformation::from_config(swap, config),
        constraints,
        UntargetedClassification::new(model),
        GreedyWordSwapWir::from_config(config),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::traits::WordSwap;
    use crate::types::AttackInput;

    /// Negative while the text contains the exact word "terrible".
    struct KeywordModel;

    impl Model for KeywordModel {
        fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
            let neg = if text.split_whitespace().any(|w| w == "terrible") {
                0.95
            } else {
                0.3
            };
            Ok(vec![("neg".into(), neg), ("pos".into(), 1.0 - neg)])
        }
    }

    #[test]
    fn test_recipe_parse() {
        assert_eq!(
            "DeepWordBug".parse::<AttackRecipe>().unwrap(),
            AttackRecipe::DeepWordBug
        );
        assert_eq!(
            "deepwordbug-substitution".parse::<AttackRecipe>().unwrap(),
            AttackRecipe::DeepWordBugSubstitution
        );
        assert!("textfooler".parse::<AttackRecipe>().is_err());
        assert_eq!(AttackRecipe::DeepWordBug.name(), "deepwordbug");
    }

    #[test]
    fn test_deepwordbug_components() {
        let attack = deepwordbug(KeywordModel, true, &AttackConfig::default()).unwrap();
        assert_eq!(attack.transformation().swap().len(), 4);
        assert_eq!(attack.constraints().names(), vec!["levenshtein_edit_distance"]);

        let attack = deepwordbug(KeywordModel, false, &AttackConfig::default()).unwrap();
        assert_eq!(attack.transformation().swap().len(), 1);
    }

    #[test]
    fn test_deepwordbug_misspells_keyword() {
        let attack = deepwordbug(KeywordModel, true, &AttackConfig::default()).unwrap();
        let result = attack
            .attack(&AttackInput::new("a terrible movie"))
            .unwrap();

        assert!(result.is_succeeded());
        let subs = result.substitutions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].1, "terrible");
        assert!(attack
            .transformation()
            .swap()
            .get_replacements("terrible")
            .unwrap()
            .contains(&subs[0].2));
    }

    #[test]
    fn test_build_dyn() {
        let input = AttackInput::new("a terrible movie");
        let attack = AttackRecipe::DeepWordBug
            .build(KeywordModel, &AttackConfig::default().with_seed(3))
            .unwrap();
        assert!(attack.attack(&input).unwrap().is_succeeded());

        // A substitution may redraw the same letter, so only the outcome
        // kind is fixed here.
        let attack = AttackRecipe::DeepWordBugSubstitution
            .build(KeywordModel, &AttackConfig::default().with_seed(3))
            .unwrap();
        assert!(!attack.attack(&input).unwrap().is_skipped());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AttackConfig::default().with_max_candidates(0);
        assert!(deepwordbug(KeywordModel, true, &config).is_err());
    }
}
