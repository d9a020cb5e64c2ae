//! Integration tests for rapid_textattack

use rapid_textattack::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Sentiment model keyed on a few words. Errors on "boom".
struct SentimentModel;

impl Model for SentimentModel {
    fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
        if text.contains("boom") {
            return Err(AttackError::model("model crashed"));
        }
        let pos = if text.contains("Grandest") || text.contains("Joe Smith") {
            0.2
        } else if text.contains("Joe") || text.contains("Smith") {
            0.6
        } else {
            0.9
        };
        Ok(vec![("pos".into(), pos), ("neg".into(), 1.0 - pos)])
    }
}

/// Capitalized words are entities, everything else is "O".
struct CapitalTagger;

impl Tagger for CapitalTagger {
    fn tag(&self, sentence: &str) -> Result<Vec<TaggedWord>> {
        Ok(sentence
            .split_whitespace()
            .map(|w| {
                let tag = if w.chars().next().is_some_and(char::is_uppercase) {
                    "PER"
                } else {
                    "O"
                };
                TaggedWord::new(w, tag)
            })
            .collect())
    }

    fn is_entity(&self, tag: &str) -> bool {
        tag == "PER"
    }
}

fn lexicon_attack(
    lexicon: WordSwapLexicon,
    constraints: ConstraintSet,
) -> Attack<
    WordSwapTransformation<WordSwapLexicon>,
    UntargetedClassification<SentimentModel>,
    GreedyWordSwap,
> {
    Attack::new(
        WordSwapTransformation::new(lexicon),
        constraints,
        UntargetedClassification::new(SentimentModel),
        GreedyWordSwap::new(),
    )
}

#[test]
fn test_full_attack() {
    let lexicon = WordSwapLexicon::new().with_entry("Worst", ["Best", "Great", "Grandest"]);
    let attack = lexicon_attack(lexicon, ConstraintSet::new());

    let input = AttackInput::new("Worst hot dog ever.").with_ground_truth("pos");
    let result = attack.attack(&input).unwrap();

    assert!(result.is_succeeded());
    let perturbed = result.perturbed().unwrap();
    assert_eq!(perturbed.text(), "Grandest hot dog ever.");
    assert_eq!(perturbed.ground_truth(), Some("pos"));
    assert_eq!(result.original_prediction().label(), "pos");
    assert_eq!(
        result.substitutions(),
        vec![(0, "Worst".to_string(), "Grandest".to_string())]
    );
    // original plus three candidates
    assert_eq!(result.queries(), 4);
}

#[test]
fn test_named_entity_attack() {
    let lexicon = WordSwapLexicon::new()
        .with_entry("Tom", ["Joe"])
        .with_entry("Brady", ["Smith"])
        .with_entry("led", ["guided"]);
    let cache = Arc::new(FeatureCache::new(CapitalTagger, 64).unwrap());
    let constraints = ConstraintSet::new().with(NamedEntityConstraint::new(Arc::clone(&cache)));
    let attack = lexicon_attack(lexicon, constraints);

    let result = attack
        .attack(&AttackInput::new("Tom Brady led the Patriots"))
        .unwrap();

    assert!(result.is_succeeded());
    let perturbed = result.perturbed().unwrap();
    assert_eq!(perturbed.text(), "Joe Smith led the Patriots");
    assert!(!perturbed.words().contains(&"guided"));
    assert!(cache.stats().hits > 0);
}

#[test]
fn test_shared_cache_across_attacks() {
    let cache = Arc::new(FeatureCache::new(CapitalTagger, 64).unwrap());
    let build = || {
        lexicon_attack(
            WordSwapLexicon::new().with_entry("Tom", ["Joe"]),
            ConstraintSet::new().with(NamedEntityConstraint::new(Arc::clone(&cache))),
        )
    };
    let input = AttackInput::new("Tom Brady led the Patriots");

    build().attack(&input).unwrap();
    let after_first = cache.stats();
    build().attack(&input).unwrap();
    let after_second = cache.stats();

    assert_eq!(after_second.misses, after_first.misses);
    assert!(after_second.hits > after_first.hits);
    assert!(cache.contains(input.text()));
}

struct CountingTransformation {
    calls: AtomicUsize,
}

impl Transformation for CountingTransformation {
    fn generate(&self, _input: &AttackInput, _visited: &BTreeSet<usize>) -> Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

#[test]
fn test_misclassified_input_is_skipped() {
    let transformation = CountingTransformation {
        calls: AtomicUsize::new(0),
    };
    let attack = Attack::new(
        &transformation,
        ConstraintSet::new(),
        UntargetedClassification::new(SentimentModel),
        GreedyWordSwap::new(),
    );

    let input = AttackInput::new("Worst hot dog ever.").with_ground_truth("neg");
    let result = attack.attack(&input).unwrap();

    assert!(result.is_skipped());
    assert_eq!(result.queries(), 1);
    assert!(result.perturbed().is_none());
    assert_eq!(transformation.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_exhausted_search_fails() {
    let lexicon = WordSwapLexicon::new().with_entry("Worst", ["Best"]);
    let attack = lexicon_attack(lexicon, ConstraintSet::new());

    let result = attack.attack(&AttackInput::new("Worst hot dog ever.")).unwrap();

    assert!(result.is_failed());
    assert!(result.queries() >= 2);
}

#[test]
fn test_attack_is_deterministic() {
    let lexicon = WordSwapLexicon::new()
        .with_entry("Worst", ["Best", "Great", "Grandest"])
        .with_entry("hot", ["warm", "spicy"]);
    let attack = lexicon_attack(lexicon, ConstraintSet::new());
    let input = AttackInput::new("Worst hot dog ever.");

    let first = attack.attack(&input).unwrap();
    let second = attack.attack(&input).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_dataset_is_lazy_and_isolates_errors() {
    let lexicon = WordSwapLexicon::new().with_entry("Worst", ["Grandest"]);
    let attack = lexicon_attack(lexicon, ConstraintSet::new());

    let pulled = AtomicUsize::new(0);
    let texts = ["Worst hot dog ever.", "boom goes the model", "...", "Worst pie"];
    let inputs = texts.iter().map(|t| {
        pulled.fetch_add(1, Ordering::SeqCst);
        AttackInput::new(*t)
    });

    let mut results = attack.attack_dataset(inputs);
    assert!(results.next().unwrap().unwrap().is_succeeded());
    assert_eq!(pulled.load(Ordering::SeqCst), 1);

    let crashed = results.next().unwrap().unwrap_err();
    assert!(crashed.is_collaborator_fault());
    assert!(matches!(
        results.next().unwrap().unwrap_err(),
        AttackError::EmptyInput { .. }
    ));
    assert!(results.next().unwrap().unwrap().is_succeeded());
    assert!(results.next().is_none());
    assert_eq!(pulled.load(Ordering::SeqCst), 4);
}

#[test]
fn test_parallel_matches_sequential() {
    let lexicon = WordSwapLexicon::new()
        .with_entry("Worst", ["Grandest"])
        .with_entry("Brady", ["Smith"]);
    let attack = lexicon_attack(lexicon, ConstraintSet::new());
    let inputs: Vec<AttackInput> = [
        "Worst hot dog ever.",
        "Tom Brady led the Patriots",
        "boom",
        "nothing to swap here",
    ]
    .iter()
    .map(|t| AttackInput::new(*t))
    .collect();

    let parallel = attack.attack_parallel(&inputs);
    let sequential: Vec<_> = attack.attack_dataset(inputs.clone()).collect();

    assert_eq!(parallel.len(), sequential.len());
    for (p, s) in parallel.iter().zip(&sequential) {
        match (p, s) {
            (Ok(p), Ok(s)) => assert_eq!(p, s),
            (Err(_), Err(_)) => {}
            _ => panic!("parallel and sequential outcomes differ"),
        }
    }
}

#[test]
fn test_observer_sees_iterations() {
    let lexicon = WordSwapLexicon::new()
        .with_entry("Tom", ["Joe"])
        .with_entry("Brady", ["Smith"]);
    let attack = lexicon_attack(lexicon, ConstraintSet::new());
    let mut recorder = RecordingObserver::default();

    let result = attack
        .attack_observed(&AttackInput::new("Tom Brady led the Patriots"), &mut recorder)
        .unwrap();

    assert!(result.is_succeeded());
    assert_eq!(recorder.started, 1);
    assert_eq!(recorder.iterations.len(), 2);
    assert_eq!(recorder.iterations[0].committed, Some(0));
    assert_eq!(recorder.results, vec![result]);
}

/// Positive while the exact word "great" is present.
struct KeywordModel;

impl Model for KeywordModel {
    fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
        let pos = if text.split_whitespace().any(|w| w == "great") {
            0.9
        } else {
            0.3
        };
        Ok(vec![("pos".into(), pos), ("neg".into(), 1.0 - pos)])
    }
}

#[test]
fn test_deepwordbug_recipe() {
    let config = AttackConfig::new().with_seed(7);
    let attack = deepwordbug(KeywordModel, true, &config).unwrap();
    let input = AttackInput::new("a great movie");

    let result = attack.attack(&input).unwrap();
    assert!(result.is_succeeded());

    let substitutions = result.substitutions();
    assert_eq!(substitutions.len(), 1);
    let (position, original, replacement) = &substitutions[0];
    assert_eq!(*position, 1);
    assert_eq!(original, "great");
    assert!(constraints::overlap::levenshtein(original, replacement) <= 30);

    // Same seed, same perturbation.
    let again = deepwordbug(KeywordModel, true, &config)
        .unwrap()
        .attack(&input)
        .unwrap();
    assert_eq!(result, again);
}

#[test]
fn test_recipe_by_name() {
    let recipe: AttackRecipe = "deepwordbug".parse().unwrap();
    let attack = recipe.build(KeywordModel, &AttackConfig::new()).unwrap();
    assert_eq!(attack.constraints().names(), vec!["levenshtein_edit_distance"]);

    assert!("textfooler".parse::<AttackRecipe>().is_err());
}

#[test]
fn test_config_from_json_drives_search() {
    let config = AttackConfig::from_json(r#"{"search": "greedy_wir", "max_candidates": 2}"#).unwrap();
    let lexicon = WordSwapLexicon::new().with_entry("Worst", ["Best", "Great", "Grandest"]);
    let attack = Attack::new(
        WordSwapTransformation::from_config(lexicon, &config),
        ConstraintSet::new(),
        UntargetedClassification::new(SentimentModel),
        search_from_config(&config),
    );

    // Capped at two replacements, "Grandest" is never proposed.
    let result = attack.attack(&AttackInput::new("Worst hot dog ever.")).unwrap();
    assert!(result.is_failed());
}
