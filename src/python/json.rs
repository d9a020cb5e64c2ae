//! JSON interface for batch processing
//!
//! One call attacks a whole batch described by a JSON document, which keeps
//! Python↔Rust conversions to a single string each way:
//!
//! ```json
//! {
//!   "config": {"max_candidates": 10, "search": "greedy_wir"},
//!   "lexicon": {"good": ["fine", "decent"]},
//!   "max_edit_distance": 30,
//!   "inputs": [{"text": "a good film", "ground_truth": "pos"}]
//! }
//! ```
//!
//! The output is a JSON array with one entry per input: a serialized
//! attack result, or `{"outcome": "error", "error": "..."}`.

use crate::constraints::{ConstraintSet, LevenshteinEditDistance};
use crate::errors::Result;
use crate::goal::UntargetedClassification;
use crate::pipeline::runner::Attack;
use crate::pipeline::traits::Model;
use crate::python::native::{to_py_err, PyModel};
use crate::search::search_from_config;
use crate::transformations::{WordSwapLexicon, WordSwapTransformation};
use crate::types::{AttackConfig, AttackInput};
use pyo3::prelude::*;
use serde::Deserialize;

/// One input from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct JsonInput {
    pub text: String,
    #[serde(default)]
    pub ground_truth: Option<String>,
}

impl From<JsonInput> for AttackInput {
    fn from(ji: JsonInput) -> Self {
        let input = AttackInput::new(ji.text);
        match ji.ground_truth {
            Some(label) => input.with_ground_truth(label),
            None => input,
        }
    }
}

/// Batch document from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct JsonBatch {
    #[serde(default)]
    pub config: AttackConfig,
    pub lexicon: WordSwapLexicon,
    #[serde(default)]
    pub max_edit_distance: Option<usize>,
    pub inputs: Vec<JsonInput>,
}

/// Run a batch document against any model and serialize the results.
pub fn run_batch<M: Model>(model: M, json_input: &str) -> Result<String> {
    let batch: JsonBatch = serde_json::from_str(json_input)?;
    batch.config.validate()?;

    let mut constraints = ConstraintSet::new();
    if let Some(distance) = batch.max_edit_distance {
        constraints.push(LevenshteinEditDistance::new(distance));
    }
    let attack = Attack::new(
        WordSwapTransformation::from_config(batch.lexicon, &batch.config),
        constraints,
        UntargetedClassification::new(model),
        search_from_config(&batch.config),
    );

    let inputs = batch.inputs.into_iter().map(AttackInput::from);
    let results: Vec<serde_json::Value> = attack
        .attack_dataset(inputs)
        .map(|result| match result {
            Ok(result) => serde_json::to_value(&result),
            Err(err) => Ok(serde_json::json!({ "outcome": "error", "error": err.to_string() })),
        })
        .collect::<std::result::Result<_, _>>()?;

    Ok(serde_json::to_string(&results)?)
}

/// Attack a JSON batch with a Python model callable.
#[pyfunction]
pub fn attack_batch_from_json(model: Py<PyAny>, json_input: &str) -> PyResult<String> {
    run_batch(PyModel::new(model), json_input).map_err(to_py_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AttackError;

    struct Keyword;

    impl Model for Keyword {
        fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
            if text.contains("crash") {
                return Err(AttackError::model("crash"));
            }
            let pos = if text.contains("decent") { 0.4 } else { 0.8 };
            Ok(vec![("pos".into(), pos), ("neg".into(), 1.0 - pos)])
        }
    }

    #[test]
    fn test_run_batch() {
        let json_input = r#"{
            "config": {"max_candidates": 5},
            "lexicon": {"good": ["fine", "decent"], "bad": ["crash"]},
            "inputs": [
                {"text": "a good film"},
                {"text": "a bad film"},
                {"text": "a good film", "ground_truth": "neg"}
            ]
        }"#;

        let out: Vec<serde_json::Value> =
            serde_json::from_str(&run_batch(Keyword, json_input).unwrap()).unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["outcome"], "succeeded");
        assert_eq!(out[0]["perturbed"]["text"], "a decent film");
        assert_eq!(out[1]["outcome"], "error");
        assert_eq!(out[2]["outcome"], "skipped");
    }

    #[test]
    fn test_run_batch_rejects_bad_documents() {
        assert!(run_batch(Keyword, "{").is_err());
        let invalid = r#"{"config": {"max_candidates": 0}, "lexicon": {}, "inputs": []}"#;
        assert!(matches!(
            run_batch(Keyword, invalid).unwrap_err(),
            AttackError::InvalidConfig { .. }
        ));
    }
}
