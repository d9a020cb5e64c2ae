//! Native Python interface
//!
//! Python callables stand in for the model and the neighbour lookup; the
//! search itself runs in Rust.

use crate::constraints::{ConstraintSet, LevenshteinEditDistance, MaxWordsPerturbed};
use crate::errors::{AttackError, Result};
use crate::goal::UntargetedClassification;
use crate::nlp::stopwords::StopwordFilter;
use crate::pipeline::runner::DynAttack;
use crate::pipeline::traits::{Model, NeighborLookup};
use crate::recipes::AttackRecipe;
use crate::search::search_from_config;
use crate::transformations::{
    CompositeWordSwap, WordSwapEmbedding, WordSwapLexicon, WordSwapTransformation,
};
use crate::types::{AttackConfig, AttackInput, AttackResult, SearchKind};
use pyo3::prelude::*;
use std::collections::HashMap;

/// Convert a library error into the matching Python exception.
pub(crate) fn to_py_err(err: AttackError) -> PyErr {
    match err {
        AttackError::InvalidConfig { .. } | AttackError::EmptyInput { .. } => {
            pyo3::exceptions::PyValueError::new_err(err.to_string())
        }
        _ => pyo3::exceptions::PyRuntimeError::new_err(err.to_string()),
    }
}

/// A Python callable `model(text) -> list[tuple[str, float]]`.
pub struct PyModel {
    callable: Py<PyAny>,
}

impl PyModel {
    pub fn new(callable: Py<PyAny>) -> Self {
        Self { callable }
    }
}

impl Model for PyModel {
    fn predict(&self, text: &str) -> Result<Vec<(String, f64)>> {
        Python::with_gil(|py| {
            self.callable
                .call1(py, (text,))
                .and_then(|out| out.extract::<Vec<(String, f64)>>(py))
                .map_err(|e| AttackError::model(e.to_string()))
        })
    }
}

/// A Python callable `neighbors(word, max_count) -> list[str]`.
pub struct PyNeighbors {
    callable: Py<PyAny>,
}

impl NeighborLookup for PyNeighbors {
    fn neighbors(&self, word: &str, max_count: usize) -> Result<Vec<String>> {
        Python::with_gil(|py| {
            self.callable
                .call1(py, (word, max_count))
                .and_then(|out| out.extract::<Vec<String>>(py))
                .map_err(|e| AttackError::neighbors(e.to_string()))
        })
    }
}

/// Outcome of attacking one text
#[pyclass(name = "AttackResult")]
#[derive(Clone)]
pub struct PyAttackResult {
    /// "succeeded", "failed", "skipped" or "error"
    #[pyo3(get)]
    pub outcome: String,
    #[pyo3(get)]
    pub original: String,
    #[pyo3(get)]
    pub perturbed: Option<String>,
    #[pyo3(get)]
    pub original_label: Option<String>,
    #[pyo3(get)]
    pub perturbed_label: Option<String>,
    #[pyo3(get)]
    pub queries: usize,
    /// (position, original word, new word)
    #[pyo3(get)]
    pub substitutions: Vec<(usize, String, String)>,
    #[pyo3(get)]
    pub error: Option<String>,
    json: String,
}

#[pymethods]
impl PyAttackResult {
    fn __repr__(&self) -> String {
        format!(
            "AttackResult(outcome='{}', queries={}, substitutions={})",
            self.outcome,
            self.queries,
            self.substitutions.len()
        )
    }

    fn __str__(&self) -> String {
        self.perturbed.clone().unwrap_or_else(|| self.original.clone())
    }

    /// The full result as a JSON string
    fn to_json(&self) -> String {
        self.json.clone()
    }
}

impl PyAttackResult {
    fn error(original: &str, err: &AttackError) -> Self {
        Self {
            outcome: "error".to_string(),
            original: original.to_string(),
            perturbed: None,
            original_label: None,
            perturbed_label: None,
            queries: 0,
            substitutions: Vec::new(),
            error: Some(err.to_string()),
            json: serde_json::json!({ "outcome": "error", "error": err.to_string() }).to_string(),
        }
    }
}

impl From<&AttackResult> for PyAttackResult {
    fn from(result: &AttackResult) -> Self {
        let outcome = match result {
            AttackResult::Succeeded { .. } => "succeeded",
            AttackResult::Failed { .. } => "failed",
            AttackResult::Skipped { .. } => "skipped",
        };
        let perturbed_label = match result {
            AttackResult::Succeeded {
                perturbed_prediction,
                ..
            } => Some(perturbed_prediction.label().to_string()),
            _ => None,
        };
        Self {
            outcome: outcome.to_string(),
            original: result.original().text().to_string(),
            perturbed: result.perturbed().map(|p| p.text().to_string()),
            original_label: Some(result.original_prediction().label().to_string()),
            perturbed_label,
            queries: result.queries(),
            substitutions: result.substitutions(),
            error: None,
            json: serde_json::to_string(result).unwrap_or_default(),
        }
    }
}

/// Get the built-in stopword list for a language.
#[pyfunction]
#[pyo3(signature = (language = "en"))]
pub fn get_stopwords(language: &str) -> PyResult<Vec<String>> {
    Ok(StopwordFilter::built_in_list(language))
}

/// Word-swap attack driven by a Python model
#[pyclass(name = "WordSwapAttack")]
pub struct PyWordSwapAttack {
    inner: DynAttack,
}

#[pymethods]
impl PyWordSwapAttack {
    #[new]
    #[pyo3(signature = (
        model,
        lexicon=None,
        neighbors=None,
        search="greedy",
        max_candidates=50,
        skip_stopwords=true,
        stopwords=None,
        language="en",
        unk_token="[UNK]",
        max_depth=None,
        max_edit_distance=None,
        max_words_perturbed=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        model: Py<PyAny>,
        lexicon: Option<HashMap<String, Vec<String>>>,
        neighbors: Option<Py<PyAny>>,
        search: &str,
        max_candidates: usize,
        skip_stopwords: bool,
        stopwords: Option<Vec<String>>,
        language: &str,
        unk_token: &str,
        max_depth: Option<usize>,
        max_edit_distance: Option<usize>,
        max_words_perturbed: Option<usize>,
    ) -> PyResult<Self> {
        if lexicon.is_none() && neighbors.is_none() {
            return Err(pyo3::exceptions::PyValueError::new_err(
                "either lexicon or neighbors is required",
            ));
        }

        let search_kind: SearchKind = search.parse().unwrap_or_default();
        let mut config = AttackConfig::new()
            .with_search(search_kind)
            .with_max_candidates(max_candidates)
            .with_skip_stopwords(skip_stopwords)
            .with_stopwords(stopwords.unwrap_or_default())
            .with_language(language)
            .with_unk_token(unk_token);
        config.max_depth = max_depth;
        config.validate().map_err(to_py_err)?;

        let mut swap = CompositeWordSwap::new();
        if let Some(table) = lexicon {
            let mut words = WordSwapLexicon::new();
            for (word, replacements) in table {
                words.insert(word, replacements);
            }
            swap.push(words);
        }
        if let Some(callable) = neighbors {
            swap.push(
                WordSwapEmbedding::new(PyNeighbors { callable })
                    .with_max_neighbors(max_candidates),
            );
        }

        let mut constraints = ConstraintSet::new();
        if let Some(distance) = max_edit_distance {
            constraints.push(LevenshteinEditDistance::new(distance));
        }
        if let Some(words) = max_words_perturbed {
            constraints.push(MaxWordsPerturbed::words(words));
        }

        Ok(Self {
            inner: DynAttack::new(
                Box::new(WordSwapTransformation::from_config(swap, &config)),
                constraints,
                Box::new(UntargetedClassification::new(PyModel::new(model))),
                search_from_config(&config),
            ),
        })
    }

    /// Attack one text
    #[pyo3(signature = (text, ground_truth=None))]
    fn attack(&self, text: &str, ground_truth: Option<String>) -> PyResult<PyAttackResult> {
        let input = make_input(text, ground_truth);
        let result = self.inner.attack(&input).map_err(to_py_err)?;
        Ok(PyAttackResult::from(&result))
    }

    /// Attack several texts in order. Failures are reported per item with
    /// outcome "error" instead of raising.
    #[pyo3(signature = (texts, ground_truths=None))]
    fn attack_many(
        &self,
        texts: Vec<String>,
        ground_truths: Option<Vec<String>>,
    ) -> PyResult<Vec<PyAttackResult>> {
        if let Some(labels) = &ground_truths {
            if labels.len() != texts.len() {
                return Err(pyo3::exceptions::PyValueError::new_err(format!(
                    "got {} texts but {} ground truth labels",
                    texts.len(),
                    labels.len()
                )));
            }
        }

        let labels = ground_truths
            .map(|ls| ls.into_iter().map(Some).collect::<Vec<_>>())
            .unwrap_or_else(|| vec![None; texts.len()]);
        let inputs: Vec<AttackInput> = texts
            .iter()
            .zip(labels)
            .map(|(text, label)| make_input(text, label))
            .collect();

        Ok(self
            .inner
            .attack_dataset(inputs)
            .zip(texts.iter())
            .map(|(result, text)| match result {
                Ok(result) => PyAttackResult::from(&result),
                Err(err) => PyAttackResult::error(text, &err),
            })
            .collect())
    }

    fn __repr__(&self) -> String {
        format!("WordSwapAttack(constraints={:?})", self.inner.constraints())
    }
}

fn make_input(text: &str, ground_truth: Option<String>) -> AttackInput {
    let input = AttackInput::new(text);
    match ground_truth {
        Some(label) => input.with_ground_truth(label),
        None => input,
    }
}

/// Build a named recipe ("deepwordbug", "deepwordbug_substitution") around
/// a Python model.
#[pyfunction]
#[pyo3(signature = (model, recipe = "deepwordbug", seed = 0, max_depth = None))]
pub fn build_recipe(
    model: Py<PyAny>,
    recipe: &str,
    seed: u64,
    max_depth: Option<usize>,
) -> PyResult<PyWordSwapAttack> {
    let recipe: AttackRecipe = recipe.parse().map_err(to_py_err)?;
    let mut config = AttackConfig::new().with_seed(seed);
    config.max_depth = max_depth;
    let inner = recipe
        .build(PyModel::new(model), &config)
        .map_err(to_py_err)?;
    Ok(PyWordSwapAttack { inner })
}
