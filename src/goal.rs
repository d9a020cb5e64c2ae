//! Classification goal functions.

use crate::errors::Result;
use crate::pipeline::traits::{GoalFunction, Model};
use crate::types::{AttackInput, Prediction, Reference, Score};

fn query<M: Model>(model: &M, input: &AttackInput) -> Result<Prediction> {
    let distribution = model.predict(input.text())?;
    Prediction::from_distribution(input.text(), distribution)
}

/// Succeeds once the predicted label differs from the reference label.
///
/// The reference label is the input's ground truth when it has one, and
/// the model's prediction on the unmodified text otherwise. Fitness is the
/// probability the model still assigns to the reference label.
#[derive(Debug, Clone)]
pub struct UntargetedClassification<M> {
    model: M,
}

impl<M: Model> UntargetedClassification<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: Model> GoalFunction for UntargetedClassification<M> {
    fn predict(&self, input: &AttackInput) -> Result<Prediction> {
        query(&self.model, input)
    }

    fn reference(&self, original: &AttackInput, prediction: Prediction) -> Reference {
        let label = original
            .ground_truth()
            .map(str::to_string)
            .unwrap_or_else(|| prediction.label().to_string());
        Reference { label, prediction }
    }

    fn score(&self, reference: &Reference, prediction: &Prediction) -> Score {
        Score::new(
            prediction.probability(&reference.label),
            prediction.label() != reference.label,
        )
    }
}

/// Succeeds once the model predicts `target`.
///
/// Fitness is `1 - p(target)`.
#[derive(Debug, Clone)]
pub struct TargetedClassification<M> {
    model: M,
    target: String,
}

impl<M: Model> TargetedClassification<M> {
    pub fn new(model: M, target: impl Into<String>) -> Self {
        Self {
            model,
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl<M: Model> GoalFunction for TargetedClassification<M> {
    fn predict(&self, input: &AttackInput) -> Result<Prediction> {
        query(&self.model, input)
    }

    fn reference(&self, _original: &AttackInput, prediction: Prediction) -> Reference {
        Reference {
            label: self.target.clone(),
            prediction,
        }
    }

    fn score(&self, reference: &Reference, prediction: &Prediction) -> Score {
        Score::new(
            1.0 - prediction.probability(&reference.label),
            prediction.label() == reference.label,
        )
    }
}
