/// Predictor
///
/// Wraps the loaded classifier and turns aligned vectors into thresholded
/// predictions.
///
/// Batch policy is atomic: every vector is checked against the schema and for
/// non-finite values before any probability is computed, and the first bad
/// record fails the whole batch.
pub mod model;

pub use model::{load_classifier, Classifier, LogisticClassifier, OnnxClassifier};

use crate::error::{Result, ScoringError};
use crate::models::Prediction;
use crate::services::aligner::AlignedVector;
use crate::services::schema::FeatureSchema;
use std::sync::Arc;
use tracing::error;

pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

pub struct Predictor {
    model: Arc<dyn Classifier>,
    schema: Arc<FeatureSchema>,
    threshold: f64,
}

impl Predictor {
    pub fn new(model: Arc<dyn Classifier>, schema: Arc<FeatureSchema>, threshold: f64) -> Self {
        Self {
            model,
            schema,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn predict(&self, aligned: &AlignedVector) -> Result<Prediction> {
        self.check(aligned)?;
        self.infer(aligned)
    }

    /// Predictions in input order, one per vector.
    pub fn predict_batch(&self, batch: &[AlignedVector]) -> Result<Vec<Prediction>> {
        for (index, aligned) in batch.iter().enumerate() {
            self.check(aligned).map_err(|e| e.at_record(index))?;
        }

        batch
            .iter()
            .enumerate()
            .map(|(index, aligned)| self.infer(aligned).map_err(|e| e.at_record(index)))
            .collect()
    }

    fn check(&self, aligned: &AlignedVector) -> Result<()> {
        if aligned.len() != self.schema.len() || !self.schema.matches(aligned.columns()) {
            error!(
                order_id = %aligned.identifier(),
                expected = self.schema.len(),
                actual = aligned.len(),
                "Aligned vector does not match the loaded feature schema"
            );
            return Err(ScoringError::SchemaMismatch {
                expected: self.schema.len(),
                actual: aligned.len(),
            });
        }

        if let Some((column, value)) = aligned.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ScoringError::InvalidFeatureValue {
                record: None,
                identifier: aligned.identifier().to_string(),
                column: column.to_string(),
                value,
            });
        }

        Ok(())
    }

    fn infer(&self, aligned: &AlignedVector) -> Result<Prediction> {
        let probability = self.model.probability_of_positive_class(aligned.values())?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(ScoringError::Inference(format!(
                "{} model returned probability {} outside [0, 1]",
                self.model.kind(),
                probability
            )));
        }

        Ok(Prediction {
            identifier: aligned.identifier().to_string(),
            probability,
            label: u8::from(probability >= self.threshold),
        })
    }
}
