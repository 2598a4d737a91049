/// Classifier backends
///
/// Loads the trained late-shipment classifier. Two artifact formats:
/// - `.onnx`: tree ensemble exported from the training pipeline, run with tract-onnx
/// - `.json`: logistic model (intercept + per-column coefficients)
///
/// A load failure is fatal; there is no heuristic fallback.
use crate::error::{Result, ScoringError};
use crate::services::schema::FeatureSchema;
use crate::utils::sigmoid;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A trained binary classifier over schema-ordered features.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    fn kind(&self) -> &'static str;

    /// Probability of the positive (late) class for one aligned feature row.
    fn probability_of_positive_class(&self, features: &[f64]) -> Result<f64>;
}

/// Load the classifier at `path`, choosing the backend from the file extension.
pub fn load_classifier<P: AsRef<Path>>(
    path: P,
    schema: &FeatureSchema,
) -> Result<Arc<dyn Classifier>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let classifier: Arc<dyn Classifier> = match extension.as_deref() {
        Some("onnx") => Arc::new(OnnxClassifier::load(path, schema.len())?),
        Some("json") => Arc::new(LogisticClassifier::load(path, schema)?),
        _ => {
            return Err(ScoringError::ModelUnavailable(format!(
                "unsupported model artifact {} (expected .onnx or .json)",
                path.display()
            )))
        }
    };

    info!(
        path = %path.display(),
        kind = classifier.kind(),
        features = schema.len(),
        "✅ Loaded late-shipment classifier"
    );
    Ok(classifier)
}

type OnnxPlan = tract_onnx::prelude::SimplePlan<
    tract_onnx::prelude::TypedFact,
    Box<dyn tract_onnx::prelude::TypedOp>,
    tract_onnx::prelude::Graph<
        tract_onnx::prelude::TypedFact,
        Box<dyn tract_onnx::prelude::TypedOp>,
    >,
>;

/// ONNX classifier evaluated one row at a time (`1 × n_features` f32 input).
pub struct OnnxClassifier {
    plan: OnnxPlan,
    n_features: usize,
}

impl OnnxClassifier {
    pub fn load(path: &Path, n_features: usize) -> Result<Self> {
        use tract_onnx::prelude::*;

        if !path.exists() {
            return Err(ScoringError::ModelUnavailable(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, n_features]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                ScoringError::ModelUnavailable(format!(
                    "failed to load ONNX model {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self { plan, n_features })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn probability_of_positive_class(&self, features: &[f64]) -> Result<f64> {
        use tract_onnx::prelude::*;

        if features.len() != self.n_features {
            return Err(ScoringError::Inference(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), row)
            .map_err(|e| ScoringError::Inference(format!("input tensor: {}", e)))?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| ScoringError::Inference(format!("ONNX inference failed: {}", e)))?;

        positive_class_probability(outputs.iter().map(|output| &**output))
    }
}

/// Pick the late-class probability out of an ONNX classifier's outputs.
///
/// Classifier exports emit an integer label tensor next to the float
/// probabilities; the first f32 output shaped `[1, 2]` (column 1) or holding a
/// single value wins.
fn positive_class_probability<'a, I>(outputs: I) -> Result<f64>
where
    I: IntoIterator<Item = &'a tract_onnx::prelude::Tensor>,
{
    for output in outputs {
        if let Ok(view) = output.to_array_view::<f32>() {
            match view.len() {
                2 => return Ok(view.iter().nth(1).copied().unwrap_or_default() as f64),
                1 => return Ok(view.iter().next().copied().unwrap_or_default() as f64),
                _ => continue,
            }
        }
    }

    Err(ScoringError::Inference(
        "ONNX model produced no probability output".to_string(),
    ))
}

#[derive(Debug, Deserialize)]
struct LogisticArtifact {
    intercept: f64,
    coefficients: BTreeMap<String, f64>,
}

/// Logistic regression: `p = σ(intercept + Σ wᵢ·xᵢ)`.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    intercept: f64,
    weights: Vec<f64>,
}

impl LogisticClassifier {
    /// Weights must be in schema order.
    pub fn new(intercept: f64, weights: Vec<f64>) -> Self {
        Self { intercept, weights }
    }

    pub fn from_json(raw: &str, schema: &FeatureSchema) -> Result<Self> {
        let artifact: LogisticArtifact = serde_json::from_str(raw).map_err(|e| {
            ScoringError::ModelUnavailable(format!("logistic model is not valid JSON: {}", e))
        })?;

        let mut weights = vec![0.0; schema.len()];
        for (column, weight) in artifact.coefficients {
            let position = schema.position(&column).ok_or_else(|| {
                ScoringError::ModelUnavailable(format!(
                    "coefficient for `{}` which is not in the feature schema",
                    column
                ))
            })?;
            weights[position] = weight;
        }

        Ok(Self::new(artifact.intercept, weights))
    }

    pub fn load(path: &Path, schema: &FeatureSchema) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScoringError::ModelUnavailable(format!(
                "failed to read model {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw, schema)
    }
}

impl Classifier for LogisticClassifier {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn probability_of_positive_class(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.weights.len() {
            return Err(ScoringError::Inference(format!(
                "expected {} features, got {}",
                self.weights.len(),
                features.len()
            )));
        }

        let margin = self.intercept
            + features
                .iter()
                .zip(&self.weights)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        Ok(sigmoid(margin))
    }
}
