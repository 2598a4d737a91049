/// Scoring Context
///
/// Immutable bundle of everything a request needs: record contract, feature
/// schema, encoder, aligner and predictor. Built once at startup by `load` and
/// shared read-only between workers.
///
/// # Workflow
/// 1. Validate each record against the contract
/// 2. Encode categorical fields against the frozen vocabulary
/// 3. Align to the training schema
/// 4. Predict, then summarise batches
use crate::config::Config;
use crate::error::Result;
use crate::models::{BatchScore, OrderRecord, Prediction};
use crate::services::aggregator::aggregate;
use crate::services::aligner::SchemaAligner;
use crate::services::contract::RecordContract;
use crate::services::encoder::CategoricalEncoder;
use crate::services::predictor::{load_classifier, Classifier, Predictor};
use crate::services::schema::FeatureSchema;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ScoringContext {
    schema: Arc<FeatureSchema>,
    contract: Arc<RecordContract>,
    encoder: CategoricalEncoder,
    aligner: SchemaAligner,
    predictor: Predictor,
}

impl ScoringContext {
    pub fn new(
        model: Arc<dyn Classifier>,
        schema: FeatureSchema,
        contract: RecordContract,
        threshold: f64,
    ) -> Self {
        let schema = Arc::new(schema);
        let contract = Arc::new(contract);

        Self {
            encoder: CategoricalEncoder::new(Arc::clone(&schema), Arc::clone(&contract)),
            aligner: SchemaAligner::new(Arc::clone(&schema)),
            predictor: Predictor::new(model, Arc::clone(&schema), threshold),
            schema,
            contract,
        }
    }

    /// Load the schema and classifier named in `config`. Any failure here is a
    /// `ModelUnavailable` and the caller must not serve traffic.
    pub fn load(config: &Config) -> Result<Self> {
        let contract = RecordContract::open_orders();
        let schema = FeatureSchema::load(&config.schema_path, &contract)?;
        let model = load_classifier(&config.model_path, &schema)?;

        info!(
            model_kind = model.kind(),
            features = schema.len(),
            fingerprint = %schema.short_fingerprint(),
            threshold = config.decision_threshold,
            "Scoring context ready"
        );

        Ok(Self::new(model, schema, contract, config.decision_threshold))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn contract(&self) -> &RecordContract {
        &self.contract
    }

    pub fn model_kind(&self) -> &'static str {
        self.predictor.model_kind()
    }

    pub fn threshold(&self) -> f64 {
        self.predictor.threshold()
    }

    pub fn score_one(&self, record: &OrderRecord) -> Result<Prediction> {
        if let Err(err) = self.contract.validate(record) {
            warn!(error = %err, "Rejected order record");
            return Err(err);
        }

        let encoded = self.encoder.encode(record);
        let aligned = self.aligner.align(&encoded);
        self.predictor.predict(&aligned)
    }

    /// Score a batch as one unit of work. The first invalid record fails the
    /// batch; its index is carried in the error.
    pub fn score_many(&self, records: &[OrderRecord]) -> Result<BatchScore> {
        if records.is_empty() {
            return Ok(BatchScore::default());
        }

        for (index, record) in records.iter().enumerate() {
            if let Err(err) = self.contract.validate(record) {
                let err = err.at_record(index);
                warn!(error = %err, batch_size = records.len(), "Rejected order batch");
                return Err(err);
            }
        }

        let encoded = self.encoder.encode_batch(records);
        let aligned = self.aligner.align_batch(&encoded);
        let predictions = self.predictor.predict_batch(&aligned)?;
        let summary = aggregate(&predictions);

        debug!(
            count = summary.count,
            positive_count = summary.positive_count,
            positive_rate = summary.positive_rate,
            "Scored order batch"
        );

        Ok(BatchScore {
            predictions,
            summary,
        })
    }
}
