use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw value of one order field as received from the caller or the ERP source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "string",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view used by the encoder; text and null have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Null | FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// One open purchase order: a flat field → value mapping owned by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl OrderRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.fields.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for OrderRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Late-shipment prediction for a single order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub identifier: String,
    pub probability: f64,
    pub label: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub count: usize,
    pub positive_count: usize,
    pub positive_rate: f64,
}

/// Result of `score_many`: predictions in input order plus their summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchScore {
    pub predictions: Vec<Prediction>,
    pub summary: BatchSummary,
}

// HTTP response bodies

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderScoreResponse {
    pub order_id: String,
    pub late_flag_pred: u8,
    pub late_probability: f64,
}

impl From<&Prediction> for OrderScoreResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            order_id: prediction.identifier.clone(),
            late_flag_pred: prediction.label,
            late_probability: crate::utils::round_probability(prediction.probability),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchScoreResponse {
    pub n_orders: usize,
    pub late_count: usize,
    pub late_rate: f64,
    pub results: Vec<OrderScoreResponse>,
}

impl From<&BatchScore> for BatchScoreResponse {
    fn from(batch: &BatchScore) -> Self {
        Self {
            n_orders: batch.summary.count,
            late_count: batch.summary.positive_count,
            late_rate: batch.summary.positive_rate,
            results: batch.predictions.iter().map(OrderScoreResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_kind: String,
    pub schema_fingerprint: String,
    pub feature_count: usize,
}
