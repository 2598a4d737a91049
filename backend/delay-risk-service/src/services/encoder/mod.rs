/// Categorical Encoder
///
/// Turns one validated order into named numeric features:
/// - categorical fields become `<field>_<category>` indicators, checked against
///   the vocabulary frozen in the feature schema
/// - numeric and flag fields pass through under their own name
/// - identifiers and raw dates are dropped; the lead-time feature is derived
///   from the dates instead
/// - fields outside the record contract are ignored, so a payload cannot set
///   schema columns directly
///
/// Each record is encoded on its own, so a record's columns never depend on the
/// other records of its batch.
use crate::models::{FieldValue, OrderRecord};
use crate::services::contract::{parse_date, FieldKind, RecordContract};
use crate::services::schema::FeatureSchema;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Days between order date and requested ship date.
pub const REQUESTED_LEAD_TIME_DAYS: &str = "requested_lead_time_days";

const ORDER_DATE: &str = "order_date";
const REQUESTED_SHIP_DATE: &str = "requested_ship_date";

/// Column name → value mapping for one record, before alignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedVector {
    identifier: String,
    values: BTreeMap<String, f64>,
    unknown_categories: Vec<(String, String)>,
}

impl EncodedVector {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: f64) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: f64) {
        self.values.insert(column.into(), value);
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(field, value)` pairs whose category is outside the training vocabulary.
    pub fn unknown_categories(&self) -> &[(String, String)] {
        &self.unknown_categories
    }
}

pub struct CategoricalEncoder {
    schema: Arc<FeatureSchema>,
    contract: Arc<RecordContract>,
}

impl CategoricalEncoder {
    pub fn new(schema: Arc<FeatureSchema>, contract: Arc<RecordContract>) -> Self {
        Self { schema, contract }
    }

    pub fn encode(&self, record: &OrderRecord) -> EncodedVector {
        let mut encoded = EncodedVector::new(self.contract.identifier_of(record));

        for (field, value) in record.iter() {
            match self.contract.kind_of(field) {
                Some(FieldKind::Identifier) | Some(FieldKind::Date) | None => {}
                Some(FieldKind::Categorical) => self.encode_category(&mut encoded, field, value),
                Some(FieldKind::Integer) | Some(FieldKind::Float) | Some(FieldKind::Flag) => {
                    if let Some(number) = value.as_f64() {
                        encoded.insert(field.as_str(), number);
                    }
                }
            }
        }

        if let Some(days) = requested_lead_time_days(record) {
            encoded.insert(REQUESTED_LEAD_TIME_DAYS, days);
        }

        if !encoded.unknown_categories.is_empty() {
            debug!(
                order_id = %encoded.identifier,
                unknown = ?encoded.unknown_categories,
                "Categories outside training vocabulary encode as all-zero indicators"
            );
        }

        encoded
    }

    pub fn encode_batch(&self, records: &[OrderRecord]) -> Vec<EncodedVector> {
        records.iter().map(|record| self.encode(record)).collect()
    }

    fn encode_category(&self, encoded: &mut EncodedVector, field: &str, value: &FieldValue) {
        let category = match value {
            FieldValue::Text(s) => s.as_str(),
            _ => return,
        };

        // Fields the schema has no vocabulary for fall back to plain one-hot
        // naming; the aligner keeps only columns the model knows.
        if !self.schema.is_categorical(field) || self.schema.is_known_category(field, category) {
            encoded.insert(indicator_column(field, category), 1.0);
        } else {
            encoded
                .unknown_categories
                .push((field.to_string(), category.to_string()));
        }
    }
}

pub fn indicator_column(field: &str, category: &str) -> String {
    format!("{}_{}", field, category)
}

fn requested_lead_time_days(record: &OrderRecord) -> Option<f64> {
    let order_date = record.get(ORDER_DATE)?.as_text().and_then(parse_date)?;
    let requested = record
        .get(REQUESTED_SHIP_DATE)?
        .as_text()
        .and_then(parse_date)?;
    Some((requested - order_date).num_days() as f64)
}
