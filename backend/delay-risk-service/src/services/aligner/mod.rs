/// Schema Aligner
///
/// Conforms an encoded record to the training schema: every schema column in
/// schema order, nothing else. Missing columns take `FILL_VALUE`, unknown
/// columns are dropped.
use crate::services::encoder::EncodedVector;
use crate::services::schema::FeatureSchema;
use std::sync::Arc;
use tracing::trace;

/// Value for a schema column the record does not carry. Must read as "absent"
/// for every feature: indicator off, zero quantity, flag unset.
pub const FILL_VALUE: f64 = 0.0;

/// Anything the aligner can read named feature values from.
pub trait FeatureLookup {
    fn identifier(&self) -> &str;
    fn lookup(&self, column: &str) -> Option<f64>;
    fn column_count(&self) -> usize;
}

impl FeatureLookup for EncodedVector {
    fn identifier(&self) -> &str {
        EncodedVector::identifier(self)
    }

    fn lookup(&self, column: &str) -> Option<f64> {
        self.get(column)
    }

    fn column_count(&self) -> usize {
        self.len()
    }
}

/// Feature values positionally matching a schema's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedVector {
    identifier: String,
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl AlignedVector {
    /// Assemble a vector without checking it against any schema. The predictor
    /// rejects vectors that do not match the loaded schema.
    pub fn from_parts(
        identifier: impl Into<String>,
        columns: Arc<[String]>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            columns,
            values,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn columns(&self) -> &Arc<[String]> {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i).copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl FeatureLookup for AlignedVector {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn lookup(&self, column: &str) -> Option<f64> {
        self.get(column)
    }

    fn column_count(&self) -> usize {
        self.len()
    }
}

pub struct SchemaAligner {
    schema: Arc<FeatureSchema>,
}

impl SchemaAligner {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self { schema }
    }

    pub fn align<F: FeatureLookup>(&self, features: &F) -> AlignedVector {
        let mut matched = 0usize;
        let values: Vec<f64> = self
            .schema
            .columns()
            .iter()
            .map(|column| match features.lookup(column) {
                Some(value) => {
                    matched += 1;
                    value
                }
                None => FILL_VALUE,
            })
            .collect();

        trace!(
            order_id = %features.identifier(),
            matched,
            filled = values.len() - matched,
            dropped = features.column_count().saturating_sub(matched),
            "Aligned feature vector"
        );

        AlignedVector {
            identifier: features.identifier().to_string(),
            columns: Arc::clone(self.schema.columns()),
            values,
        }
    }

    pub fn align_batch<F: FeatureLookup>(&self, batch: &[F]) -> Vec<AlignedVector> {
        batch.iter().map(|features| self.align(features)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::contract::RecordContract;

    fn aligner(columns: &[&str]) -> SchemaAligner {
        let schema = FeatureSchema::from_columns(
            columns.iter().map(|s| s.to_string()).collect(),
            &RecordContract::open_orders(),
        )
        .unwrap();
        SchemaAligner::new(Arc::new(schema))
    }

    #[test]
    fn test_fills_missing_and_drops_unknown() {
        let aligner = aligner(&["order_qty", "plant_PLANT_A", "plant_PLANT_B"]);
        let encoded = EncodedVector::new("O1")
            .with("plant_PLANT_B", 1.0)
            .with("order_qty", 42.0)
            .with("plant_LA01", 1.0);

        let aligned = aligner.align(&encoded);

        assert_eq!(aligned.identifier(), "O1");
        assert_eq!(aligned.values(), &[42.0, FILL_VALUE, 1.0]);
        assert_eq!(
            aligned.columns().to_vec(),
            vec!["order_qty", "plant_PLANT_A", "plant_PLANT_B"]
        );
        assert_eq!(aligned.get("plant_LA01"), None);
    }

    #[test]
    fn test_empty_input_is_all_fill() {
        let aligner = aligner(&["a", "b", "c"]);
        let aligned = aligner.align(&EncodedVector::new("O1"));
        assert_eq!(aligned.values(), &[FILL_VALUE; 3]);
    }

    #[test]
    fn test_alignment_is_idempotent() {
        let aligner = aligner(&["order_qty", "plant_PLANT_A", "month_ordered"]);
        let encoded = EncodedVector::new("O1")
            .with("order_qty", 3.0)
            .with("extra", 9.0)
            .with("month_ordered", 11.0);

        let once = aligner.align(&encoded);
        let twice = aligner.align(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_shares_schema_columns() {
        let aligner = aligner(&["a", "b"]);
        let aligned = aligner.align(&EncodedVector::new("O1").with("a", 1.0));
        assert!(Arc::ptr_eq(aligned.columns(), aligner.schema.columns()));
    }

    #[test]
    fn test_batch_preserves_order() {
        let aligner = aligner(&["a"]);
        let batch = vec![
            EncodedVector::new("O1").with("a", 1.0),
            EncodedVector::new("O2").with("a", 2.0),
            EncodedVector::new("O3").with("a", 3.0),
        ];

        let aligned = aligner.align_batch(&batch);
        let ids: Vec<&str> = aligned.iter().map(|v| v.identifier()).collect();
        assert_eq!(ids, vec!["O1", "O2", "O3"]);
        assert_eq!(aligned[2].values(), &[3.0]);
    }
}
