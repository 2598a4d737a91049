pub mod aggregator;
pub mod aligner;
pub mod contract;
pub mod encoder;
pub mod erp_source;
pub mod predictor;
pub mod schema;
pub mod scoring;

pub use aggregator::aggregate;
pub use aligner::{AlignedVector, SchemaAligner, FILL_VALUE};
pub use contract::{FieldKind, FieldSpec, RecordContract};
pub use encoder::{CategoricalEncoder, EncodedVector};
pub use predictor::{Classifier, LogisticClassifier, OnnxClassifier, Predictor};
pub use schema::FeatureSchema;
pub use scoring::ScoringContext;
