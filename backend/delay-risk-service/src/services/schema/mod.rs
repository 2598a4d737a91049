/// Schema Registry
///
/// Frozen, ordered list of training-time feature columns plus the categorical
/// vocabulary the model was trained with. Loaded once at startup and shared
/// read-only; nothing here mutates after construction.
use crate::error::{Result, ScoringError};
use crate::services::contract::RecordContract;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// On-disk schema formats. The training step writes a bare column list; the
/// object form additionally pins the categorical vocabulary.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaArtifact {
    Columns(Vec<String>),
    Described {
        columns: Vec<String>,
        #[serde(default)]
        categorical: Option<BTreeMap<String, Vec<String>>>,
    },
}

#[derive(Debug)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
    positions: HashMap<String, usize>,
    vocabulary: BTreeMap<String, BTreeSet<String>>,
    fingerprint: String,
}

impl FeatureSchema {
    /// Build a schema from ordered columns and an explicit vocabulary.
    pub fn new(
        columns: Vec<String>,
        vocabulary: BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(ScoringError::ModelUnavailable(
                "feature schema has no columns".to_string(),
            ));
        }

        let mut positions = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if positions.insert(column.clone(), position).is_some() {
                return Err(ScoringError::ModelUnavailable(format!(
                    "duplicate column `{}` in feature schema",
                    column
                )));
            }
        }

        let fingerprint = fingerprint(&columns);

        Ok(Self {
            columns: columns.into(),
            positions,
            vocabulary,
            fingerprint,
        })
    }

    /// Build a schema whose vocabulary is read off the `<field>_<category>`
    /// indicator columns of every categorical contract field.
    pub fn from_columns(columns: Vec<String>, contract: &RecordContract) -> Result<Self> {
        let vocabulary = derive_vocabulary(&columns, contract);
        Self::new(columns, vocabulary)
    }

    pub fn from_json(raw: &str, contract: &RecordContract) -> Result<Self> {
        let artifact = serde_json::from_str::<SchemaArtifact>(raw).map_err(|e| {
            ScoringError::ModelUnavailable(format!("feature schema is not valid JSON: {}", e))
        })?;

        match artifact {
            SchemaArtifact::Columns(columns) => Self::from_columns(columns, contract),
            SchemaArtifact::Described {
                columns,
                categorical: None,
            } => Self::from_columns(columns, contract),
            SchemaArtifact::Described {
                columns,
                categorical: Some(categorical),
            } => {
                let vocabulary = categorical
                    .into_iter()
                    .map(|(field, categories)| (field, categories.into_iter().collect()))
                    .collect();
                Self::new(columns, vocabulary)
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, contract: &RecordContract) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScoringError::ModelUnavailable(format!(
                "failed to read feature schema {}: {}",
                path.display(),
                e
            ))
        })?;

        let schema = Self::from_json(&raw, contract)?;
        info!(
            path = %path.display(),
            columns = schema.len(),
            fingerprint = %schema.short_fingerprint(),
            "Loaded feature schema"
        );
        Ok(schema)
    }

    pub fn columns(&self) -> &Arc<[String]> {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    /// Whether `field` is one-hot encoded against a fixed vocabulary.
    pub fn is_categorical(&self, field: &str) -> bool {
        self.vocabulary.contains_key(field)
    }

    pub fn is_known_category(&self, field: &str, category: &str) -> bool {
        self.vocabulary
            .get(field)
            .map(|categories| categories.contains(category))
            .unwrap_or(false)
    }

    pub fn vocabulary(&self, field: &str) -> Option<&BTreeSet<String>> {
        self.vocabulary.get(field)
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn short_fingerprint(&self) -> &str {
        &self.fingerprint[..12]
    }

    /// True when `columns` are positionally identical to this schema.
    pub fn matches(&self, columns: &Arc<[String]>) -> bool {
        Arc::ptr_eq(&self.columns, columns) || self.columns[..] == columns[..]
    }
}

fn derive_vocabulary(
    columns: &[String],
    contract: &RecordContract,
) -> BTreeMap<String, BTreeSet<String>> {
    contract
        .categorical_fields()
        .map(|field| {
            let prefix = format!("{}_", field);
            let categories = columns
                .iter()
                .filter_map(|column| column.strip_prefix(prefix.as_str()))
                .filter(|category| !category.is_empty())
                .map(str::to_string)
                .collect();
            (field.to_string(), categories)
        })
        .collect()
}

fn fingerprint(columns: &[String]) -> String {
    let mut hasher = Sha256::new();
    for column in columns {
        hasher.update(column.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
