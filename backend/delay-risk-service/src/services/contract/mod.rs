/// Record Contract
///
/// Column contract of the ERP open-orders feed. Validation runs before encoding
/// so that a malformed record never reaches the model.
use crate::error::{Result, ScoringError};
use crate::models::{FieldValue, OrderRecord};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Opaque identifier, never a feature.
    Identifier,
    /// String attribute expanded into indicator columns.
    Categorical,
    /// ISO-8601 calendar date.
    Date,
    Integer,
    Float,
    /// 0/1 indicator.
    Flag,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordContract {
    identifier: String,
    fields: Vec<FieldSpec>,
}

impl RecordContract {
    /// Build a contract; `identifier` must name one of the `Identifier` fields.
    pub fn new(identifier: &str, fields: Vec<FieldSpec>) -> Result<Self> {
        let valid = fields
            .iter()
            .any(|f| f.name == identifier && f.kind == FieldKind::Identifier && f.required);
        if !valid {
            return Err(ScoringError::Internal(format!(
                "contract identifier `{}` must be a required identifier field",
                identifier
            )));
        }

        Ok(Self {
            identifier: identifier.to_string(),
            fields,
        })
    }

    /// Contract of the open-orders extract produced by the ERP client.
    pub fn open_orders() -> Self {
        use FieldKind::*;

        Self {
            identifier: "order_id".to_string(),
            fields: vec![
                FieldSpec::required("order_id", Identifier),
                FieldSpec::required("customer_id", Categorical),
                FieldSpec::required("item_id", Categorical),
                FieldSpec::required("plant", Categorical),
                FieldSpec::required("order_date", Date),
                FieldSpec::required("requested_ship_date", Date),
                FieldSpec::required("promised_ship_date", Date),
                FieldSpec::required("order_priority", Integer),
                FieldSpec::required("order_qty", Integer),
                FieldSpec::required("current_available_qty", Integer),
                FieldSpec::required("historical_lead_time_days", Float),
                FieldSpec::required("supplier_reliability_score", Float),
                FieldSpec::required("num_open_orders_customer", Integer),
                FieldSpec::required("past_due_invoices_flag", Flag),
                FieldSpec::required("weekday_ordered", Integer),
                FieldSpec::required("month_ordered", Integer),
            ],
        }
    }

    pub fn identifier_field(&self) -> &str {
        &self.identifier
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    pub fn categorical_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Categorical)
            .map(|f| f.name.as_str())
    }

    /// Check presence and type of every contract field.
    ///
    /// Fields outside the contract are not inspected here; they flow into the
    /// encoder untouched.
    pub fn validate(&self, record: &OrderRecord) -> Result<()> {
        for spec in &self.fields {
            match record.get(&spec.name) {
                None | Some(FieldValue::Null) => {
                    if spec.required {
                        return Err(ScoringError::validation(
                            &spec.name,
                            "missing required field",
                        ));
                    }
                }
                Some(value) => check_kind(spec, value)?,
            }
        }

        Ok(())
    }

    /// Identifier of a validated record.
    pub fn identifier_of(&self, record: &OrderRecord) -> String {
        record
            .get(&self.identifier)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    }
}

impl Default for RecordContract {
    fn default() -> Self {
        Self::open_orders()
    }
}

fn check_kind(spec: &FieldSpec, value: &FieldValue) -> Result<()> {
    let wrong_type = |expected: &str| {
        ScoringError::validation(
            &spec.name,
            format!("expected {}, got {}", expected, value.type_name()),
        )
    };

    match spec.kind {
        FieldKind::Identifier | FieldKind::Categorical => match value {
            FieldValue::Text(s) if s.trim().is_empty() => {
                Err(ScoringError::validation(&spec.name, "must not be empty"))
            }
            FieldValue::Text(_) => Ok(()),
            _ => Err(wrong_type("string")),
        },
        FieldKind::Date => match value {
            FieldValue::Text(s) => parse_date(s).map(|_| ()).ok_or_else(|| {
                ScoringError::validation(
                    &spec.name,
                    format!("expected ISO-8601 date (YYYY-MM-DD), got `{}`", s),
                )
            }),
            _ => Err(wrong_type("ISO-8601 date string")),
        },
        FieldKind::Integer => match value {
            FieldValue::Integer(_) => Ok(()),
            FieldValue::Float(f) if f.fract() == 0.0 => Ok(()),
            _ => Err(wrong_type("integer")),
        },
        FieldKind::Float => match value {
            FieldValue::Integer(_) | FieldValue::Float(_) => Ok(()),
            _ => Err(wrong_type("number")),
        },
        FieldKind::Flag => match value {
            FieldValue::Bool(_) | FieldValue::Integer(0) | FieldValue::Integer(1) => Ok(()),
            FieldValue::Integer(other) => Err(ScoringError::validation(
                &spec.name,
                format!("flag must be 0 or 1, got {}", other),
            )),
            _ => Err(wrong_type("flag (0/1)")),
        },
    }
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
