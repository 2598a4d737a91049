use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoringError>;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Malformed or missing input field, rejected before encoding.
    #[error("Validation error on field `{field}`{}: {reason}", record_suffix(.record))]
    Validation {
        record: Option<usize>,
        field: String,
        reason: String,
    },

    /// A value that is not a finite number reached the aligned feature vector.
    #[error("Invalid feature value for `{column}` in order {identifier}{}: {value}", record_suffix(.record))]
    InvalidFeatureValue {
        record: Option<usize>,
        identifier: String,
        column: String,
        value: f64,
    },

    /// The model artifact or its schema could not be loaded. Fatal at startup.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Aligned input does not match the loaded schema; the aligner was bypassed.
    #[error("Schema mismatch: expected {expected} columns in training order, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn record_suffix(record: &Option<usize>) -> String {
    record
        .map(|index| format!(" (record {})", index))
        .unwrap_or_default()
}

impl ScoringError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ScoringError::Validation {
            record: None,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attach the position of the offending record inside a batch.
    pub fn at_record(self, index: usize) -> Self {
        match self {
            ScoringError::Validation { field, reason, .. } => ScoringError::Validation {
                record: Some(index),
                field,
                reason,
            },
            ScoringError::InvalidFeatureValue {
                identifier,
                column,
                value,
                ..
            } => ScoringError::InvalidFeatureValue {
                record: Some(index),
                identifier,
                column,
                value,
            },
            other => other,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScoringError::Validation { .. } | ScoringError::InvalidFeatureValue { .. }
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<usize>,
}

impl ResponseError for ScoringError {
    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        let (field, record) = match self {
            ScoringError::Validation { field, record, .. } => (Some(field.clone()), *record),
            ScoringError::InvalidFeatureValue { column, record, .. } => {
                (Some(column.clone()), *record)
            }
            _ => (None, None),
        };

        // Internal failures keep their detail in the logs only.
        let error = if self.is_client_error() {
            self.to_string()
        } else {
            tracing::error!(error = %self, "scoring request failed");
            "Internal server error".to_string()
        };

        HttpResponse::build(code).json(ErrorResponse {
            error,
            code: code.as_u16(),
            field,
            record,
        })
    }

    fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<csv::Error> for ScoringError {
    fn from(err: csv::Error) -> Self {
        ScoringError::DataSource(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = ScoringError::validation("order_qty", "missing required field");
        assert_eq!(
            err.to_string(),
            "Validation error on field `order_qty`: missing required field"
        );

        let err = err.at_record(2);
        assert_eq!(
            err.to_string(),
            "Validation error on field `order_qty` (record 2): missing required field"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ScoringError::validation("plant", "empty").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ScoringError::SchemaMismatch {
                expected: 10,
                actual: 9
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ScoringError::Inference("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_at_record_leaves_other_errors_untouched() {
        let err = ScoringError::Internal("x".into()).at_record(4);
        assert!(matches!(err, ScoringError::Internal(_)));
    }
}
