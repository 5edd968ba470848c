// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// Every failure the pipeline or the prediction service can
// report is one of these typed errors. Nothing is recovered
// silently: a failure aborts the current unit of work (one
// pipeline run, or one request) and is handed back to the caller.
//
//   ValidationError  — a request field is malformed or out of range
//   CategoryError    — a label is not in its ordinal vocabulary
//   DataSourceError  — the raw dataset file is missing
//   ServeError       — what the HTTP boundary turns into a status
//
// Reference: Rust Book §9 (Recoverable Errors with Result)
//            thiserror crate documentation

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::vocabulary::CategoryColumn;

/// A label that does not belong to its column's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{label}' is not a known {column} category")]
pub struct CategoryError {
    pub column: CategoryColumn,
    pub label:  String,
}

/// One offending field in a prediction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field:   String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A request rejected before it reached the encoder or the model.
/// Carries every offending field, not just the first one found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request: {}", join_fields(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { fields: vec![FieldError::new(field, message)] }
    }

    /// Names of the offending fields, in the order they were checked
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The raw dataset is not where the configuration says it is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("raw dataset '{}' does not exist", .path.display())]
pub struct DataSourceError {
    pub path: PathBuf,
}

// ─── ServeError ───────────────────────────────────────────────────────────────
/// Errors of a single prediction request.
/// The HTTP layer maps each variant to exactly one status code.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("category error: {0}")]
    Category(#[from] CategoryError),

    #[error("the model is out of service")]
    ModelUnavailable,

    #[error("inference failed: {0}")]
    Inference(String),
}

impl ServeError {
    /// HTTP status code for this error kind
    pub fn status_code(&self) -> u16 {
        match self {
            ServeError::Validation(_) | ServeError::Category(_) => 400,
            ServeError::ModelUnavailable                        => 503,
            ServeError::Inference(_)                            => 500,
        }
    }
}
