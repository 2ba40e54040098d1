//! Service Layer Error Types
//!
//! Typed failures for the resolver, instance store and value service. The
//! generator and renderer never fail, so they have no variants here.

use crate::models::{FieldError, Namespace};
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Type, instance, child or override record absent
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Required field or constraint violation; carries every failing field
    #[error("Validation failed: {}", join_errors(.errors))]
    ValidationFailed { errors: Vec<FieldError> },

    /// Type id already registered; non-fatal
    #[error("{namespace} type already registered: {id}")]
    DuplicateRegistration { namespace: Namespace, id: String },

    /// The record or value store failed; not retried
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored record could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a validation error from collected field errors
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Create a validation error for one field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Create a duplicate registration error
    pub fn duplicate(namespace: Namespace, id: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            namespace,
            id: id.into(),
        }
    }

    /// Wrap a store failure
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(err.to_string())
    }

    /// Create a serialization error
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Names of the failing fields, empty for non-validation errors
    pub fn failed_fields(&self) -> Vec<&str> {
        match self {
            Self::ValidationFailed { errors } => errors.iter().map(|e| e.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
