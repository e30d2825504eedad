use bindings::BindingError;
use catalog::CatalogError;
use common::error::diagnostics::DiagnosticMessage;
use schema::SchemaError;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("conflict: {context}")]
    Conflict { context: DiagnosticMessage },
    #[error("not found: {context}")]
    NotFound { context: DiagnosticMessage },
    #[error("illegal binding: {context}")]
    IllegalBinding { context: DiagnosticMessage },
    #[error("immutable field: {context}")]
    ImmutableField { context: DiagnosticMessage },
    #[error("unsupported schema: {context}")]
    UnsupportedSchema { context: DiagnosticMessage },
    #[error("internal error: {context}")]
    Internal {
        context: DiagnosticMessage,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

/// Structured error handed back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

impl ServiceError {
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn illegal_binding(message: impl Into<String>) -> Self {
        Self::IllegalBinding {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn immutable_field(message: impl Into<String>) -> Self {
        Self::ImmutableField {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn internal<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Internal {
            context: DiagnosticMessage::new(message.into()),
            source: Some(Box::new(source)),
        }
    }

    pub fn context(&self) -> &DiagnosticMessage {
        match self {
            ServiceError::Conflict { context }
            | ServiceError::NotFound { context }
            | ServiceError::IllegalBinding { context }
            | ServiceError::ImmutableField { context }
            | ServiceError::UnsupportedSchema { context }
            | ServiceError::Internal { context, .. } => context,
        }
    }

    /// Validation failures are 422, absences 404 and anything else 500.
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Conflict { .. }
            | ServiceError::IllegalBinding { .. }
            | ServiceError::ImmutableField { .. }
            | ServiceError::UnsupportedSchema { .. } => 422,
            ServiceError::NotFound { .. } => 404,
            ServiceError::Internal { .. } => 500,
        }
    }

    pub fn response(&self) -> ErrorResponse {
        let message = match self {
            ServiceError::Internal { .. } => "Internal server error".to_string(),
            _ => self.context().message().to_string(),
        };
        ErrorResponse {
            status: self.status(),
            message,
        }
    }
}

impl From<CatalogError> for ServiceError {
    #[track_caller]
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Duplicate { context } | CatalogError::InUse { context } => {
                ServiceError::Conflict { context }
            }
            CatalogError::NotFound { context } => ServiceError::NotFound { context },
            other => {
                error!("catalog failure: {other}");
                ServiceError::Internal {
                    context: DiagnosticMessage::new(other.context().message().to_string()),
                    source: Some(Box::new(other)),
                }
            }
        }
    }
}

impl From<SchemaError> for ServiceError {
    #[track_caller]
    fn from(err: SchemaError) -> Self {
        ServiceError::UnsupportedSchema {
            context: err.context().clone(),
        }
    }
}

impl From<BindingError> for ServiceError {
    #[track_caller]
    fn from(err: BindingError) -> Self {
        ServiceError::IllegalBinding {
            context: DiagnosticMessage::new(err.reason().to_string()),
        }
    }
}
