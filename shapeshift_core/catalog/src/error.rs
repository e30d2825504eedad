use common::error::diagnostics::DiagnosticMessage;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog entry already exists: {context}")]
    Duplicate { context: DiagnosticMessage },
    #[error("catalog lookup failed: {context}")]
    NotFound { context: DiagnosticMessage },
    #[error("catalog entry is still referenced: {context}")]
    InUse { context: DiagnosticMessage },
    #[error("corrupt catalog row: {context}")]
    Decode { context: DiagnosticMessage },
    #[error("database error: {context}")]
    Database {
        context: DiagnosticMessage,
        #[source]
        source: Option<tokio_postgres::Error>,
    },
    #[error("serde json error: {context}")]
    SerdeJson {
        context: DiagnosticMessage,
        #[source]
        source: serde_json::Error,
    },
    #[error("I/O error: {context}")]
    Io {
        context: DiagnosticMessage,
        #[source]
        source: io::Error,
    },
}

impl CatalogError {
    #[track_caller]
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn duplicate_binding(target_node: &str) -> Self {
        Self::duplicate(format!("A binding for '{target_node}' already exists"))
    }

    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn in_use(message: impl Into<String>) -> Self {
        Self::InUse {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            context: DiagnosticMessage::new(message.into()),
        }
    }

    #[track_caller]
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            context: DiagnosticMessage::new(message.into()),
            source: None,
        }
    }

    pub fn context(&self) -> &DiagnosticMessage {
        match self {
            CatalogError::Duplicate { context }
            | CatalogError::NotFound { context }
            | CatalogError::InUse { context }
            | CatalogError::Decode { context }
            | CatalogError::Database { context, .. }
            | CatalogError::SerdeJson { context, .. }
            | CatalogError::Io { context, .. } => context,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerdeJson {
            context: DiagnosticMessage::new(err.to_string()),
            source: err,
        }
    }
}

impl From<io::Error> for CatalogError {
    #[track_caller]
    fn from(err: io::Error) -> Self {
        CatalogError::Io {
            context: DiagnosticMessage::new(err.to_string()),
            source: err,
        }
    }
}

impl From<tokio_postgres::Error> for CatalogError {
    #[track_caller]
    fn from(err: tokio_postgres::Error) -> Self {
        let message = match err.as_db_error() {
            Some(db) => format!("{} ({})", db.message(), db.code().code()),
            None => err.to_string(),
        };
        CatalogError::Database {
            context: DiagnosticMessage::new(message),
            source: Some(err),
        }
    }
}
