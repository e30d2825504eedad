use common::error::diagnostics::DiagnosticMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unsupported schema: {context}")]
    Unsupported { context: DiagnosticMessage },
    #[error("invalid schema document: {context}")]
    InvalidDocument {
        context: DiagnosticMessage,
        #[source]
        source: serde_json::Error,
    },
}

impl SchemaError {
    #[track_caller]
    pub fn unsupported(pointer: &str, reason: impl Into<String>) -> Self {
        let at = if pointer.is_empty() { "<root>" } else { pointer };
        Self::Unsupported {
            context: DiagnosticMessage::new(format!("{} at '{at}'", reason.into())),
        }
    }

    pub fn context(&self) -> &DiagnosticMessage {
        match self {
            SchemaError::Unsupported { context } | SchemaError::InvalidDocument { context, .. } => {
                context
            }
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        SchemaError::InvalidDocument {
            context: DiagnosticMessage::new(err.to_string()),
            source: err,
        }
    }
}
