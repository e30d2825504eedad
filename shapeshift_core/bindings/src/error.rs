use common::error::diagnostics::DiagnosticMessage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("illegal binding: {context}")]
    IllegalBinding { context: DiagnosticMessage },
    #[error("unknown target node: {context}")]
    UnknownTargetNode { context: DiagnosticMessage },
}

impl BindingError {
    #[track_caller]
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalBinding {
            context: DiagnosticMessage::new(reason.into()),
        }
    }

    #[track_caller]
    pub fn unknown_target_node(pointer: &str) -> Self {
        Self::UnknownTargetNode {
            context: DiagnosticMessage::new(format!(
                "Could not find node '{pointer}' in target schema"
            )),
        }
    }

    /// Client facing reason, without call-site.
    pub fn reason(&self) -> &str {
        match self {
            BindingError::IllegalBinding { context }
            | BindingError::UnknownTargetNode { context } => context.message(),
        }
    }
}
