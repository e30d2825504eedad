use std::{borrow::Cow, fmt, panic::Location};

/// A human readable reason paired with the source location that produced it.
///
/// Build one with [`DiagnosticMessage::new`] or the [`diag!`] macro. Error
/// variants across the workspace carry one of these as their `context` so a
/// client-facing reason ([`DiagnosticMessage::message`]) stays separate from
/// the call-site used in logs ([`fmt::Display`]).
#[derive(Clone, Debug)]
pub struct DiagnosticMessage {
    message: Cow<'static, str>,
    location: &'static Location<'static>,
}

impl DiagnosticMessage {
    #[track_caller]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// The reason without location information, safe to hand to a client.
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    pub fn into_message(self) -> String {
        self.message.into_owned()
    }
}

impl PartialEq for DiagnosticMessage {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (at {}:{})",
            self.message,
            self.location.file(),
            self.location.line()
        )
    }
}

/// `format!`-style constructor for [`DiagnosticMessage`] that records the
/// caller's file and line.
#[macro_export]
macro_rules! diag {
    ($msg:literal $(,)?) => {
        $crate::error::diagnostics::DiagnosticMessage::new($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::diagnostics::DiagnosticMessage::new(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_appends_call_site() {
        let diag = crate::diag!("node '{}' is unknown", "/age");
        assert_eq!(diag.message(), "node '/age' is unknown");

        let rendered = diag.to_string();
        assert!(rendered.starts_with("node '/age' is unknown (at "));
        assert!(rendered.contains("diagnostics.rs"));
    }

    #[test]
    fn equality_ignores_location() {
        let a = DiagnosticMessage::new("same");
        let b = DiagnosticMessage::new("same");
        assert_eq!(a, b);
        assert_eq!(b.into_message(), "same");
    }
}
