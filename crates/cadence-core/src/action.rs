//! Operator-facing result of a pacing or profiling operation.

use std::fmt;

use crate::error::ControlError;

/// Message plus success flag, handed to the command-output sink.
///
/// Failure messages are the [`ControlError`] display text, verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionResult {
    /// Text shown to the invoking operator. May be empty on success.
    pub message: String,
    /// Whether the operation took effect.
    pub success: bool,
}

impl ActionResult {
    /// A successful result.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    /// A failed result.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl From<ControlError> for ActionResult {
    fn from(e: ControlError) -> Self {
        Self::fail(e.to_string())
    }
}

impl<S: Into<String>> From<Result<S, ControlError>> for ActionResult {
    fn from(r: Result<S, ControlError>) -> Self {
        match r {
            Ok(message) => Self::ok(message),
            Err(e) => e.into(),
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_becomes_failed_result() {
        let r: ActionResult = Err::<String, _>(ControlError::SessionConflict).into();
        assert!(!r.success);
        assert_eq!(r.message, "Another profiling is running");
    }

    #[test]
    fn ok_keeps_message() {
        let r: ActionResult = Ok::<_, ControlError>("Warp start").into();
        assert!(r.success);
        assert_eq!(r.to_string(), "Warp start");
    }
}
