use std::fmt;

/// Errors that can occur during gate evaluation.
///
/// A rejection is *not* an error: stages report rejections through
/// [`crate::StageDecision::Fail`]. `GateError` is reserved for stages that
/// could not reach a decision at all.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A stage returned an unexpected error.
    #[error("stage error in '{stage}': {message}")]
    StageError { stage: String, message: String },
}

impl GateError {
    /// Create a stage error with a name and message.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl PartialEq for GateError {
    fn eq(&self, other: &Self) -> bool {
        // Compare by display representation for test convenience.
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for GateError {}
