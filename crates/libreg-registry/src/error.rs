use libreg_gate::{GateError, RejectionKind};

/// Errors produced by registry operations.
///
/// Every rejection is detected before any table is written, so receiving
/// one of these means the call had no effect.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// The caller lacks the librarian role or does not hold the book.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The named book is not currently registered.
    #[error("book not found: {0}")]
    NotFound(String),

    /// The requested condition is incompatible with the current one.
    #[error("state consistency violation: {0}")]
    StateConsistency(String),

    /// A gate stage failed to reach a decision.
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("journal integrity violation at seq {seq}: {reason}")]
    JournalIntegrity { seq: u64, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LibraryError {
    /// The gate rejection category, if this error is a rejection.
    pub fn kind(&self) -> Option<RejectionKind> {
        match self {
            Self::Unauthorized(_) => Some(RejectionKind::Unauthorized),
            Self::NotFound(_) => Some(RejectionKind::NotFound),
            Self::StateConsistency(_) => Some(RejectionKind::StateConsistency),
            _ => None,
        }
    }
}

/// Convenience type alias for registry operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
