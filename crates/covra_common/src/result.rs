//! Common result and error types for the Covra kernel.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an internal-invariant violation (a bug in Covra), not a
/// problem with the user's design or trace. User-facing conditions are
/// reported through the diagnostics sink and typed kernel errors.
pub type CovraResult<T> = Result<T, InternalError>;

/// An internal kernel error indicating a bug in Covra, not a user input problem.
///
/// Re-binding an already-bound expression is the canonical example: the
/// elaboration pipeline must never produce one, so hitting it at runtime
/// means the invariant was broken upstream.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
