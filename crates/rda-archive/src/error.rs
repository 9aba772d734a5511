//! Error types for archive access.

use rda_types::{DepositId, DepositObjectKind};

/// Errors from archive backend operations.
///
/// These propagate to the orchestration layer uncaught; retry policy lives
/// in the tracker's bounded waits, not here.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// No deposit transaction with this id is known to the archive.
    #[error("unknown deposit: {0}")]
    UnknownDeposit(DepositId),

    /// A retrieval asked for one object kind but the deposit holds another.
    #[error("deposit {deposit_id} holds a {actual:?}, expected {expected:?}")]
    WrongKind {
        deposit_id: DepositId,
        expected: DepositObjectKind,
        actual: DepositObjectKind,
    },

    /// The archive backend was unreachable or refused the request.
    #[error("archive access error: {0}")]
    Access(String),

    /// The archive returned data the core could not interpret.
    #[error("malformed archive response: {0}")]
    Malformed(String),
}

/// Result alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;
