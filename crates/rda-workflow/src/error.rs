//! Error types for the orchestration workflows.

use rda_archive::ArchiveError;
use rda_graph::GraphError;
use rda_types::DepositId;

/// Errors from the collection workflows.
///
/// Failure, timeout, and interruption are separate variants because callers
/// react differently (retry, abort, skip-and-continue) and logs must keep
/// them apart.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The collection did not pass validation; nothing was deposited.
    #[error("invalid collection: {0}")]
    Invalid(String),

    /// The archive reported the deposit FAILED.
    #[error("archive reported deposit {0} as failed")]
    DepositFailed(DepositId),

    /// The bounded wait exhausted its poll budget while still PENDING.
    #[error("deposit {deposit_id} still pending after {polls} polls")]
    ConvergenceTimeout { deposit_id: DepositId, polls: u32 },

    /// The convergence wait was cancelled from outside.
    #[error("convergence wait for deposit {0} was interrupted")]
    Interrupted(DepositId),

    /// The deposit reached DEPOSITED but a subsequent edge write failed:
    /// the object is archived but unlinked. The deposit id is carried so
    /// the caller can reconcile.
    #[error("deposit {deposit_id} succeeded but relationship linking failed: {source}")]
    LinkFailed {
        deposit_id: DepositId,
        #[source]
        source: GraphError,
    },

    /// Relationship graph failure before any deposit was attempted.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Archive access failure.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Result alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
