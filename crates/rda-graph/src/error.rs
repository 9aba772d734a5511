//! Error types for the relationship graph.

use rda_types::{BusinessObjectId, RelationType};

/// Errors from relationship graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Adding the edge would give the child a second parent. The existing
    /// target is named so the caller can report the conflict; the stored
    /// edge is left untouched.
    #[error(
        "relationship constraint violated: {child} already has {rel_type:?} target {existing}, \
         cannot add {requested}"
    )]
    ConstraintViolation {
        /// The object that would gain a second parent.
        child: BusinessObjectId,
        /// The target the caller tried to link.
        requested: BusinessObjectId,
        /// The target already linked.
        existing: BusinessObjectId,
        /// The single-parent relation type involved.
        rel_type: RelationType,
    },

    /// The subcollection walk revisited a node, which the single-parent
    /// invariant makes unreachable in a well-formed graph.
    #[error("cycle detected in subcollection graph at {0}")]
    CycleDetected(BusinessObjectId),

    /// Backing-store failure. Retryable at a higher policy layer.
    #[error("relationship store access error: {0}")]
    Storage(String),
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
