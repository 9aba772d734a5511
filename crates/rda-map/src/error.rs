//! Error types for map construction.

use rda_archive::ArchiveError;
use rda_graph::GraphError;

/// Errors from business object map construction.
///
/// Per-node resolution failures are absorbed into FAILED leaves and never
/// surface here; these variants cover failures of the map operation itself.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The archive was unreachable or returned malformed data.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The relationship graph could not be read.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result alias for map operations.
pub type MapResult<T> = Result<T, MapError>;
