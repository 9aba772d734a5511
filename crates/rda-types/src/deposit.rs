use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{BusinessObjectId, DepositId};

/// Convergence state of one deposit transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositStatus {
    /// Accepted by the archive but not yet converged.
    Pending,
    /// The archive confirmed the deposit.
    Deposited,
    /// The archive rejected or lost the deposit.
    Failed,
}

impl DepositStatus {
    /// Returns `true` once the status can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Label used in rendered object maps.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Deposited => "DEPOSITED",
            Self::Failed => "FAILED",
        }
    }
}

/// The archive-side classification of a deposited object.
///
/// This is the archive's vocabulary, not the curation layer's: data items
/// deposit as `DataSet`, and registered metadata formats as `RegistryEntry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositObjectKind {
    Collection,
    DataSet,
    DataFile,
    MetadataFile,
    RegistryEntry,
}

/// One deposit attempt of one business object.
///
/// Records are append-only: a new record is created per attempt and an
/// existing record is mutated only by the polling mechanism, which fills in
/// `archive_id` and `state_id` once the archive converges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveDepositInfo {
    pub object_id: BusinessObjectId,
    pub object_kind: DepositObjectKind,
    pub deposit_id: DepositId,
    /// Links a child deposit (e.g. a DataFile) to its enclosing deposit.
    pub parent_deposit_id: Option<DepositId>,
    /// Archive-internal object id; populated only after convergence.
    pub archive_id: Option<String>,
    /// Archive-internal state id; populated only after convergence.
    pub state_id: Option<String>,
    pub status: DepositStatus,
    pub deposit_datetime: DateTime<Utc>,
}

impl ArchiveDepositInfo {
    /// A fresh PENDING record for a just-accepted deposit.
    pub fn pending(
        object_id: BusinessObjectId,
        object_kind: DepositObjectKind,
        deposit_id: DepositId,
        parent_deposit_id: Option<DepositId>,
    ) -> Self {
        Self {
            object_id,
            object_kind,
            deposit_id,
            parent_deposit_id,
            archive_id: None,
            state_id: None,
            status: DepositStatus::Pending,
            deposit_datetime: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_not_terminal() {
        assert!(!DepositStatus::Pending.is_terminal());
        assert!(DepositStatus::Deposited.is_terminal());
        assert!(DepositStatus::Failed.is_terminal());
    }

    #[test]
    fn fresh_record_starts_pending_and_unconverged() {
        let info = ArchiveDepositInfo::pending(
            BusinessObjectId::new("c1"),
            DepositObjectKind::Collection,
            DepositId::new("tx-1"),
            None,
        );
        assert_eq!(info.status, DepositStatus::Pending);
        assert!(info.archive_id.is_none());
        assert!(info.state_id.is_none());
    }

    #[test]
    fn status_labels() {
        assert_eq!(DepositStatus::Deposited.label(), "DEPOSITED");
        assert_eq!(DepositStatus::Failed.label(), "FAILED");
        assert_eq!(DepositStatus::Pending.label(), "PENDING");
    }
}
