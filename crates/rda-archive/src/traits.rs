use async_trait::async_trait;

use rda_types::{
    ArchiveDepositInfo, BusinessObject, BusinessObjectId, Collection, DataItem, DepositId,
    DepositObjectKind, DepositStatus, MetadataFile,
};

use crate::error::ArchiveResult;

/// The asynchronous archival store, consumed as a black box.
///
/// Implementations must satisfy these invariants:
/// - `deposit` is non-blocking from the caller's perspective: it returns a
///   transaction id immediately and creates a PENDING
///   [`ArchiveDepositInfo`]; the record converges out of band.
/// - Deposit history is append-only. Records are never deleted; an object
///   accumulates one record per attempt and `list_deposit_info` returns
///   them newest first.
/// - `poll_archive` refreshes every known-PENDING record. Repeated polls of
///   an already-terminal record are no-ops.
/// - No cross-object ordering: two objects deposited concurrently may
///   converge in either order.
#[async_trait]
pub trait ArchiveBackend: Send + Sync {
    /// Submit an object for archival, optionally under a parent deposit
    /// (e.g. a DataFile under its DataItem's deposit).
    async fn deposit(
        &self,
        object: &BusinessObject,
        kind: DepositObjectKind,
        parent: Option<&DepositId>,
    ) -> ArchiveResult<DepositId>;

    /// Refresh the convergence state of known-PENDING deposits.
    async fn poll_archive(&self) -> ArchiveResult<()>;

    /// Deposit history for an object, newest first, optionally filtered to
    /// one status. Empty when the object has never been deposited.
    async fn list_deposit_info(
        &self,
        object_id: &BusinessObjectId,
        status: Option<DepositStatus>,
    ) -> ArchiveResult<Vec<ArchiveDepositInfo>>;

    /// Current status of one deposit transaction.
    async fn get_deposit_status(&self, deposit_id: &DepositId) -> ArchiveResult<DepositStatus>;

    /// Retrieve a collection by deposit id.
    async fn retrieve_collection(&self, deposit_id: &DepositId) -> ArchiveResult<Collection>;

    /// Retrieve a data item by deposit id, with its files held by value.
    async fn retrieve_data_item(&self, deposit_id: &DepositId) -> ArchiveResult<DataItem>;

    /// Retrieve a metadata file by deposit id.
    async fn retrieve_metadata_file(
        &self,
        deposit_id: &DepositId,
    ) -> ArchiveResult<MetadataFile>;

    /// One page of the data items aggregated under a collection's deposit.
    ///
    /// Membership is archive-sourced, not graph-sourced: the archive is the
    /// authority on which items a collection deposit currently aggregates.
    async fn retrieve_data_items_for_collection(
        &self,
        deposit_id: &DepositId,
        limit: usize,
        offset: usize,
    ) -> ArchiveResult<Vec<DataItem>>;
}
