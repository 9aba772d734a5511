//! In-memory archive backend for tests, demos, and embedding.
//!
//! [`InMemoryArchive`] models the archive's asynchrony explicitly: a deposit
//! stays PENDING until `poll_archive` has been called a scripted number of
//! times, then flips to its scripted terminal status. Tests script outcomes
//! per object id before depositing.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use rda_types::{
    ArchiveDepositInfo, BusinessObject, BusinessObjectId, Collection, DataItem, DepositId,
    DepositObjectKind, DepositStatus, MetadataFile,
};

use crate::error::{ArchiveError, ArchiveResult};
use crate::traits::ArchiveBackend;

/// Scripted convergence plan for one deposit.
#[derive(Clone, Copy, Debug)]
struct ConvergencePlan {
    /// Terminal status to converge to; `None` stays PENDING forever.
    outcome: Option<DepositStatus>,
    /// Polls remaining before the flip.
    polls_remaining: u32,
}

struct StoredDeposit {
    info: ArchiveDepositInfo,
    object: BusinessObject,
    plan: ConvergencePlan,
}

#[derive(Default)]
struct ArchiveState {
    /// All deposits in acceptance order.
    order: Vec<DepositId>,
    deposits: HashMap<DepositId, StoredDeposit>,
    /// Per-object deposit ids in acceptance order (oldest first).
    history: HashMap<BusinessObjectId, Vec<DepositId>>,
    /// Plans consulted when an object id is next deposited.
    plans: HashMap<BusinessObjectId, ConvergencePlan>,
    poll_count: u64,
}

/// An in-memory implementation of [`ArchiveBackend`].
///
/// Unscripted deposits converge to DEPOSITED on the first poll.
#[derive(Default)]
pub struct InMemoryArchive {
    state: RwLock<ArchiveState>,
}

impl InMemoryArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the convergence of the next deposit(s) of `object_id`:
    /// after `after_polls` polls the record flips to `outcome`; `None`
    /// leaves it PENDING forever.
    pub fn script_object(
        &self,
        object_id: &BusinessObjectId,
        outcome: Option<DepositStatus>,
        after_polls: u32,
    ) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.plans.insert(
            object_id.clone(),
            ConvergencePlan {
                outcome,
                polls_remaining: after_polls,
            },
        );
    }

    /// Total `poll_archive` calls observed.
    pub fn poll_count(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .poll_count
    }

    fn read_deposit<T>(
        &self,
        deposit_id: &DepositId,
        f: impl FnOnce(&StoredDeposit) -> ArchiveResult<T>,
    ) -> ArchiveResult<T> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let stored = state
            .deposits
            .get(deposit_id)
            .ok_or_else(|| ArchiveError::UnknownDeposit(deposit_id.clone()))?;
        f(stored)
    }
}

#[async_trait]
impl ArchiveBackend for InMemoryArchive {
    async fn deposit(
        &self,
        object: &BusinessObject,
        kind: DepositObjectKind,
        parent: Option<&DepositId>,
    ) -> ArchiveResult<DepositId> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if let Some(parent_id) = parent {
            if !state.deposits.contains_key(parent_id) {
                return Err(ArchiveError::UnknownDeposit(parent_id.clone()));
            }
        }

        let deposit_id = DepositId::new(format!("dep-{}", Uuid::now_v7()));
        let plan = state
            .plans
            .get(object.id())
            .copied()
            .unwrap_or(ConvergencePlan {
                outcome: Some(DepositStatus::Deposited),
                polls_remaining: 1,
            });
        let info = ArchiveDepositInfo::pending(
            object.id().clone(),
            kind,
            deposit_id.clone(),
            parent.cloned(),
        );

        state.order.push(deposit_id.clone());
        state
            .history
            .entry(object.id().clone())
            .or_default()
            .push(deposit_id.clone());
        state.deposits.insert(
            deposit_id.clone(),
            StoredDeposit {
                info,
                object: object.clone(),
                plan,
            },
        );
        Ok(deposit_id)
    }

    async fn poll_archive(&self) -> ArchiveResult<()> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.poll_count += 1;
        for stored in state.deposits.values_mut() {
            if stored.info.status.is_terminal() {
                continue;
            }
            let Some(outcome) = stored.plan.outcome else {
                continue;
            };
            if stored.plan.polls_remaining > 0 {
                stored.plan.polls_remaining -= 1;
            }
            if stored.plan.polls_remaining == 0 {
                stored.info.status = outcome;
                if outcome == DepositStatus::Deposited {
                    stored.info.archive_id =
                        Some(format!("arch:{}", stored.info.deposit_id.as_str()));
                    stored.info.state_id =
                        Some(format!("state:{}", stored.info.deposit_id.as_str()));
                }
            }
        }
        Ok(())
    }

    async fn list_deposit_info(
        &self,
        object_id: &BusinessObjectId,
        status: Option<DepositStatus>,
    ) -> ArchiveResult<Vec<ArchiveDepositInfo>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        let Some(ids) = state.history.get(object_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .rev()
            .filter_map(|id| state.deposits.get(id))
            .map(|stored| stored.info.clone())
            .filter(|info| status.map_or(true, |s| info.status == s))
            .collect())
    }

    async fn get_deposit_status(&self, deposit_id: &DepositId) -> ArchiveResult<DepositStatus> {
        self.read_deposit(deposit_id, |stored| Ok(stored.info.status))
    }

    async fn retrieve_collection(&self, deposit_id: &DepositId) -> ArchiveResult<Collection> {
        self.read_deposit(deposit_id, |stored| match &stored.object {
            BusinessObject::Collection(c) => Ok(c.clone()),
            _ => Err(ArchiveError::WrongKind {
                deposit_id: deposit_id.clone(),
                expected: DepositObjectKind::Collection,
                actual: stored.info.object_kind,
            }),
        })
    }

    async fn retrieve_data_item(&self, deposit_id: &DepositId) -> ArchiveResult<DataItem> {
        self.read_deposit(deposit_id, |stored| match &stored.object {
            BusinessObject::DataItem(d) => Ok(d.clone()),
            _ => Err(ArchiveError::WrongKind {
                deposit_id: deposit_id.clone(),
                expected: DepositObjectKind::DataSet,
                actual: stored.info.object_kind,
            }),
        })
    }

    async fn retrieve_metadata_file(
        &self,
        deposit_id: &DepositId,
    ) -> ArchiveResult<MetadataFile> {
        self.read_deposit(deposit_id, |stored| match &stored.object {
            BusinessObject::MetadataFile(m) => Ok(m.clone()),
            _ => Err(ArchiveError::WrongKind {
                deposit_id: deposit_id.clone(),
                expected: DepositObjectKind::MetadataFile,
                actual: stored.info.object_kind,
            }),
        })
    }

    async fn retrieve_data_items_for_collection(
        &self,
        deposit_id: &DepositId,
        limit: usize,
        offset: usize,
    ) -> ArchiveResult<Vec<DataItem>> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        if !state.deposits.contains_key(deposit_id) {
            return Err(ArchiveError::UnknownDeposit(deposit_id.clone()));
        }
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.deposits.get(id))
            .filter(|stored| stored.info.parent_deposit_id.as_ref() == Some(deposit_id))
            .filter_map(|stored| match &stored.object {
                BusinessObject::DataItem(d) => Some(d.clone()),
                _ => None,
            })
            .skip(offset)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(id: &str) -> BusinessObject {
        BusinessObject::Collection(Collection {
            id: BusinessObjectId::new(id),
            name: format!("collection {id}"),
            sub_collection_ids: Vec::new(),
        })
    }

    fn data_item(id: &str) -> BusinessObject {
        BusinessObject::DataItem(DataItem {
            id: BusinessObjectId::new(id),
            name: format!("item {id}"),
            data_files: Vec::new(),
        })
    }

    #[tokio::test]
    async fn deposit_starts_pending() {
        let archive = InMemoryArchive::new();
        let id = archive
            .deposit(&collection("c1"), DepositObjectKind::Collection, None)
            .await
            .unwrap();
        assert_eq!(
            archive.get_deposit_status(&id).await.unwrap(),
            DepositStatus::Pending
        );
    }

    #[tokio::test]
    async fn unscripted_deposit_converges_on_first_poll() {
        let archive = InMemoryArchive::new();
        let id = archive
            .deposit(&collection("c1"), DepositObjectKind::Collection, None)
            .await
            .unwrap();
        archive.poll_archive().await.unwrap();
        assert_eq!(
            archive.get_deposit_status(&id).await.unwrap(),
            DepositStatus::Deposited
        );

        let history = archive
            .list_deposit_info(&BusinessObjectId::new("c1"), None)
            .await
            .unwrap();
        assert!(history[0].archive_id.is_some());
        assert!(history[0].state_id.is_some());
    }

    #[tokio::test]
    async fn polls_of_terminal_records_are_noops() {
        let archive = InMemoryArchive::new();
        let id = archive
            .deposit(&collection("c1"), DepositObjectKind::Collection, None)
            .await
            .unwrap();
        for _ in 0..5 {
            archive.poll_archive().await.unwrap();
        }
        assert_eq!(
            archive.get_deposit_status(&id).await.unwrap(),
            DepositStatus::Deposited
        );
        assert_eq!(archive.poll_count(), 5);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_filterable() {
        let archive = InMemoryArchive::new();
        let object_id = BusinessObjectId::new("c1");

        archive.script_object(&object_id, Some(DepositStatus::Failed), 1);
        let first = archive
            .deposit(&collection("c1"), DepositObjectKind::Collection, None)
            .await
            .unwrap();
        archive.poll_archive().await.unwrap();

        archive.script_object(&object_id, Some(DepositStatus::Deposited), 1);
        let second = archive
            .deposit(&collection("c1"), DepositObjectKind::Collection, None)
            .await
            .unwrap();
        archive.poll_archive().await.unwrap();

        let all = archive.list_deposit_info(&object_id, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].deposit_id, second);
        assert_eq!(all[1].deposit_id, first);

        let failed = archive
            .list_deposit_info(&object_id, Some(DepositStatus::Failed))
            .await
            .unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].deposit_id, first);
    }

    #[tokio::test]
    async fn unknown_object_has_empty_history() {
        let archive = InMemoryArchive::new();
        let history = archive
            .list_deposit_info(&BusinessObjectId::new("ghost"), None)
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn unknown_deposit_id_is_an_error() {
        let archive = InMemoryArchive::new();
        let err = archive
            .get_deposit_status(&DepositId::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::UnknownDeposit(_)));
    }

    #[tokio::test]
    async fn retrieval_checks_object_kind() {
        let archive = InMemoryArchive::new();
        let id = archive
            .deposit(&collection("c1"), DepositObjectKind::Collection, None)
            .await
            .unwrap();
        archive.poll_archive().await.unwrap();

        assert!(archive.retrieve_collection(&id).await.is_ok());
        let err = archive.retrieve_data_item(&id).await.unwrap_err();
        assert!(matches!(err, ArchiveError::WrongKind { .. }));
    }

    #[tokio::test]
    async fn collection_membership_is_paginated() {
        let archive = InMemoryArchive::new();
        let coll = archive
            .deposit(&collection("c1"), DepositObjectKind::Collection, None)
            .await
            .unwrap();
        for i in 0..5 {
            archive
                .deposit(
                    &data_item(&format!("d{i}")),
                    DepositObjectKind::DataSet,
                    Some(&coll),
                )
                .await
                .unwrap();
        }

        let page1 = archive
            .retrieve_data_items_for_collection(&coll, 2, 0)
            .await
            .unwrap();
        let page2 = archive
            .retrieve_data_items_for_collection(&coll, 2, 2)
            .await
            .unwrap();
        let page3 = archive
            .retrieve_data_items_for_collection(&coll, 2, 4)
            .await
            .unwrap();

        assert_eq!(page1.len(), 2);
        assert_eq!(page2.len(), 2);
        assert_eq!(page3.len(), 1);
        assert_eq!(page1[0].id.as_str(), "d0");
        assert_eq!(page3[0].id.as_str(), "d4");
    }

    #[tokio::test]
    async fn child_deposit_requires_known_parent() {
        let archive = InMemoryArchive::new();
        let err = archive
            .deposit(
                &data_item("d1"),
                DepositObjectKind::DataSet,
                Some(&DepositId::new("missing")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ArchiveError::UnknownDeposit(_)));
    }
}
