//! Call-site invariant layer over the relationship store.
//!
//! The store itself is a general-purpose typed-edge store; "exactly one
//! parent" is an application invariant enforced here, before the write, under
//! a per-key lock. Two concurrent callers racing to link different parents to
//! the same child serialize on the child's key: exactly one wins and the
//! other observes a [`GraphError::ConstraintViolation`] naming the winner's
//! target. Silent last-writer-wins is never acceptable because the ancestor
//! walk relies on the single-parent shape.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rda_types::{BusinessObjectId, RelationEnd, RelationType, Relationship};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{GraphError, GraphResult};
use crate::keyed::KeyedLocks;
use crate::traits::RelationStore;

/// Relationship graph operations with invariant enforcement.
pub struct RelationshipService {
    store: Arc<dyn RelationStore>,
    locks: KeyedLocks,
    /// Coarser lock taken by the bulk variants instead of per-key locks.
    bulk_lock: Mutex<()>,
}

impl RelationshipService {
    /// Create a service over the given store.
    pub fn new(store: Arc<dyn RelationStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
            bulk_lock: Mutex::new(()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn RelationStore> {
        &self.store
    }

    /// Add a logical edge (both directions) with invariant enforcement.
    ///
    /// For single-parent relation types (the aggregation family and metadata
    /// ownership, in either direction) the child's current parent set is
    /// checked first under a lock on the child id. Re-linking the same parent
    /// is idempotent; a different parent fails with
    /// [`GraphError::ConstraintViolation`] and leaves the stored edge intact.
    pub async fn add_relation(
        &self,
        source: &BusinessObjectId,
        target: &BusinessObjectId,
        rel_type: RelationType,
    ) -> GraphResult<()> {
        // Normalize to the child-side direction when one side carries the
        // single-parent constraint.
        let constrained = if rel_type.is_single_parent() {
            Some(Relationship::new(source.clone(), target.clone(), rel_type))
        } else if rel_type.inverse().is_single_parent() {
            Some(Relationship::new(
                target.clone(),
                source.clone(),
                rel_type.inverse(),
            ))
        } else {
            None
        };

        match constrained {
            Some(child_edge) => {
                let _guard = self.locks.acquire(&KeyedLocks::id_key(&child_edge.source)).await;
                self.check_single_parent(&child_edge)?;
                self.store.add_relation(&child_edge)
            }
            None => {
                let _guard = self
                    .locks
                    .acquire(&KeyedLocks::pair_key(source, target))
                    .await;
                self.store
                    .add_relation(&Relationship::new(source.clone(), target.clone(), rel_type))
            }
        }
    }

    /// Remove a logical edge (both directions). Idempotent.
    pub async fn remove_relation(
        &self,
        source: &BusinessObjectId,
        target: &BusinessObjectId,
        rel_type: RelationType,
    ) -> GraphResult<()> {
        let _guard = self
            .locks
            .acquire(&KeyedLocks::pair_key(source, target))
            .await;
        self.store
            .remove_relation(&Relationship::new(source.clone(), target.clone(), rel_type))
    }

    /// Add a set of edges under the coarse bulk lock.
    ///
    /// Constraint checks apply per edge, both against the store and against
    /// the rest of the set: two edges claiming different parents for the
    /// same child reject the whole set before anything is written. The
    /// first violation aborts the remainder. Must not run concurrently with
    /// per-pair operations on overlapping keys (known limitation).
    pub async fn add_relations(&self, rels: &HashSet<Relationship>) -> GraphResult<()> {
        let _guard = self.bulk_lock.lock().await;
        let mut claimed: HashMap<(BusinessObjectId, RelationType), BusinessObjectId> =
            HashMap::new();
        for rel in rels {
            let child_edge = if rel.rel_type.is_single_parent() {
                Some(rel.clone())
            } else if rel.rel_type.inverse().is_single_parent() {
                Some(rel.inverse())
            } else {
                None
            };
            if let Some(edge) = &child_edge {
                self.check_single_parent(edge)?;
                let key = (edge.source.clone(), edge.rel_type);
                if let Some(prior) = claimed.insert(key, edge.target.clone()) {
                    if prior != edge.target {
                        return Err(GraphError::ConstraintViolation {
                            child: edge.source.clone(),
                            requested: edge.target.clone(),
                            existing: prior,
                            rel_type: edge.rel_type,
                        });
                    }
                }
            }
        }
        self.store.add_relations(rels)
    }

    /// Remove a set of edges under the coarse bulk lock.
    pub async fn remove_relations(&self, rels: &HashSet<Relationship>) -> GraphResult<()> {
        let _guard = self.bulk_lock.lock().await;
        self.store.remove_relations(rels)
    }

    /// All relationships of `rel_type` where `id` occupies `end`.
    pub fn get_relations(
        &self,
        id: &BusinessObjectId,
        rel_type: RelationType,
        end: RelationEnd,
    ) -> GraphResult<HashSet<Relationship>> {
        self.store.get_relations(id, rel_type, end)
    }

    /// Whether the edge `(source, target, rel_type)` exists.
    pub fn is_related(
        &self,
        source: &BusinessObjectId,
        target: &BusinessObjectId,
        rel_type: RelationType,
    ) -> GraphResult<bool> {
        self.store.is_related(source, target, rel_type)
    }

    /// Ids of metadata files owned by `id`.
    pub fn metadata_files_of(
        &self,
        id: &BusinessObjectId,
    ) -> GraphResult<Vec<BusinessObjectId>> {
        let rels =
            self.store
                .get_relations(id, RelationType::HasMetadataFile, RelationEnd::Source)?;
        Ok(rels.into_iter().map(|r| r.target).collect())
    }

    /// Walk `IS_SUBCOLLECTION_OF` edges upward until no parent remains.
    ///
    /// The single-parent invariant makes the subcollection graph a forest,
    /// so the walk terminates; a visited set guards the unreachable cycle
    /// case anyway.
    pub fn top_level_collection(
        &self,
        id: &BusinessObjectId,
    ) -> GraphResult<BusinessObjectId> {
        let mut current = id.clone();
        let mut visited = HashSet::new();
        visited.insert(current.clone());

        loop {
            let parents = self.store.get_relations(
                &current,
                RelationType::IsSubCollectionOf,
                RelationEnd::Source,
            )?;
            let Some(parent) = parents.into_iter().next() else {
                return Ok(current);
            };
            if !visited.insert(parent.target.clone()) {
                warn!(id = %parent.target, "subcollection walk revisited a node");
                return Err(GraphError::CycleDetected(parent.target));
            }
            current = parent.target;
        }
    }

    /// The project owning a collection, found by walking to the top-level
    /// collection and reading its `IS_AGGREGATED_BY` target.
    pub fn owning_project(
        &self,
        collection_id: &BusinessObjectId,
    ) -> GraphResult<Option<BusinessObjectId>> {
        let top = self.top_level_collection(collection_id)?;
        let owners = self.store.get_relations(
            &top,
            RelationType::IsAggregatedBy,
            RelationEnd::Source,
        )?;
        Ok(owners.into_iter().next().map(|r| r.target))
    }

    fn check_single_parent(&self, child_edge: &Relationship) -> GraphResult<()> {
        let existing = self.store.get_relations(
            &child_edge.source,
            child_edge.rel_type,
            RelationEnd::Source,
        )?;
        if let Some(conflict) = existing
            .into_iter()
            .find(|rel| rel.target != child_edge.target)
        {
            debug!(
                source = %child_edge.source,
                requested = %child_edge.target,
                existing = %conflict.target,
                "rejected second parent"
            );
            return Err(GraphError::ConstraintViolation {
                child: child_edge.source.clone(),
                requested: child_edge.target.clone(),
                existing: conflict.target,
                rel_type: child_edge.rel_type,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRelationStore;

    fn service() -> Arc<RelationshipService> {
        Arc::new(RelationshipService::new(Arc::new(
            InMemoryRelationStore::new(),
        )))
    }

    fn id(s: &str) -> BusinessObjectId {
        BusinessObjectId::new(s)
    }

    #[tokio::test]
    async fn at_most_one_parent_per_source() {
        let svc = service();
        svc.add_relation(&id("c1"), &id("p1"), RelationType::IsAggregatedBy)
            .await
            .unwrap();

        let err = svc
            .add_relation(&id("c1"), &id("p2"), RelationType::IsAggregatedBy)
            .await
            .unwrap_err();
        match err {
            GraphError::ConstraintViolation {
                child,
                requested,
                existing,
                ..
            } => {
                assert_eq!(child, id("c1"));
                assert_eq!(requested, id("p2"));
                assert_eq!(existing, id("p1"));
            }
            other => panic!("expected constraint violation, got {other:?}"),
        }

        // The stored edge is untouched.
        let parents = svc
            .get_relations(&id("c1"), RelationType::IsAggregatedBy, RelationEnd::Source)
            .unwrap();
        assert_eq!(parents.len(), 1);
        assert!(parents.iter().all(|r| r.target == id("p1")));
    }

    #[tokio::test]
    async fn relinking_same_parent_is_idempotent() {
        let svc = service();
        svc.add_relation(&id("c1"), &id("p1"), RelationType::IsAggregatedBy)
            .await
            .unwrap();
        svc.add_relation(&id("c1"), &id("p1"), RelationType::IsAggregatedBy)
            .await
            .unwrap();
        let parents = svc
            .get_relations(&id("c1"), RelationType::IsAggregatedBy, RelationEnd::Source)
            .unwrap();
        assert_eq!(parents.len(), 1);
    }

    #[tokio::test]
    async fn constraint_applies_from_the_parent_direction_too() {
        let svc = service();
        // Writing the parent-side direction still normalizes to the child.
        svc.add_relation(&id("p1"), &id("c1"), RelationType::Aggregates)
            .await
            .unwrap();
        let err = svc
            .add_relation(&id("p2"), &id("c1"), RelationType::Aggregates)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn metadata_file_cannot_have_two_owners() {
        let svc = service();
        svc.add_relation(&id("c1"), &id("m1"), RelationType::HasMetadataFile)
            .await
            .unwrap();
        let err = svc
            .add_relation(&id("c2"), &id("m1"), RelationType::HasMetadataFile)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::ConstraintViolation { .. }));

        // A second metadata file on the same owner is fine.
        svc.add_relation(&id("c1"), &id("m2"), RelationType::HasMetadataFile)
            .await
            .unwrap();
        let mut files = svc.metadata_files_of(&id("c1")).unwrap();
        files.sort();
        assert_eq!(files, vec![id("m1"), id("m2")]);
    }

    #[tokio::test]
    async fn non_parent_relations_are_unconstrained() {
        let svc = service();
        svc.add_relation(&id("a1"), &id("c1"), RelationType::IsAdministratorFor)
            .await
            .unwrap();
        svc.add_relation(&id("a2"), &id("c1"), RelationType::IsAdministratorFor)
            .await
            .unwrap();
        let admins = svc
            .get_relations(
                &id("c1"),
                RelationType::IsAdministratorFor,
                RelationEnd::Target,
            )
            .unwrap();
        assert_eq!(admins.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_parent_race_has_exactly_one_winner() {
        let svc = service();
        let mut handles = Vec::new();
        for parent in ["p1", "p2", "p3", "p4"] {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.add_relation(&id("c1"), &id(parent), RelationType::IsAggregatedBy)
                    .await
            }));
        }

        let mut ok = 0;
        let mut violations = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(GraphError::ConstraintViolation { .. }) => violations += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(violations, 3);

        let parents = svc
            .get_relations(&id("c1"), RelationType::IsAggregatedBy, RelationEnd::Source)
            .unwrap();
        assert_eq!(parents.len(), 1);
    }

    #[tokio::test]
    async fn ancestor_walk_finds_top_level_and_project() {
        let svc = service();
        svc.add_relation(&id("c3"), &id("c2"), RelationType::IsSubCollectionOf)
            .await
            .unwrap();
        svc.add_relation(&id("c2"), &id("c1"), RelationType::IsSubCollectionOf)
            .await
            .unwrap();
        svc.add_relation(&id("c1"), &id("p1"), RelationType::IsAggregatedBy)
            .await
            .unwrap();

        assert_eq!(svc.top_level_collection(&id("c3")).unwrap(), id("c1"));
        assert_eq!(svc.top_level_collection(&id("c1")).unwrap(), id("c1"));
        assert_eq!(svc.owning_project(&id("c3")).unwrap(), Some(id("p1")));
        assert_eq!(svc.owning_project(&id("c1")).unwrap(), Some(id("p1")));
    }

    #[tokio::test]
    async fn ancestor_walk_without_project_returns_none() {
        let svc = service();
        svc.add_relation(&id("c2"), &id("c1"), RelationType::IsSubCollectionOf)
            .await
            .unwrap();
        assert_eq!(svc.owning_project(&id("c2")).unwrap(), None);
    }

    #[tokio::test]
    async fn ancestor_walk_detects_corrupt_cycle() {
        // Bypass the service to plant a cycle directly in the store.
        let store = Arc::new(InMemoryRelationStore::new());
        store
            .add_relation(&Relationship::new("c1", "c2", RelationType::IsSubCollectionOf))
            .unwrap();
        store
            .add_relation(&Relationship::new("c2", "c1", RelationType::IsSubCollectionOf))
            .unwrap();
        let svc = RelationshipService::new(store);
        let err = svc.top_level_collection(&id("c1")).unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected(_)));
    }

    #[tokio::test]
    async fn bulk_add_checks_constraints() {
        let svc = service();
        svc.add_relation(&id("c1"), &id("p1"), RelationType::IsAggregatedBy)
            .await
            .unwrap();

        let rels: HashSet<Relationship> = [
            Relationship::new("a1", "c1", RelationType::IsAdministratorFor),
            Relationship::new("c1", "p2", RelationType::IsAggregatedBy),
        ]
        .into_iter()
        .collect();
        let err = svc.add_relations(&rels).await.unwrap_err();
        assert!(matches!(err, GraphError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn bulk_add_rejects_two_parents_within_one_set() {
        let svc = service();
        // Both edges normalize to the child c1; the set itself is the
        // conflict, even though the store is empty.
        let rels: HashSet<Relationship> = [
            Relationship::new("c1", "p1", RelationType::IsAggregatedBy),
            Relationship::new("p2", "c1", RelationType::Aggregates),
        ]
        .into_iter()
        .collect();

        let err = svc.add_relations(&rels).await.unwrap_err();
        assert!(matches!(err, GraphError::ConstraintViolation { .. }));

        // Nothing was written.
        let parents = svc
            .get_relations(&id("c1"), RelationType::IsAggregatedBy, RelationEnd::Source)
            .unwrap();
        assert!(parents.is_empty());
    }
}
