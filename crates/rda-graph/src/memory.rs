//! In-memory relationship store for testing and ephemeral use.
//!
//! [`InMemoryRelationStore`] keeps all edges in per-endpoint indexes behind
//! a `RwLock`. Both directions of a logical edge are materialized, so either
//! end of a relationship can be queried from its own index.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use rda_types::{BusinessObjectId, RelationEnd, RelationType, Relationship};

use crate::error::{GraphError, GraphResult};
use crate::traits::RelationStore;

#[derive(Default)]
struct EdgeState {
    by_source: HashMap<BusinessObjectId, HashSet<Relationship>>,
    by_target: HashMap<BusinessObjectId, HashSet<Relationship>>,
}

impl EdgeState {
    fn insert(&mut self, rel: &Relationship) {
        self.by_source
            .entry(rel.source.clone())
            .or_default()
            .insert(rel.clone());
        self.by_target
            .entry(rel.target.clone())
            .or_default()
            .insert(rel.clone());
    }

    fn remove(&mut self, rel: &Relationship) {
        if let Some(set) = self.by_source.get_mut(&rel.source) {
            set.remove(rel);
            if set.is_empty() {
                self.by_source.remove(&rel.source);
            }
        }
        if let Some(set) = self.by_target.get_mut(&rel.target) {
            set.remove(rel);
            if set.is_empty() {
                self.by_target.remove(&rel.target);
            }
        }
    }
}

/// An in-memory implementation of [`RelationStore`].
///
/// All data lives behind a `RwLock` and is lost when the store is dropped.
#[derive(Default)]
pub struct InMemoryRelationStore {
    inner: RwLock<EdgeState>,
}

impl InMemoryRelationStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of directed edges held (counts both directions).
    pub fn edge_count(&self) -> usize {
        let state = self.inner.read().unwrap_or_else(|e| e.into_inner());
        state.by_source.values().map(HashSet::len).sum()
    }
}

impl RelationStore for InMemoryRelationStore {
    fn add_relation(&self, rel: &Relationship) -> GraphResult<()> {
        let mut state = self
            .inner
            .write()
            .map_err(|e| GraphError::Storage(format!("lock poisoned: {e}")))?;
        state.insert(rel);
        state.insert(&rel.inverse());
        tracing::debug!(
            source = %rel.source,
            target = %rel.target,
            rel_type = ?rel.rel_type,
            "added relation pair"
        );
        Ok(())
    }

    fn remove_relation(&self, rel: &Relationship) -> GraphResult<()> {
        let mut state = self
            .inner
            .write()
            .map_err(|e| GraphError::Storage(format!("lock poisoned: {e}")))?;
        state.remove(rel);
        state.remove(&rel.inverse());
        tracing::debug!(
            source = %rel.source,
            target = %rel.target,
            rel_type = ?rel.rel_type,
            "removed relation pair"
        );
        Ok(())
    }

    fn get_relations(
        &self,
        id: &BusinessObjectId,
        rel_type: RelationType,
        end: RelationEnd,
    ) -> GraphResult<HashSet<Relationship>> {
        let state = self
            .inner
            .read()
            .map_err(|e| GraphError::Storage(format!("lock poisoned: {e}")))?;
        let index = match end {
            RelationEnd::Source => &state.by_source,
            RelationEnd::Target => &state.by_target,
        };
        Ok(index
            .get(id)
            .map(|set| {
                set.iter()
                    .filter(|rel| rel.rel_type == rel_type)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn is_related(
        &self,
        source: &BusinessObjectId,
        target: &BusinessObjectId,
        rel_type: RelationType,
    ) -> GraphResult<bool> {
        let state = self
            .inner
            .read()
            .map_err(|e| GraphError::Storage(format!("lock poisoned: {e}")))?;
        Ok(state.by_source.get(source).is_some_and(|set| {
            set.contains(&Relationship {
                source: source.clone(),
                target: target.clone(),
                rel_type,
            })
        }))
    }

    fn add_relations(&self, rels: &HashSet<Relationship>) -> GraphResult<()> {
        let mut state = self
            .inner
            .write()
            .map_err(|e| GraphError::Storage(format!("lock poisoned: {e}")))?;
        for rel in rels {
            state.insert(rel);
            state.insert(&rel.inverse());
        }
        Ok(())
    }

    fn remove_relations(&self, rels: &HashSet<Relationship>) -> GraphResult<()> {
        let mut state = self
            .inner
            .write()
            .map_err(|e| GraphError::Storage(format!("lock poisoned: {e}")))?;
        for rel in rels {
            state.remove(rel);
            state.remove(&rel.inverse());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rel(source: &str, target: &str, rel_type: RelationType) -> Relationship {
        Relationship::new(source, target, rel_type)
    }

    #[test]
    fn add_writes_both_directions() {
        let store = InMemoryRelationStore::new();
        store
            .add_relation(&rel("p1", "c1", RelationType::Aggregates))
            .unwrap();

        assert!(store
            .is_related(&"p1".into(), &"c1".into(), RelationType::Aggregates)
            .unwrap());
        assert!(store
            .is_related(&"c1".into(), &"p1".into(), RelationType::IsAggregatedBy)
            .unwrap());
    }

    #[test]
    fn remove_deletes_both_directions() {
        let store = InMemoryRelationStore::new();
        let edge = rel("p1", "c1", RelationType::Aggregates);
        store.add_relation(&edge).unwrap();
        store.remove_relation(&edge).unwrap();

        assert!(!store
            .is_related(&"p1".into(), &"c1".into(), RelationType::Aggregates)
            .unwrap());
        assert!(!store
            .is_related(&"c1".into(), &"p1".into(), RelationType::IsAggregatedBy)
            .unwrap());
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn remove_of_inverse_deletes_the_pair_too() {
        let store = InMemoryRelationStore::new();
        store
            .add_relation(&rel("p1", "c1", RelationType::Aggregates))
            .unwrap();
        // Removing via the inverse direction is the same logical operation.
        store
            .remove_relation(&rel("c1", "p1", RelationType::IsAggregatedBy))
            .unwrap();
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn add_is_idempotent() {
        let store = InMemoryRelationStore::new();
        let edge = rel("p1", "c1", RelationType::Aggregates);
        store.add_relation(&edge).unwrap();
        store.add_relation(&edge).unwrap();
        assert_eq!(store.edge_count(), 2); // one edge + its inverse
    }

    #[test]
    fn remove_of_missing_edge_is_a_noop() {
        let store = InMemoryRelationStore::new();
        store
            .remove_relation(&rel("p1", "c1", RelationType::Aggregates))
            .unwrap();
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn get_relations_filters_by_type_and_end() {
        let store = InMemoryRelationStore::new();
        store
            .add_relation(&rel("p1", "c1", RelationType::Aggregates))
            .unwrap();
        store
            .add_relation(&rel("p1", "c2", RelationType::Aggregates))
            .unwrap();
        store
            .add_relation(&rel("a1", "c1", RelationType::IsAdministratorFor))
            .unwrap();

        let owned = store
            .get_relations(&"p1".into(), RelationType::Aggregates, RelationEnd::Source)
            .unwrap();
        assert_eq!(owned.len(), 2);

        let admins = store
            .get_relations(
                &"c1".into(),
                RelationType::IsAdministratorFor,
                RelationEnd::Target,
            )
            .unwrap();
        assert_eq!(admins.len(), 1);
        assert!(admins.iter().all(|r| r.source.as_str() == "a1"));
    }

    #[test]
    fn get_relations_returns_empty_set_for_unknown_id() {
        let store = InMemoryRelationStore::new();
        let rels = store
            .get_relations(
                &"ghost".into(),
                RelationType::Aggregates,
                RelationEnd::Source,
            )
            .unwrap();
        assert!(rels.is_empty());
    }

    #[test]
    fn bulk_add_and_remove() {
        let store = InMemoryRelationStore::new();
        let rels: HashSet<Relationship> = [
            rel("a1", "c1", RelationType::IsAdministratorFor),
            rel("a1", "c1", RelationType::IsDepositorFor),
        ]
        .into_iter()
        .collect();

        store.add_relations(&rels).unwrap();
        assert_eq!(store.edge_count(), 4);

        store.remove_relations(&rels).unwrap();
        assert_eq!(store.edge_count(), 0);
    }

    proptest! {
        /// Inverse symmetry holds after any interleaving of adds and removes.
        #[test]
        fn add_remove_preserves_inverse_symmetry(ops in prop::collection::vec(
            (0u8..2, 0u8..4, 0u8..4), 1..40
        )) {
            let store = InMemoryRelationStore::new();
            for (op, s, t) in ops {
                let edge = Relationship::new(
                    format!("o{s}"),
                    format!("o{t}"),
                    RelationType::IsAdministratorFor,
                );
                if op == 0 {
                    store.add_relation(&edge).unwrap();
                } else {
                    store.remove_relation(&edge).unwrap();
                }
            }
            // Every stored edge must have its inverse stored too.
            for s in 0u8..4 {
                let id = BusinessObjectId::new(format!("o{s}"));
                for end in [RelationEnd::Source, RelationEnd::Target] {
                    for rel_type in [
                        RelationType::IsAdministratorFor,
                        RelationType::IsAdministeredBy,
                    ] {
                        for edge in store.get_relations(&id, rel_type, end).unwrap() {
                            prop_assert!(store
                                .is_related(&edge.target, &edge.source, rel_type.inverse())
                                .unwrap());
                        }
                    }
                }
            }
        }
    }
}
