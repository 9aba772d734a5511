use std::collections::HashSet;

use rda_types::{BusinessObjectId, RelationEnd, RelationType, Relationship};

use crate::error::GraphResult;

/// Typed edge storage for business-object relationships.
///
/// All implementations must satisfy these invariants:
/// - Every write is logical: adding `(a, b, T)` also adds `(b, a, inverse(T))`
///   and removing one removes both. No single-sided write primitive exists.
/// - `add_relation` and `remove_relation` are idempotent: re-adding an
///   existing edge or removing a missing one is a no-op, not an error.
/// - Queries return empty sets, never errors, when nothing matches.
/// - All backing-store failures are propagated, never silently ignored.
///
/// The store is deliberately unopinionated about graph shape; structural
/// invariants such as "one parent" belong to the call site
/// ([`crate::RelationshipService`]).
pub trait RelationStore: Send + Sync {
    /// Record an edge and its inverse as one unit.
    fn add_relation(&self, rel: &Relationship) -> GraphResult<()>;

    /// Remove an edge and its inverse as one unit.
    fn remove_relation(&self, rel: &Relationship) -> GraphResult<()>;

    /// All relationships of `rel_type` where `id` occupies `end`.
    fn get_relations(
        &self,
        id: &BusinessObjectId,
        rel_type: RelationType,
        end: RelationEnd,
    ) -> GraphResult<HashSet<Relationship>>;

    /// Whether the edge `(source, target, rel_type)` exists.
    fn is_related(
        &self,
        source: &BusinessObjectId,
        target: &BusinessObjectId,
        rel_type: RelationType,
    ) -> GraphResult<bool>;

    /// Add a set of edges. Default implementation adds one at a time;
    /// backends may override for a single write.
    fn add_relations(&self, rels: &HashSet<Relationship>) -> GraphResult<()> {
        for rel in rels {
            self.add_relation(rel)?;
        }
        Ok(())
    }

    /// Remove a set of edges. Default implementation removes one at a time.
    fn remove_relations(&self, rels: &HashSet<Relationship>) -> GraphResult<()> {
        for rel in rels {
            self.remove_relation(rel)?;
        }
        Ok(())
    }
}
