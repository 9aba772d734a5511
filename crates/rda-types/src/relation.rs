use serde::{Deserialize, Serialize};

use crate::id::BusinessObjectId;

/// Typed edge vocabulary between business objects.
///
/// The enumeration is closed under inversion: every member has an inverse
/// member, and whenever the edge `(a, b, T)` exists the store also holds
/// `(b, a, T.inverse())`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    /// Person -> Collection: the person administers the collection.
    IsAdministratorFor,
    /// Collection -> Person: inverse of [`Self::IsAdministratorFor`].
    IsAdministeredBy,
    /// Project -> Collection (or Collection -> DataItem, DataItem -> DataFile):
    /// the source aggregates the target.
    Aggregates,
    /// Inverse of [`Self::Aggregates`]; the single-parent constraint is
    /// enforced on this direction.
    IsAggregatedBy,
    /// Person -> Collection: the person may deposit into the collection.
    IsDepositorFor,
    /// Collection -> Person: inverse of [`Self::IsDepositorFor`].
    AcceptsDeposit,
    /// Collection -> Collection: the source is a sub-collection of the target.
    IsSubCollectionOf,
    /// Inverse of [`Self::IsSubCollectionOf`].
    HasSubCollection,
    /// Any object -> MetadataFile: the source owns the metadata file.
    HasMetadataFile,
    /// MetadataFile -> owner: inverse of [`Self::HasMetadataFile`].
    IsMetadataFor,
}

impl RelationType {
    /// The inverse member of this relation type.
    pub fn inverse(self) -> Self {
        match self {
            Self::IsAdministratorFor => Self::IsAdministeredBy,
            Self::IsAdministeredBy => Self::IsAdministratorFor,
            Self::Aggregates => Self::IsAggregatedBy,
            Self::IsAggregatedBy => Self::Aggregates,
            Self::IsDepositorFor => Self::AcceptsDeposit,
            Self::AcceptsDeposit => Self::IsDepositorFor,
            Self::IsSubCollectionOf => Self::HasSubCollection,
            Self::HasSubCollection => Self::IsSubCollectionOf,
            Self::HasMetadataFile => Self::IsMetadataFor,
            Self::IsMetadataFor => Self::HasMetadataFile,
        }
    }

    /// Relation types whose source may have at most one target: the
    /// aggregation family plus metadata ownership, read from the child side.
    pub fn is_single_parent(self) -> bool {
        matches!(self, Self::IsAggregatedBy | Self::IsSubCollectionOf | Self::IsMetadataFor)
    }
}

/// Which end of a relationship an id occupies in a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationEnd {
    Source,
    Target,
}

/// An immutable, directed, typed edge between two business-object ids.
///
/// Equality is structural: two relationships with the same source, target,
/// and type are the same edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub source: BusinessObjectId,
    pub target: BusinessObjectId,
    pub rel_type: RelationType,
}

impl Relationship {
    /// Create a new relationship triple.
    pub fn new(
        source: impl Into<BusinessObjectId>,
        target: impl Into<BusinessObjectId>,
        rel_type: RelationType,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            rel_type,
        }
    }

    /// The inverse edge: `(target, source, inverse(type))`.
    pub fn inverse(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            rel_type: self.rel_type.inverse(),
        }
    }
}
