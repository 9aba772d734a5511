//! Relationship graph store for the RDA curation core.
//!
//! Edges between business objects are typed and come in inverse pairs: the
//! store's write API only accepts logical operations and always writes or
//! removes both directions as one unit. On top of the general-purpose store,
//! [`RelationshipService`] enforces the application-level single-parent
//! invariants (a collection belongs to at most one project, a metadata file
//! to at most one owner) under per-key locks, and provides the ancestor walk
//! used to find a collection's owning project.

pub mod error;
pub mod keyed;
pub mod memory;
pub mod service;
pub mod traits;

pub use error::{GraphError, GraphResult};
pub use keyed::KeyedLocks;
pub use memory::InMemoryRelationStore;
pub use service::RelationshipService;
pub use traits::RelationStore;
