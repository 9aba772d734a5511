//! Foundation types for the research data archive (RDA) curation core.
//!
//! This crate provides the identifier, business-object, relationship, and
//! deposit-lifecycle types used throughout the RDA system. Every other RDA
//! crate depends on `rda-types`.
//!
//! # Key Types
//!
//! - [`BusinessObjectId`] — Opaque, stable identifier for a curated object
//! - [`BusinessObject`] — Tagged union over the curated object kinds
//! - [`RelationType`] — Typed edge vocabulary, closed under inversion
//! - [`Relationship`] — A directed, typed edge between two object ids
//! - [`DepositId`] — Archive-assigned transaction identifier
//! - [`ArchiveDepositInfo`] — One deposit attempt and its convergence state

pub mod deposit;
pub mod id;
pub mod object;
pub mod relation;

pub use deposit::{ArchiveDepositInfo, DepositObjectKind, DepositStatus};
pub use id::{BusinessObjectId, DepositId};
pub use object::{
    BusinessObject, BusinessObjectKind, Collection, DataFile, DataItem, MetadataFile, Person,
    Project,
};
pub use relation::{RelationEnd, RelationType, Relationship};
