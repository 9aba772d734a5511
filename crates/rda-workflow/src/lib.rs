//! Orchestration workflows over the RDA core.
//!
//! The archive's asynchrony makes "create a collection" a sequence, not a
//! call: validate, deposit, wait for convergence within a bounded budget,
//! and only then write relationship edges. No graph state is committed for
//! a deposit that did not reach DEPOSITED; failure, timeout, and
//! interruption stay distinguishable all the way up.

pub mod collection;
pub mod error;
pub mod export;

pub use collection::{CollectionLinks, CollectionWorkflow};
pub use error::{WorkflowError, WorkflowResult};
pub use export::spawn_descendant_export;
