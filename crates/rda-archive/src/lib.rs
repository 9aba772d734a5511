//! Archive backend seam and deposit convergence tracking.
//!
//! The archive confirms nothing synchronously: a [`deposit`] call returns a
//! transaction id immediately and the record converges out of band. The
//! [`DepositTracker`] wraps an [`ArchiveBackend`] with the two bounded
//! waiting disciplines the rest of the system relies on:
//!
//! - a linear-backoff convergence wait used by the creation workflows, whose
//!   exhaustion (timeout) is distinct from an archive-reported failure and
//!   from interruption;
//! - the dual per-object resolve policies (wait-for-pending / ignore-pending)
//!   used by the map builder.
//!
//! [`InMemoryArchive`] is a scriptable backend for tests and local use.
//!
//! [`deposit`]: ArchiveBackend::deposit

pub mod config;
pub mod error;
pub mod memory;
pub mod tracker;
pub mod traits;

pub use config::ConvergenceConfig;
pub use error::{ArchiveError, ArchiveResult};
pub use memory::InMemoryArchive;
pub use tracker::{Convergence, DepositTracker, ResolvePolicy};
pub use traits::ArchiveBackend;
