//! Business object map construction.
//!
//! A [`BusinessObjectMap`] is an ephemeral, point-in-time tree snapshot of a
//! curated object and its descendants, combining the relationship graph with
//! live deposit state. The builder tolerates descendants that are mid-deposit
//! or failed: such branches become childless FAILED leaves instead of
//! aborting the whole map.

pub mod alternate;
pub mod builder;
pub mod error;
pub mod node;
pub mod render;

pub use alternate::AlternateIdIndex;
pub use builder::MapBuilder;
pub use error::{MapError, MapResult};
pub use node::BusinessObjectMap;
pub use render::{to_document, to_text};
