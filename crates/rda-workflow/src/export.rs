//! Descendant export as an explicit background task.
//!
//! The export walks an object's descendants into a map and renders it as
//! text (the body of a "your export is ready" notification, delivery of
//! which lives outside the core). It runs as a spawned task whose result is
//! observable through the returned handle — not a fire-and-forget thread —
//! and takes no per-key graph locks while it runs: map construction is
//! read-only.

use std::sync::Arc;

use rda_archive::ResolvePolicy;
use rda_map::{AlternateIdIndex, MapBuilder, MapError};
use rda_types::BusinessObject;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn a descendant export for `object`.
///
/// The caller may await the handle for the rendered text, or drop it to let
/// the export run detached.
pub fn spawn_descendant_export(
    builder: Arc<MapBuilder>,
    object: BusinessObject,
    alternates: AlternateIdIndex,
    policy: ResolvePolicy,
) -> JoinHandle<Result<String, MapError>> {
    tokio::spawn(async move {
        debug!(root = %object.id(), "starting descendant export");
        let map = builder.generate_map(&object, &alternates, policy).await?;
        Ok(rda_map::to_text(&map))
    })
}
