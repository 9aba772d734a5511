//! Recursive construction of business object maps.
//!
//! The descent is depth-first and pre-order: the node for an object is
//! constructed before its children. The root is ground truth — the caller
//! resolved it as deposited before asking for a map — so its status is
//! assumed DEPOSITED. Every descendant's deposit id is resolved under the
//! chosen [`ResolvePolicy`]; descendants with no usable deposit become
//! childless FAILED leaves rather than failing the map.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rda_archive::{DepositTracker, ResolvePolicy};
use rda_graph::RelationshipService;
use rda_types::{
    BusinessObject, BusinessObjectId, BusinessObjectKind, DepositId, DepositStatus, RelationEnd,
    RelationType,
};
use tracing::debug;

use crate::alternate::AlternateIdIndex;
use crate::error::MapResult;
use crate::node::BusinessObjectMap;

const DEFAULT_PAGE_SIZE: usize = 100;

/// Builds point-in-time [`BusinessObjectMap`] snapshots from the
/// relationship graph, the deposit tracker, and archive retrievals.
pub struct MapBuilder {
    graph: Arc<RelationshipService>,
    tracker: Arc<DepositTracker>,
    page_size: usize,
}

impl MapBuilder {
    /// Create a builder over the given graph and tracker.
    pub fn new(graph: Arc<RelationshipService>, tracker: Arc<DepositTracker>) -> Self {
        Self {
            graph,
            tracker,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size for archive-sourced data item pagination.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Build a map of `object` and its descendants.
    ///
    /// Fails only on archive-access or graph-access errors; per-node
    /// resolution failures become FAILED leaves.
    pub async fn generate_map(
        &self,
        object: &BusinessObject,
        alternates: &AlternateIdIndex,
        policy: ResolvePolicy,
    ) -> MapResult<BusinessObjectMap> {
        // The hierarchy is a forest by the single-parent invariant, so the
        // visited set only matters if the stored graph is corrupt.
        let mut visited = HashSet::new();
        let map = self
            .build_node(object.clone(), None, alternates, policy, &mut visited)
            .await?;
        debug!(root = %map.id, nodes = map.node_count(), "built business object map");
        Ok(map)
    }

    /// Recursive node construction. `deposit_id` is the deposit the object
    /// was retrieved under, when the parent already resolved it.
    fn build_node<'a>(
        &'a self,
        object: BusinessObject,
        deposit_id: Option<DepositId>,
        alternates: &'a AlternateIdIndex,
        policy: ResolvePolicy,
        visited: &'a mut HashSet<BusinessObjectId>,
    ) -> Pin<Box<dyn Future<Output = MapResult<BusinessObjectMap>> + Send + 'a>> {
        Box::pin(async move {
            visited.insert(object.id().clone());
            let mut node = BusinessObjectMap::resolved(&object, DepositStatus::Deposited);
            node.alternate_ids = alternates.lookup(object.id()).to_vec();

            self.descend_metadata_files(&object, &mut node, alternates, policy, visited)
                .await?;

            match &object {
                BusinessObject::Project(project) => {
                    // Project-owned collections only; sub-collections are
                    // reached through their parent collection.
                    let mut collection_ids: Vec<BusinessObjectId> = self
                        .graph
                        .get_relations(&project.id, RelationType::Aggregates, RelationEnd::Source)?
                        .into_iter()
                        .map(|rel| rel.target)
                        .collect();
                    collection_ids.sort();
                    for collection_id in collection_ids {
                        self.descend_collection(collection_id, &mut node, alternates, policy, visited)
                            .await?;
                    }
                }
                BusinessObject::Collection(collection) => {
                    for sub_id in collection.sub_collection_ids.clone() {
                        self.descend_collection(sub_id, &mut node, alternates, policy, visited)
                            .await?;
                    }
                    self.descend_data_items(
                        collection.id.clone(),
                        deposit_id,
                        &mut node,
                        alternates,
                        policy,
                        visited,
                    )
                    .await?;
                }
                BusinessObject::DataItem(item) => {
                    // Files are held by value on the retrieved item; they
                    // were part of its deposit and need no own resolution.
                    for file in item.data_files.clone() {
                        if visited.contains(&file.id) {
                            continue;
                        }
                        let child = self
                            .build_node(
                                BusinessObject::DataFile(file),
                                None,
                                alternates,
                                policy,
                                visited,
                            )
                            .await?;
                        node.children.push(child);
                    }
                }
                BusinessObject::DataFile(_)
                | BusinessObject::MetadataFile(_)
                | BusinessObject::Person(_) => {}
            }

            Ok(node)
        })
    }

    /// Step 3: metadata files attached through the relationship graph.
    async fn descend_metadata_files(
        &self,
        object: &BusinessObject,
        node: &mut BusinessObjectMap,
        alternates: &AlternateIdIndex,
        policy: ResolvePolicy,
        visited: &mut HashSet<BusinessObjectId>,
    ) -> MapResult<()> {
        let mut metadata_ids = self.graph.metadata_files_of(object.id())?;
        metadata_ids.sort();
        for metadata_id in metadata_ids {
            if visited.contains(&metadata_id) {
                continue;
            }
            match self.tracker.resolve_deposit(&metadata_id, policy).await? {
                Some(info) => {
                    let metadata = self
                        .tracker
                        .backend()
                        .retrieve_metadata_file(&info.deposit_id)
                        .await?;
                    let child = self
                        .build_node(
                            BusinessObject::MetadataFile(metadata),
                            Some(info.deposit_id),
                            alternates,
                            policy,
                            visited,
                        )
                        .await?;
                    node.children.push(child);
                }
                None => {
                    debug!(id = %metadata_id, "metadata file unresolvable, marking failed");
                    visited.insert(metadata_id.clone());
                    node.children.push(BusinessObjectMap::failed_leaf(
                        metadata_id.clone(),
                        metadata_id.to_string(),
                        BusinessObjectKind::MetadataFile,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Resolve and recurse into one collection id, or append a FAILED leaf.
    async fn descend_collection(
        &self,
        collection_id: BusinessObjectId,
        node: &mut BusinessObjectMap,
        alternates: &AlternateIdIndex,
        policy: ResolvePolicy,
        visited: &mut HashSet<BusinessObjectId>,
    ) -> MapResult<()> {
        if visited.contains(&collection_id) {
            return Ok(());
        }
        match self.tracker.resolve_deposit(&collection_id, policy).await? {
            Some(info) => {
                let collection = self
                    .tracker
                    .backend()
                    .retrieve_collection(&info.deposit_id)
                    .await?;
                let child = self
                    .build_node(
                        BusinessObject::Collection(collection),
                        Some(info.deposit_id),
                        alternates,
                        policy,
                        visited,
                    )
                    .await?;
                node.children.push(child);
            }
            None => {
                debug!(id = %collection_id, "collection unresolvable, marking failed");
                visited.insert(collection_id.clone());
                node.children.push(BusinessObjectMap::failed_leaf(
                    collection_id.clone(),
                    collection_id.to_string(),
                    BusinessObjectKind::Collection,
                ));
            }
        }
        Ok(())
    }

    /// The data items currently aggregated under a collection's deposit:
    /// an archive-sourced, paginated query, not a graph lookup.
    async fn descend_data_items(
        &self,
        collection_id: BusinessObjectId,
        deposit_id: Option<DepositId>,
        node: &mut BusinessObjectMap,
        alternates: &AlternateIdIndex,
        policy: ResolvePolicy,
        visited: &mut HashSet<BusinessObjectId>,
    ) -> MapResult<()> {
        let current_deposit = match deposit_id {
            Some(id) => Some(id),
            None => self
                .tracker
                .resolve_deposit(&collection_id, policy)
                .await?
                .map(|info| info.deposit_id),
        };
        let Some(current_deposit) = current_deposit else {
            // Root collection with no usable deposit: nothing to query.
            return Ok(());
        };

        let mut offset = 0;
        loop {
            let page = self
                .tracker
                .backend()
                .retrieve_data_items_for_collection(&current_deposit, self.page_size, offset)
                .await?;
            let fetched = page.len();

            for item in page {
                if visited.contains(&item.id) {
                    continue;
                }
                match self.tracker.resolve_deposit(&item.id, policy).await? {
                    Some(info) => {
                        let child = self
                            .build_node(
                                BusinessObject::DataItem(item),
                                Some(info.deposit_id),
                                alternates,
                                policy,
                                visited,
                            )
                            .await?;
                        node.children.push(child);
                    }
                    None => {
                        debug!(id = %item.id, "data item unresolvable, marking failed");
                        visited.insert(item.id.clone());
                        node.children.push(BusinessObjectMap::failed_leaf(
                            item.id,
                            item.name,
                            BusinessObjectKind::DataItem,
                        ));
                    }
                }
            }

            if fetched < self.page_size {
                break;
            }
            offset += fetched;
        }
        Ok(())
    }
}
