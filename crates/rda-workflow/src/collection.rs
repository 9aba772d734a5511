//! Create/update collection workflows.

use std::collections::HashSet;
use std::sync::Arc;

use rda_archive::{Convergence, DepositTracker};
use rda_graph::RelationshipService;
use rda_types::{
    BusinessObject, BusinessObjectId, Collection, DepositId, DepositObjectKind, RelationType,
    Relationship,
};
use tokio::sync::watch;
use tracing::info;

use crate::error::{WorkflowError, WorkflowResult};

/// Relationship edges to write once a collection deposit converges.
#[derive(Clone, Debug, Default)]
pub struct CollectionLinks {
    /// Owning project; subject to the single-parent constraint.
    pub project_id: Option<BusinessObjectId>,
    /// People who administer the collection.
    pub administrator_ids: Vec<BusinessObjectId>,
    /// People allowed to deposit into the collection.
    pub depositor_ids: Vec<BusinessObjectId>,
    /// Metadata files owned by the collection.
    pub metadata_file_ids: Vec<BusinessObjectId>,
}

/// Composes the deposit tracker and the relationship graph into the two
/// operations that must appear atomic to external observers: create and
/// update collection.
pub struct CollectionWorkflow {
    tracker: Arc<DepositTracker>,
    graph: Arc<RelationshipService>,
    cancel: Option<watch::Receiver<bool>>,
}

impl CollectionWorkflow {
    /// Create a workflow over the given tracker and graph.
    pub fn new(tracker: Arc<DepositTracker>, graph: Arc<RelationshipService>) -> Self {
        Self {
            tracker,
            graph,
            cancel: None,
        }
    }

    /// Attach a cancellation signal. When the watched value flips to `true`
    /// mid-wait, the running operation stops with
    /// [`WorkflowError::Interrupted`]; no edges are written for the
    /// abandoned deposit. Without a signal, waits run to their poll budget.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Create a collection: validate, deposit, wait, then link.
    ///
    /// No edges are written unless the deposit reaches DEPOSITED. If edge
    /// writing fails after a successful deposit the collection stays
    /// archived but unlinked; the returned [`WorkflowError::LinkFailed`]
    /// carries the deposit id so the caller can reconcile.
    pub async fn create_collection(
        &self,
        collection: &Collection,
        links: &CollectionLinks,
    ) -> WorkflowResult<DepositId> {
        validate(collection)?;
        let deposit_id = self.deposit_and_wait(collection).await?;
        self.write_links(collection, links)
            .await
            .map_err(|source| WorkflowError::LinkFailed {
                deposit_id: deposit_id.clone(),
                source,
            })?;
        info!(collection = %collection.id, deposit_id = %deposit_id, "collection created");
        Ok(deposit_id)
    }

    /// Update a collection: re-deposit a new revision, wait, then refresh
    /// links. Edge writes are idempotent, so unchanged links are no-ops.
    pub async fn update_collection(
        &self,
        collection: &Collection,
        links: &CollectionLinks,
    ) -> WorkflowResult<DepositId> {
        validate(collection)?;
        let deposit_id = self.deposit_and_wait(collection).await?;
        self.write_links(collection, links)
            .await
            .map_err(|source| WorkflowError::LinkFailed {
                deposit_id: deposit_id.clone(),
                source,
            })?;
        info!(collection = %collection.id, deposit_id = %deposit_id, "collection updated");
        Ok(deposit_id)
    }

    /// Create a collection nested under an existing parent collection.
    pub async fn create_sub_collection(
        &self,
        collection: &Collection,
        parent_collection_id: &BusinessObjectId,
        links: &CollectionLinks,
    ) -> WorkflowResult<DepositId> {
        validate(collection)?;
        let deposit_id = self.deposit_and_wait(collection).await?;
        let linked = async {
            self.graph
                .add_relation(
                    &collection.id,
                    parent_collection_id,
                    RelationType::IsSubCollectionOf,
                )
                .await?;
            self.write_links(collection, links).await
        };
        linked.await.map_err(|source| WorkflowError::LinkFailed {
            deposit_id: deposit_id.clone(),
            source,
        })?;
        info!(
            collection = %collection.id,
            parent = %parent_collection_id,
            deposit_id = %deposit_id,
            "sub-collection created"
        );
        Ok(deposit_id)
    }

    async fn deposit_and_wait(&self, collection: &Collection) -> WorkflowResult<DepositId> {
        let object = BusinessObject::Collection(collection.clone());
        let deposit_id = self
            .tracker
            .deposit(&object, DepositObjectKind::Collection, None)
            .await?;
        let convergence = match &self.cancel {
            Some(cancel) => {
                let mut cancel = cancel.clone();
                self.tracker
                    .wait_for_convergence_with_cancel(&deposit_id, &mut cancel)
                    .await?
            }
            None => self.tracker.wait_for_convergence(&deposit_id).await?,
        };
        match convergence {
            Convergence::Deposited => Ok(deposit_id),
            Convergence::Failed => Err(WorkflowError::DepositFailed(deposit_id)),
            Convergence::TimedOut { polls } => Err(WorkflowError::ConvergenceTimeout {
                deposit_id,
                polls,
            }),
            Convergence::Interrupted => Err(WorkflowError::Interrupted(deposit_id)),
        }
    }

    async fn write_links(
        &self,
        collection: &Collection,
        links: &CollectionLinks,
    ) -> Result<(), rda_graph::GraphError> {
        if let Some(project_id) = &links.project_id {
            self.graph
                .add_relation(&collection.id, project_id, RelationType::IsAggregatedBy)
                .await?;
        }

        let mut people_edges: HashSet<Relationship> = HashSet::new();
        for admin in &links.administrator_ids {
            people_edges.insert(Relationship::new(
                admin.clone(),
                collection.id.clone(),
                RelationType::IsAdministratorFor,
            ));
        }
        for depositor in &links.depositor_ids {
            people_edges.insert(Relationship::new(
                depositor.clone(),
                collection.id.clone(),
                RelationType::IsDepositorFor,
            ));
        }
        if !people_edges.is_empty() {
            self.graph.add_relations(&people_edges).await?;
        }

        for metadata_id in &links.metadata_file_ids {
            self.graph
                .add_relation(&collection.id, metadata_id, RelationType::HasMetadataFile)
                .await?;
        }
        Ok(())
    }
}

fn validate(collection: &Collection) -> WorkflowResult<()> {
    if collection.id.as_str().trim().is_empty() {
        return Err(WorkflowError::Invalid("collection id is empty".into()));
    }
    if collection.name.trim().is_empty() {
        return Err(WorkflowError::Invalid("collection name is empty".into()));
    }
    Ok(())
}
