use serde::{Deserialize, Serialize};

use rda_types::{BusinessObject, BusinessObjectId, BusinessObjectKind, DepositStatus};

/// One node of a business object map: an ephemeral, read-only projection of
/// a curated object plus its deposit status at snapshot time.
///
/// Child order is insertion order and not semantically significant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessObjectMap {
    pub id: BusinessObjectId,
    pub name: String,
    pub kind: BusinessObjectKind,
    pub deposit_status: DepositStatus,
    /// Duplicate identifiers the same object is known by (e.g. within an
    /// ingested package).
    pub alternate_ids: Vec<String>,
    pub children: Vec<BusinessObjectMap>,
}

impl BusinessObjectMap {
    /// A node for a resolved object, initially childless.
    pub fn resolved(object: &BusinessObject, deposit_status: DepositStatus) -> Self {
        Self {
            id: object.id().clone(),
            name: object.name().to_string(),
            kind: object.kind(),
            deposit_status,
            alternate_ids: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A FAILED leaf for a descendant that could not be resolved from the
    /// archive. Failed branches terminate descent: their children are never
    /// explored because they cannot be fetched.
    pub fn failed_leaf(id: BusinessObjectId, name: String, kind: BusinessObjectKind) -> Self {
        Self {
            id,
            name,
            kind,
            deposit_status: DepositStatus::Failed,
            alternate_ids: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Depth-first search for a node by id.
    pub fn find(&self, id: &BusinessObjectId) -> Option<&Self> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}
