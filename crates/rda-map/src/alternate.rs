use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use rda_types::BusinessObjectId;

/// Index of duplicate identifiers the same object is known by.
///
/// Built during package ingest, where one object can arrive under several
/// ids; the map builder merges an object's alternates into its node.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AlternateIdIndex {
    entries: HashMap<BusinessObjectId, Vec<String>>,
}

impl AlternateIdIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an alternate id for an object. Duplicates are dropped.
    pub fn record(&mut self, id: &BusinessObjectId, alternate: impl Into<String>) {
        let alternate = alternate.into();
        let alternates = self.entries.entry(id.clone()).or_default();
        if !alternates.contains(&alternate) {
            alternates.push(alternate);
        }
    }

    /// Alternate ids known for an object, in recording order.
    pub fn lookup(&self, id: &BusinessObjectId) -> &[String] {
        self.entries.get(id).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if no alternates are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_of_unknown_id_is_empty() {
        let index = AlternateIdIndex::new();
        assert!(index.lookup(&BusinessObjectId::new("x")).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn record_preserves_order_and_dedupes() {
        let mut index = AlternateIdIndex::new();
        let id = BusinessObjectId::new("f1");
        index.record(&id, "urn:pkg:7");
        index.record(&id, "urn:pkg:8");
        index.record(&id, "urn:pkg:7");
        assert_eq!(index.lookup(&id), ["urn:pkg:7", "urn:pkg:8"]);
    }
}
