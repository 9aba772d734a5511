use serde::{Deserialize, Serialize};

use crate::id::BusinessObjectId;

/// The kind of a curated business object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessObjectKind {
    Project,
    Collection,
    DataItem,
    DataFile,
    MetadataFile,
    Person,
}

impl BusinessObjectKind {
    /// Human-readable label used in rendered object maps.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Collection => "Collection",
            Self::DataItem => "Data Item",
            Self::DataFile => "Data File",
            Self::MetadataFile => "Metadata File",
            Self::Person => "Person",
        }
    }
}

/// A research project: the top of the curated hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: BusinessObjectId,
    pub name: String,
}

/// A collection of data items, owned by at most one project.
///
/// Sub-collection ids are carried on the retrieved object because the
/// archive returns them with the collection record; project ownership and
/// metadata attachments live in the relationship graph instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: BusinessObjectId,
    pub name: String,
    pub sub_collection_ids: Vec<BusinessObjectId>,
}

/// A data item: the unit of deposit that directly holds data files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    pub id: BusinessObjectId,
    pub name: String,
    /// Files held by value: a retrieved data item carries its files with it
    /// rather than referencing them through the relationship graph.
    pub data_files: Vec<DataFile>,
}

/// A single data file within a data item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
    pub id: BusinessObjectId,
    pub name: String,
}

/// A metadata file attached to another business object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFile {
    pub id: BusinessObjectId,
    pub name: String,
    /// Metadata format name, when known (e.g. a registered schema name).
    pub format: Option<String>,
}

/// A person: administrator of or depositor into collections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: BusinessObjectId,
    pub name: String,
}

/// Tagged union over the curated object kinds.
///
/// Downstream code dispatches over the variant once instead of chaining
/// kind checks; the map builder's per-kind descent is the main consumer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessObject {
    Project(Project),
    Collection(Collection),
    DataItem(DataItem),
    DataFile(DataFile),
    MetadataFile(MetadataFile),
    Person(Person),
}

impl BusinessObject {
    /// The object's stable identifier.
    pub fn id(&self) -> &BusinessObjectId {
        match self {
            Self::Project(p) => &p.id,
            Self::Collection(c) => &c.id,
            Self::DataItem(d) => &d.id,
            Self::DataFile(f) => &f.id,
            Self::MetadataFile(m) => &m.id,
            Self::Person(p) => &p.id,
        }
    }

    /// The object's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Project(p) => &p.name,
            Self::Collection(c) => &c.name,
            Self::DataItem(d) => &d.name,
            Self::DataFile(f) => &f.name,
            Self::MetadataFile(m) => &m.name,
            Self::Person(p) => &p.name,
        }
    }

    /// The object's kind tag.
    pub fn kind(&self) -> BusinessObjectKind {
        match self {
            Self::Project(_) => BusinessObjectKind::Project,
            Self::Collection(_) => BusinessObjectKind::Collection,
            Self::DataItem(_) => BusinessObjectKind::DataItem,
            Self::DataFile(_) => BusinessObjectKind::DataFile,
            Self::MetadataFile(_) => BusinessObjectKind::MetadataFile,
            Self::Person(_) => BusinessObjectKind::Person,
        }
    }
}
