use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Sequence given to folders created without one.
pub const DEFAULT_SEQUENCE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub u64);

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node of the folder tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,

    pub name: String,

    /// Absent only for roots
    #[serde(default)]
    pub parent: Option<FolderId>,

    #[serde(default = "default_sequence")]
    pub sequence: i32,

    #[serde(default)]
    pub owner: Option<String>,

    /// Tag facets attached to the folder
    #[serde(default)]
    pub facets: BTreeSet<String>,
}

fn default_sequence() -> i32 {
    DEFAULT_SEQUENCE
}

/// Values for a folder about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFolder {
    pub name: String,
    pub parent: Option<FolderId>,
    pub sequence: Option<i32>,
    pub owner: Option<String>,
}

impl NewFolder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            sequence: None,
            owner: None,
        }
    }

    pub fn parent(mut self, parent: FolderId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn sequence(mut self, sequence: i32) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub sequence: Option<i32>,
    pub owner: Option<String>,
    pub add_facets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub name: String,
    pub folder: FolderId,
}

/// Pending request for documents to be uploaded into a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub name: String,
    pub folder: FolderId,
    pub owner: String,
}
