//! In-memory store persisted as a JSON snapshot.

use crate::query::sort_key;
use crate::{
    Document, DocumentRequest, DocumentStore, Folder, FolderId, FolderQuery, FolderStore,
    FolderUpdate, NewFolder, RefRegistry, RequestStore, Result, StoreError, DEFAULT_SEQUENCE,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Serialized form of a [`MemoryStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub folders: Vec<Folder>,

    #[serde(default)]
    pub documents: Vec<Document>,

    /// Symbolic identifier -> folder id
    #[serde(default)]
    pub refs: BTreeMap<String, FolderId>,

    #[serde(default)]
    pub requests: Vec<DocumentRequest>,
}

/// In-process folder/document store backed by a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    folders: BTreeMap<FolderId, Folder>,
    documents: Vec<Document>,
    refs: BTreeMap<String, FolderId>,
    requests: Vec<DocumentRequest>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot, rejecting folder records that do not
    /// form a tree (dangling parents or parent loops).
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        let store = Self {
            folders: snapshot
                .folders
                .into_iter()
                .map(|folder| (folder.id, folder))
                .collect(),
            documents: snapshot.documents,
            refs: snapshot.refs,
            requests: snapshot.requests,
        };
        store.check_tree()?;
        Ok(store)
    }

    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            folders: self.folders.values().cloned().collect(),
            documents: self.documents.clone(),
            refs: self.refs.clone(),
            requests: self.requests.clone(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        log::debug!("Loading folder snapshot from {:?}", path.as_ref());
        let data = std::fs::read_to_string(path.as_ref())?;
        let snapshot: StoreSnapshot = serde_json::from_str(&data)?;
        let store = Self::from_snapshot(snapshot)?;
        log::debug!("Loaded {} folders", store.folders.len());
        Ok(store)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        log::debug!("Saving folder snapshot to {:?}", path.as_ref());
        let data = serde_json::to_string_pretty(&self.to_snapshot())?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    pub fn document(&self, id: u64) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn add_document(&mut self, name: impl Into<String>, folder: FolderId) -> Result<Document> {
        if !self.folders.contains_key(&folder) {
            return Err(StoreError::FolderNotFound(folder));
        }
        let id = self.documents.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let doc = Document {
            id,
            name: name.into(),
            folder,
        };
        self.documents.push(doc.clone());
        Ok(doc)
    }

    pub fn requests(&self) -> &[DocumentRequest] {
        &self.requests
    }

    fn next_id(&self) -> FolderId {
        FolderId(self.folders.keys().next_back().map_or(1, |id| id.0 + 1))
    }

    fn check_tree(&self) -> Result<()> {
        let mut acyclic = BTreeSet::new();
        for folder in self.folders.values() {
            let mut path = BTreeSet::new();
            let mut cursor = folder;
            while let Some(parent) = cursor.parent {
                if acyclic.contains(&cursor.id) {
                    break;
                }
                if !path.insert(cursor.id) {
                    return Err(StoreError::ParentCycle(cursor.id));
                }
                cursor = self
                    .folders
                    .get(&parent)
                    .ok_or(StoreError::UnknownParent(parent))?;
            }
            acyclic.extend(path);
        }
        Ok(())
    }

    fn within(&self, id: FolderId, ancestor: FolderId) -> bool {
        let mut seen = BTreeSet::new();
        let mut current = Some(id);
        while let Some(cursor) = current {
            if cursor == ancestor {
                return true;
            }
            if !seen.insert(cursor) {
                return false;
            }
            current = self.folders.get(&cursor).and_then(|f| f.parent);
        }
        false
    }
}

impl FolderStore for MemoryStore {
    fn folder(&self, id: FolderId) -> Result<Option<Folder>> {
        Ok(self.folders.get(&id).cloned())
    }

    fn search(&self, query: &FolderQuery) -> Result<Vec<Folder>> {
        let mut hits: Vec<&Folder> = self
            .folders
            .values()
            .filter(|folder| query.matches_record(folder))
            .filter(|folder| query.within.map_or(true, |root| self.within(folder.id, root)))
            .filter(|folder| {
                query
                    .not_within
                    .map_or(true, |excluded| !self.within(folder.id, excluded))
            })
            .collect();
        hits.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }
        Ok(hits.into_iter().cloned().collect())
    }

    fn create(&mut self, folder: NewFolder) -> Result<Folder> {
        let name = folder.name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if let Some(parent) = folder.parent {
            if !self.folders.contains_key(&parent) {
                return Err(StoreError::UnknownParent(parent));
            }
        }

        let created = Folder {
            id: self.next_id(),
            name: name.to_string(),
            parent: folder.parent,
            sequence: folder.sequence.unwrap_or(DEFAULT_SEQUENCE),
            owner: folder.owner,
            facets: BTreeSet::new(),
        };
        log::debug!("Created folder {} '{}'", created.id, created.name);
        self.folders.insert(created.id, created.clone());
        Ok(created)
    }

    fn update(&mut self, id: FolderId, update: FolderUpdate) -> Result<Folder> {
        let folder = self
            .folders
            .get_mut(&id)
            .ok_or(StoreError::FolderNotFound(id))?;
        if let Some(name) = update.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(StoreError::EmptyName);
            }
            folder.name = name.to_string();
        }
        if let Some(sequence) = update.sequence {
            folder.sequence = sequence;
        }
        if let Some(owner) = update.owner {
            folder.owner = Some(owner);
        }
        folder.facets.extend(update.add_facets);
        Ok(folder.clone())
    }

    fn is_descendant_or_self(&self, id: FolderId, ancestor: FolderId) -> Result<bool> {
        Ok(self.within(id, ancestor))
    }
}

impl DocumentStore for MemoryStore {
    fn count_in_folder(&self, folder: FolderId) -> Result<usize> {
        Ok(self.documents.iter().filter(|d| d.folder == folder).count())
    }
}

impl RefRegistry for MemoryStore {
    fn resolve_ref(&self, xml_id: &str) -> Result<Option<FolderId>> {
        Ok(self
            .refs
            .get(xml_id)
            .copied()
            .filter(|id| self.folders.contains_key(id)))
    }

    fn bind_ref(&mut self, xml_id: &str, folder: FolderId) -> Result<()> {
        if !self.folders.contains_key(&folder) {
            return Err(StoreError::FolderNotFound(folder));
        }
        match self.refs.insert(xml_id.to_string(), folder) {
            Some(previous) if previous != folder => {
                log::info!("Re-pointed {xml_id} from {previous} to {folder}");
            }
            Some(_) => {}
            None => log::debug!("Bound {xml_id} to {folder}"),
        }
        Ok(())
    }
}

impl RequestStore for MemoryStore {
    fn find_request(&self, name: &str, folder: FolderId) -> Result<Option<DocumentRequest>> {
        Ok(self
            .requests
            .iter()
            .find(|r| r.name == name && r.folder == folder)
            .cloned())
    }

    fn create_request(&mut self, request: DocumentRequest) -> Result<()> {
        self.requests.push(request);
        Ok(())
    }
}
