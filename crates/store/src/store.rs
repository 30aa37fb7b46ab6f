use crate::{DocumentRequest, Folder, FolderId, FolderQuery, FolderUpdate, NewFolder, Result};
use std::collections::HashSet;

/// Hierarchical folder storage owned by the host application.
pub trait FolderStore {
    fn folder(&self, id: FolderId) -> Result<Option<Folder>>;

    /// All folders satisfying `query`, ordered by `(sequence, name, id)`.
    fn search(&self, query: &FolderQuery) -> Result<Vec<Folder>>;

    fn create(&mut self, folder: NewFolder) -> Result<Folder>;

    fn update(&mut self, id: FolderId, update: FolderUpdate) -> Result<Folder>;

    fn search_one(&self, query: &FolderQuery) -> Result<Option<Folder>> {
        let query = query.clone().limit(1);
        Ok(self.search(&query)?.into_iter().next())
    }

    /// True when `ancestor` is `id` itself or one of its ancestors.
    fn is_descendant_or_self(&self, id: FolderId, ancestor: FolderId) -> Result<bool> {
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(cursor) = current {
            if cursor == ancestor {
                return Ok(true);
            }
            if !seen.insert(cursor) {
                log::warn!("Folder parent chain loops at {cursor}");
                return Ok(false);
            }
            current = self.folder(cursor)?.and_then(|f| f.parent);
        }
        Ok(false)
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    fn ancestors(&self, id: FolderId) -> Result<Vec<Folder>> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.folder(id)?.and_then(|f| f.parent);
        while let Some(cursor) = current {
            if !seen.insert(cursor) {
                break;
            }
            let Some(folder) = self.folder(cursor)? else {
                break;
            };
            current = folder.parent;
            out.push(folder);
        }
        Ok(out)
    }
}

/// Documents stored in folders; only counted by this subsystem.
pub trait DocumentStore {
    /// Documents placed directly in `folder` (sub-folders not included).
    fn count_in_folder(&self, folder: FolderId) -> Result<usize>;
}

/// Stable symbolic identifiers (`module.name`) pointing at folders.
pub trait RefRegistry {
    fn resolve_ref(&self, xml_id: &str) -> Result<Option<FolderId>>;

    /// Create the binding or re-point an existing one.
    fn bind_ref(&mut self, xml_id: &str, folder: FolderId) -> Result<()>;
}

pub trait RequestStore {
    fn find_request(&self, name: &str, folder: FolderId) -> Result<Option<DocumentRequest>>;

    fn create_request(&mut self, request: DocumentRequest) -> Result<()>;
}

