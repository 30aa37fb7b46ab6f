//! Workspace boundary applied to every folder search.

use crate::{ResolveError, ResolverConfig, Result};
use dossier_store::{FolderId, FolderQuery, FolderStore, RefRegistry};
use serde::Serialize;

/// Search boundary: the workspace subtree minus the excluded subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub root: FolderId,
    pub exclude: Option<FolderId>,
}

impl Scope {
    pub fn new(root: FolderId, exclude: Option<FolderId>) -> Self {
        Self { root, exclude }
    }

    /// Resolve the configured identifiers into folder ids.
    ///
    /// A missing workspace root is fatal; a missing exclusion root means
    /// nothing is excluded.
    pub fn resolve<R: RefRegistry + ?Sized>(refs: &R, config: &ResolverConfig) -> Result<Self> {
        let root = refs
            .resolve_ref(&config.workspace_ref)?
            .ok_or_else(|| ResolveError::MissingWorkspaceRoot(config.workspace_ref.clone()))?;

        let exclude = match config.exclude_ref() {
            Some(xml_id) => {
                let found = refs.resolve_ref(xml_id)?;
                if found.is_none() {
                    log::debug!("Exclusion folder {xml_id} not bound; nothing excluded");
                }
                found
            }
            None => None,
        };

        Ok(Self { root, exclude })
    }

    /// Descendant-or-self of the root AND not descendant-or-self of the
    /// exclusion root, conjoined with `extra`.
    pub fn scoped_domain(&self, extra: FolderQuery) -> FolderQuery {
        let query = extra.within(self.root);
        match self.exclude {
            Some(excluded) => query.not_within(excluded),
            None => query,
        }
    }

    pub fn contains<S: FolderStore + ?Sized>(&self, store: &S, id: FolderId) -> Result<bool> {
        if !store.is_descendant_or_self(id, self.root)? {
            return Ok(false);
        }
        match self.exclude {
            Some(excluded) => Ok(!store.is_descendant_or_self(id, excluded)?),
            None => Ok(true),
        }
    }
}
