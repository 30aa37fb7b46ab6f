//! Candidate search with a shortest-substring fallback, always scoped.

use crate::{ResolveError, ResolverConfig, Result, Scope};
use dossier_naming::{candidate_basenames, SimilarityConfig};
use dossier_store::{Folder, FolderId, FolderQuery, FolderStore, RefRegistry};
use serde::Serialize;

/// Which step of the lookup produced the folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum MatchSource {
    /// Name starts with a structured candidate basename
    Candidate { basename: String },

    /// Substring fallback, narrowed to names starting with the shortest hit
    Fallback { base: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub folder: Folder,
    pub source: MatchSource,
}

/// Best existing folder for `raw_code`, restricted to `scope_root` and
/// outside `exclude_root`. A `scope_root` missing from the store is
/// [`ResolveError::MissingWorkspaceRoot`].
pub fn find_existing_folder<S: FolderStore + ?Sized>(
    store: &S,
    raw_code: &str,
    scope_root: FolderId,
    exclude_root: Option<FolderId>,
) -> Result<Option<Folder>> {
    let scope = Scope::new(scope_root, exclude_root);
    Ok(resolve_in_scope(store, raw_code, &scope)?.map(|r| r.folder))
}

/// Same lookup as [`find_existing_folder`], reporting how the folder was found.
pub fn resolve_in_scope<S: FolderStore + ?Sized>(
    store: &S,
    raw_code: &str,
    scope: &Scope,
) -> Result<Option<Resolution>> {
    if store.folder(scope.root)?.is_none() {
        return Err(ResolveError::MissingWorkspaceRoot(scope.root.to_string()));
    }

    for basename in candidate_basenames(raw_code) {
        let query = scope.scoped_domain(FolderQuery::new().name_starts_with(basename.as_str()));
        if let Some(folder) = store.search_one(&query)? {
            log::debug!("'{raw_code}' resolved to '{}' via candidate {basename}", folder.name);
            return Ok(Some(Resolution {
                folder,
                source: MatchSource::Candidate { basename },
            }));
        }
    }

    let needle = raw_code.trim();
    if needle.is_empty() {
        return Ok(None);
    }

    let hits = store.search(&scope.scoped_domain(FolderQuery::new().name_contains(needle)))?;
    let Some(base) = hits
        .iter()
        .min_by_key(|f| f.name.chars().count())
        .map(|f| f.name.clone())
    else {
        log::debug!("No folder in scope matches '{raw_code}'");
        return Ok(None);
    };

    let query = scope.scoped_domain(FolderQuery::new().name_starts_with(base.as_str()));
    let found = store.search_one(&query)?;
    if let Some(folder) = &found {
        log::debug!("'{raw_code}' resolved to '{}' via fallback base {base}", folder.name);
    }
    Ok(found.map(|folder| Resolution {
        folder,
        source: MatchSource::Fallback { base },
    }))
}

/// Resolver bound to a configuration; the scope is looked up per call so a
/// rebinding of the workspace identifiers takes effect immediately.
#[derive(Debug, Clone, Default)]
pub struct FolderResolver {
    config: ResolverConfig,
}

impl FolderResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn similarity(&self) -> SimilarityConfig {
        SimilarityConfig::with_threshold(self.config.fuzzy_threshold)
    }

    pub fn scope<R: RefRegistry + ?Sized>(&self, refs: &R) -> Result<Scope> {
        Scope::resolve(refs, &self.config)
    }

    pub fn resolve<S>(&self, store: &S, raw_code: &str) -> Result<Option<Resolution>>
    where
        S: FolderStore + RefRegistry + ?Sized,
    {
        let scope = self.scope(store)?;
        resolve_in_scope(store, raw_code, &scope)
    }

    pub fn find_existing_folder<S>(&self, store: &S, raw_code: &str) -> Result<Option<Folder>>
    where
        S: FolderStore + RefRegistry + ?Sized,
    {
        Ok(self.resolve(store, raw_code)?.map(|r| r.folder))
    }
}

/// Folders two levels below the workspace root (root → year → dossier).
pub fn dossier_level_folders<S: FolderStore + ?Sized>(store: &S, scope: &Scope) -> Result<Vec<Folder>> {
    let mut out = Vec::new();
    for year in store.search(&scope.scoped_domain(FolderQuery::new().child_of(scope.root)))? {
        out.extend(store.search(&scope.scoped_domain(FolderQuery::new().child_of(year.id)))?);
    }
    Ok(out)
}
