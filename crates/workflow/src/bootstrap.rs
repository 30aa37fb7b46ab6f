//! Binding of the workspace identifiers to an existing folder tree.

use crate::folders::ensure_year_folder;
use crate::{DossierConfig, Result, WorkflowConfig};
use dossier_store::{Folder, FolderId, FolderQuery, FolderStore, NameMatch, RefRegistry};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Workspace root found by name, if any
    pub root: Option<FolderId>,

    /// Identifiers bound or re-pointed during this run
    pub bound: Vec<String>,

    pub current_year: Option<FolderId>,
}

/// Parentless folder named `root_name` (case-insensitive), else the first
/// parentless folder whose name contains every hint.
pub fn find_workspace_root<S: FolderStore + ?Sized>(
    store: &S,
    workflow: &WorkflowConfig,
) -> Result<Option<Folder>> {
    let roots = store.search(&FolderQuery::new().roots())?;

    let exact = workflow.root_name.trim().to_lowercase();
    if !exact.is_empty() {
        if let Some(folder) = roots.iter().find(|f| f.name.to_lowercase() == exact) {
            return Ok(Some(folder.clone()));
        }
    }

    let matchers: Vec<NameMatch> = workflow
        .root_name_hints
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(|h| NameMatch::ContainsIgnoreCase(h.to_string()))
        .collect();
    if matchers.is_empty() {
        return Ok(None);
    }
    Ok(roots
        .into_iter()
        .find(|folder| matchers.iter().all(|m| m.matches(&folder.name))))
}

/// Bind the workspace identifiers to the existing folder structure.
///
/// Idempotent: rerunning re-points stale identifiers and creates nothing new
/// except a missing current-year folder. When no root can be found nothing is
/// bound and the resolver will report the missing workspace.
pub fn bootstrap_refs<S>(store: &mut S, config: &DossierConfig, year: i32) -> Result<BootstrapReport>
where
    S: FolderStore + RefRegistry + ?Sized,
{
    let mut report = BootstrapReport::default();
    let Some(root) = find_workspace_root(store, &config.workflow)? else {
        log::warn!(
            "No parentless folder named '{}' or matching {:?}; workspace identifiers left unbound",
            config.workflow.root_name,
            config.workflow.root_name_hints
        );
        return Ok(report);
    };
    report.root = Some(root.id);

    let resolver = &config.resolver;
    for xml_id in [&resolver.workspace_ref, &resolver.workspace_alias_ref] {
        if xml_id.trim().is_empty() {
            continue;
        }
        bind(store, xml_id, root.id, &mut report)?;
    }

    let exclude_name = config
        .workflow
        .exclude_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    for child in store.search(&FolderQuery::new().child_of(root.id))? {
        if is_year_name(&child.name) {
            bind(store, &resolver.year_ref(parse_year(&child.name)), child.id, &mut report)?;
        } else if let (Some(xml_id), Some(name)) = (resolver.exclude_ref(), exclude_name) {
            if child.name.eq_ignore_ascii_case(name) {
                bind(store, xml_id, child.id, &mut report)?;
            }
        }
    }

    let current = ensure_year_folder(store, root.id, year)?;
    bind(store, &resolver.year_ref(year), current.id, &mut report)?;
    report.current_year = Some(current.id);

    Ok(report)
}

fn bind<S: RefRegistry + ?Sized>(
    store: &mut S,
    xml_id: &str,
    folder: FolderId,
    report: &mut BootstrapReport,
) -> Result<()> {
    if store.resolve_ref(xml_id)? == Some(folder) {
        return Ok(());
    }
    store.bind_ref(xml_id, folder)?;
    report.bound.push(xml_id.to_string());
    Ok(())
}

fn is_year_name(name: &str) -> bool {
    name.len() == 4 && name.bytes().all(|b| b.is_ascii_digit())
}

fn parse_year(name: &str) -> i32 {
    name.bytes().fold(0, |acc, b| acc * 10 + i32::from(b - b'0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_store::{MemoryStore, NewFolder};
    use pretty_assertions::assert_eq;

    #[test]
    fn root_lookup_prefers_the_exact_name() {
        let mut store = MemoryStore::new();
        store.create(NewFolder::new("Dossieres de calidad (copia)")).unwrap();
        let root = store.create(NewFolder::new("DOSSIERES DE CALIDAD")).unwrap().id;
        let found = find_workspace_root(&store, &WorkflowConfig::default()).unwrap();
        assert_eq!(found.map(|f| f.id), Some(root));
    }

    #[test]
    fn root_lookup_needs_every_hint() {
        let mut store = MemoryStore::new();
        store.create(NewFolder::new("Dossieres comerciales")).unwrap();
        let root = store.create(NewFolder::new("Dossier Calidad Obras")).unwrap().id;
        let workflow = WorkflowConfig::default();
        assert_eq!(
            find_workspace_root(&store, &workflow).unwrap().map(|f| f.id),
            Some(root)
        );

        let bare = WorkflowConfig {
            root_name: String::new(),
            root_name_hints: Vec::new(),
            ..WorkflowConfig::default()
        };
        assert_eq!(find_workspace_root(&store, &bare).unwrap(), None);
    }

    #[test]
    fn binds_root_years_and_current_year() {
        let mut store = MemoryStore::new();
        let root = store.create(NewFolder::new("Dossieres de calidad")).unwrap().id;
        let y2023 = store.create(NewFolder::new("2023").parent(root)).unwrap().id;
        let archived = store.create(NewFolder::new("Archivado").parent(root)).unwrap().id;
        let config = DossierConfig::default();

        let report = bootstrap_refs(&mut store, &config, 2025).unwrap();
        assert_eq!(report.root, Some(root));
        assert_eq!(
            store.resolve_ref(config.resolver.exclude_ref().unwrap()).unwrap(),
            Some(archived)
        );
        assert_eq!(store.resolve_ref(&config.resolver.workspace_ref).unwrap(), Some(root));
        assert_eq!(
            store.resolve_ref(&config.resolver.workspace_alias_ref).unwrap(),
            Some(root)
        );
        assert_eq!(store.resolve_ref("dossier.folder_year_2023").unwrap(), Some(y2023));
        assert_eq!(
            store.resolve_ref("dossier.folder_year_2025").unwrap(),
            report.current_year
        );
        assert_eq!(report.bound.len(), 5);

        let again = bootstrap_refs(&mut store, &config, 2025).unwrap();
        assert!(again.bound.is_empty());
        assert_eq!(again.current_year, report.current_year);
    }

    #[test]
    fn stale_binding_is_repointed() {
        let mut store = MemoryStore::new();
        let wrong = store.create(NewFolder::new("Compras")).unwrap().id;
        let root = store.create(NewFolder::new("Dossieres de calidad")).unwrap().id;
        let config = DossierConfig::default();
        store.bind_ref(&config.resolver.workspace_ref, wrong).unwrap();

        let report = bootstrap_refs(&mut store, &config, 2025).unwrap();
        assert!(report.bound.contains(&config.resolver.workspace_ref));
        assert_eq!(store.resolve_ref(&config.resolver.workspace_ref).unwrap(), Some(root));
    }

    #[test]
    fn missing_root_binds_nothing() {
        let mut store = MemoryStore::new();
        store.create(NewFolder::new("Compras")).unwrap();
        let report = bootstrap_refs(&mut store, &DossierConfig::default(), 2025).unwrap();
        assert_eq!(report, BootstrapReport::default());
        assert_eq!(store.len(), 1);
    }
}
