//! The create/link dialog for contract dossiers.

use crate::folders::{ensure_year_folder, folder_path, get_or_create_folder};
use crate::owners::{require_single_owner, OwnerDirectory};
use crate::structure::{DossierStructure, StructureReport};
use crate::{ContractBook, ContractId, DossierConfig, Result, WorkflowError};
use dossier_resolver::{FolderResolver, Scope};
use dossier_store::{DocumentStore, Folder, FolderId, FolderStore, RefRegistry, RequestStore};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Principal,
    Addendum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "folder", rename_all = "snake_case")]
pub enum AssignMode {
    /// Create (or reuse a matching) dossier folder
    New,

    /// Link an existing dossier folder
    Existing(FolderId),
}

/// What the create/link dialog submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignRequest {
    pub contract: ContractId,
    pub kind: ContractKind,
    pub mode: AssignMode,

    /// Principal contract, required for addenda
    pub principal: Option<ContractId>,

    /// Dossier name for `New`; defaults to the principal's name
    pub folder_name: Option<String>,
}

impl AssignRequest {
    /// Dialog defaults for `contract`: the kind follows the parent link, and
    /// an addendum whose principal already has a dossier links that folder.
    pub fn defaults(book: &ContractBook, contract: ContractId) -> Result<Self> {
        let current = book.get(contract)?;
        let root = book.root_of(contract)?;

        let mut request = Self {
            contract,
            kind: ContractKind::Principal,
            mode: AssignMode::New,
            principal: None,
            folder_name: Some(root.name.clone()),
        };
        if current.is_addendum() {
            request.kind = ContractKind::Addendum;
            request.principal = Some(root.id);
            if let Some(folder) = root.dossier_folder {
                request.mode = AssignMode::Existing(folder);
            }
        }
        Ok(request)
    }

    /// Contract whose dossier folder gets written.
    pub fn target_contract(&self, book: &ContractBook) -> Result<ContractId> {
        match self.kind {
            ContractKind::Principal => Ok(book.root_of(self.contract)?.id),
            ContractKind::Addendum => {
                let principal = self.principal.ok_or(WorkflowError::MissingPrincipal)?;
                Ok(book.root_of(principal)?.id)
            }
        }
    }
}

/// Reasons to think twice before linking an existing folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReassignWarning {
    HasDocuments { count: usize },
    LinkedToOther { contract: String },
}

impl fmt::Display for ReassignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReassignWarning::HasDocuments { count } => write!(
                f,
                "The selected folder already holds {count} document(s); reassign only on purpose."
            ),
            ReassignWarning::LinkedToOther { contract } => {
                write!(f, "The folder is already linked to contract {contract}.")
            }
        }
    }
}

/// Warnings for an `Existing` request; empty for `New`.
pub fn reassignment_warnings<S>(
    store: &S,
    book: &ContractBook,
    request: &AssignRequest,
) -> Result<Vec<ReassignWarning>>
where
    S: DocumentStore + ?Sized,
{
    let AssignMode::Existing(folder) = request.mode else {
        return Ok(Vec::new());
    };

    let target = match request.target_contract(book) {
        Ok(id) => id,
        Err(WorkflowError::MissingPrincipal) => book.root_of(request.contract)?.id,
        Err(err) => return Err(err),
    };

    let mut warnings = Vec::new();
    let count = store.count_in_folder(folder)?;
    if count > 0 {
        warnings.push(ReassignWarning::HasDocuments { count });
    }
    if let Some(other) = book.linked_elsewhere(folder, target) {
        warnings.push(ReassignWarning::LinkedToOther {
            contract: other.name.clone(),
        });
    }
    Ok(warnings)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignOutcome {
    /// Contract that now owns the dossier folder
    pub contract: ContractId,
    pub folder: Folder,
    pub path: String,

    /// Folder created by this call (false when linked or matched)
    pub created: bool,

    /// An existing folder was found by the resolver
    pub matched: bool,

    pub structure: Option<StructureReport>,
}

/// Applies [`AssignRequest`]s against a store and a contract book.
pub struct DossierAssigner<'a> {
    config: &'a DossierConfig,
    resolver: FolderResolver,
}

impl<'a> DossierAssigner<'a> {
    pub fn new(config: &'a DossierConfig) -> Self {
        Self {
            config,
            resolver: FolderResolver::new(config.resolver.clone()),
        }
    }

    pub fn confirm<S, D>(
        &self,
        store: &mut S,
        book: &mut ContractBook,
        owners: &D,
        request: &AssignRequest,
        year: i32,
    ) -> Result<AssignOutcome>
    where
        S: FolderStore + RefRegistry + RequestStore + ?Sized,
        D: OwnerDirectory + ?Sized,
    {
        let target = request.target_contract(book)?;
        let scope = self.resolver.scope(&*store)?;

        let outcome = match request.mode {
            AssignMode::Existing(folder_id) => {
                let folder = store
                    .folder(folder_id)?
                    .ok_or(WorkflowError::FolderNotFound(folder_id))?;
                if !scope.contains(&*store, folder_id)? {
                    return Err(WorkflowError::OutOfScope(folder_id));
                }
                AssignOutcome {
                    contract: target,
                    path: folder_path(&*store, folder.id)?,
                    folder,
                    created: false,
                    matched: false,
                    structure: None,
                }
            }
            AssignMode::New => {
                self.create_or_match(store, book, owners, request, target, &scope, year)?
            }
        };

        book.set_folder(target, outcome.folder.id)?;
        if let Err(err) = book.post_note(target, format!("Dossier asignado: {}", outcome.path)) {
            log::warn!("Could not record the assignment note on {target}: {err}");
        }
        log::info!(
            "Contract {} -> dossier '{}'{}",
            target,
            outcome.path,
            if outcome.created { " (created)" } else { "" }
        );
        Ok(outcome)
    }

    #[allow(clippy::too_many_arguments)]
    fn create_or_match<S, D>(
        &self,
        store: &mut S,
        book: &ContractBook,
        owners: &D,
        request: &AssignRequest,
        target: ContractId,
        scope: &Scope,
        year: i32,
    ) -> Result<AssignOutcome>
    where
        S: FolderStore + RefRegistry + RequestStore + ?Sized,
        D: OwnerDirectory + ?Sized,
    {
        let name = request
            .folder_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| book.get(target).ok().map(|c| c.name.trim().to_string()))
            .unwrap_or_default();
        if name.is_empty() {
            return Err(WorkflowError::EmptyDossierName);
        }

        // Fail before touching the tree when ownership is misconfigured
        let owner = require_single_owner(owners, &self.config.workflow.owner_role)?;

        // A match already owned by another contract is never shared
        let found = match dossier_resolver::resolve_in_scope(&*store, &name, scope)? {
            Some(resolution) => match book.linked_elsewhere(resolution.folder.id, target) {
                Some(other) => {
                    log::warn!(
                        "'{name}' matches '{}' which belongs to contract {}; not reusing it",
                        resolution.folder.name,
                        other.name
                    );
                    None
                }
                None => Some(resolution.folder),
            },
            None => None,
        };

        let (folder, created, matched) = match found {
            Some(folder) => (folder, false, true),
            None => {
                let year_folder = ensure_year_folder(store, scope.root, year)?;
                let (folder, created) = get_or_create_folder(store, year_folder.id, &name, None)?;
                if let Some(other) = book.linked_elsewhere(folder.id, target) {
                    return Err(WorkflowError::FolderTaken {
                        folder: folder.id,
                        contract: other.name.clone(),
                    });
                }
                (folder, created, false)
            }
        };

        let facets = self.template_facets(&*store)?;
        let structure = DossierStructure::new(&self.config.workflow.structure, owner, facets)
            .build(store, &folder)?;

        Ok(AssignOutcome {
            contract: target,
            path: folder_path(&*store, folder.id)?,
            folder,
            created,
            matched,
            structure: Some(structure),
        })
    }

    fn template_facets<S>(&self, store: &S) -> Result<Vec<String>>
    where
        S: FolderStore + RefRegistry + ?Sized,
    {
        let Some(xml_id) = self.config.workflow.facet_source_ref.as_deref() else {
            return Ok(Vec::new());
        };
        let Some(source) = store.resolve_ref(xml_id)? else {
            log::debug!("Facet template {xml_id} not bound; folders stay untagged");
            return Ok(Vec::new());
        };
        Ok(store
            .folder(source)?
            .map(|f| f.facets.into_iter().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticOwners;
    use dossier_store::{MemoryStore, NewFolder};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_for_principal_and_addendum() {
        let mut book = ContractBook::new();
        let principal = book.insert("LSG-CN-PU-CON-0018", None).unwrap();
        let addendum = book.insert("LSG-CN-PU-CON-0018A", Some(principal)).unwrap();

        let req = AssignRequest::defaults(&book, principal).unwrap();
        assert_eq!(req.kind, ContractKind::Principal);
        assert_eq!(req.mode, AssignMode::New);
        assert_eq!(req.folder_name.as_deref(), Some("LSG-CN-PU-CON-0018"));

        let req = AssignRequest::defaults(&book, addendum).unwrap();
        assert_eq!(req.kind, ContractKind::Addendum);
        assert_eq!(req.principal, Some(principal));
        assert_eq!(req.mode, AssignMode::New);
        assert_eq!(req.folder_name.as_deref(), Some("LSG-CN-PU-CON-0018"));

        book.set_folder(principal, FolderId(5)).unwrap();
        let req = AssignRequest::defaults(&book, addendum).unwrap();
        assert_eq!(req.mode, AssignMode::Existing(FolderId(5)));
    }

    #[test]
    fn addendum_without_principal_is_rejected() {
        let mut book = ContractBook::new();
        let principal = book.insert("P", None).unwrap();
        let addendum = book.insert("A", Some(principal)).unwrap();
        let request = AssignRequest {
            contract: addendum,
            kind: ContractKind::Addendum,
            mode: AssignMode::New,
            principal: None,
            folder_name: None,
        };
        assert!(matches!(
            request.target_contract(&book),
            Err(WorkflowError::MissingPrincipal)
        ));
    }

    #[test]
    fn warnings_cover_documents_and_other_links() {
        let mut store = MemoryStore::new();
        let folder = store.create(NewFolder::new("ABC-VAO-0018")).unwrap().id;
        store.add_document("plan.pdf", folder).unwrap();

        let mut book = ContractBook::new();
        let owner = book.insert("ABC-VAO-0018", None).unwrap();
        let other = book.insert("XYZ-CON-0001", None).unwrap();
        book.set_folder(owner, folder).unwrap();

        let request = AssignRequest {
            contract: other,
            kind: ContractKind::Principal,
            mode: AssignMode::Existing(folder),
            principal: None,
            folder_name: None,
        };
        let warnings = reassignment_warnings(&store, &book, &request).unwrap();
        assert_eq!(
            warnings,
            vec![
                ReassignWarning::HasDocuments { count: 1 },
                ReassignWarning::LinkedToOther {
                    contract: "ABC-VAO-0018".to_string()
                },
            ]
        );
        assert!(warnings[1].to_string().contains("ABC-VAO-0018"));

        let own = AssignRequest {
            contract: owner,
            ..request.clone()
        };
        assert_eq!(
            reassignment_warnings(&store, &book, &own).unwrap(),
            vec![ReassignWarning::HasDocuments { count: 1 }]
        );

        let new = AssignRequest {
            mode: AssignMode::New,
            ..request
        };
        assert!(reassignment_warnings(&store, &book, &new).unwrap().is_empty());
    }

    #[test]
    fn ambiguous_owner_stops_before_creating_folders() {
        let mut store = MemoryStore::new();
        let config = DossierConfig::default();
        let root = store.create(NewFolder::new("Dossieres de calidad")).unwrap().id;
        store.bind_ref(&config.resolver.workspace_ref, root).unwrap();

        let mut book = ContractBook::new();
        let contract = book.insert("ABC-VAO-0018", None).unwrap();
        let request = AssignRequest::defaults(&book, contract).unwrap();
        let owners = StaticOwners::default().with_role("dossier_manager", &["ana", "luis"]);

        let err = DossierAssigner::new(&config)
            .confirm(&mut store, &mut book, &owners, &request, 2025)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::AmbiguousOwner { count: 2, .. }));
        assert_eq!(store.len(), 1);
        assert!(!book.has_dossier(contract).unwrap());
    }
}
