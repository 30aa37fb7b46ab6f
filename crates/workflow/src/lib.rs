//! # Dossier Workflow
//!
//! Contract-side handling of quality dossiers: which contract owns which
//! folder, the create/link dialog, reassignment warnings, the fixed dossier
//! sub-structure, and binding of the workspace identifiers to an existing
//! folder tree.
//!
//! Folder creation is read-then-create without locking; concurrent callers
//! resolving the same missing dossier can create duplicates.

mod assign;
mod bootstrap;
mod config;
mod contract;
mod error;
mod folders;
mod owners;
mod snapshot;
mod structure;

pub use assign::{
    reassignment_warnings, AssignMode, AssignOutcome, AssignRequest, ContractKind,
    DossierAssigner, ReassignWarning,
};
pub use bootstrap::{bootstrap_refs, find_workspace_root, BootstrapReport};
pub use config::{DossierConfig, StructureTemplate, WorkflowConfig};
pub use contract::{Contract, ContractBook, ContractId, DossierState};
pub use error::{Result, WorkflowError};
pub use folders::{
    current_year, dossier_of_folder, ensure_year_folder, folder_path, get_or_create_folder,
};
pub use owners::{require_single_owner, OwnerDirectory, StaticOwners};
pub use snapshot::{DossierSnapshot, DossierWorkspace};
pub use structure::{DossierStructure, StructureReport};
