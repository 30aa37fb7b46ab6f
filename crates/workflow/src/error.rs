use crate::ContractId;
use dossier_store::FolderId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Store error: {0}")]
    StoreError(#[from] dossier_store::StoreError),

    #[error(transparent)]
    ResolveError(#[from] dossier_resolver::ResolveError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    SnapshotError(#[from] serde_json::Error),

    #[error("Contract not found: {0}")]
    ContractNotFound(ContractId),

    #[error("Folder not found: {0}")]
    FolderNotFound(FolderId),

    #[error("Folder {0} is outside the dossier workspace")]
    OutOfScope(FolderId),

    #[error("Folder {folder} already belongs to contract {contract}")]
    FolderTaken { folder: FolderId, contract: String },

    #[error("An addendum needs its principal contract")]
    MissingPrincipal,

    #[error("Could not determine the dossier name")]
    EmptyDossierName,

    #[error("Expected exactly one owner with role '{role}', found {count}: [{}]", .names.join(", "))]
    AmbiguousOwner {
        role: String,
        count: usize,
        names: Vec<String>,
    },

    #[error("Unknown dossier state '{0}' (expected suministro, en_proceso, enviado or aprobado)")]
    UnknownState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
