use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Store error: {0}")]
    StoreError(#[from] dossier_store::StoreError),

    #[error("Workspace root folder not found ({0})")]
    MissingWorkspaceRoot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
