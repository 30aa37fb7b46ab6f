use crate::FolderId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    SnapshotError(#[from] serde_json::Error),

    #[error("Folder not found: {0}")]
    FolderNotFound(FolderId),

    #[error("Parent folder not found: {0}")]
    UnknownParent(FolderId),

    #[error("Folder {0} is its own ancestor")]
    ParentCycle(FolderId),

    #[error("Folder name must not be empty")]
    EmptyName,
}
