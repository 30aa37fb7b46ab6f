//! # Dossier Store
//!
//! Folder tree, document counts and symbolic references consumed by the
//! dossier resolver. The traits model the host application's storage; the
//! [`MemoryStore`] keeps everything in process and persists to a JSON snapshot.

mod error;
mod memory;
mod query;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreSnapshot};
pub use query::{FolderQuery, NameMatch, ParentFilter};
pub use store::{DocumentStore, FolderStore, RefRegistry, RequestStore};
pub use types::{
    Document, DocumentRequest, Folder, FolderId, FolderUpdate, NewFolder, DEFAULT_SEQUENCE,
};
