//! # Dossier Resolver
//!
//! Finds the existing quality dossier folder for a contract code inside the
//! workspace subtree, never touching the archived subtree.
//!
//! ```text
//! raw code
//!     │
//!     ├──> candidate basenames (most specific first)
//!     │      └─ name starts with candidate, scoped      → first hit wins
//!     │
//!     └──> fallback
//!            ├─ name contains raw code, scoped
//!            ├─ shortest hit becomes the base
//!            └─ name starts with base, scoped           → first hit or none
//! ```
//!
//! Every search goes through [`Scope::scoped_domain`].

mod config;
mod error;
mod resolver;
mod scope;
mod suggest;

pub use config::{
    ResolverConfig, DEFAULT_EXCLUDE_REF, DEFAULT_WORKSPACE_ALIAS_REF, DEFAULT_WORKSPACE_REF,
    DEFAULT_YEAR_REF_PREFIX,
};
pub use error::{ResolveError, Result};
pub use resolver::{
    dossier_level_folders, find_existing_folder, resolve_in_scope, FolderResolver, MatchSource,
    Resolution,
};
pub use scope::Scope;
pub use suggest::{FolderSuggester, Suggestion};
