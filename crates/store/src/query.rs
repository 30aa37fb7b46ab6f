//! Folder search predicate.

use crate::{Folder, FolderId};

/// Name predicate of a folder query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    /// Exact, case-sensitive equality
    Exact(String),

    /// Case-insensitive prefix
    StartsWith(String),

    /// Case-insensitive substring
    ContainsIgnoreCase(String),
}

impl NameMatch {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Exact(value) => name == value,
            NameMatch::StartsWith(prefix) => name.to_lowercase().starts_with(&prefix.to_lowercase()),
            NameMatch::ContainsIgnoreCase(needle) => {
                name.to_lowercase().contains(&needle.to_lowercase())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// Folders without a parent
    Root,

    /// Direct children of the folder
    Is(FolderId),
}

/// Conjunction of predicates over the folder tree.
///
/// Results are ordered by `(sequence, name, id)` so that "first match" is
/// stable across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderQuery {
    /// Descendant-or-self of this folder
    pub within: Option<FolderId>,

    /// Not descendant-or-self of this folder
    pub not_within: Option<FolderId>,

    pub parent: Option<ParentFilter>,

    pub name: Option<NameMatch>,

    pub limit: Option<usize>,
}

impl FolderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn within(mut self, ancestor: FolderId) -> Self {
        self.within = Some(ancestor);
        self
    }

    pub fn not_within(mut self, ancestor: FolderId) -> Self {
        self.not_within = Some(ancestor);
        self
    }

    pub fn roots(mut self) -> Self {
        self.parent = Some(ParentFilter::Root);
        self
    }

    pub fn child_of(mut self, parent: FolderId) -> Self {
        self.parent = Some(ParentFilter::Is(parent));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(NameMatch::Exact(name.into()));
        self
    }

    pub fn name_starts_with(mut self, prefix: impl Into<String>) -> Self {
        self.name = Some(NameMatch::StartsWith(prefix.into()));
        self
    }

    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name = Some(NameMatch::ContainsIgnoreCase(needle.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks the predicates that only need the folder record itself.
    /// Ancestry (`within` / `not_within`) is left to the store.
    pub fn matches_record(&self, folder: &Folder) -> bool {
        let parent_ok = match self.parent {
            None => true,
            Some(ParentFilter::Root) => folder.parent.is_none(),
            Some(ParentFilter::Is(parent)) => folder.parent == Some(parent),
        };
        parent_ok
            && self
                .name
                .as_ref()
                .map_or(true, |name| name.matches(&folder.name))
    }
}

pub(crate) fn sort_key(folder: &Folder) -> (i32, &str, FolderId) {
    (folder.sequence, folder.name.as_str(), folder.id)
}
