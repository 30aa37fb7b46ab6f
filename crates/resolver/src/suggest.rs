//! Fuzzy ranking of dossier folders for link pickers.

use crate::{dossier_level_folders, Result, Scope};
use dossier_store::{Folder, FolderStore};
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub folder: Folder,

    /// Relative to the best hit (0..=1)
    pub score: f32,
}

/// Fuzzy ranking of dossier folders for "link existing dossier" pickers
pub struct FolderSuggester {
    matcher: Matcher,
}

impl FolderSuggester {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Rank `folders` by fuzzy match of their names against `query`.
    /// Returns at most `limit` entries, best first.
    pub fn rank(&mut self, query: &str, folders: Vec<Folder>, limit: usize) -> Vec<Suggestion> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }
        let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);

        let mut scored: Vec<(Folder, u32)> = folders
            .into_iter()
            .filter_map(|folder| {
                let haystack = Utf32String::from(folder.name.as_str());
                let score = pattern.score(haystack.slice(..), &mut self.matcher)?;
                Some((folder, score))
            })
            .collect();

        // Ties keep store order
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(limit);

        let max_score = scored.first().map(|(_, s)| *s as f32).unwrap_or(1.0);
        scored
            .into_iter()
            .map(|(folder, score)| Suggestion {
                folder,
                score: if max_score > 0.0 {
                    score as f32 / max_score
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Rank the dossier-level folders of `scope`.
    pub fn suggest<S: FolderStore + ?Sized>(
        &mut self,
        store: &S,
        scope: &Scope,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>> {
        let folders = dossier_level_folders(store, scope)?;
        Ok(self.rank(query, folders, limit))
    }
}

impl Default for FolderSuggester {
    fn default() -> Self {
        Self::new()
    }
}
