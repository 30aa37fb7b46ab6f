//! Fixed sub-folder layout built inside every dossier.

use crate::folders::get_or_create_folder;
use crate::{Result, StructureTemplate};
use dossier_naming::contains_normalized;
use dossier_store::{DocumentRequest, Folder, FolderId, FolderStore, FolderUpdate, RequestStore};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    pub folders_created: usize,
    pub folders_reused: usize,
    pub requests_created: usize,
    pub facets_added: usize,
}

/// Builds the fixed sub-folder layout of a dossier. Safe to run again on a
/// partially built dossier: existing folders and requests are reused.
pub struct DossierStructure<'a> {
    template: &'a StructureTemplate,
    owner: String,
    facets: Vec<String>,
}

impl<'a> DossierStructure<'a> {
    /// `facets` are the template tag names offered to matching folders.
    pub fn new(template: &'a StructureTemplate, owner: impl Into<String>, facets: Vec<String>) -> Self {
        Self {
            template,
            owner: owner.into(),
            facets,
        }
    }

    pub fn build<S>(&self, store: &mut S, dossier: &Folder) -> Result<StructureReport>
    where
        S: FolderStore + RequestStore + ?Sized,
    {
        let mut report = StructureReport::default();
        let template = self.template;

        self.tag(store, dossier.id, &template.children, &mut report);

        let mut sequence = template.first_sequence;
        for name in &template.children {
            let child = self.ensure(store, dossier.id, name, Some(sequence), &mut report)?;

            if !template.stateless.contains(name) {
                for (offset, state) in template.states.iter().enumerate() {
                    let seq = template.first_sequence + offset as i32;
                    self.ensure(store, child.id, state, Some(seq), &mut report)?;
                }
            }

            if template.notifications.contains(name) {
                for n in 1..=template.noi_count {
                    let seq = template.first_sequence + n as i32 - 1;
                    self.ensure(store, child.id, &format!("NOI-{n}"), Some(seq), &mut report)?;
                }
            }

            if template.contract.contains(name) {
                self.ensure(store, child.id, &template.addenda_folder, None, &mut report)?;
            }

            self.tag(store, child.id, std::slice::from_ref(name), &mut report);

            let request_name = format!("Solicitud para {} / {}", dossier.name, child.name);
            if store.find_request(&request_name, child.id)?.is_none() {
                store.create_request(DocumentRequest {
                    name: request_name,
                    folder: child.id,
                    owner: self.owner.clone(),
                })?;
                report.requests_created += 1;
            }

            sequence += 1;
        }

        log::info!(
            "Dossier '{}' structure: {} created, {} reused, {} requests",
            dossier.name,
            report.folders_created,
            report.folders_reused,
            report.requests_created
        );
        Ok(report)
    }

    fn ensure<S: FolderStore + ?Sized>(
        &self,
        store: &mut S,
        parent: FolderId,
        name: &str,
        sequence: Option<i32>,
        report: &mut StructureReport,
    ) -> Result<Folder> {
        let (folder, created) = get_or_create_folder(store, parent, name, sequence)?;
        if created {
            report.folders_created += 1;
        } else {
            report.folders_reused += 1;
        }
        Ok(folder)
    }

    /// Attach template facets whose names contain (or are contained in) one
    /// of `targets`. Failures are logged and never abort the build.
    fn tag<S: FolderStore + ?Sized>(
        &self,
        store: &mut S,
        folder: FolderId,
        targets: &[String],
        report: &mut StructureReport,
    ) {
        let matching: Vec<String> = self
            .facets
            .iter()
            .filter(|facet| targets.iter().any(|t| contains_normalized(facet, t)))
            .cloned()
            .collect();
        if matching.is_empty() {
            return;
        }

        let count = matching.len();
        let update = FolderUpdate {
            add_facets: matching,
            ..Default::default()
        };
        match store.update(folder, update) {
            Ok(_) => report.facets_added += count,
            Err(err) => log::warn!("Skipping facets for folder {folder}: {err}"),
        }
    }
}
