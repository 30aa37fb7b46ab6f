use crate::{Result, WorkflowError};
use dossier_resolver::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sub-folders created inside every dossier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StructureTemplate {
    /// Direct children of the dossier folder, in display order
    pub children: Vec<String>,

    /// Per-state sub-folders added under every child not listed in `stateless`
    pub states: Vec<String>,

    pub stateless: Vec<String>,

    /// Children that receive `NOI-1..=NOI-<noi_count>`
    pub notifications: Vec<String>,

    pub noi_count: u32,

    /// Children that receive the addenda folder
    pub contract: Vec<String>,

    pub addenda_folder: String,

    /// Sequence of the first child; following children count up by one
    pub first_sequence: i32,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for StructureTemplate {
    fn default() -> Self {
        Self {
            children: strings(&[
                "0. Plantillas",
                "1. Lista de documentos",
                "2. MPR",
                "3. Schedule",
                "4. Lista de materiales",
                "5. Packing List",
                "6.a ITP",
                "6.b Notificaciones",
                "6.b Autorizaciones de Envío",
                "7.a Planos",
                "7.b Datasheets",
                "7.c Lista de Repuestos",
                "8. Quality Plan",
                "9. Procedimientos",
                "10.a Certificados",
                "10.b Marcado CE/UKCA",
                "10.c Conformidad",
                "11. Logística",
                "12. Dossier Final",
                "13. Contrato",
                "14. KOM",
                "15. Milestones",
            ]),
            states: strings(&["Proveedor", "Enviado", "Comentarios", "Rechazado", "Aprobado"]),
            stateless: strings(&[
                "0. Plantillas",
                "6.b Notificaciones",
                "6.b Autorizaciones de Envío",
                "11. Logística",
                "13. Contrato",
                "14. KOM",
                "15. Milestones",
            ]),
            notifications: strings(&["6.b Notificaciones"]),
            noi_count: 10,
            contract: strings(&["13. Contrato"]),
            addenda_folder: "Adendas".to_string(),
            first_sequence: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Role whose single member owns document requests
    pub owner_role: String,

    /// Symbolic identifier of the folder whose facets act as tag template
    pub facet_source_ref: Option<String>,

    /// Name of the workspace root, matched exactly (ignoring case) before the
    /// hints are tried
    pub root_name: String,

    /// Fragments a parentless folder name must contain to be taken as the
    /// workspace root during bootstrap
    pub root_name_hints: Vec<String>,

    /// Child of the workspace root bound as the excluded (archived) subtree
    pub exclude_name: Option<String>,

    pub structure: StructureTemplate,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            owner_role: "dossier_manager".to_string(),
            facet_source_ref: Some("dossier.folder_facet_template".to_string()),
            root_name: "Dossieres de calidad".to_string(),
            root_name_hints: strings(&["dossier", "calidad"]),
            exclude_name: Some("Archivado".to_string()),
            structure: StructureTemplate::default(),
        }
    }
}

/// Full configuration file: `[resolver]` and `[workflow]` tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DossierConfig {
    pub resolver: ResolverConfig,
    pub workflow: WorkflowConfig,
}

impl DossierConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: Self =
            toml::from_str(raw).map_err(|err| WorkflowError::InvalidConfig(err.to_string()))?;
        cfg.resolver.validate()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.workflow.owner_role.trim().is_empty() {
            return Err(WorkflowError::InvalidConfig(
                "workflow.owner_role must not be empty".to_string(),
            ));
        }
        if self.workflow.root_name.trim().is_empty()
            && self.workflow.root_name_hints.iter().all(|h| h.trim().is_empty())
        {
            return Err(WorkflowError::InvalidConfig(
                "workflow needs a root_name or at least one root_name_hints fragment".to_string(),
            ));
        }
        if self.workflow.structure.addenda_folder.trim().is_empty() {
            return Err(WorkflowError::InvalidConfig(
                "workflow.structure.addenda_folder must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
