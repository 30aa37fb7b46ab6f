//! Contracts and the dossier folder each one owns.

use crate::{Result, WorkflowError};
use dossier_store::FolderId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub u64);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DossierState {
    Suministro,
    #[default]
    EnProceso,
    Enviado,
    Aprobado,
}

impl DossierState {
    pub const ALL: [DossierState; 4] = [
        DossierState::Suministro,
        DossierState::EnProceso,
        DossierState::Enviado,
        DossierState::Aprobado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DossierState::Suministro => "suministro",
            DossierState::EnProceso => "en_proceso",
            DossierState::Enviado => "enviado",
            DossierState::Aprobado => "aprobado",
        }
    }
}

impl fmt::Display for DossierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DossierState {
    type Err = WorkflowError;

    fn from_str(raw: &str) -> Result<Self> {
        let wanted = raw.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == wanted)
            .ok_or_else(|| WorkflowError::UnknownState(raw.to_string()))
    }
}

/// Sales contract (quotation). Principal contracts have no parent; addenda
/// point at the contract they amend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,

    pub name: String,

    #[serde(default)]
    pub parent: Option<ContractId>,

    /// Dossier folder owned by this contract
    #[serde(default)]
    pub dossier_folder: Option<FolderId>,

    #[serde(default)]
    pub dossier_state: DossierState,

    /// Chatter-style log of workflow notes
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Contract {
    pub fn is_addendum(&self) -> bool {
        self.parent.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractBook {
    contracts: Vec<Contract>,
}

impl ContractBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_contracts(contracts: Vec<Contract>) -> Self {
        Self { contracts }
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn get(&self, id: ContractId) -> Result<&Contract> {
        self.contracts
            .iter()
            .find(|c| c.id == id)
            .ok_or(WorkflowError::ContractNotFound(id))
    }

    fn get_mut(&mut self, id: ContractId) -> Result<&mut Contract> {
        self.contracts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(WorkflowError::ContractNotFound(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Contract> {
        let name = name.trim();
        self.contracts.iter().find(|c| c.name == name)
    }

    pub fn insert(&mut self, name: impl Into<String>, parent: Option<ContractId>) -> Result<ContractId> {
        if let Some(parent) = parent {
            self.get(parent)?;
        }
        let id = ContractId(self.contracts.iter().map(|c| c.id.0).max().unwrap_or(0) + 1);
        self.contracts.push(Contract {
            id,
            name: name.into(),
            parent,
            dossier_folder: None,
            dossier_state: DossierState::default(),
            notes: Vec::new(),
        });
        Ok(id)
    }

    /// Top of the parent chain. A looping chain stops at the last contract
    /// before the loop closes.
    pub fn root_of(&self, id: ContractId) -> Result<&Contract> {
        let mut current = self.get(id)?;
        let mut seen = HashSet::new();
        while let Some(parent) = current.parent {
            if !seen.insert(current.id) {
                log::warn!("Contract parent chain loops at {}", current.id);
                break;
            }
            current = self.get(parent)?;
        }
        Ok(current)
    }

    /// Own folder when set, otherwise the principal's.
    pub fn effective_folder(&self, id: ContractId) -> Result<Option<FolderId>> {
        let contract = self.get(id)?;
        if contract.dossier_folder.is_some() {
            return Ok(contract.dossier_folder);
        }
        Ok(self.root_of(id)?.dossier_folder)
    }

    pub fn has_dossier(&self, id: ContractId) -> Result<bool> {
        Ok(self.effective_folder(id)?.is_some())
    }

    /// Name shown as "assigned dossier": the contract itself when it owns a
    /// folder, the principal otherwise.
    pub fn assigned_label(&self, id: ContractId) -> Result<String> {
        let contract = self.get(id)?;
        if contract.dossier_folder.is_some() {
            return Ok(contract.name.clone());
        }
        Ok(self.root_of(id)?.name.clone())
    }

    /// A contract other than `except` that already owns `folder`.
    pub fn linked_elsewhere(&self, folder: FolderId, except: ContractId) -> Option<&Contract> {
        self.contracts
            .iter()
            .find(|c| c.id != except && c.dossier_folder == Some(folder))
    }

    pub fn set_folder(&mut self, id: ContractId, folder: FolderId) -> Result<()> {
        self.get_mut(id)?.dossier_folder = Some(folder);
        Ok(())
    }

    pub fn set_state(&mut self, id: ContractId, state: DossierState) -> Result<()> {
        self.get_mut(id)?.dossier_state = state;
        Ok(())
    }

    pub fn post_note(&mut self, id: ContractId, note: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.notes.push(note.into());
        Ok(())
    }
}
