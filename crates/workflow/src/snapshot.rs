//! Single-file JSON snapshot of folders, contracts and owners.

use crate::{Contract, ContractBook, Result, StaticOwners};
use dossier_store::{MemoryStore, StoreSnapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk form: folder store fields plus contracts and owner roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DossierSnapshot {
    #[serde(flatten)]
    pub store: StoreSnapshot,

    #[serde(default)]
    pub contracts: Vec<Contract>,

    #[serde(default)]
    pub owners: StaticOwners,
}

/// Everything one dossier operation needs, loaded from a single snapshot.
#[derive(Debug, Clone, Default)]
pub struct DossierWorkspace {
    pub store: MemoryStore,
    pub book: ContractBook,
    pub owners: StaticOwners,
}

impl DossierWorkspace {
    pub fn from_snapshot(snapshot: DossierSnapshot) -> Result<Self> {
        Ok(Self {
            store: MemoryStore::from_snapshot(snapshot.store)?,
            book: ContractBook::from_contracts(snapshot.contracts),
            owners: snapshot.owners,
        })
    }

    pub fn to_snapshot(&self) -> DossierSnapshot {
        DossierSnapshot {
            store: self.store.to_snapshot(),
            contracts: self.book.contracts().to_vec(),
            owners: self.owners.clone(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        log::debug!("Loading dossier snapshot from {:?}", path.as_ref());
        let data = std::fs::read_to_string(path.as_ref())?;
        let snapshot: DossierSnapshot = serde_json::from_str(&data)?;
        Self::from_snapshot(snapshot)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.to_snapshot())?;
        std::fs::write(path.as_ref(), data)?;
        log::debug!("Saved dossier snapshot to {:?}", path.as_ref());
        Ok(())
    }
}
