use crate::{Result, WorkflowError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Users eligible for a role (security group membership in the host).
pub trait OwnerDirectory {
    fn eligible(&self, role: &str) -> Vec<String>;
}

/// Role -> members table loaded from the snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticOwners(pub BTreeMap<String, Vec<String>>);

impl StaticOwners {
    pub fn with_role(mut self, role: &str, members: &[&str]) -> Self {
        self.0.insert(
            role.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }
}

impl OwnerDirectory for StaticOwners {
    fn eligible(&self, role: &str) -> Vec<String> {
        self.0.get(role).cloned().unwrap_or_default()
    }
}

/// The single member of `role`; zero or several is a configuration error.
pub fn require_single_owner<D: OwnerDirectory + ?Sized>(directory: &D, role: &str) -> Result<String> {
    let mut names = directory.eligible(role);
    names.sort();
    names.dedup();
    if names.len() == 1 {
        return Ok(names.remove(0));
    }
    Err(WorkflowError::AmbiguousOwner {
        role: role.to_string(),
        count: names.len(),
        names,
    })
}
