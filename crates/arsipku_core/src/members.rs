//! crates/arsipku_core/src/members.rs
//!
//! Member list editing for the create/update organization forms.

use crate::domain::OrganizationUpdate;
use serde::{Deserialize, Serialize};

/// Tracks the member emails of an organization while the user edits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEditor {
    initial: Vec<String>,
    members: Vec<String>,
}

impl MemberEditor {
    /// Starts editing an existing member list.
    pub fn with_members(initial: Vec<String>) -> Self {
        Self {
            members: initial.clone(),
            initial,
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Adds a trimmed email. Blank input and exact duplicates are ignored.
    pub fn add(&mut self, input: &str) -> bool {
        let email = input.trim();
        if email.is_empty() || self.members.iter().any(|m| m == email) {
            return false;
        }
        self.members.push(email.to_string());
        true
    }

    pub fn remove(&mut self, email: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != email);
        self.members.len() != before
    }

    /// Members added since editing began.
    pub fn added(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|m| !self.initial.contains(m))
            .cloned()
            .collect()
    }

    /// Members removed since editing began.
    pub fn removed(&self) -> Vec<String> {
        self.initial
            .iter()
            .filter(|m| !self.members.contains(m))
            .cloned()
            .collect()
    }

    pub fn to_update(&self, organization_name: &str) -> OrganizationUpdate {
        OrganizationUpdate {
            organization_name: organization_name.trim().to_string(),
            add_member: self.added(),
            remove_member: self.removed(),
        }
    }
}
