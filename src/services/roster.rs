//! Project roster state for membership administration.
//!
//! The roster is the local copy of a project's metadata and member list.
//! It is only ever changed by applying a [`RosterChange`] built from an
//! authoritative server response, and every change is keyed by the entity
//! it addresses, so responses may be applied in any order.
//!
//! Primary-lead status is never stored per member: it is derived from the
//! project's `primary_lead_agent_id`, so at most one member can be the lead.

use crate::error::AppError;
use crate::models::{Member, Project};
use serde::Serialize;

/// Role labels offered as shortcuts. Roles stay free text.
pub const SUGGESTED_ROLES: [&str; 7] = [
    "Lead",
    "Developer",
    "Reviewer",
    "Security",
    "DevOps",
    "Tester",
    "Observer",
];

/// A confirmed server-side change to apply locally.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterChange {
    MemberUpdated(Member),
    ProjectUpdated(Project),
    MemberRemoved { agent_id: String },
}

/// A member as displayed in the admin table.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRow<'a> {
    pub member: &'a Member,
    pub is_primary_lead: bool,
    /// The removal affordance is disabled for the primary lead.
    pub can_remove: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Roster {
    project_id: String,
    project: Option<Project>,
    members: Vec<Member>,
}

impl Roster {
    pub fn new(project_id: impl Into<String>, project: Option<Project>, members: Vec<Member>) -> Self {
        Self {
            project_id: project_id.into(),
            project,
            members,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, agent_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.agent_id == agent_id)
    }

    pub fn is_primary_lead(&self, agent_id: &str) -> bool {
        self.project
            .as_ref()
            .is_some_and(|p| p.is_primary_lead(agent_id))
    }

    /// The current primary lead, if it is a loaded member.
    pub fn primary_lead(&self) -> Option<&Member> {
        let lead = self.project.as_ref()?.primary_lead_agent_id.as_deref()?;
        self.member(lead)
    }

    pub fn rows(&self) -> Vec<MemberRow<'_>> {
        self.members
            .iter()
            .map(|member| {
                let is_primary_lead = self.is_primary_lead(&member.agent_id);
                MemberRow {
                    member,
                    is_primary_lead,
                    can_remove: !is_primary_lead,
                }
            })
            .collect()
    }

    /// Local checks before a removal request.
    pub fn check_removable(&self, agent_id: &str) -> Result<(), AppError> {
        if self.member(agent_id).is_none() {
            return Err(AppError::not_found_with_id("Member", agent_id));
        }
        if self.is_primary_lead(agent_id) {
            return Err(AppError::invalid_input_field(
                "The primary lead cannot be removed. Assign another lead first.",
                "agent_id",
            ));
        }
        Ok(())
    }

    /// Local checks before a primary-lead assignment.
    pub fn check_lead_candidate(&self, agent_id: &str) -> Result<(), AppError> {
        if self.member(agent_id).is_none() {
            return Err(AppError::invalid_input_field(
                "The primary lead must be a member of the project",
                "agent_id",
            ));
        }
        Ok(())
    }

    /// Apply a confirmed change. Returns whether local state changed.
    ///
    /// Changes addressing a member or project this roster does not hold are
    /// ignored.
    pub fn apply(&mut self, change: RosterChange) -> bool {
        match change {
            RosterChange::MemberUpdated(updated) => {
                match self.members.iter_mut().find(|m| m.agent_id == updated.agent_id) {
                    Some(slot) => {
                        *slot = updated;
                        true
                    }
                    None => false,
                }
            }
            RosterChange::ProjectUpdated(project) => {
                if project.id != self.project_id {
                    return false;
                }
                self.project = Some(project);
                true
            }
            RosterChange::MemberRemoved { agent_id } => {
                let before = self.members.len();
                self.members.retain(|m| m.agent_id != agent_id);
                self.members.len() != before
            }
        }
    }
}
