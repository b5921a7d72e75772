//! Membership administration for one project.
//!
//! Each mutation is sent first and the roster is only updated from the
//! server's answer. The free functions return a [`RosterChange`] so several
//! requests can be awaited together and applied in any order;
//! [`MembershipAdmin`] wraps them with the view's edit buffer, the lead
//! assignment lock and the view scope.

use crate::error::AppError;
use crate::models::ProjectUpdate;
use crate::services::credentials::{require_api_key, AgentSession};
use crate::services::forum_api::ForumApi;
use crate::services::roster::{Roster, RosterChange, SUGGESTED_ROLES};
use crate::services::view_scope::ViewScope;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Change a member's role.
///
/// # Arguments
/// * `roster` - Current roster, used to validate the target
/// * `agent_id` - Member to update
/// * `role` - Free-text role label
pub async fn update_role<A: ForumApi>(
    api: &A,
    session: Option<&AgentSession>,
    roster: &Roster,
    agent_id: &str,
    role: &str,
) -> Result<RosterChange, AppError> {
    if roster.member(agent_id).is_none() {
        return Err(AppError::not_found_with_id("Member", agent_id));
    }
    let api_key = require_api_key(session)?;

    let member = api
        .update_member_role(api_key, roster.project_id(), agent_id, role)
        .await?;

    Ok(RosterChange::MemberUpdated(member))
}

/// Make a member the project's primary lead, replacing the previous one.
pub async fn assign_primary_lead<A: ForumApi>(
    api: &A,
    session: Option<&AgentSession>,
    roster: &Roster,
    agent_id: &str,
) -> Result<RosterChange, AppError> {
    roster.check_lead_candidate(agent_id)?;
    let api_key = require_api_key(session)?;

    let update = ProjectUpdate {
        primary_lead_agent_id: Some(agent_id.to_string()),
    };
    let project = api
        .update_project(api_key, roster.project_id(), &update)
        .await?;

    Ok(RosterChange::ProjectUpdated(project))
}

/// Remove a member from the project. The primary lead cannot be removed.
pub async fn remove_member<A: ForumApi>(
    api: &A,
    session: Option<&AgentSession>,
    roster: &Roster,
    agent_id: &str,
) -> Result<RosterChange, AppError> {
    roster.check_removable(agent_id)?;
    let api_key = require_api_key(session)?;

    api.remove_member(api_key, roster.project_id(), agent_id)
        .await?;

    Ok(RosterChange::MemberRemoved {
        agent_id: agent_id.to_string(),
    })
}

/// The role edit currently open in the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleEdit {
    pub agent_id: String,
    pub role: String,
}

#[derive(Debug, Default)]
struct AdminState {
    roster: Roster,
    editing: Option<RoleEdit>,
    /// Target of the pending primary lead assignment.
    lead_in_flight: Option<String>,
    /// Members whose removal is pending.
    removals_in_flight: Vec<String>,
}

/// Clears the lead lock when the assignment finishes or is dropped.
struct LeadLock<'s> {
    state: &'s Mutex<AdminState>,
}

impl Drop for LeadLock<'_> {
    fn drop(&mut self) {
        lock(self.state).lead_in_flight = None;
    }
}

/// Marks a member as being removed until the request finishes or is dropped.
struct RemovalLock<'s> {
    state: &'s Mutex<AdminState>,
    agent_id: String,
}

impl Drop for RemovalLock<'_> {
    fn drop(&mut self) {
        lock(self.state)
            .removals_in_flight
            .retain(|id| *id != self.agent_id);
    }
}

fn lock(state: &Mutex<AdminState>) -> MutexGuard<'_, AdminState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Membership admin view state for one project.
pub struct MembershipAdmin<'a, A> {
    api: &'a A,
    scope: ViewScope,
    state: Mutex<AdminState>,
}

impl<'a, A: ForumApi> MembershipAdmin<'a, A> {
    /// Load project metadata and members together.
    ///
    /// Either read may fail; the view then shows what it has (no project,
    /// or an empty member list).
    pub async fn load(api: &'a A, project_id: &str, scope: ViewScope) -> Self {
        let (project, members) =
            futures::join!(api.get_project(project_id), api.list_members(project_id));

        let project = project
            .map_err(|e| log::warn!("Failed to load project {}: {}", project_id, e))
            .ok();
        let members = members.unwrap_or_else(|e| {
            log::warn!("Failed to load members of {}: {}", project_id, e);
            Vec::new()
        });

        Self {
            api,
            scope,
            state: Mutex::new(AdminState {
                roster: Roster::new(project_id, project, members),
                ..AdminState::default()
            }),
        }
    }

    pub fn suggested_roles() -> &'static [&'static str] {
        &SUGGESTED_ROLES
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Snapshot of the roster.
    pub fn roster(&self) -> Roster {
        lock(&self.state).roster.clone()
    }

    /// Read the roster without cloning it.
    pub fn with_roster<R>(&self, read: impl FnOnce(&Roster) -> R) -> R {
        read(&lock(&self.state).roster)
    }

    pub fn editing(&self) -> Option<RoleEdit> {
        lock(&self.state).editing.clone()
    }

    pub fn lead_assignment_in_flight(&self) -> bool {
        lock(&self.state).lead_in_flight.is_some()
    }

    pub fn removal_in_flight(&self, agent_id: &str) -> bool {
        lock(&self.state).removals_in_flight.iter().any(|id| id == agent_id)
    }

    /// Open the role editor for a member, discarding any other open edit.
    pub fn begin_role_edit(&self, agent_id: &str) -> Result<(), AppError> {
        let mut state = lock(&self.state);
        let role = state
            .roster
            .member(agent_id)
            .map(|m| m.role.clone())
            .ok_or_else(|| AppError::not_found_with_id("Member", agent_id))?;

        state.editing = Some(RoleEdit {
            agent_id: agent_id.to_string(),
            role,
        });
        Ok(())
    }

    /// Update the open edit buffer. Does nothing when no edit is open.
    pub fn set_edit_role(&self, role: &str) {
        if let Some(edit) = lock(&self.state).editing.as_mut() {
            edit.role = role.to_string();
        }
    }

    pub fn cancel_role_edit(&self) {
        lock(&self.state).editing = None;
    }

    /// Send the open role edit.
    ///
    /// On success the member is updated from the response and the editor
    /// closes. On failure the editor stays open with the typed role.
    pub async fn save_role(&self, session: Option<&AgentSession>) -> Result<(), AppError> {
        let (edit, roster) = {
            let state = lock(&self.state);
            let edit = state
                .editing
                .clone()
                .ok_or_else(|| AppError::invalid_input("No role edit is open"))?;
            (edit, state.roster.clone())
        };

        match update_role(self.api, session, &roster, &edit.agent_id, &edit.role).await {
            Ok(change) => {
                log::info!("Updated role of {} to {:?}", edit.agent_id, edit.role);
                self.commit("role update", change, |state| {
                    if state.editing.as_ref() == Some(&edit) {
                        state.editing = None;
                    }
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("Role update for {} rejected: {}", edit.agent_id, e);
                Err(e)
            }
        }
    }

    /// Assign the primary lead.
    ///
    /// Refused while another assignment is pending, or while the candidate's
    /// removal is pending.
    pub async fn assign_primary_lead(
        &self,
        session: Option<&AgentSession>,
        agent_id: &str,
    ) -> Result<(), AppError> {
        let (roster, _lead_lock) = {
            let mut state = lock(&self.state);
            if state.lead_in_flight.is_some() {
                return Err(AppError::invalid_input(
                    "A primary lead change is already in progress",
                ));
            }
            if state.removals_in_flight.iter().any(|id| id == agent_id) {
                return Err(AppError::invalid_input_field(
                    "This member is being removed",
                    "agent_id",
                ));
            }
            state.roster.check_lead_candidate(agent_id)?;
            state.lead_in_flight = Some(agent_id.to_string());
            (
                state.roster.clone(),
                LeadLock { state: &self.state },
            )
        };

        match assign_primary_lead(self.api, session, &roster, agent_id).await {
            Ok(change) => {
                log::info!("Assigned {} as primary lead of {}", agent_id, roster.project_id());
                self.commit("lead assignment", change, |_| {});
                Ok(())
            }
            Err(e) => {
                log::warn!("Primary lead assignment to {} rejected: {}", agent_id, e);
                Err(e)
            }
        }
    }

    /// Remove a member. Refused for the primary lead, including a member
    /// whose lead assignment is pending.
    pub async fn remove_member(
        &self,
        session: Option<&AgentSession>,
        agent_id: &str,
    ) -> Result<(), AppError> {
        let (roster, _removal_lock) = {
            let mut state = lock(&self.state);
            if state.lead_in_flight.as_deref() == Some(agent_id) {
                return Err(AppError::invalid_input_field(
                    "This member is becoming the primary lead",
                    "agent_id",
                ));
            }
            state.roster.check_removable(agent_id)?;
            state.removals_in_flight.push(agent_id.to_string());
            (
                state.roster.clone(),
                RemovalLock {
                    state: &self.state,
                    agent_id: agent_id.to_string(),
                },
            )
        };

        match remove_member(self.api, session, &roster, agent_id).await {
            Ok(change) => {
                log::info!("Removed {} from {}", agent_id, roster.project_id());
                self.commit("member removal", change, |state| {
                    if state.editing.as_ref().is_some_and(|e| e.agent_id == agent_id) {
                        state.editing = None;
                    }
                });
                Ok(())
            }
            Err(e) => {
                log::warn!("Removal of {} rejected: {}", agent_id, e);
                Err(e)
            }
        }
    }

    fn commit(&self, what: &str, change: RosterChange, after: impl FnOnce(&mut AdminState)) {
        self.scope.apply(what, || {
            let mut state = lock(&self.state);
            state.roster.apply(change);
            after(&mut state);
        });
    }
}
