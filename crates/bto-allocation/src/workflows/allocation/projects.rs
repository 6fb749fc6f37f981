use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    validate_officer_slots, ApplicationStatus, ApplicationWindow, FlatType, Project,
    ProjectDraft, ProjectId, UserId,
};
use super::engine::{log_rejection, AllocationEngine};
use super::error::WorkflowError;

/// Partial edit of an existing project. Unit counts are not editable; inventory only moves
/// through application approvals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub neighbourhood: Option<String>,
    pub opening: Option<NaiveDate>,
    pub closing: Option<NaiveDate>,
    pub officer_slots: Option<u32>,
    #[serde(default)]
    pub prices: BTreeMap<FlatType, u32>,
}

impl AllocationEngine {
    pub fn create_project(
        &mut self,
        manager: &UserId,
        draft: ProjectDraft,
    ) -> Result<ProjectId, WorkflowError> {
        self.check_create_project(manager, &draft)
            .inspect_err(|err| log_rejection("create_project", err))?;

        let id = self.repository.next_project_id();
        let project = Project::from_draft(id, draft, manager.clone())?;
        info!(project = %id, name = project.name(), %manager, "project created");
        self.repository.insert_project(project);
        Ok(id)
    }

    fn check_create_project(
        &self,
        manager: &UserId,
        draft: &ProjectDraft,
    ) -> Result<(), WorkflowError> {
        self.require_capability(
            manager,
            |user| user.capabilities().can_manage_projects,
            "create projects",
        )?;
        let window = draft.validate()?;
        self.repository.ensure_unique_name(draft.name.trim(), None)?;
        self.repository.ensure_manager_window_free(manager, &window, None)
    }

    pub fn edit_project(
        &mut self,
        manager: &UserId,
        project: ProjectId,
        update: ProjectUpdate,
    ) -> Result<(), WorkflowError> {
        let window = self
            .check_edit_project(manager, project, &update)
            .inspect_err(|err| log_rejection("edit_project", err))?;

        let target = self.repository.project_mut(project)?;
        target.set_window(window);
        if let Some(name) = update.name {
            target.rename(name.trim().to_string());
        }
        if let Some(neighbourhood) = update.neighbourhood {
            target.set_neighbourhood(neighbourhood.trim().to_string());
        }
        if let Some(slots) = update.officer_slots {
            target.set_officer_slots(slots);
        }
        for (flat_type, price) in update.prices {
            target.set_price(flat_type, price);
        }

        info!(%project, %manager, "project updated");
        Ok(())
    }

    fn check_edit_project(
        &self,
        manager: &UserId,
        project: ProjectId,
        update: &ProjectUpdate,
    ) -> Result<ApplicationWindow, WorkflowError> {
        let target = self.owned_project(manager, project, "edit this project")?;

        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(WorkflowError::InvalidProject(
                    "project name must not be empty".to_string(),
                ));
            }
            self.repository.ensure_unique_name(name.trim(), Some(project))?;
        }
        if update
            .neighbourhood
            .as_ref()
            .is_some_and(|value| value.trim().is_empty())
        {
            return Err(WorkflowError::InvalidProject(
                "neighbourhood must not be empty".to_string(),
            ));
        }
        if let Some(slots) = update.officer_slots {
            validate_officer_slots(slots)?;
            let assigned = target.officers().len() as u32;
            if slots < assigned {
                return Err(WorkflowError::SlotsBelowAssigned {
                    requested: slots,
                    assigned,
                });
            }
        }
        if let Some(flat_type) = update
            .prices
            .keys()
            .find(|flat_type| target.flat(**flat_type).is_none())
        {
            return Err(WorkflowError::InvalidProject(format!(
                "{} flats are not offered in this project",
                flat_type.label()
            )));
        }

        let window = ApplicationWindow::new(
            update.opening.unwrap_or(target.window().opening()),
            update.closing.unwrap_or(target.window().closing()),
        )?;
        self.repository.ensure_manager_window_free(manager, &window, Some(project))?;
        for officer in target.officers() {
            self.repository
                .ensure_officer_window_free(officer, project, &window)?;
        }
        Ok(window)
    }

    /// Remove a project with no bookings. Remaining applications are detached and their
    /// applicants may apply elsewhere.
    pub fn delete_project(
        &mut self,
        manager: &UserId,
        project: ProjectId,
    ) -> Result<(), WorkflowError> {
        self.check_delete_project(manager, project)
            .inspect_err(|err| log_rejection("delete_project", err))?;

        let attached = self.repository.project(project)?.applications().to_vec();
        for application in attached {
            self.repository.application_mut(application)?.clear();
            self.repository.detach_application(application);
        }
        self.repository.remove_project(project);

        info!(%project, %manager, "project deleted");
        Ok(())
    }

    fn check_delete_project(&self, manager: &UserId, project: ProjectId) -> Result<(), WorkflowError> {
        let target = self.owned_project(manager, project, "delete this project")?;
        for id in target.applications() {
            if self.repository.application(*id)?.status() == ApplicationStatus::Booked {
                return Err(WorkflowError::ProjectHasBookings(project));
            }
        }
        Ok(())
    }

    pub fn set_visibility(
        &mut self,
        manager: &UserId,
        project: ProjectId,
        visible: bool,
    ) -> Result<(), WorkflowError> {
        self.owned_project(manager, project, "toggle project visibility")
            .inspect_err(|err| log_rejection("set_visibility", err))?;

        self.repository.project_mut(project)?.set_visible(visible);
        info!(%project, visible, "project visibility changed");
        Ok(())
    }

    pub fn managed_projects(&self, manager: &UserId) -> Result<Vec<&Project>, WorkflowError> {
        self.repository.user(manager)?;
        Ok(self
            .repository
            .projects()
            .filter(|project| project.is_managed_by(manager))
            .collect())
    }

    /// Projects an officer is currently approved to administer.
    pub fn assigned_projects(&self, officer: &UserId) -> Result<Vec<&Project>, WorkflowError> {
        self.repository.user(officer)?;
        Ok(self
            .repository
            .projects()
            .filter(|project| project.has_officer(officer))
            .collect())
    }
}
