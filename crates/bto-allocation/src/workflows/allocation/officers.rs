use tracing::info;

use super::domain::{OfficerRegistration, ProjectId, RegistrationStatus, UserId};
use super::engine::{log_rejection, AllocationEngine};
use super::error::WorkflowError;

impl AllocationEngine {
    /// Ask to administer a project. The registration starts out pending.
    pub fn register_officer(
        &mut self,
        officer: &UserId,
        project: ProjectId,
    ) -> Result<(), WorkflowError> {
        self.check_register_officer(officer, project)
            .inspect_err(|err| log_rejection("register_officer", err))?;

        self.repository
            .upsert_registration(officer.clone(), project, RegistrationStatus::Pending);

        info!(%officer, %project, "officer registration submitted");
        Ok(())
    }

    fn check_register_officer(
        &self,
        officer: &UserId,
        project: ProjectId,
    ) -> Result<(), WorkflowError> {
        self.require_capability(
            officer,
            |user| user.capabilities().can_register_as_officer,
            "register as a project officer",
        )?;
        let target = self.repository.project(project)?;

        for registration in self.repository.registrations_of(officer) {
            let same_project = registration.project() == project;
            match registration.status() {
                RegistrationStatus::Pending => {
                    return Err(WorkflowError::AlreadyRegistered {
                        officer: officer.clone(),
                        project: registration.project(),
                    });
                }
                RegistrationStatus::Approved if same_project => {
                    return Err(WorkflowError::AlreadyRegistered {
                        officer: officer.clone(),
                        project,
                    });
                }
                _ => {}
            }
        }

        if self.repository.current_project_of(officer) == Some(project) {
            return Err(WorkflowError::ConflictsWithApplication {
                officer: officer.clone(),
                project,
            });
        }

        self.repository
            .ensure_officer_window_free(officer, project, target.window())
    }

    /// Approve a pending registration, placing the officer on the project.
    pub fn approve_officer(
        &mut self,
        manager: &UserId,
        project: ProjectId,
        officer: &UserId,
    ) -> Result<(), WorkflowError> {
        self.check_approve_officer(manager, project, officer)
            .inspect_err(|err| log_rejection("approve_officer", err))?;

        let assigned = self.repository.project_mut(project)?.assign_officer(officer.clone());
        debug_assert!(assigned, "slot availability checked before commit");
        self.repository
            .registration_mut(officer, project)?
            .set_status(RegistrationStatus::Approved);

        info!(%officer, %project, "officer registration approved");
        Ok(())
    }

    fn check_approve_officer(
        &self,
        manager: &UserId,
        project: ProjectId,
        officer: &UserId,
    ) -> Result<(), WorkflowError> {
        let target = self.owned_project(manager, project, "approve officer registrations")?;
        let registration = self.pending_registration(officer, project, "approve")?;

        if target.available_officer_slots() == 0 {
            return Err(WorkflowError::NoSlots(registration.project()));
        }
        Ok(())
    }

    pub fn reject_officer(
        &mut self,
        manager: &UserId,
        project: ProjectId,
        officer: &UserId,
    ) -> Result<(), WorkflowError> {
        self.owned_project(manager, project, "reject officer registrations")
            .and_then(|_| self.pending_registration(officer, project, "reject"))
            .inspect_err(|err| log_rejection("reject_officer", err))?;

        self.repository
            .registration_mut(officer, project)?
            .set_status(RegistrationStatus::Rejected);

        info!(%officer, %project, "officer registration rejected");
        Ok(())
    }

    /// Remove an approved officer from a project, freeing the slot.
    pub fn release_officer(
        &mut self,
        manager: &UserId,
        project: ProjectId,
        officer: &UserId,
    ) -> Result<(), WorkflowError> {
        self.check_release_officer(manager, project, officer)
            .inspect_err(|err| log_rejection("release_officer", err))?;

        self.repository.project_mut(project)?.release_officer(officer);
        self.repository
            .registration_mut(officer, project)?
            .set_status(RegistrationStatus::None);

        info!(%officer, %project, "officer released from project");
        Ok(())
    }

    fn check_release_officer(
        &self,
        manager: &UserId,
        project: ProjectId,
        officer: &UserId,
    ) -> Result<(), WorkflowError> {
        let target = self.owned_project(manager, project, "release project officers")?;
        if !target.has_officer(officer) {
            return Err(WorkflowError::RegistrationNotFound {
                officer: officer.clone(),
                project,
            });
        }
        self.repository
            .registration(officer, project)
            .map(|_| ())
            .ok_or_else(|| WorkflowError::RegistrationNotFound {
                officer: officer.clone(),
                project,
            })
    }

    fn pending_registration(
        &self,
        officer: &UserId,
        project: ProjectId,
        action: &'static str,
    ) -> Result<&OfficerRegistration, WorkflowError> {
        let registration = self
            .repository
            .registration(officer, project)
            .ok_or_else(|| WorkflowError::RegistrationNotFound {
                officer: officer.clone(),
                project,
            })?;

        if registration.status() != RegistrationStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                entity: "officer registration",
                from: registration.status().label(),
                action,
            });
        }
        Ok(registration)
    }

    pub fn officer_registrations(
        &self,
        officer: &UserId,
    ) -> Result<Vec<&OfficerRegistration>, WorkflowError> {
        self.repository.user(officer)?;
        Ok(self.repository.registrations_of(officer).collect())
    }

    /// Pending registrations across the manager's projects.
    pub fn pending_registrations(
        &self,
        manager: &UserId,
    ) -> Result<Vec<&OfficerRegistration>, WorkflowError> {
        self.require_capability(
            manager,
            |user| user.capabilities().can_manage_projects,
            "review officer registrations",
        )?;

        Ok(self
            .repository
            .projects()
            .filter(|project| project.is_managed_by(manager))
            .flat_map(|project| self.repository.registrations_for(project.id()))
            .filter(|registration| registration.status() == RegistrationStatus::Pending)
            .collect())
    }
}
