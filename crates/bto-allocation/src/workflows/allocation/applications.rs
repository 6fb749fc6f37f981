use chrono::NaiveDate;
use tracing::info;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, FlatType, ProjectId, UserId,
};
use super::eligibility;
use super::engine::{log_rejection, AllocationEngine, UnitReleasePolicy};
use super::error::WorkflowError;
use super::report::{ApplicationStatusView, BookingReceipt};

impl AllocationEngine {
    /// Submit a new application, returning its identifier.
    pub fn apply(
        &mut self,
        applicant: &UserId,
        project: ProjectId,
        flat_type: FlatType,
        today: NaiveDate,
    ) -> Result<ApplicationId, WorkflowError> {
        self.check_apply(applicant, project, flat_type, today)
            .inspect_err(|err| log_rejection("apply", err))?;

        let id = self.repository.next_application_id();
        self.repository.insert_application(Application::new(
            id,
            applicant.clone(),
            project,
            flat_type,
            today,
        ));

        info!(application = %id, %applicant, %project, flat_type = flat_type.label(), "application submitted");
        Ok(id)
    }

    fn check_apply(
        &self,
        applicant: &UserId,
        project: ProjectId,
        flat_type: FlatType,
        today: NaiveDate,
    ) -> Result<(), WorkflowError> {
        let user = self.require_capability(
            applicant,
            |user| user.capabilities().can_apply,
            "apply for a project",
        )?;

        if let Some(current) = self.repository.current_application(applicant) {
            return Err(WorkflowError::AlreadyApplied {
                applicant: applicant.clone(),
                status: current.status(),
            });
        }

        let target = self.repository.project(project)?;

        if self
            .repository
            .registration(applicant, project)
            .is_some_and(|registration| registration.status().is_live())
        {
            return Err(WorkflowError::ConflictsWithRegistration {
                officer: applicant.clone(),
                project,
            });
        }

        let current_project = self.repository.current_project_of(applicant);
        if !target.visible_to(current_project) || !target.is_open_on(today) {
            return Err(WorkflowError::ProjectClosed(project));
        }

        if !eligibility::is_eligible(user, target, flat_type) {
            return Err(WorkflowError::NotEligible {
                applicant: applicant.clone(),
                flat_type,
            });
        }

        Ok(())
    }

    /// Flag the applicant's current application for withdrawal; a manager still has to decide.
    pub fn request_withdrawal(&mut self, applicant: &UserId) -> Result<ApplicationId, WorkflowError> {
        let id = self
            .check_request_withdrawal(applicant)
            .inspect_err(|err| log_rejection("request_withdrawal", err))?;

        self.repository
            .application_mut(id)?
            .set_withdrawal_requested(true);

        info!(application = %id, %applicant, "withdrawal requested");
        Ok(id)
    }

    fn check_request_withdrawal(&self, applicant: &UserId) -> Result<ApplicationId, WorkflowError> {
        self.repository.user(applicant)?;
        let application = self
            .repository
            .current_application(applicant)
            .ok_or_else(|| WorkflowError::NoApplication(applicant.clone()))?;

        if application.withdrawal_requested() {
            return Err(WorkflowError::WithdrawalAlreadyRequested(application.id()));
        }
        Ok(application.id())
    }

    /// Approve a pending application, consuming one unit of its flat type.
    pub fn approve_application(
        &mut self,
        manager: &UserId,
        application: ApplicationId,
    ) -> Result<(), WorkflowError> {
        let (project, flat_type) = self
            .check_approve_application(manager, application)
            .inspect_err(|err| log_rejection("approve_application", err))?;

        let consumed = self.repository.project_mut(project)?.consume_unit(flat_type);
        debug_assert!(consumed, "inventory checked before commit");
        self.repository
            .application_mut(application)?
            .set_status(ApplicationStatus::Successful);

        info!(%application, %project, flat_type = flat_type.label(), "application approved");
        Ok(())
    }

    fn check_approve_application(
        &self,
        manager: &UserId,
        id: ApplicationId,
    ) -> Result<(ProjectId, FlatType), WorkflowError> {
        let application = self.repository.application(id)?;
        let project = self.owned_project(manager, application.project(), "approve applications")?;

        if application.status() != ApplicationStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                entity: "application",
                from: application.status().label(),
                action: "approve",
            });
        }

        let flat_type = application.flat_type();
        if project.remaining_units(flat_type) == 0 {
            return Err(WorkflowError::NoUnitsAvailable {
                project: project.id(),
                flat_type,
            });
        }

        Ok((project.id(), flat_type))
    }

    /// Mark a pending application unsuccessful. Inventory is untouched.
    pub fn reject_application(
        &mut self,
        manager: &UserId,
        application: ApplicationId,
    ) -> Result<(), WorkflowError> {
        self.check_reject_application(manager, application)
            .inspect_err(|err| log_rejection("reject_application", err))?;

        self.repository
            .application_mut(application)?
            .set_status(ApplicationStatus::Unsuccessful);

        info!(%application, "application rejected");
        Ok(())
    }

    fn check_reject_application(
        &self,
        manager: &UserId,
        id: ApplicationId,
    ) -> Result<(), WorkflowError> {
        let application = self.repository.application(id)?;
        self.owned_project(manager, application.project(), "reject applications")?;

        if application.status() != ApplicationStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                entity: "application",
                from: application.status().label(),
                action: "reject",
            });
        }
        Ok(())
    }

    /// Accept a withdrawal request, freeing the applicant to apply again.
    ///
    /// Returns `true` when a consumed unit went back into the inventory, which only happens
    /// under [`UnitReleasePolicy::Restock`].
    pub fn approve_withdrawal(
        &mut self,
        manager: &UserId,
        application: ApplicationId,
    ) -> Result<bool, WorkflowError> {
        self.check_withdrawal_decision(manager, application, "approve withdrawals")
            .inspect_err(|err| log_rejection("approve_withdrawal", err))?;

        let record = self.repository.application(application)?;
        let (project, flat_type, status) = (record.project(), record.flat_type(), record.status());

        let restocked = match self.policy {
            UnitReleasePolicy::Restock if status.holds_unit() => {
                self.repository.project_mut(project)?.restock_unit(flat_type)
            }
            _ => false,
        };

        self.repository.application_mut(application)?.clear();
        self.repository.detach_application(application);

        info!(%application, %project, previous = status.label(), restocked, "withdrawal approved");
        Ok(restocked)
    }

    /// Decline a withdrawal request; the application keeps its status.
    pub fn reject_withdrawal(
        &mut self,
        manager: &UserId,
        application: ApplicationId,
    ) -> Result<(), WorkflowError> {
        self.check_withdrawal_decision(manager, application, "reject withdrawals")
            .inspect_err(|err| log_rejection("reject_withdrawal", err))?;

        self.repository
            .application_mut(application)?
            .set_withdrawal_requested(false);

        info!(%application, "withdrawal rejected");
        Ok(())
    }

    fn check_withdrawal_decision(
        &self,
        manager: &UserId,
        id: ApplicationId,
        action: &'static str,
    ) -> Result<(), WorkflowError> {
        let application = self.repository.application(id)?;
        self.owned_project(manager, application.project(), action)?;

        if !application.withdrawal_requested() {
            return Err(WorkflowError::NoWithdrawalRequest(id));
        }
        Ok(())
    }

    /// Book the flat of a successful applicant on behalf of an officer assigned to the project.
    pub fn book_flat(
        &mut self,
        officer: &UserId,
        applicant: &UserId,
    ) -> Result<BookingReceipt, WorkflowError> {
        let application = self
            .check_book_flat(officer, applicant)
            .inspect_err(|err| log_rejection("book_flat", err))?;

        self.repository
            .application_mut(application)?
            .set_status(ApplicationStatus::Booked);

        let receipt = self.booking_receipt(application, officer)?;
        info!(%application, %officer, %applicant, project = %receipt.project_id, "flat booked");
        Ok(receipt)
    }

    fn check_book_flat(
        &self,
        officer: &UserId,
        applicant: &UserId,
    ) -> Result<ApplicationId, WorkflowError> {
        self.repository.user(officer)?;
        self.repository.user(applicant)?;
        let application = self
            .repository
            .current_application(applicant)
            .ok_or_else(|| WorkflowError::NoApplication(applicant.clone()))?;

        let project = self.repository.project(application.project())?;
        if !project.has_officer(officer) {
            return Err(WorkflowError::Unauthorized {
                actor: officer.clone(),
                action: "book flats for this project",
            });
        }

        if application.status() != ApplicationStatus::Successful {
            return Err(WorkflowError::NotSuccessful {
                application: application.id(),
                status: application.status(),
            });
        }
        Ok(application.id())
    }

    fn booking_receipt(
        &self,
        id: ApplicationId,
        officer: &UserId,
    ) -> Result<BookingReceipt, WorkflowError> {
        let application = self.repository.application(id)?;
        let applicant = self.repository.user(application.applicant())?;
        let project = self.repository.project(application.project())?;
        let flat_type = application.flat_type();

        Ok(BookingReceipt {
            application_id: id,
            applicant_id: applicant.id.clone(),
            applicant_name: applicant.name.clone(),
            age: applicant.age,
            marital_status: applicant.marital_status,
            flat_type,
            flat_type_label: flat_type.label(),
            price: project.price(flat_type).unwrap_or_default(),
            project_id: project.id(),
            project_name: project.name().to_string(),
            neighbourhood: project.neighbourhood().to_string(),
            booked_by: officer.clone(),
        })
    }

    /// The applicant's in-flight application, if any, as a read view.
    pub fn application_status(
        &self,
        applicant: &UserId,
    ) -> Result<Option<ApplicationStatusView>, WorkflowError> {
        self.repository.user(applicant)?;
        let Some(application) = self.repository.current_application(applicant) else {
            return Ok(None);
        };
        let project = self.repository.project(application.project())?;
        Ok(Some(ApplicationStatusView::new(application, project)))
    }

    /// Applications on the manager's projects that still await a decision.
    pub fn pending_applications(&self, manager: &UserId) -> Result<Vec<&Application>, WorkflowError> {
        Ok(self
            .manager_applications(manager)?
            .into_iter()
            .filter(|application| application.status() == ApplicationStatus::Pending)
            .collect())
    }

    pub fn withdrawal_requests(&self, manager: &UserId) -> Result<Vec<&Application>, WorkflowError> {
        Ok(self
            .manager_applications(manager)?
            .into_iter()
            .filter(|application| application.withdrawal_requested())
            .collect())
    }

    pub(crate) fn manager_applications(
        &self,
        manager: &UserId,
    ) -> Result<Vec<&Application>, WorkflowError> {
        self.require_capability(
            manager,
            |user| user.capabilities().can_manage_projects,
            "review applications",
        )?;

        let mut applications = Vec::new();
        for project in self
            .repository
            .projects()
            .filter(|project| project.is_managed_by(manager))
        {
            for id in project.applications() {
                applications.push(self.repository.application(*id)?);
            }
        }
        Ok(applications)
    }
}
