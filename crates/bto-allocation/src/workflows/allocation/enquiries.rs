use tracing::{debug, info};

use super::domain::{Enquiry, EnquiryId, ProjectId, UserId};
use super::engine::{log_rejection, AllocationEngine};
use super::error::WorkflowError;

impl AllocationEngine {
    pub fn submit_enquiry(
        &mut self,
        applicant: &UserId,
        project: ProjectId,
        message: &str,
    ) -> Result<EnquiryId, WorkflowError> {
        let message = self
            .check_submit_enquiry(applicant, project, message)
            .inspect_err(|err| log_rejection("submit_enquiry", err))?;

        let id = self
            .repository
            .project_mut(project)?
            .push_enquiry(applicant.clone(), message);

        info!(enquiry = %id, %applicant, %project, "enquiry submitted");
        Ok(id)
    }

    fn check_submit_enquiry(
        &self,
        applicant: &UserId,
        project: ProjectId,
        message: &str,
    ) -> Result<String, WorkflowError> {
        self.require_capability(
            applicant,
            |user| user.capabilities().can_apply,
            "submit enquiries",
        )?;
        self.repository.project(project)?;
        non_empty(message)
    }

    /// Rewrite an unanswered enquiry. Only its author may edit it.
    pub fn edit_enquiry(
        &mut self,
        applicant: &UserId,
        project: ProjectId,
        enquiry: EnquiryId,
        message: &str,
    ) -> Result<(), WorkflowError> {
        let message = self
            .authored_open_enquiry(applicant, project, enquiry, "edit this enquiry")
            .and_then(|_| non_empty(message))
            .inspect_err(|err| log_rejection("edit_enquiry", err))?;

        self.repository
            .project_mut(project)?
            .enquiry_mut(enquiry)
            .ok_or(WorkflowError::EnquiryNotFound { project, enquiry })?
            .set_message(message);

        info!(%enquiry, %project, "enquiry edited");
        Ok(())
    }

    pub fn delete_enquiry(
        &mut self,
        applicant: &UserId,
        project: ProjectId,
        enquiry: EnquiryId,
    ) -> Result<(), WorkflowError> {
        self.authored_open_enquiry(applicant, project, enquiry, "delete this enquiry")
            .inspect_err(|err| log_rejection("delete_enquiry", err))?;

        self.repository.project_mut(project)?.remove_enquiry(enquiry);

        info!(%enquiry, %project, "enquiry deleted");
        Ok(())
    }

    fn authored_open_enquiry(
        &self,
        applicant: &UserId,
        project: ProjectId,
        id: EnquiryId,
        action: &'static str,
    ) -> Result<&Enquiry, WorkflowError> {
        self.repository.user(applicant)?;
        let enquiry = self
            .repository
            .project(project)?
            .enquiry(id)
            .ok_or(WorkflowError::EnquiryNotFound {
                project,
                enquiry: id,
            })?;

        if enquiry.applicant() != applicant {
            return Err(WorkflowError::Unauthorized {
                actor: applicant.clone(),
                action,
            });
        }
        if enquiry.is_replied() {
            return Err(WorkflowError::AlreadyReplied(id));
        }
        Ok(enquiry)
    }

    /// Answer an enquiry as the project's manager or one of its officers. Replying again
    /// overwrites the previous answer.
    pub fn reply_to_enquiry(
        &mut self,
        actor: &UserId,
        project: ProjectId,
        enquiry: EnquiryId,
        message: &str,
    ) -> Result<(), WorkflowError> {
        let reply = self
            .check_reply(actor, project, enquiry, message)
            .inspect_err(|err| log_rejection("reply_to_enquiry", err))?;

        self.repository
            .project_mut(project)?
            .enquiry_mut(enquiry)
            .ok_or(WorkflowError::EnquiryNotFound { project, enquiry })?
            .set_reply(reply);

        info!(%enquiry, %project, %actor, "enquiry answered");
        Ok(())
    }

    fn check_reply(
        &self,
        actor: &UserId,
        project: ProjectId,
        enquiry: EnquiryId,
        message: &str,
    ) -> Result<String, WorkflowError> {
        self.repository.user(actor)?;
        let target = self.repository.project(project)?;
        if !target.is_administered_by(actor) {
            return Err(WorkflowError::Unauthorized {
                actor: actor.clone(),
                action: "reply to enquiries for this project",
            });
        }
        if target.enquiry(enquiry).is_none() {
            return Err(WorkflowError::EnquiryNotFound { project, enquiry });
        }
        non_empty(message)
    }

    pub fn project_enquiries(&self, project: ProjectId) -> Result<&[Enquiry], WorkflowError> {
        Ok(self.repository.project(project)?.enquiries())
    }

    /// Every enquiry the applicant has raised, across all projects.
    pub fn enquiries_by(&self, applicant: &UserId) -> Result<Vec<&Enquiry>, WorkflowError> {
        self.repository.user(applicant)?;
        let enquiries: Vec<&Enquiry> = self
            .repository
            .projects()
            .flat_map(|project| project.enquiries())
            .filter(|enquiry| enquiry.applicant() == applicant)
            .collect();
        debug!(%applicant, count = enquiries.len(), "listed applicant enquiries");
        Ok(enquiries)
    }
}

fn non_empty(message: &str) -> Result<String, WorkflowError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::EmptyMessage);
    }
    Ok(trimmed.to_string())
}
