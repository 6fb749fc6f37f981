use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{FlatType, ParseValueError, Project, ProjectId, User, UserId};
use super::eligibility;
use super::error::WorkflowError;
use super::repository::HousingRepository;

/// What happens to a unit consumed by an approved application when the applicant withdraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitReleasePolicy {
    /// The unit stays consumed.
    #[default]
    Retain,
    /// The unit goes back into the project inventory.
    Restock,
}

impl UnitReleasePolicy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Restock => "restock",
        }
    }
}

impl fmt::Display for UnitReleasePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitReleasePolicy {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "retain" | "keep" => Ok(Self::Retain),
            "restock" | "release" => Ok(Self::Restock),
            _ => Err(ParseValueError {
                field: "unit release policy",
                value: raw.to_string(),
            }),
        }
    }
}

/// Entry point for every allocation workflow.
///
/// Operations take `&mut self`, so one call always completes before the next begins. Hosts
/// that share the engine across threads wrap it in a single `Mutex`.
#[derive(Debug, Default)]
pub struct AllocationEngine {
    pub(crate) repository: HousingRepository,
    pub(crate) policy: UnitReleasePolicy,
}

impl AllocationEngine {
    pub fn new(repository: HousingRepository) -> Self {
        Self::with_policy(repository, UnitReleasePolicy::default())
    }

    pub fn with_policy(repository: HousingRepository, policy: UnitReleasePolicy) -> Self {
        Self { repository, policy }
    }

    pub fn repository(&self) -> &HousingRepository {
        &self.repository
    }

    pub fn policy(&self) -> UnitReleasePolicy {
        self.policy
    }

    pub fn into_repository(self) -> HousingRepository {
        self.repository
    }

    /// Eligibility of a stored applicant for one flat type of a stored project.
    pub fn is_eligible(
        &self,
        applicant: &UserId,
        project: ProjectId,
        flat_type: FlatType,
    ) -> Result<bool, WorkflowError> {
        let user = self.repository.user(applicant)?;
        let project = self.repository.project(project)?;
        Ok(eligibility::is_eligible(user, project, flat_type))
    }

    pub(crate) fn require_capability(
        &self,
        actor: &UserId,
        allowed: impl Fn(&User) -> bool,
        action: &'static str,
    ) -> Result<&User, WorkflowError> {
        let user = self.repository.user(actor)?;
        if !allowed(user) {
            return Err(WorkflowError::Unauthorized {
                actor: actor.clone(),
                action,
            });
        }
        Ok(user)
    }

    pub(crate) fn owned_project(
        &self,
        manager: &UserId,
        project: ProjectId,
        action: &'static str,
    ) -> Result<&Project, WorkflowError> {
        self.repository.user(manager)?;
        let project = self.repository.project(project)?;
        if !project.is_managed_by(manager) {
            return Err(WorkflowError::Unauthorized {
                actor: manager.clone(),
                action,
            });
        }
        Ok(project)
    }
}

pub(crate) fn log_rejection(action: &'static str, err: &WorkflowError) {
    warn!(action, kind = err.kind().label(), error = %err, "workflow operation rejected");
}
