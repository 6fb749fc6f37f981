use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    ApplicationId, ApplicationStatus, EnquiryId, FlatType, ProjectId, UserId,
};

/// Broad classification used by callers to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    StateConflict,
    Authorization,
    NotFound,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::StateConflict => "state_conflict",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
        }
    }
}

/// Named failure returned by every workflow operation. None of them leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("application window closes on {closing} before it opens on {opening}")]
    InvalidWindow {
        opening: NaiveDate,
        closing: NaiveDate,
    },
    #[error("invalid project: {0}")]
    InvalidProject(String),
    #[error("enquiry message must not be empty")]
    EmptyMessage,

    #[error("{applicant} already holds a {} application", .status.label())]
    AlreadyApplied {
        applicant: UserId,
        status: ApplicationStatus,
    },
    #[error("{0} is not open for applications")]
    ProjectClosed(ProjectId),
    #[error("{applicant} is not eligible for a {} flat", .flat_type.label())]
    NotEligible {
        applicant: UserId,
        flat_type: FlatType,
    },
    #[error("{0} has no application")]
    NoApplication(UserId),
    #[error("withdrawal already requested for {0}")]
    WithdrawalAlreadyRequested(ApplicationId),
    #[error("no withdrawal requested for {0}")]
    NoWithdrawalRequest(ApplicationId),
    #[error("no {} units remaining in {project}", .flat_type.label())]
    NoUnitsAvailable {
        project: ProjectId,
        flat_type: FlatType,
    },
    #[error("{application} is {} and cannot be booked", .status.label())]
    NotSuccessful {
        application: ApplicationId,
        status: ApplicationStatus,
    },
    #[error("cannot {action} a {entity} that is {from}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        action: &'static str,
    },
    #[error("{officer} already holds a registration for {project}")]
    AlreadyRegistered { officer: UserId, project: ProjectId },
    #[error("{officer} has applied to {project} and cannot administer it")]
    ConflictsWithApplication { officer: UserId, project: ProjectId },
    #[error("{officer} is registered to administer {project} and cannot apply to it")]
    ConflictsWithRegistration { officer: UserId, project: ProjectId },
    #[error("{project} application window overlaps {conflicting}")]
    WindowOverlap {
        project: ProjectId,
        conflicting: ProjectId,
    },
    #[error("{0} has no officer slots left")]
    NoSlots(ProjectId),
    #[error("cannot reduce officer slots to {requested} while {assigned} officers are assigned")]
    SlotsBelowAssigned { requested: u32, assigned: u32 },
    #[error("enquiry {0} has already been replied to")]
    AlreadyReplied(EnquiryId),
    #[error("a project named '{0}' already exists")]
    DuplicateProjectName(String),
    #[error("{manager} already manages {conflicting} during an overlapping window")]
    ManagerWindowOverlap {
        manager: UserId,
        conflicting: ProjectId,
    },
    #[error("{0} has booked flats and cannot be deleted")]
    ProjectHasBookings(ProjectId),
    #[error("user {0} already exists")]
    DuplicateUser(UserId),

    #[error("{actor} is not permitted to {action}")]
    Unauthorized { actor: UserId, action: &'static str },

    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("{0} not found")]
    ProjectNotFound(ProjectId),
    #[error("{0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("enquiry {enquiry} not found in {project}")]
    EnquiryNotFound {
        project: ProjectId,
        enquiry: EnquiryId,
    },
    #[error("{officer} has no registration for {project}")]
    RegistrationNotFound { officer: UserId, project: ProjectId },
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidWindow { .. }
            | Self::InvalidProject(_)
            | Self::EmptyMessage => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::UserNotFound(_)
            | Self::ProjectNotFound(_)
            | Self::ApplicationNotFound(_)
            | Self::EnquiryNotFound { .. }
            | Self::RegistrationNotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::StateConflict,
        }
    }
}
