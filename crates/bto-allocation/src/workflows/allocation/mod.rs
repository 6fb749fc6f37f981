//! BTO allocation workflow engine.
//!
//! [`AllocationEngine`] owns the [`HousingRepository`] and exposes every workflow as a method:
//! applications and withdrawals, officer registrations, enquiries, project management, and
//! manager reporting. Each operation validates against the current state first and only then
//! commits, so a returned [`WorkflowError`] always means nothing changed.

mod applications;
pub mod domain;
pub mod eligibility;
mod engine;
mod enquiries;
pub mod error;
mod officers;
mod projects;
pub mod report;
pub mod repository;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationWindow, Capabilities, Enquiry,
    EnquiryId, FlatInventory, FlatOffer, FlatType, MaritalStatus, OfficerRegistration,
    ParseValueError, Project, ProjectDraft, ProjectId, RegistrationStatus, Role, User, UserId,
    MAX_OFFICER_SLOTS,
};
pub use engine::{AllocationEngine, UnitReleasePolicy};
pub use error::{ErrorKind, WorkflowError};
pub use projects::ProjectUpdate;
pub use report::{
    ApplicationReport, ApplicationReportEntry, ApplicationStatusView, BookingReceipt,
    FlatAvailabilityView, ProjectCriteria, ProjectListing, ProjectSort, ReportFilter,
    ReportFilterError,
};
pub use repository::HousingRepository;
