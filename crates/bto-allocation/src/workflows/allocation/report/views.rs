use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{
    Application, ApplicationId, ApplicationStatus, FlatType, MaritalStatus, Project, ProjectId,
    User, UserId,
};
use super::filter::{ReportFilter, ReportFilterError};

/// One row of a manager report: an application joined with its applicant and project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationReportEntry {
    pub application_id: ApplicationId,
    pub applicant_id: UserId,
    pub applicant_name: String,
    pub age: u8,
    pub marital_status: MaritalStatus,
    pub flat_type: FlatType,
    pub project_id: ProjectId,
    pub project_name: String,
    pub neighbourhood: String,
    pub status: ApplicationStatus,
    pub withdrawal_requested: bool,
}

impl ApplicationReportEntry {
    pub(crate) fn new(application: &Application, applicant: &User, project: &Project) -> Self {
        Self {
            application_id: application.id(),
            applicant_id: applicant.id.clone(),
            applicant_name: applicant.name.clone(),
            age: applicant.age,
            marital_status: applicant.marital_status,
            flat_type: application.flat_type(),
            project_id: project.id(),
            project_name: project.name().to_string(),
            neighbourhood: project.neighbourhood().to_string(),
            status: application.status(),
            withdrawal_requested: application.withdrawal_requested(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationReport {
    pub filter: ReportFilter,
    pub entries: Vec<ApplicationReportEntry>,
    /// Set when the requested filter was unusable; `entries` is then unfiltered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_filter: Option<ReportFilterError>,
}

impl ApplicationReport {
    pub fn is_filtered(&self) -> bool {
        self.invalid_filter.is_none() && self.filter != ReportFilter::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatAvailabilityView {
    pub flat_type: FlatType,
    pub flat_type_label: &'static str,
    pub remaining_units: u32,
    pub price: u32,
    pub eligible: bool,
}

/// Project as presented to a browsing applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectListing {
    pub project_id: ProjectId,
    pub name: String,
    pub neighbourhood: String,
    pub opening: NaiveDate,
    pub closing: NaiveDate,
    pub visible: bool,
    pub flats: Vec<FlatAvailabilityView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_eligible_price: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub project_id: ProjectId,
    pub project_name: String,
    pub flat_type: FlatType,
    pub status: &'static str,
    pub withdrawal_requested: bool,
    pub created_on: NaiveDate,
}

impl ApplicationStatusView {
    pub(crate) fn new(application: &Application, project: &Project) -> Self {
        Self {
            application_id: application.id(),
            project_id: project.id(),
            project_name: project.name().to_string(),
            flat_type: application.flat_type(),
            status: application.status().label(),
            withdrawal_requested: application.withdrawal_requested(),
            created_on: application.created_on(),
        }
    }
}

/// Structured record of a completed booking, handed back to the officer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingReceipt {
    pub application_id: ApplicationId,
    pub applicant_id: UserId,
    pub applicant_name: String,
    pub age: u8,
    pub marital_status: MaritalStatus,
    pub flat_type: FlatType,
    pub flat_type_label: &'static str,
    pub price: u32,
    pub project_id: ProjectId,
    pub project_name: String,
    pub neighbourhood: String,
    pub booked_by: UserId,
}
