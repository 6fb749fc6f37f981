//! Manager reporting and applicant-facing project listings.

mod filter;
mod views;

pub use filter::{ReportFilter, ReportFilterError};
pub use views::{
    ApplicationReport, ApplicationReportEntry, ApplicationStatusView, BookingReceipt,
    FlatAvailabilityView, ProjectListing,
};

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{FlatType, Project, User, UserId};
use super::eligibility;
use super::engine::AllocationEngine;
use super::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSort {
    PriceAscending,
    #[default]
    NameDescending,
}

/// Applicant-supplied browsing criteria. Empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCriteria {
    pub neighbourhood: Option<String>,
    #[serde(default)]
    pub flat_types: Vec<FlatType>,
    #[serde(default)]
    pub sort: ProjectSort,
}

impl ProjectCriteria {
    fn matches(&self, project: &Project) -> bool {
        let neighbourhood_ok = match self.neighbourhood.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) => project.neighbourhood().eq_ignore_ascii_case(wanted),
        };
        let flat_types_ok = self.flat_types.is_empty()
            || self
                .flat_types
                .iter()
                .any(|flat_type| project.remaining_units(*flat_type) > 0);
        neighbourhood_ok && flat_types_ok
    }

    fn wants(&self, flat_type: FlatType) -> bool {
        self.flat_types.is_empty() || self.flat_types.contains(&flat_type)
    }
}

impl AllocationEngine {
    /// Applications across every project the manager owns, narrowed by at most one filter.
    ///
    /// An unusable filter does not fail the call: the report comes back unfiltered with
    /// `invalid_filter` set.
    pub fn generate_report(
        &self,
        manager: &UserId,
        category: &str,
        value: &str,
    ) -> Result<ApplicationReport, WorkflowError> {
        let mut entries = Vec::new();
        for application in self.manager_applications(manager)? {
            let applicant = self.repository.user(application.applicant())?;
            let project = self.repository.project(application.project())?;
            entries.push(ApplicationReportEntry::new(application, applicant, project));
        }

        let report = match ReportFilter::parse(category, value) {
            Ok(filter) => {
                entries.retain(|entry| filter.matches(entry));
                ApplicationReport {
                    filter,
                    entries,
                    invalid_filter: None,
                }
            }
            Err(err) => {
                warn!(%manager, category, value, error = %err, "report filter rejected, returning unfiltered report");
                ApplicationReport {
                    filter: ReportFilter::None,
                    entries,
                    invalid_filter: Some(err),
                }
            }
        };

        debug!(%manager, rows = report.entries.len(), "report generated");
        Ok(report)
    }

    /// Projects the applicant may browse, narrowed by `criteria` and sorted per its `sort`.
    pub fn list_eligible_projects(
        &self,
        applicant: &UserId,
        criteria: &ProjectCriteria,
    ) -> Result<Vec<ProjectListing>, WorkflowError> {
        let user = self.repository.user(applicant)?;
        let current_project = self.repository.current_project_of(applicant);

        let mut listings: Vec<ProjectListing> = self
            .repository
            .projects()
            .filter(|project| project.visible_to(current_project))
            .filter(|project| criteria.matches(project))
            .map(|project| listing_for(user, project, criteria))
            .collect();

        match criteria.sort {
            ProjectSort::PriceAscending => listings.sort_by(compare_lowest_price),
            ProjectSort::NameDescending => listings.sort_by(|a, b| b.name.cmp(&a.name)),
        }

        debug!(%applicant, count = listings.len(), "listed projects");
        Ok(listings)
    }
}

fn listing_for(applicant: &User, project: &Project, criteria: &ProjectCriteria) -> ProjectListing {
    let eligible = eligibility::eligible_flat_types(applicant, project);
    let flats: Vec<FlatAvailabilityView> = project
        .flats()
        .map(|(flat_type, inventory)| FlatAvailabilityView {
            flat_type,
            flat_type_label: flat_type.label(),
            remaining_units: inventory.remaining_units(),
            price: inventory.price(),
            eligible: eligible.contains(&flat_type),
        })
        .collect();

    let lowest_eligible_price = flats
        .iter()
        .filter(|flat| flat.eligible && criteria.wants(flat.flat_type))
        .map(|flat| flat.price)
        .min();

    ProjectListing {
        project_id: project.id(),
        name: project.name().to_string(),
        neighbourhood: project.neighbourhood().to_string(),
        opening: project.window().opening(),
        closing: project.window().closing(),
        visible: project.is_visible(),
        flats,
        lowest_eligible_price,
    }
}

/// Projects without an eligible price sort after every priced project.
fn compare_lowest_price(a: &ProjectListing, b: &ProjectListing) -> Ordering {
    match (a.lowest_eligible_price, b.lowest_eligible_price) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}
