use bto_allocation::config::AppConfig;
use bto_allocation::error::AppError;
use bto_allocation::telemetry;
use bto_allocation::workflows::allocation::{
    AllocationEngine, ApplicationReport, FlatType, ProjectCriteria, ProjectId, ProjectListing,
    UserId,
};
use bto_allocation::workflows::dataset::DatasetImporter;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::cli::{EligibilityArgs, GlobalArgs, ProjectsArgs, ReportArgs};

/// Engine loaded from the dataset plus the output settings shared by every command.
pub(crate) struct Session {
    engine: AllocationEngine,
    today: NaiveDate,
    json: bool,
}

impl Session {
    pub(crate) fn open(args: &GlobalArgs) -> Result<Self, AppError> {
        let mut config = AppConfig::load()?;
        if let Some(dir) = &args.data_dir {
            config.dataset.data_dir = dir.clone();
        }

        telemetry::init(&config.telemetry)?;

        let repository = DatasetImporter::from_dir(&config.dataset.data_dir)?;
        let engine = AllocationEngine::with_policy(repository, config.engine.unit_release);
        info!(
            environment = ?config.environment,
            data_dir = %config.dataset.data_dir.display(),
            unit_release = %config.engine.unit_release,
            "dataset loaded"
        );

        Ok(Self {
            engine,
            today: args.today.unwrap_or_else(|| Local::now().date_naive()),
            json: args.json,
        })
    }

    fn resolve_project(&self, raw: &str) -> Result<ProjectId, AppError> {
        let repository = self.engine.repository();
        let trimmed = raw.trim();
        let number = trimmed
            .strip_prefix("project-")
            .unwrap_or(trimmed)
            .parse::<u32>()
            .ok();

        if let Some(project) = number.and_then(|value| repository.project(ProjectId(value)).ok()) {
            return Ok(project.id());
        }
        repository
            .project_by_name(trimmed)
            .map(|project| project.id())
            .ok_or_else(|| AppError::UnknownProject(trimmed.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ListedProject<'a> {
    #[serde(flatten)]
    listing: &'a ProjectListing,
    open: bool,
}

#[derive(Debug, Serialize)]
struct ProjectsOutput<'a> {
    applicant: &'a UserId,
    today: NaiveDate,
    projects: Vec<ListedProject<'a>>,
}

pub(crate) fn run_projects(session: &Session, args: ProjectsArgs) -> Result<(), AppError> {
    let applicant = UserId::new(args.applicant.trim());
    let criteria = ProjectCriteria {
        neighbourhood: args.neighbourhood,
        flat_types: args.flat_types,
        sort: args.sort.into(),
    };
    let listings = session
        .engine
        .list_eligible_projects(&applicant, &criteria)?;

    let output = ProjectsOutput {
        applicant: &applicant,
        today: session.today,
        projects: listings
            .iter()
            .map(|listing| ListedProject {
                listing,
                open: listing.opening <= session.today && session.today <= listing.closing,
            })
            .collect(),
    };

    if session.json {
        return print_json(&output);
    }

    println!("Projects for {} (as of {})", applicant, output.today);
    if output.projects.is_empty() {
        println!("- none");
    }
    for entry in &output.projects {
        let listing = entry.listing;
        println!(
            "- {} [{}], {} to {}{}",
            listing.name,
            listing.neighbourhood,
            listing.opening,
            listing.closing,
            if entry.open { ", open" } else { "" }
        );
        for flat in &listing.flats {
            println!(
                "    {}: {} left at ${}{}",
                flat.flat_type_label,
                flat.remaining_units,
                flat.price,
                if flat.eligible { " (eligible)" } else { "" }
            );
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct EligibilityOutput {
    applicant: UserId,
    project_id: ProjectId,
    project_name: String,
    flat_type: FlatType,
    eligible: bool,
    open: bool,
}

pub(crate) fn run_eligibility(session: &Session, args: EligibilityArgs) -> Result<(), AppError> {
    let applicant = UserId::new(args.applicant.trim());
    let project_id = session.resolve_project(&args.project)?;
    let eligible = session
        .engine
        .is_eligible(&applicant, project_id, args.flat_type)?;
    let project = session.engine.repository().project(project_id)?;

    let output = EligibilityOutput {
        applicant,
        project_id,
        project_name: project.name().to_string(),
        flat_type: args.flat_type,
        eligible,
        open: project.is_open_on(session.today),
    };

    if session.json {
        return print_json(&output);
    }

    println!(
        "{} {} eligible for a {} flat in {}",
        output.applicant,
        if output.eligible { "is" } else { "is not" },
        output.flat_type.label(),
        output.project_name
    );
    if !output.open {
        println!("Note: {} is not accepting applications on {}", output.project_name, session.today);
    }
    Ok(())
}

pub(crate) fn run_report(session: &Session, args: ReportArgs) -> Result<(), AppError> {
    let manager = UserId::new(args.manager.trim());
    let report = session
        .engine
        .generate_report(&manager, &args.category, &args.value)?;

    if session.json {
        return print_json(&report);
    }

    render_report(&manager, &report);
    Ok(())
}

fn render_report(manager: &UserId, report: &ApplicationReport) {
    println!("Application report for {}", manager);
    if let Some(err) = &report.invalid_filter {
        println!("Filter ignored: {}", err);
    }
    if report.entries.is_empty() {
        println!("- no applications");
        return;
    }
    for entry in &report.entries {
        println!(
            "- {} {} ({}, {}), {} in {} [{}], {}{}",
            entry.application_id,
            entry.applicant_name,
            entry.age,
            entry.marital_status.label(),
            entry.flat_type.label(),
            entry.project_name,
            entry.neighbourhood,
            entry.status.label(),
            if entry.withdrawal_requested {
                ", withdrawal requested"
            } else {
                ""
            }
        );
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
