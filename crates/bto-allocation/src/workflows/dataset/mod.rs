//! Loads users and projects from the portal's flat-file exports into a [`HousingRepository`].

mod parser;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::workflows::allocation::{
    FlatOffer, FlatType, HousingRepository, MaritalStatus, ProjectDraft, ProjectId, Role, User,
    UserId, WorkflowError,
};

use parser::{ProjectRow, UserRow};

#[derive(Debug)]
pub enum ImportError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv(csv::Error),
    InvalidField {
        record: String,
        field: &'static str,
        value: String,
    },
    UnknownManager {
        project: String,
        manager: String,
    },
    UnknownOfficer {
        project: String,
        officer: String,
    },
    Workflow(WorkflowError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ImportError::Csv(err) => write!(f, "invalid dataset row: {}", err),
            ImportError::InvalidField {
                record,
                field,
                value,
            } => write!(f, "{}: invalid {} '{}'", record, field, value),
            ImportError::UnknownManager { project, manager } => write!(
                f,
                "project '{}' names manager '{}' who is not in the manager list",
                project, manager
            ),
            ImportError::UnknownOfficer { project, officer } => write!(
                f,
                "project '{}' names officer '{}' who is not in the officer list",
                project, officer
            ),
            ImportError::Workflow(err) => write!(f, "could not load dataset: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io { source, .. } => Some(source),
            ImportError::Csv(err) => Some(err),
            ImportError::Workflow(err) => Some(err),
            ImportError::InvalidField { .. }
            | ImportError::UnknownManager { .. }
            | ImportError::UnknownOfficer { .. } => None,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<WorkflowError> for ImportError {
    fn from(err: WorkflowError) -> Self {
        Self::Workflow(err)
    }
}

/// Locations of the four exports that make up a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFiles {
    pub applicants: PathBuf,
    pub officers: PathBuf,
    pub managers: PathBuf,
    pub projects: PathBuf,
}

impl DatasetFiles {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            applicants: dir.join("ApplicantList.csv"),
            officers: dir.join("OfficerList.csv"),
            managers: dir.join("ManagerList.csv"),
            projects: dir.join("ProjectList.csv"),
        }
    }
}

/// Raw contents of a dataset, already read into memory.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSources<'a> {
    pub applicants: &'a str,
    pub officers: &'a str,
    pub managers: &'a str,
    pub projects: &'a str,
}

pub struct DatasetImporter;

impl DatasetImporter {
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<HousingRepository, ImportError> {
        Self::from_files(&DatasetFiles::in_dir(dir))
    }

    pub fn from_files(files: &DatasetFiles) -> Result<HousingRepository, ImportError> {
        let applicants = read(&files.applicants)?;
        let officers = read(&files.officers)?;
        let managers = read(&files.managers)?;
        let projects = read(&files.projects)?;

        Self::from_sources(DatasetSources {
            applicants: &applicants,
            officers: &officers,
            managers: &managers,
            projects: &projects,
        })
    }

    pub fn from_sources(sources: DatasetSources<'_>) -> Result<HousingRepository, ImportError> {
        let mut repository = HousingRepository::new();
        let mut directory = NameDirectory::default();

        for (raw, role) in [
            (sources.applicants, Role::Applicant),
            (sources.officers, Role::Officer),
            (sources.managers, Role::Manager),
        ] {
            for row in parser::parse_rows::<UserRow>(raw)? {
                let user = user_from_row(row, role)?;
                directory.record(&user);
                repository.insert_user(user)?;
            }
        }

        for row in parser::parse_rows::<ProjectRow>(sources.projects)? {
            let id = load_project(&mut repository, &directory, row)?;
            debug!(project = %id, "project loaded from dataset");
        }

        info!(
            users = repository.users().count(),
            projects = repository.projects().count(),
            "dataset imported"
        );
        Ok(repository)
    }
}

fn read(path: &Path) -> Result<String, ImportError> {
    std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Project rows refer to staff by display name or NRIC.
#[derive(Debug, Default)]
struct NameDirectory {
    managers: BTreeMap<String, UserId>,
    officers: BTreeMap<String, UserId>,
}

impl NameDirectory {
    fn record(&mut self, user: &User) {
        let target = match user.role {
            Role::Manager => &mut self.managers,
            Role::Officer => &mut self.officers,
            Role::Applicant => return,
        };
        target.insert(user.name.to_lowercase(), user.id.clone());
        target.insert(user.id.0.to_lowercase(), user.id.clone());
    }

    fn manager(&self, name: &str) -> Option<&UserId> {
        self.managers.get(&name.trim().to_lowercase())
    }

    fn officer(&self, name: &str) -> Option<&UserId> {
        self.officers.get(&name.trim().to_lowercase())
    }
}

fn user_from_row(row: UserRow, role: Role) -> Result<User, ImportError> {
    let age = row
        .age
        .parse::<u8>()
        .map_err(|_| invalid_field(&row.nric, "age", &row.age))?;
    let marital_status = row
        .marital_status
        .parse::<MaritalStatus>()
        .map_err(|_| invalid_field(&row.nric, "marital status", &row.marital_status))?;
    if row.nric.is_empty() {
        return Err(invalid_field(&row.name, "NRIC", &row.nric));
    }

    Ok(User::new(
        UserId::new(row.nric),
        row.name,
        age,
        marital_status,
        role,
    ))
}

fn load_project(
    repository: &mut HousingRepository,
    directory: &NameDirectory,
    row: ProjectRow,
) -> Result<ProjectId, ImportError> {
    let manager = directory
        .manager(&row.manager)
        .cloned()
        .ok_or_else(|| ImportError::UnknownManager {
            project: row.name.clone(),
            manager: row.manager.clone(),
        })?;

    let officers = row
        .officer_names()
        .into_iter()
        .map(|name| {
            directory
                .officer(&name)
                .cloned()
                .ok_or_else(|| ImportError::UnknownOfficer {
                    project: row.name.clone(),
                    officer: name,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut flats = BTreeMap::new();
    let (flat_type, offer) = flat_offer(&row.name, &row.type_1, &row.units_1, &row.price_1)?;
    flats.insert(flat_type, offer);
    if let Some(type_2) = row.type_2.as_deref() {
        let units = row.units_2.as_deref().unwrap_or_default();
        let price = row.price_2.as_deref().unwrap_or_default();
        let (flat_type, offer) = flat_offer(&row.name, type_2, units, price)?;
        flats.insert(flat_type, offer);
    }

    let opening = parser::parse_date(&row.opening)
        .ok_or_else(|| invalid_field(&row.name, "opening date", &row.opening))?;
    let closing = parser::parse_date(&row.closing)
        .ok_or_else(|| invalid_field(&row.name, "closing date", &row.closing))?;
    let officer_slots = row
        .officer_slots
        .parse::<u32>()
        .map_err(|_| invalid_field(&row.name, "officer slot", &row.officer_slots))?;
    let visible = match row.visibility.as_deref() {
        None => true,
        Some(raw) => parser::parse_visibility(raw)
            .ok_or_else(|| invalid_field(&row.name, "visibility", raw))?,
    };

    let draft = ProjectDraft {
        name: row.name,
        neighbourhood: row.neighbourhood,
        flats,
        opening,
        closing,
        officer_slots,
        visible,
    };
    Ok(repository.seed_project(draft, manager, officers)?)
}

fn flat_offer(
    project: &str,
    flat_type: &str,
    units: &str,
    price: &str,
) -> Result<(FlatType, FlatOffer), ImportError> {
    let parsed = flat_type
        .parse::<FlatType>()
        .map_err(|_| invalid_field(project, "flat type", flat_type))?;
    let units = units
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid_field(project, "unit count", units))?;
    let price = price
        .trim()
        .parse::<u32>()
        .map_err(|_| invalid_field(project, "selling price", price))?;
    Ok((parsed, FlatOffer { units, price }))
}

fn invalid_field(record: &str, field: &'static str, value: &str) -> ImportError {
    ImportError::InvalidField {
        record: record.to_string(),
        field,
        value: value.to_string(),
    }
}
