use std::collections::BTreeMap;

use super::domain::{
    Application, ApplicationId, ApplicationWindow, OfficerRegistration, Project, ProjectDraft,
    ProjectId, RegistrationStatus, User, UserId,
};
use super::error::WorkflowError;

/// In-memory store owned by the engine for the lifetime of the process.
///
/// Reads are public. Writes are crate-private and driven by the workflow operations.
#[derive(Debug, Default)]
pub struct HousingRepository {
    users: BTreeMap<UserId, User>,
    projects: BTreeMap<ProjectId, Project>,
    applications: BTreeMap<ApplicationId, Application>,
    current_applications: BTreeMap<UserId, ApplicationId>,
    registrations: Vec<OfficerRegistration>,
    next_project: u32,
    next_application: u64,
}

impl HousingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&mut self, user: User) -> Result<(), WorkflowError> {
        if self.users.contains_key(&user.id) {
            return Err(WorkflowError::DuplicateUser(user.id));
        }
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn user(&self, id: &UserId) -> Result<&User, WorkflowError> {
        self.users
            .get(id)
            .ok_or_else(|| WorkflowError::UserNotFound(id.clone()))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn project(&self, id: ProjectId) -> Result<&Project, WorkflowError> {
        self.projects
            .get(&id)
            .ok_or(WorkflowError::ProjectNotFound(id))
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    pub fn project_by_name(&self, name: &str) -> Option<&Project> {
        let name = name.trim();
        self.projects
            .values()
            .find(|project| project.name().eq_ignore_ascii_case(name))
    }

    pub fn application(&self, id: ApplicationId) -> Result<&Application, WorkflowError> {
        self.applications
            .get(&id)
            .ok_or(WorkflowError::ApplicationNotFound(id))
    }

    /// The applicant's canonical application, if one is still in flight.
    pub fn current_application(&self, applicant: &UserId) -> Option<&Application> {
        self.current_applications
            .get(applicant)
            .and_then(|id| self.applications.get(id))
    }

    pub fn current_project_of(&self, applicant: &UserId) -> Option<ProjectId> {
        self.current_application(applicant)
            .map(Application::project)
    }

    pub fn registration(
        &self,
        officer: &UserId,
        project: ProjectId,
    ) -> Option<&OfficerRegistration> {
        self.registrations
            .iter()
            .find(|entry| entry.officer() == officer && entry.project() == project)
    }

    pub fn registrations_of<'a>(
        &'a self,
        officer: &UserId,
    ) -> impl Iterator<Item = &'a OfficerRegistration> + 'a {
        let officer = officer.clone();
        self.registrations
            .iter()
            .filter(move |entry| entry.officer() == &officer)
    }

    pub fn registrations_for(
        &self,
        project: ProjectId,
    ) -> impl Iterator<Item = &OfficerRegistration> {
        self.registrations
            .iter()
            .filter(move |entry| entry.project() == project)
    }

    pub(crate) fn project_mut(&mut self, id: ProjectId) -> Result<&mut Project, WorkflowError> {
        self.projects
            .get_mut(&id)
            .ok_or(WorkflowError::ProjectNotFound(id))
    }

    pub(crate) fn application_mut(
        &mut self,
        id: ApplicationId,
    ) -> Result<&mut Application, WorkflowError> {
        self.applications
            .get_mut(&id)
            .ok_or(WorkflowError::ApplicationNotFound(id))
    }

    pub(crate) fn registration_mut(
        &mut self,
        officer: &UserId,
        project: ProjectId,
    ) -> Result<&mut OfficerRegistration, WorkflowError> {
        self.registrations
            .iter_mut()
            .find(|entry| entry.officer() == officer && entry.project() == project)
            .ok_or_else(|| WorkflowError::RegistrationNotFound {
                officer: officer.clone(),
                project,
            })
    }

    pub(crate) fn next_project_id(&mut self) -> ProjectId {
        self.next_project += 1;
        ProjectId(self.next_project)
    }

    pub(crate) fn next_application_id(&mut self) -> ApplicationId {
        self.next_application += 1;
        ApplicationId(self.next_application)
    }

    pub(crate) fn insert_project(&mut self, project: Project) {
        self.projects.insert(project.id(), project);
    }

    /// Registers the application on both the applicant and the project.
    pub(crate) fn insert_application(&mut self, application: Application) {
        let id = application.id();
        if let Some(project) = self.projects.get_mut(&application.project()) {
            project.attach_application(id);
        }
        self.current_applications
            .insert(application.applicant().clone(), id);
        self.applications.insert(id, application);
    }

    /// Detaches the application from its applicant and project; the record itself is kept.
    pub(crate) fn detach_application(&mut self, id: ApplicationId) {
        let Some(application) = self.applications.get(&id) else {
            return;
        };
        if self.current_applications.get(application.applicant()) == Some(&id) {
            self.current_applications.remove(application.applicant());
        }
        if let Some(project) = self.projects.get_mut(&application.project()) {
            project.detach_application(id);
        }
    }

    pub(crate) fn upsert_registration(
        &mut self,
        officer: UserId,
        project: ProjectId,
        status: RegistrationStatus,
    ) {
        match self.registration_mut(&officer, project) {
            Ok(existing) => existing.set_status(status),
            Err(_) => self
                .registrations
                .push(OfficerRegistration::new(officer, project, status)),
        }
    }

    pub(crate) fn remove_project(&mut self, id: ProjectId) -> Option<Project> {
        let project = self.projects.remove(&id)?;
        self.registrations.retain(|entry| entry.project() != id);
        Some(project)
    }

    /// Project names are unique ignoring ASCII case.
    pub(crate) fn ensure_unique_name(
        &self,
        name: &str,
        exclude: Option<ProjectId>,
    ) -> Result<(), WorkflowError> {
        match self.project_by_name(name) {
            Some(existing) if Some(existing.id()) != exclude => {
                Err(WorkflowError::DuplicateProjectName(name.trim().to_string()))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn ensure_manager_window_free(
        &self,
        manager: &UserId,
        window: &ApplicationWindow,
        exclude: Option<ProjectId>,
    ) -> Result<(), WorkflowError> {
        let conflicting = self.projects.values().find(|project| {
            project.is_managed_by(manager)
                && Some(project.id()) != exclude
                && project.window().overlaps(window)
        });

        match conflicting {
            Some(project) => Err(WorkflowError::ManagerWindowOverlap {
                manager: manager.clone(),
                conflicting: project.id(),
            }),
            None => Ok(()),
        }
    }

    /// An officer may not be approved on two projects whose windows overlap. `project` is the
    /// one being registered for, edited, or seeded and is skipped.
    pub(crate) fn ensure_officer_window_free(
        &self,
        officer: &UserId,
        project: ProjectId,
        window: &ApplicationWindow,
    ) -> Result<(), WorkflowError> {
        let conflicting = self
            .registrations_of(officer)
            .filter(|registration| registration.status() == RegistrationStatus::Approved)
            .filter(|registration| registration.project() != project)
            .filter_map(|registration| self.projects.get(&registration.project()))
            .find(|assigned| assigned.window().overlaps(window));

        match conflicting {
            Some(assigned) => Err(WorkflowError::WindowOverlap {
                project,
                conflicting: assigned.id(),
            }),
            None => Ok(()),
        }
    }

    /// Inserts a project loaded from an existing dataset, with its officers already approved.
    /// Seeded rows go through the same name, manager and officer window rules as live edits.
    pub(crate) fn seed_project(
        &mut self,
        draft: ProjectDraft,
        manager: UserId,
        officers: Vec<UserId>,
    ) -> Result<ProjectId, WorkflowError> {
        let id = ProjectId(self.next_project + 1);
        let mut project = Project::from_draft(id, draft, manager)?;
        self.ensure_unique_name(project.name(), None)?;
        self.ensure_manager_window_free(project.manager(), project.window(), None)?;

        if officers.len() as u32 > project.officer_slots() {
            return Err(WorkflowError::NoSlots(id));
        }
        for officer in &officers {
            self.ensure_officer_window_free(officer, id, project.window())?;
            project.assign_officer(officer.clone());
        }

        self.next_project = id.0;
        for officer in officers {
            self.upsert_registration(officer, id, RegistrationStatus::Approved);
        }
        self.insert_project(project);
        Ok(id)
    }
}
