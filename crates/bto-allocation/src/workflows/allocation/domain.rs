use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::WorkflowError;

/// Upper bound on officer slots a single project may advertise.
pub const MAX_OFFICER_SLOTS: u32 = 10;

/// NRIC-style identifier shared by applicants, officers, and managers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub u32);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project-{:03}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app-{:06}", self.0)
    }
}

/// Sequential enquiry number, unique within its project only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnquiryId(pub u32);

impl fmt::Display for EnquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raised when free-form text cannot be mapped onto one of the domain enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {field} '{value}'")]
pub struct ParseValueError {
    pub field: &'static str,
    pub value: String,
}

fn normalize_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Married => "Married",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_token(raw).as_str() {
            "single" => Ok(Self::Single),
            "married" => Ok(Self::Married),
            _ => Err(ParseValueError {
                field: "marital status",
                value: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatType {
    TwoRoom,
    ThreeRoom,
}

impl FlatType {
    pub const fn ordered() -> [Self; 2] {
        [Self::TwoRoom, Self::ThreeRoom]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TwoRoom => "2-Room",
            Self::ThreeRoom => "3-Room",
        }
    }
}

impl FromStr for FlatType {
    type Err = ParseValueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_token(raw).as_str() {
            "2room" | "tworoom" | "2" => Ok(Self::TwoRoom),
            "3room" | "threeroom" | "3" => Ok(Self::ThreeRoom),
            _ => Err(ParseValueError {
                field: "flat type",
                value: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Applicant,
    Officer,
    Manager,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applicant => "Applicant",
            Self::Officer => "HDB Officer",
            Self::Manager => "HDB Manager",
        }
    }

    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Applicant => Capabilities {
                can_apply: true,
                can_manage_projects: false,
                can_register_as_officer: false,
            },
            Self::Officer => Capabilities {
                can_apply: true,
                can_manage_projects: false,
                can_register_as_officer: true,
            },
            Self::Manager => Capabilities {
                can_apply: false,
                can_manage_projects: true,
                can_register_as_officer: false,
            },
        }
    }
}

/// Actions a user may attempt, derived from the role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_apply: bool,
    pub can_manage_projects: bool,
    pub can_register_as_officer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub age: u8,
    pub marital_status: MaritalStatus,
    pub role: Role,
}

impl User {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        age: u8,
        marital_status: MaritalStatus,
        role: Role,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            marital_status,
            role,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }
}

/// Inclusive date range during which applications are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplicationWindow {
    opening: NaiveDate,
    closing: NaiveDate,
}

impl ApplicationWindow {
    pub fn new(opening: NaiveDate, closing: NaiveDate) -> Result<Self, WorkflowError> {
        if opening > closing {
            return Err(WorkflowError::InvalidWindow { opening, closing });
        }
        Ok(Self { opening, closing })
    }

    pub fn opening(&self) -> NaiveDate {
        self.opening
    }

    pub fn closing(&self) -> NaiveDate {
        self.closing
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.opening <= date && date <= self.closing
    }

    pub fn overlaps(&self, other: &ApplicationWindow) -> bool {
        self.opening <= other.closing && other.opening <= self.closing
    }
}

/// Units and pricing offered for one flat type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatOffer {
    pub units: u32,
    pub price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlatInventory {
    initial_units: u32,
    remaining_units: u32,
    price: u32,
}

impl FlatInventory {
    fn from_offer(offer: FlatOffer) -> Self {
        Self {
            initial_units: offer.units,
            remaining_units: offer.units,
            price: offer.price,
        }
    }

    pub fn initial_units(&self) -> u32 {
        self.initial_units
    }

    pub fn remaining_units(&self) -> u32 {
        self.remaining_units
    }

    pub fn price(&self) -> u32 {
        self.price
    }

    fn consume(&mut self) -> bool {
        if self.remaining_units == 0 {
            return false;
        }
        self.remaining_units -= 1;
        true
    }

    fn restock(&mut self) -> bool {
        if self.remaining_units >= self.initial_units {
            return false;
        }
        self.remaining_units += 1;
        true
    }
}

/// Manager-supplied description of a new project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub neighbourhood: String,
    pub flats: BTreeMap<FlatType, FlatOffer>,
    pub opening: NaiveDate,
    pub closing: NaiveDate,
    pub officer_slots: u32,
    pub visible: bool,
}

impl ProjectDraft {
    pub(crate) fn validate(&self) -> Result<ApplicationWindow, WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::InvalidProject(
                "project name must not be empty".to_string(),
            ));
        }
        if self.neighbourhood.trim().is_empty() {
            return Err(WorkflowError::InvalidProject(
                "neighbourhood must not be empty".to_string(),
            ));
        }
        if self.flats.is_empty() {
            return Err(WorkflowError::InvalidProject(
                "at least one flat type must be offered".to_string(),
            ));
        }
        validate_officer_slots(self.officer_slots)?;
        ApplicationWindow::new(self.opening, self.closing)
    }
}

pub(crate) fn validate_officer_slots(slots: u32) -> Result<(), WorkflowError> {
    if slots == 0 || slots > MAX_OFFICER_SLOTS {
        return Err(WorkflowError::InvalidProject(format!(
            "officer slots must be between 1 and {MAX_OFFICER_SLOTS}, found {slots}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    id: ProjectId,
    name: String,
    neighbourhood: String,
    flats: BTreeMap<FlatType, FlatInventory>,
    window: ApplicationWindow,
    visible: bool,
    manager: UserId,
    officer_slots: u32,
    officers: Vec<UserId>,
    enquiries: Vec<Enquiry>,
    applications: Vec<ApplicationId>,
    next_enquiry: u32,
}

impl Project {
    pub(crate) fn from_draft(
        id: ProjectId,
        draft: ProjectDraft,
        manager: UserId,
    ) -> Result<Self, WorkflowError> {
        let window = draft.validate()?;
        let flats = draft
            .flats
            .into_iter()
            .map(|(flat_type, offer)| (flat_type, FlatInventory::from_offer(offer)))
            .collect();

        Ok(Self {
            id,
            name: draft.name.trim().to_string(),
            neighbourhood: draft.neighbourhood.trim().to_string(),
            flats,
            window,
            visible: draft.visible,
            manager,
            officer_slots: draft.officer_slots,
            officers: Vec::new(),
            enquiries: Vec::new(),
            applications: Vec::new(),
            next_enquiry: 1,
        })
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn neighbourhood(&self) -> &str {
        &self.neighbourhood
    }

    pub fn window(&self) -> &ApplicationWindow {
        &self.window
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn manager(&self) -> &UserId {
        &self.manager
    }

    pub fn officer_slots(&self) -> u32 {
        self.officer_slots
    }

    pub fn officers(&self) -> &[UserId] {
        &self.officers
    }

    pub fn enquiries(&self) -> &[Enquiry] {
        &self.enquiries
    }

    pub fn applications(&self) -> &[ApplicationId] {
        &self.applications
    }

    pub fn flats(&self) -> impl Iterator<Item = (FlatType, &FlatInventory)> {
        self.flats.iter().map(|(flat_type, inventory)| (*flat_type, inventory))
    }

    pub fn flat(&self, flat_type: FlatType) -> Option<&FlatInventory> {
        self.flats.get(&flat_type)
    }

    pub fn remaining_units(&self, flat_type: FlatType) -> u32 {
        self.flat(flat_type)
            .map(FlatInventory::remaining_units)
            .unwrap_or(0)
    }

    pub fn price(&self, flat_type: FlatType) -> Option<u32> {
        self.flat(flat_type).map(FlatInventory::price)
    }

    pub fn available_officer_slots(&self) -> u32 {
        self.officer_slots
            .saturating_sub(self.officers.len() as u32)
    }

    pub fn has_officer(&self, user: &UserId) -> bool {
        self.officers.contains(user)
    }

    pub fn is_managed_by(&self, user: &UserId) -> bool {
        &self.manager == user
    }

    /// Managers and assigned officers both administer a project.
    pub fn is_administered_by(&self, user: &UserId) -> bool {
        self.is_managed_by(user) || self.has_officer(user)
    }

    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.window.contains(date)
    }

    /// Browsing visibility: hidden projects stay visible to their own applicants.
    pub fn visible_to(&self, current_project: Option<ProjectId>) -> bool {
        self.visible || current_project == Some(self.id)
    }

    pub fn enquiry(&self, id: EnquiryId) -> Option<&Enquiry> {
        self.enquiries.iter().find(|enquiry| enquiry.id == id)
    }

    pub(crate) fn consume_unit(&mut self, flat_type: FlatType) -> bool {
        self.flats
            .get_mut(&flat_type)
            .map(FlatInventory::consume)
            .unwrap_or(false)
    }

    pub(crate) fn restock_unit(&mut self, flat_type: FlatType) -> bool {
        self.flats
            .get_mut(&flat_type)
            .map(FlatInventory::restock)
            .unwrap_or(false)
    }

    pub(crate) fn assign_officer(&mut self, officer: UserId) -> bool {
        if self.has_officer(&officer) || self.available_officer_slots() == 0 {
            return false;
        }
        self.officers.push(officer);
        true
    }

    pub(crate) fn release_officer(&mut self, officer: &UserId) -> bool {
        let before = self.officers.len();
        self.officers.retain(|assigned| assigned != officer);
        before != self.officers.len()
    }

    pub(crate) fn attach_application(&mut self, id: ApplicationId) {
        if !self.applications.contains(&id) {
            self.applications.push(id);
        }
    }

    pub(crate) fn detach_application(&mut self, id: ApplicationId) {
        self.applications.retain(|attached| *attached != id);
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_neighbourhood(&mut self, neighbourhood: String) {
        self.neighbourhood = neighbourhood;
    }

    pub(crate) fn set_window(&mut self, window: ApplicationWindow) {
        self.window = window;
    }

    pub(crate) fn set_officer_slots(&mut self, slots: u32) {
        self.officer_slots = slots;
    }

    pub(crate) fn set_price(&mut self, flat_type: FlatType, price: u32) -> bool {
        match self.flats.get_mut(&flat_type) {
            Some(inventory) => {
                inventory.price = price;
                true
            }
            None => false,
        }
    }

    pub(crate) fn push_enquiry(&mut self, applicant: UserId, message: String) -> EnquiryId {
        let id = EnquiryId(self.next_enquiry);
        self.next_enquiry += 1;
        self.enquiries.push(Enquiry {
            id,
            project: self.id,
            applicant,
            message,
            reply: None,
            replied: false,
        });
        id
    }

    pub(crate) fn enquiry_mut(&mut self, id: EnquiryId) -> Option<&mut Enquiry> {
        self.enquiries.iter_mut().find(|enquiry| enquiry.id == id)
    }

    pub(crate) fn remove_enquiry(&mut self, id: EnquiryId) -> bool {
        let before = self.enquiries.len();
        self.enquiries.retain(|enquiry| enquiry.id != id);
        before != self.enquiries.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    None,
    Pending,
    Successful,
    Unsuccessful,
    Booked,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Unsuccessful => "unsuccessful",
            Self::Booked => "booked",
        }
    }

    pub const fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Statuses that have consumed a unit from the project inventory.
    pub const fn holds_unit(self) -> bool {
        matches!(self, Self::Successful | Self::Booked)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    id: ApplicationId,
    applicant: UserId,
    project: ProjectId,
    flat_type: FlatType,
    status: ApplicationStatus,
    withdrawal_requested: bool,
    created_on: NaiveDate,
}

impl Application {
    pub(crate) fn new(
        id: ApplicationId,
        applicant: UserId,
        project: ProjectId,
        flat_type: FlatType,
        created_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            applicant,
            project,
            flat_type,
            status: ApplicationStatus::Pending,
            withdrawal_requested: false,
            created_on,
        }
    }

    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn applicant(&self) -> &UserId {
        &self.applicant
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn flat_type(&self) -> FlatType {
        self.flat_type
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn withdrawal_requested(&self) -> bool {
        self.withdrawal_requested
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    pub(crate) fn set_status(&mut self, status: ApplicationStatus) {
        self.status = status;
    }

    pub(crate) fn set_withdrawal_requested(&mut self, requested: bool) {
        self.withdrawal_requested = requested;
    }

    pub(crate) fn clear(&mut self) {
        self.status = ApplicationStatus::None;
        self.withdrawal_requested = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Pending and approved registrations both tie the officer to the project.
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfficerRegistration {
    officer: UserId,
    project: ProjectId,
    status: RegistrationStatus,
}

impl OfficerRegistration {
    pub(crate) fn new(officer: UserId, project: ProjectId, status: RegistrationStatus) -> Self {
        Self {
            officer,
            project,
            status,
        }
    }

    pub fn officer(&self) -> &UserId {
        &self.officer
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: RegistrationStatus) {
        self.status = status;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enquiry {
    id: EnquiryId,
    project: ProjectId,
    applicant: UserId,
    message: String,
    reply: Option<String>,
    replied: bool,
}

impl Enquiry {
    pub fn id(&self) -> EnquiryId {
        self.id
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn applicant(&self) -> &UserId {
        &self.applicant
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reply(&self) -> Option<&str> {
        self.reply.as_deref()
    }

    pub fn is_replied(&self) -> bool {
        self.replied
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = message;
    }

    pub(crate) fn set_reply(&mut self, reply: String) {
        self.reply = Some(reply);
        self.replied = true;
    }
}
