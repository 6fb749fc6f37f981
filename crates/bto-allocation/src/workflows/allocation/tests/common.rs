use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::workflows::allocation::{
    AllocationEngine, FlatOffer, FlatType, HousingRepository, MaritalStatus, ProjectDraft,
    ProjectId, Role, UnitReleasePolicy, User, UserId,
};

pub(super) const MANAGER: &str = "T8765432F";
pub(super) const OTHER_MANAGER: &str = "S5678901G";
pub(super) const SINGLE_35: &str = "S1234567A";
pub(super) const SINGLE_34: &str = "S2345678B";
pub(super) const MARRIED_21: &str = "T3456789C";
pub(super) const MARRIED_40: &str = "T7654321B";
pub(super) const MARRIED_20: &str = "S4567890D";
pub(super) const OFFICER: &str = "T2109876H";
pub(super) const OTHER_OFFICER: &str = "S6543210I";

pub(super) fn id(raw: &str) -> UserId {
    UserId::new(raw)
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A day inside the default project window.
pub(super) fn today() -> NaiveDate {
    date(2025, 2, 15)
}

pub(super) fn repository() -> HousingRepository {
    let mut repository = HousingRepository::new();
    let users = [
        (MANAGER, "Michael", 36, MaritalStatus::Single, Role::Manager),
        (OTHER_MANAGER, "Jessica", 26, MaritalStatus::Married, Role::Manager),
        (SINGLE_35, "John", 35, MaritalStatus::Single, Role::Applicant),
        (SINGLE_34, "Grace", 34, MaritalStatus::Single, Role::Applicant),
        (MARRIED_21, "Rachel", 21, MaritalStatus::Married, Role::Applicant),
        (MARRIED_40, "Sarah", 40, MaritalStatus::Married, Role::Applicant),
        (MARRIED_20, "Kevin", 20, MaritalStatus::Married, Role::Applicant),
        (OFFICER, "Daniel", 36, MaritalStatus::Single, Role::Officer),
        (OTHER_OFFICER, "Emily", 28, MaritalStatus::Married, Role::Officer),
    ];
    for (nric, name, age, marital_status, role) in users {
        repository
            .insert_user(User::new(id(nric), name, age, marital_status, role))
            .expect("unique fixture users");
    }
    repository
}

pub(super) fn draft(
    name: &str,
    opening: NaiveDate,
    closing: NaiveDate,
    two_room_units: u32,
    three_room_units: u32,
) -> ProjectDraft {
    let mut flats = BTreeMap::new();
    flats.insert(
        FlatType::TwoRoom,
        FlatOffer {
            units: two_room_units,
            price: 350_000,
        },
    );
    flats.insert(
        FlatType::ThreeRoom,
        FlatOffer {
            units: three_room_units,
            price: 450_000,
        },
    );
    ProjectDraft {
        name: name.to_string(),
        neighbourhood: "Yishun".to_string(),
        flats,
        opening,
        closing,
        officer_slots: 3,
        visible: true,
    }
}

/// Acacia Breeze, open 1 Jan to 31 Mar 2025 with two 2-Room units and one 3-Room unit.
pub(super) fn acacia_draft() -> ProjectDraft {
    draft("Acacia Breeze", date(2025, 1, 1), date(2025, 3, 31), 2, 1)
}

pub(super) fn engine_with_policy(policy: UnitReleasePolicy) -> (AllocationEngine, ProjectId) {
    let mut engine = AllocationEngine::with_policy(repository(), policy);
    let project = engine
        .create_project(&id(MANAGER), acacia_draft())
        .expect("fixture project is valid");
    (engine, project)
}

pub(super) fn engine() -> (AllocationEngine, ProjectId) {
    engine_with_policy(UnitReleasePolicy::Retain)
}

/// Puts the officer on the project through the registration workflow.
pub(super) fn assign_officer(engine: &mut AllocationEngine, project: ProjectId, officer: &str) {
    engine
        .register_officer(&id(officer), project)
        .expect("registration accepted");
    let manager = engine
        .repository()
        .project(project)
        .expect("project exists")
        .manager()
        .clone();
    engine
        .approve_officer(&manager, project, &id(officer))
        .expect("registration approved");
}

/// Sum of consumed units must match applications that currently hold one.
pub(super) fn assert_unit_invariant(engine: &AllocationEngine, project: ProjectId) {
    let repository = engine.repository();
    let target = repository.project(project).expect("project exists");
    for (flat_type, inventory) in target.flats() {
        let holding = target
            .applications()
            .iter()
            .map(|id| repository.application(*id).expect("attached application"))
            .filter(|application| {
                application.flat_type() == flat_type && application.status().holds_unit()
            })
            .count() as u32;
        assert_eq!(
            inventory.initial_units() - inventory.remaining_units(),
            holding,
            "{} inventory out of step with approvals",
            flat_type.label()
        );
    }
}
