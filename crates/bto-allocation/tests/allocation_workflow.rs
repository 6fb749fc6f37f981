use chrono::NaiveDate;

use bto_allocation::workflows::allocation::{
    AllocationEngine, ApplicationStatus, FlatType, ProjectCriteria, UnitReleasePolicy, UserId,
    WorkflowError,
};
use bto_allocation::workflows::dataset::DatasetImporter;

const JESSICA: &str = "S5678901G";
const DANIEL: &str = "T2109876H";
const SARAH: &str = "T7654321B";
const JOHN: &str = "S1234567A";
const RACHEL: &str = "S3456789E";

fn engine(policy: UnitReleasePolicy) -> AllocationEngine {
    let data_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let repository = DatasetImporter::from_dir(data_dir).expect("sample dataset imports");
    AllocationEngine::with_policy(repository, policy)
}

fn user(raw: &str) -> UserId {
    UserId::new(raw)
}

fn march_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

#[test]
fn application_to_booking_end_to_end() {
    let mut engine = engine(UnitReleasePolicy::Retain);
    let acacia = engine
        .repository()
        .project_by_name("Acacia Breeze")
        .expect("acacia")
        .id();

    let application = engine
        .apply(&user(SARAH), acacia, FlatType::ThreeRoom, march_first())
        .expect("married applicant applies");
    engine
        .approve_application(&user(JESSICA), application)
        .expect("manager approves");
    let receipt = engine
        .book_flat(&user(DANIEL), &user(SARAH))
        .expect("assigned officer books");

    assert_eq!(receipt.project_name, "Acacia Breeze");
    assert_eq!(receipt.price, 450_000);
    assert_eq!(
        engine
            .repository()
            .project(acacia)
            .expect("project")
            .remaining_units(FlatType::ThreeRoom),
        2
    );

    let report = engine
        .generate_report(&user(JESSICA), "flat_type", "3-room")
        .expect("report");
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].status, ApplicationStatus::Booked);

    let err = engine
        .delete_project(&user(JESSICA), acacia)
        .expect_err("booked flats pin the project");
    assert_eq!(err, WorkflowError::ProjectHasBookings(acacia));
}

#[test]
fn withdrawn_applicant_can_apply_elsewhere() {
    let mut engine = engine(UnitReleasePolicy::Restock);
    let acacia = engine
        .repository()
        .project_by_name("Acacia Breeze")
        .expect("acacia")
        .id();

    let application = engine
        .apply(&user(JOHN), acacia, FlatType::TwoRoom, march_first())
        .expect("single applicant, 2-Room");
    engine
        .request_withdrawal(&user(JOHN))
        .expect("withdrawal requested");
    engine
        .approve_withdrawal(&user(JESSICA), application)
        .expect("withdrawal approved");

    let boon_lay = engine
        .repository()
        .project_by_name("Boon Lay Glade")
        .expect("boon lay")
        .id();
    let april = NaiveDate::from_ymd_opt(2025, 4, 10).expect("valid date");
    engine
        .apply(&user(JOHN), boon_lay, FlatType::TwoRoom, april)
        .expect("free to apply again");
}

#[test]
fn young_single_applicant_sees_no_eligible_flats() {
    let engine = engine(UnitReleasePolicy::Retain);
    let listings = engine
        .list_eligible_projects(&user(RACHEL), &ProjectCriteria::default())
        .expect("listing");

    assert_eq!(listings.len(), 3);
    assert!(listings
        .iter()
        .all(|listing| listing.lowest_eligible_price.is_none()));
    assert!(listings
        .iter()
        .flat_map(|listing| listing.flats.iter())
        .all(|flat| !flat.eligible));
}
