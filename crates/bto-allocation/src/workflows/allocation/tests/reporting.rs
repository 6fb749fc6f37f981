use serde_json::json;

use super::common::*;
use crate::workflows::allocation::{
    AllocationEngine, ErrorKind, FlatOffer, FlatType, ProjectCriteria, ProjectDraft, ProjectId,
    ProjectSort, ReportFilter, ReportFilterError,
};

fn engine_with_applications() -> (AllocationEngine, ProjectId) {
    let (mut engine, project) = engine();
    for (applicant, flat_type) in [
        (SINGLE_35, FlatType::TwoRoom),
        (MARRIED_40, FlatType::ThreeRoom),
        (MARRIED_21, FlatType::TwoRoom),
    ] {
        engine
            .apply(&id(applicant), project, flat_type, today())
            .expect("apply");
    }
    (engine, project)
}

fn birch_grove() -> ProjectDraft {
    let mut birch = draft("Birch Grove", date(2025, 2, 1), date(2025, 4, 30), 4, 0);
    birch.neighbourhood = "Tampines".to_string();
    birch.flats.insert(
        FlatType::TwoRoom,
        FlatOffer {
            units: 4,
            price: 300_000,
        },
    );
    birch
}

#[test]
fn age_filter_is_inclusive() {
    let (engine, _) = engine_with_applications();
    let report = engine
        .generate_report(&id(MANAGER), "age", "30-40")
        .expect("report");

    assert!(report.is_filtered());
    assert_eq!(report.filter, ReportFilter::AgeRange { min: 30, max: 40 });
    let mut names: Vec<_> = report
        .entries
        .iter()
        .map(|entry| entry.applicant_name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, vec!["John", "Sarah"]);
}

#[test]
fn malformed_filter_returns_everything() {
    let (engine, _) = engine_with_applications();
    let report = engine
        .generate_report(&id(MANAGER), "age", "abc")
        .expect("report still produced");

    assert!(!report.is_filtered());
    assert_eq!(report.entries.len(), 3);
    assert_eq!(
        report.invalid_filter,
        Some(ReportFilterError::InvalidValue {
            category: "age",
            value: "abc".to_string(),
        })
    );
}

#[test]
fn report_json_matches_cli_output_shape() {
    let (engine, _) = engine_with_applications();

    let filtered = engine
        .generate_report(&id(MANAGER), "age", "30-40")
        .expect("report");
    let json = serde_json::to_value(&filtered).expect("report serializes");
    assert_eq!(
        json["filter"],
        json!({ "category": "age_range", "value": { "min": 30, "max": 40 } })
    );
    assert!(json.get("invalid_filter").is_none());
    assert_eq!(json["entries"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["entries"][0]["status"], "pending");

    let fallback = engine
        .generate_report(&id(MANAGER), "age", "abc")
        .expect("report");
    let json = serde_json::to_value(&fallback).expect("report serializes");
    assert_eq!(json["filter"], json!({ "category": "none" }));
    assert_eq!(
        json["invalid_filter"],
        json!({ "invalid_value": { "category": "age", "value": "abc" } })
    );
    assert_eq!(json["entries"].as_array().map(Vec::len), Some(3));
}

#[test]
fn marital_and_flat_type_filters() {
    let (engine, _) = engine_with_applications();

    let married = engine
        .generate_report(&id(MANAGER), "marital", "married")
        .expect("report");
    assert_eq!(married.entries.len(), 2);

    let three_room = engine
        .generate_report(&id(MANAGER), "flat_type", "3-Room")
        .expect("report");
    assert_eq!(three_room.entries.len(), 1);
    assert_eq!(three_room.entries[0].applicant_name, "Sarah");

    let elsewhere = engine
        .generate_report(&id(MANAGER), "neighbourhood", "Tampines")
        .expect("report");
    assert!(elsewhere.entries.is_empty());
}

#[test]
fn report_only_covers_the_managers_projects() {
    let (engine, _) = engine_with_applications();
    let report = engine
        .generate_report(&id(OTHER_MANAGER), "none", "")
        .expect("report");
    assert!(report.entries.is_empty());

    let err = engine
        .generate_report(&id(SINGLE_35), "none", "")
        .expect_err("applicants cannot report");
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn listings_sort_by_name_descending_by_default() {
    let (mut engine, _) = engine();
    engine
        .create_project(&id(OTHER_MANAGER), birch_grove())
        .expect("birch grove");

    let names: Vec<_> = engine
        .list_eligible_projects(&id(SINGLE_35), &ProjectCriteria::default())
        .expect("listing")
        .into_iter()
        .map(|listing| listing.name)
        .collect();
    assert_eq!(names, vec!["Birch Grove", "Acacia Breeze"]);
}

#[test]
fn listings_sort_by_lowest_eligible_price() {
    let (mut engine, _) = engine();
    engine
        .create_project(&id(OTHER_MANAGER), birch_grove())
        .expect("birch grove");

    let criteria = ProjectCriteria {
        sort: ProjectSort::PriceAscending,
        ..ProjectCriteria::default()
    };
    let listings = engine
        .list_eligible_projects(&id(SINGLE_35), &criteria)
        .expect("listing");
    let prices: Vec<_> = listings
        .iter()
        .map(|listing| (listing.name.as_str(), listing.lowest_eligible_price))
        .collect();
    assert_eq!(
        prices,
        vec![
            ("Birch Grove", Some(300_000)),
            ("Acacia Breeze", Some(350_000))
        ]
    );

    let acacia = &listings[1];
    let three_room = acacia
        .flats
        .iter()
        .find(|flat| flat.flat_type == FlatType::ThreeRoom)
        .expect("3-Room offered");
    assert!(!three_room.eligible);
}

#[test]
fn listings_apply_neighbourhood_and_flat_type_criteria() {
    let (mut engine, _) = engine();
    engine
        .create_project(&id(OTHER_MANAGER), birch_grove())
        .expect("birch grove");

    let tampines = ProjectCriteria {
        neighbourhood: Some("tampines".to_string()),
        ..ProjectCriteria::default()
    };
    let names: Vec<_> = engine
        .list_eligible_projects(&id(MARRIED_40), &tampines)
        .expect("listing")
        .into_iter()
        .map(|listing| listing.name)
        .collect();
    assert_eq!(names, vec!["Birch Grove"]);

    let three_room = ProjectCriteria {
        flat_types: vec![FlatType::ThreeRoom],
        ..ProjectCriteria::default()
    };
    let names: Vec<_> = engine
        .list_eligible_projects(&id(MARRIED_40), &three_room)
        .expect("listing")
        .into_iter()
        .map(|listing| listing.name)
        .collect();
    assert_eq!(names, vec!["Acacia Breeze"]);
}

#[test]
fn hidden_project_stays_listed_for_its_applicants() {
    let (mut engine, project) = engine();
    engine
        .apply(&id(MARRIED_40), project, FlatType::TwoRoom, today())
        .expect("apply");
    engine
        .set_visibility(&id(MANAGER), project, false)
        .expect("hide");

    let own = engine
        .list_eligible_projects(&id(MARRIED_40), &ProjectCriteria::default())
        .expect("listing");
    assert_eq!(own.len(), 1);
    assert!(!own[0].visible);

    assert!(engine
        .list_eligible_projects(&id(SINGLE_35), &ProjectCriteria::default())
        .expect("listing")
        .is_empty());
}
