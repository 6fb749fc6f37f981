//! Stateless eligibility rules for flat-type applications.

use super::domain::{FlatType, MaritalStatus, Project, User};

pub const MARRIED_MINIMUM_AGE: u8 = 21;
pub const SINGLE_MINIMUM_AGE: u8 = 35;

/// Whether `applicant` may apply for `flat_type` in `project` right now.
///
/// Browsing visibility is the caller's concern. Inventory is part of the check, so the
/// answer can change between listing a project and applying to it.
pub fn is_eligible(applicant: &User, project: &Project, flat_type: FlatType) -> bool {
    if project.remaining_units(flat_type) == 0 {
        return false;
    }
    qualifies_for(applicant, flat_type)
}

/// Marital status and age rule, independent of any project's inventory.
pub fn qualifies_for(applicant: &User, flat_type: FlatType) -> bool {
    match applicant.marital_status {
        MaritalStatus::Married => applicant.age >= MARRIED_MINIMUM_AGE,
        MaritalStatus::Single => {
            applicant.age >= SINGLE_MINIMUM_AGE && flat_type == FlatType::TwoRoom
        }
    }
}

pub fn eligible_flat_types(applicant: &User, project: &Project) -> Vec<FlatType> {
    FlatType::ordered()
        .into_iter()
        .filter(|flat_type| is_eligible(applicant, project, *flat_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::workflows::allocation::domain::{
        FlatOffer, ProjectDraft, ProjectId, Role, UserId,
    };

    fn applicant(age: u8, marital_status: MaritalStatus) -> User {
        User::new(
            UserId::new("S1234567A"),
            "Test Applicant",
            age,
            marital_status,
            Role::Applicant,
        )
    }

    fn project(two_room: u32, three_room: u32) -> Project {
        let mut flats = BTreeMap::new();
        flats.insert(
            FlatType::TwoRoom,
            FlatOffer {
                units: two_room,
                price: 350_000,
            },
        );
        flats.insert(
            FlatType::ThreeRoom,
            FlatOffer {
                units: three_room,
                price: 450_000,
            },
        );
        let draft = ProjectDraft {
            name: "Acacia Breeze".to_string(),
            neighbourhood: "Yishun".to_string(),
            flats,
            opening: NaiveDate::from_ymd_opt(2025, 2, 15).expect("valid"),
            closing: NaiveDate::from_ymd_opt(2025, 3, 20).expect("valid"),
            officer_slots: 3,
            visible: true,
        };
        Project::from_draft(ProjectId(1), draft, UserId::new("T8765432F")).expect("valid draft")
    }

    #[test]
    fn married_at_twenty_one_is_eligible_for_last_two_room_unit() {
        let project = project(1, 0);
        assert!(is_eligible(
            &applicant(21, MaritalStatus::Married),
            &project,
            FlatType::TwoRoom
        ));
    }

    #[test]
    fn single_below_thirty_five_is_not_eligible() {
        let project = project(5, 5);
        assert!(!is_eligible(
            &applicant(34, MaritalStatus::Single),
            &project,
            FlatType::TwoRoom
        ));
    }

    #[test]
    fn single_applicants_are_limited_to_two_room() {
        let project = project(5, 5);
        let single = applicant(35, MaritalStatus::Single);
        assert!(is_eligible(&single, &project, FlatType::TwoRoom));
        assert!(!is_eligible(&single, &project, FlatType::ThreeRoom));
    }

    #[test]
    fn married_below_twenty_one_is_not_eligible() {
        let project = project(5, 5);
        let married = applicant(20, MaritalStatus::Married);
        assert!(!is_eligible(&married, &project, FlatType::TwoRoom));
        assert!(!is_eligible(&married, &project, FlatType::ThreeRoom));
    }

    #[test]
    fn sold_out_flat_types_are_never_eligible() {
        let project = project(0, 2);
        let married = applicant(40, MaritalStatus::Married);
        assert!(!is_eligible(&married, &project, FlatType::TwoRoom));
        assert_eq!(
            eligible_flat_types(&married, &project),
            vec![FlatType::ThreeRoom]
        );
    }
}
