use super::common::*;
use crate::workflows::allocation::{EnquiryId, ErrorKind, WorkflowError};

#[test]
fn enquiries_get_sequential_ids_per_project() {
    let (mut engine, project) = engine();
    let first = engine
        .submit_enquiry(&id(SINGLE_35), project, "Is there a carpark?")
        .expect("submit");
    let second = engine
        .submit_enquiry(&id(MARRIED_40), project, "  When is the ballot?  ")
        .expect("submit");

    assert_eq!(first, EnquiryId(1));
    assert_eq!(second, EnquiryId(2));
    let enquiries = engine.project_enquiries(project).expect("project");
    assert_eq!(enquiries[1].message(), "When is the ballot?");
    assert!(!enquiries[1].is_replied());
}

#[test]
fn blank_messages_are_rejected() {
    let (mut engine, project) = engine();
    let err = engine
        .submit_enquiry(&id(SINGLE_35), project, "   ")
        .expect_err("blank");
    assert_eq!(err, WorkflowError::EmptyMessage);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(engine.project_enquiries(project).expect("project").is_empty());
}

#[test]
fn author_edits_and_deletes_open_enquiry() {
    let (mut engine, project) = engine();
    let enquiry = engine
        .submit_enquiry(&id(SINGLE_35), project, "Is there a carpark?")
        .expect("submit");

    engine
        .edit_enquiry(&id(SINGLE_35), project, enquiry, "Is there a sheltered carpark?")
        .expect("edit");
    assert_eq!(
        engine.project_enquiries(project).expect("project")[0].message(),
        "Is there a sheltered carpark?"
    );

    let err = engine
        .delete_enquiry(&id(MARRIED_40), project, enquiry)
        .expect_err("not the author");
    assert_eq!(err.kind(), ErrorKind::Authorization);

    engine
        .delete_enquiry(&id(SINGLE_35), project, enquiry)
        .expect("delete");
    assert!(engine.enquiries_by(&id(SINGLE_35)).expect("user").is_empty());
}

#[test]
fn replied_enquiry_is_frozen() {
    let (mut engine, project) = engine();
    let enquiry = engine
        .submit_enquiry(&id(SINGLE_35), project, "Is there a carpark?")
        .expect("submit");
    engine
        .reply_to_enquiry(&id(MANAGER), project, enquiry, "Yes, multi-storey.")
        .expect("manager replies");

    let err = engine
        .edit_enquiry(&id(SINGLE_35), project, enquiry, "Changed question")
        .expect_err("already replied");
    assert_eq!(err, WorkflowError::AlreadyReplied(enquiry));
    let err = engine
        .delete_enquiry(&id(SINGLE_35), project, enquiry)
        .expect_err("already replied");
    assert_eq!(err, WorkflowError::AlreadyReplied(enquiry));

    let stored = &engine.project_enquiries(project).expect("project")[0];
    assert_eq!(stored.message(), "Is there a carpark?");
    assert_eq!(stored.reply(), Some("Yes, multi-storey."));
}

#[test]
fn only_project_staff_may_reply() {
    let (mut engine, project) = engine();
    let enquiry = engine
        .submit_enquiry(&id(SINGLE_35), project, "Is there a carpark?")
        .expect("submit");

    let err = engine
        .reply_to_enquiry(&id(OFFICER), project, enquiry, "Yes")
        .expect_err("officer not assigned yet");
    assert_eq!(err.kind(), ErrorKind::Authorization);
    let err = engine
        .reply_to_enquiry(&id(OTHER_MANAGER), project, enquiry, "Yes")
        .expect_err("another manager's project");
    assert_eq!(err.kind(), ErrorKind::Authorization);

    assign_officer(&mut engine, project, OFFICER);
    engine
        .reply_to_enquiry(&id(OFFICER), project, enquiry, "Yes")
        .expect("assigned officer replies");

    let err = engine
        .reply_to_enquiry(&id(OFFICER), project, EnquiryId(9), "Yes")
        .expect_err("unknown enquiry");
    assert_eq!(
        err,
        WorkflowError::EnquiryNotFound {
            project,
            enquiry: EnquiryId(9),
        }
    );
}

#[test]
fn enquiries_by_collects_across_projects() {
    let (mut engine, first) = engine();
    let second = engine
        .create_project(
            &id(OTHER_MANAGER),
            draft("Birch Grove", date(2025, 2, 1), date(2025, 4, 30), 1, 1),
        )
        .expect("second project");
    engine
        .submit_enquiry(&id(SINGLE_35), first, "First question")
        .expect("submit");
    engine
        .submit_enquiry(&id(SINGLE_35), second, "Second question")
        .expect("submit");
    engine
        .submit_enquiry(&id(MARRIED_40), second, "Someone else")
        .expect("submit");

    let mine: Vec<_> = engine
        .enquiries_by(&id(SINGLE_35))
        .expect("user")
        .into_iter()
        .map(|enquiry| (enquiry.project(), enquiry.message().to_string()))
        .collect();
    assert_eq!(
        mine,
        vec![
            (first, "First question".to_string()),
            (second, "Second question".to_string())
        ]
    );
}
