mod common;

use common::{lecture, recitation, sample_catalog};
use section_scheduler::{
    Catalog, CourseRequest, Department, Group, Course, RequestError, Section, resolve_requests,
    validate_catalog,
};
use std::sync::Arc;

fn single_course_catalog(course: Course) -> Catalog {
    Catalog::new().with_department(Department::new(course.department.clone()).with_course(course))
}

#[test]
fn groups_keep_section_types_in_discovery_order() {
    let catalog = sample_catalog();
    let cis = catalog.course("CIS", "120").unwrap();
    let group = &cis.groups[0];
    assert_eq!(group.kinds().collect::<Vec<_>>(), vec!["LEC", "REC"]);
    assert_eq!(group.sections_of("REC").len(), 3);
    assert_eq!(group.section_count(), 4);
    assert_eq!(cis.section("202").unwrap().kind, "REC");
    assert!(cis.group_of("202").is_some());
}

#[test]
fn empty_groups_are_not_added() {
    let mut course = Course::new("CIS", "121", "Data Structures", 1.0);
    assert!(!course.add_group(Group::new()));
    assert!(course.add_group(Group::new().with_section(lecture("001", "TR", 12.0, 13.5))));
    assert_eq!(course.groups.len(), 1);
}

#[test]
fn sample_catalog_is_valid() {
    assert!(validate_catalog(&sample_catalog()).is_ok());
}

#[test]
fn validation_rejects_inverted_meeting_times() {
    let course = Course::new("CIS", "160", "Discrete Math", 1.0)
        .with_group(Group::new().with_section(lecture("001", "MW", 14.0, 13.0)));
    let err = validate_catalog(&single_course_catalog(course)).unwrap_err();
    assert!(err.to_string().contains("CIS-160"), "{err}");
}

#[test]
fn validation_rejects_times_outside_the_day() {
    let course = Course::new("CIS", "160", "Discrete Math", 1.0)
        .with_group(Group::new().with_section(lecture("001", "MW", 23.0, 25.0)));
    assert!(validate_catalog(&single_course_catalog(course)).is_err());
}

#[test]
fn validation_rejects_duplicate_section_numbers() {
    let course = Course::new("CIS", "160", "Discrete Math", 1.0).with_group(
        Group::new()
            .with_section(recitation("201", "T", 9.0, 10.0))
            .with_section(recitation("201", "R", 9.0, 10.0)),
    );
    assert!(validate_catalog(&single_course_catalog(course)).is_err());
}

#[test]
fn validation_rejects_negative_credits() {
    let course = Course::new("CIS", "160", "Discrete Math", -1.0)
        .with_group(Group::new().with_section(lecture("001", "MW", 9.0, 10.0)));
    assert!(validate_catalog(&single_course_catalog(course)).is_err());
}

#[test]
fn validation_rejects_misfiled_courses() {
    let course = Course::new("MATH", "104", "Calculus", 1.0)
        .with_group(Group::new().with_section(lecture("001", "MW", 9.0, 10.0)));
    let catalog = Catalog::new().with_department(Department::new("CIS").with_course(course));
    assert!(validate_catalog(&catalog).is_err());
}

#[test]
fn tba_sections_pass_validation() {
    let course = Course::new("WRIT", "039", "Writing Seminar", 1.0)
        .with_group(Group::new().with_section(Section::tba("301", "SEM", "Staff")));
    assert!(validate_catalog(&single_course_catalog(course)).is_ok());
}

#[test]
fn resolves_requests_in_first_mention_order() {
    let catalog = sample_catalog();
    let resolved =
        resolve_requests(&catalog, ["math 104", "CIS-120-202", "MATH-104", "writ039"]).unwrap();
    let labels: Vec<String> = resolved.courses.iter().map(|course| course.label()).collect();
    assert_eq!(labels, vec!["MATH-104", "CIS-120", "WRIT-039"]);
    assert_eq!(resolved.requests.len(), 4);
    assert_eq!(resolved.requests[1].section.as_deref(), Some("202"));
    assert!(Arc::ptr_eq(
        &resolved.courses[1],
        catalog.course("CIS", "120").unwrap()
    ));
}

#[test]
fn reports_every_unresolved_request() {
    let catalog = sample_catalog();
    let errors =
        resolve_requests(&catalog, ["CIS-120", "PHYS-150", "CIS-999", "CIS-120-999", "???"])
            .unwrap_err();
    assert_eq!(
        errors,
        vec![
            RequestError::UnknownDepartment("PHYS".into()),
            RequestError::UnknownCourse {
                department: "CIS".into(),
                course: "999".into(),
            },
            RequestError::UnknownSection {
                department: "CIS".into(),
                course: "120".into(),
                section: "999".into(),
            },
            RequestError::Malformed("???".into()),
        ]
    );
}

#[test]
fn course_request_displays_canonically() {
    let request = CourseRequest::parse(" cis 120 001 ").unwrap();
    assert_eq!(request.to_string(), "CIS-120-001");
}

#[test]
fn validation_rejects_courses_without_groups() {
    let course = Course::new("CIS", "190", "Placeholder", 0.5);
    let err = validate_catalog(&single_course_catalog(course)).unwrap_err();
    assert!(err.to_string().contains("CIS-190 has no groups"), "{err}");
}

#[test]
fn validation_rejects_departments_without_courses() {
    let catalog = sample_catalog().with_department(Department::new("PHYS"));
    let err = validate_catalog(&catalog).unwrap_err();
    assert!(err.to_string().contains("PHYS has no courses"), "{err}");
}

#[test]
fn validation_rejects_overlapping_meetings_within_a_section() {
    let lab = Section::new("101", "LAB", "TA")
        .with_meeting(common::meeting("T", 13.0, 15.0))
        .with_meeting(common::meeting("TR", 14.0, 16.0));
    let course = Course::new("CHEM", "101", "Chemistry", 1.0)
        .with_group(Group::new().with_section(lab));
    let err = validate_catalog(&single_course_catalog(course)).unwrap_err();
    assert!(err.to_string().contains("overlapping meetings"), "{err}");

    let split = Section::new("102", "LAB", "TA")
        .with_meeting(common::meeting("T", 13.0, 14.0))
        .with_meeting(common::meeting("T", 14.0, 16.0));
    let course = Course::new("CHEM", "101", "Chemistry", 1.0)
        .with_group(Group::new().with_section(split));
    assert!(validate_catalog(&single_course_catalog(course)).is_ok());
}

#[test]
fn requests_with_trailing_text_resolve_to_the_course() {
    let catalog = sample_catalog();
    let resolved = resolve_requests(&catalog, ["CIS-120-", "cis 120 lecture", "MATH104A"]).unwrap();
    let labels: Vec<String> = resolved.courses.iter().map(|course| course.label()).collect();
    assert_eq!(labels, vec!["CIS-120", "MATH-104"]);
    assert!(resolved.requests.iter().all(|request| request.section.is_none()));
}
