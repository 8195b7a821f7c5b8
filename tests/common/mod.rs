#![allow(dead_code)]

use section_scheduler::catalog::parse_day_codes;
use section_scheduler::{Catalog, Course, Department, Group, Meeting, Schedule, Section};
use std::sync::Arc;

pub fn meeting(days: &str, start: f64, end: f64) -> Meeting {
    Meeting::new(parse_day_codes(days).unwrap(), start, end)
}

pub fn lecture(number: &str, days: &str, start: f64, end: f64) -> Section {
    Section::new(number, "LEC", "Staff").with_meeting(meeting(days, start, end))
}

pub fn recitation(number: &str, days: &str, start: f64, end: f64) -> Section {
    Section::new(number, "REC", "TA").with_meeting(meeting(days, start, end))
}

/// CIS-120: one group, lecture MWF 10-11 plus recitations (203 clashes with the lecture).
/// MATH-104: group 1 has lectures TR 9-10:30 and MWF 12-13; group 2 has MW 15-16:30.
/// WRIT-039: a single seminar whose time is still to be announced.
pub fn sample_catalog() -> Catalog {
    let cis120 = Course::new("CIS", "120", "Programming Languages and Techniques I", 1.0)
        .with_group(
            Group::new()
                .with_section(lecture("001", "MWF", 10.0, 11.0).with_instructor("Zdancewic"))
                .with_section(recitation("201", "T", 9.0, 10.0))
                .with_section(recitation("202", "R", 13.0, 14.0))
                .with_section(recitation("203", "F", 10.0, 11.0)),
        );
    let math104 = Course::new("MATH", "104", "Calculus, Part I", 1.0)
        .with_group(
            Group::new()
                .with_section(lecture("001", "TR", 9.0, 10.5))
                .with_section(lecture("002", "MWF", 12.0, 13.0)),
        )
        .with_group(Group::new().with_section(lecture("003", "MW", 15.0, 16.5)));
    let writ039 = Course::new("WRIT", "039", "Writing Seminar", 1.0)
        .with_group(Group::new().with_section(Section::tba("301", "SEM", "Staff")));

    Catalog::new()
        .with_term("Fall", "2013")
        .with_department(Department::new("CIS").with_course(cis120))
        .with_department(Department::new("MATH").with_course(math104))
        .with_department(Department::new("WRIT").with_course(writ039))
}

pub fn courses(catalog: &Catalog, keys: &[(&str, &str)]) -> Vec<Arc<Course>> {
    keys.iter()
        .map(|(dept, code)| catalog.course(dept, code).unwrap().clone())
        .collect()
}

pub fn labels(schedules: &[Schedule]) -> Vec<String> {
    schedules.iter().map(Schedule::summary).collect()
}

trait WithInstructor {
    fn with_instructor(self, instructor: &str) -> Self;
}

impl WithInstructor for Section {
    fn with_instructor(mut self, instructor: &str) -> Self {
        self.instructor = instructor.to_string();
        self
    }
}
