use crate::catalog::{Catalog, Course, Department, Meeting, Section};
use std::collections::HashSet;
use std::fmt;

const DAY_HOURS: f64 = 24.0;

#[derive(Debug, Clone)]
pub struct CatalogValidationError {
    message: String,
}

impl CatalogValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CatalogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CatalogValidationError {}

fn validate_meeting(
    course: &Course,
    section: &Section,
    meeting: &Meeting,
) -> Result<(), CatalogValidationError> {
    if !meeting.start.is_finite() || !meeting.end.is_finite() {
        return Err(CatalogValidationError::new(format!(
            "section {} {} has a non-finite meeting time",
            course.label(),
            section.number
        )));
    }
    if meeting.start < 0.0 || meeting.end > DAY_HOURS {
        return Err(CatalogValidationError::new(format!(
            "section {} {} meets outside the day ({}-{})",
            course.label(),
            section.number,
            meeting.start,
            meeting.end
        )));
    }
    if meeting.start > meeting.end {
        return Err(CatalogValidationError::new(format!(
            "section {} {} has a meeting ending before it starts ({}-{})",
            course.label(),
            section.number,
            meeting.start,
            meeting.end
        )));
    }
    Ok(())
}

pub fn validate_course(course: &Course) -> Result<(), CatalogValidationError> {
    if course.code.trim().is_empty() {
        return Err(CatalogValidationError::new(format!(
            "department {} has a course without a code",
            course.department
        )));
    }
    if !course.credits.is_finite() || course.credits < 0.0 {
        return Err(CatalogValidationError::new(format!(
            "course {} has invalid credits {}",
            course.label(),
            course.credits
        )));
    }

    if course.groups.is_empty() {
        return Err(CatalogValidationError::new(format!(
            "course {} has no groups",
            course.label()
        )));
    }

    for (group_idx, group) in course.groups.iter().enumerate() {
        if group.is_empty() {
            return Err(CatalogValidationError::new(format!(
                "course {} group #{} has no sections",
                course.label(),
                group_idx
            )));
        }
        let mut kinds = HashSet::with_capacity(group.slots.len());
        for slot in &group.slots {
            if !kinds.insert(slot.kind.as_str()) {
                return Err(CatalogValidationError::new(format!(
                    "course {} group #{} lists section type '{}' twice",
                    course.label(),
                    group_idx,
                    slot.kind
                )));
            }
            if slot.sections.is_empty() {
                return Err(CatalogValidationError::new(format!(
                    "course {} group #{} has no '{}' sections",
                    course.label(),
                    group_idx,
                    slot.kind
                )));
            }
            let mut numbers = HashSet::with_capacity(slot.sections.len());
            for section in &slot.sections {
                if section.kind != slot.kind {
                    return Err(CatalogValidationError::new(format!(
                        "section {} {} is typed '{}' but listed under '{}'",
                        course.label(),
                        section.number,
                        section.kind,
                        slot.kind
                    )));
                }
                if !numbers.insert(section.number.as_str()) {
                    return Err(CatalogValidationError::new(format!(
                        "course {} has duplicate {} section {}",
                        course.label(),
                        slot.kind,
                        section.number
                    )));
                }
                let meetings = section.meetings();
                for (idx, meeting) in meetings.iter().enumerate() {
                    validate_meeting(course, section, meeting)?;
                    if meetings[idx + 1..].iter().any(|other| meeting.overlaps(other)) {
                        return Err(CatalogValidationError::new(format!(
                            "section {} {} has overlapping meetings",
                            course.label(),
                            section.number
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

fn validate_department(key: &str, department: &Department) -> Result<(), CatalogValidationError> {
    if department.name != key {
        return Err(CatalogValidationError::new(format!(
            "department stored under '{}' is named '{}'",
            key, department.name
        )));
    }
    if department.courses.is_empty() {
        return Err(CatalogValidationError::new(format!(
            "department {} has no courses",
            department.name
        )));
    }
    for (code, course) in &department.courses {
        if course.code != *code || course.department != department.name {
            return Err(CatalogValidationError::new(format!(
                "course stored under {}-{} is labelled {}",
                department.name,
                code,
                course.label()
            )));
        }
        validate_course(course)?;
    }
    Ok(())
}

pub fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogValidationError> {
    for (key, department) in &catalog.departments {
        validate_department(key, department)?;
    }
    Ok(())
}
