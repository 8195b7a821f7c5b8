use crate::catalog::{Catalog, Course};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// One free-text request such as `cis 120`, `CIS-120-001` or `MATH104`.
/// Only the leading identifier is read; trailing text is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRequest {
    pub department: String,
    pub course: String,
    pub section: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    Malformed(String),
    UnknownDepartment(String),
    UnknownCourse { department: String, course: String },
    UnknownSection {
        department: String,
        course: String,
        section: String,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Malformed(input) => {
                write!(f, "'{input}' is not a course identifier like CIS-120 or CIS-120-001")
            }
            RequestError::UnknownDepartment(department) => {
                write!(f, "unknown department {department}")
            }
            RequestError::UnknownCourse { department, course } => {
                write!(f, "unknown course {department}-{course}")
            }
            RequestError::UnknownSection {
                department,
                course,
                section,
            } => write!(f, "unknown section {department}-{course}-{section}"),
        }
    }
}

impl std::error::Error for RequestError {}

fn request_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<dept>[A-Z]+)[^A-Z\d]*(?P<course>\d+)[^A-Z\d]*(?P<section>\d+)?")
            .expect("course request pattern is valid")
    })
}

impl CourseRequest {
    pub fn parse(input: &str) -> Result<Self, RequestError> {
        let normalized = input.trim().to_uppercase();
        let captures = request_pattern()
            .captures(&normalized)
            .ok_or_else(|| RequestError::Malformed(input.trim().to_string()))?;
        Ok(Self {
            department: captures["dept"].to_string(),
            course: captures["course"].to_string(),
            section: captures.name("section").map(|m| m.as_str().to_string()),
        })
    }

    pub fn resolve(&self, catalog: &Catalog) -> Result<Arc<Course>, RequestError> {
        let department = catalog
            .department(&self.department)
            .ok_or_else(|| RequestError::UnknownDepartment(self.department.clone()))?;
        let course = department
            .course(&self.course)
            .ok_or_else(|| RequestError::UnknownCourse {
                department: self.department.clone(),
                course: self.course.clone(),
            })?;
        if let Some(section) = &self.section {
            if course.section(section).is_none() {
                return Err(RequestError::UnknownSection {
                    department: self.department.clone(),
                    course: self.course.clone(),
                    section: section.clone(),
                });
            }
        }
        Ok(Arc::clone(course))
    }
}

impl fmt::Display for CourseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.department, self.course)?;
        if let Some(section) = &self.section {
            write!(f, "-{section}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedRequest {
    /// Requested courses in first-mention order, without duplicates.
    pub courses: Vec<Arc<Course>>,
    pub requests: Vec<CourseRequest>,
}

/// Resolves every input against `catalog`. All failing inputs are reported
/// together. A section-qualified request schedules its whole course.
pub fn resolve_requests<I, S>(
    catalog: &Catalog,
    inputs: I,
) -> Result<ResolvedRequest, Vec<RequestError>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut resolved = ResolvedRequest::default();
    let mut errors = Vec::new();
    for input in inputs {
        let outcome = CourseRequest::parse(input.as_ref())
            .and_then(|request| request.resolve(catalog).map(|course| (request, course)));
        match outcome {
            Ok((request, course)) => {
                if !resolved
                    .courses
                    .iter()
                    .any(|existing| Arc::ptr_eq(existing, &course))
                {
                    resolved.courses.push(course);
                }
                resolved.requests.push(request);
            }
            Err(err) => errors.push(err),
        }
    }
    if errors.is_empty() {
        Ok(resolved)
    } else {
        Err(errors)
    }
}
