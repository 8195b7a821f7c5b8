use super::{PersistenceError, PersistenceResult};
use crate::catalog::{
    Catalog, Course, Department, Group, Meeting, Section, format_day_codes, parse_day_codes,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

const SNAPSHOT_VERSION: u32 = 1;
const TERM_ROW_MARKER: &str = "__term__";

fn snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Serialize, Deserialize)]
struct CatalogSnapshot {
    #[serde(default = "snapshot_version")]
    version: u32,
    #[serde(flatten)]
    catalog: Catalog,
}

pub fn save_catalog_to_json<P: AsRef<Path>>(catalog: &Catalog, path: P) -> PersistenceResult<()> {
    super::validate_catalog(catalog)?;
    let snapshot = CatalogSnapshot {
        version: SNAPSHOT_VERSION,
        catalog: catalog.clone(),
    };
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    info!(
        path = %path.as_ref().display(),
        departments = catalog.departments.len(),
        courses = catalog.course_count(),
        "catalog saved as json"
    );
    Ok(())
}

pub fn load_catalog_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Catalog> {
    let file = File::open(path.as_ref())?;
    let snapshot: CatalogSnapshot = serde_json::from_reader(file)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(PersistenceError::InvalidData(format!(
            "snapshot version {} is newer than supported version {}",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    super::validate_catalog(&snapshot.catalog)?;
    info!(
        path = %path.as_ref().display(),
        departments = snapshot.catalog.departments.len(),
        courses = snapshot.catalog.course_count(),
        "catalog loaded from json"
    );
    Ok(snapshot.catalog)
}

/// One meeting per row. TBA sections and sections without meetings get a
/// single row with empty days and times.
#[derive(Debug, Default, Serialize, Deserialize)]
struct MeetingCsvRecord {
    department: String,
    course: String,
    course_name: String,
    credits: String,
    group: String,
    section: String,
    kind: String,
    instructor: String,
    tba: String,
    days: String,
    start: String,
    end: String,
    location: String,
    #[serde(default)]
    semester: String,
    #[serde(default)]
    year: String,
}

impl MeetingCsvRecord {
    fn term_row(catalog: &Catalog) -> Self {
        Self {
            department: TERM_ROW_MARKER.to_string(),
            semester: catalog.semester.clone().unwrap_or_default(),
            year: catalog.year.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    fn is_term_row(&self) -> bool {
        self.department == TERM_ROW_MARKER
    }

    fn for_section(course: &Course, group_idx: usize, section: &Section) -> Self {
        Self {
            department: course.department.clone(),
            course: course.code.clone(),
            course_name: course.name.clone(),
            credits: course.credits.to_string(),
            group: group_idx.to_string(),
            section: section.number.clone(),
            kind: section.kind.clone(),
            instructor: section.instructor.clone(),
            tba: section.is_tba().to_string(),
            ..Self::default()
        }
    }

    fn with_meeting(mut self, meeting: &Meeting) -> Self {
        self.days = format_day_codes(&meeting.days);
        self.start = meeting.start.to_string();
        self.end = meeting.end.to_string();
        self.location = meeting.location.clone().unwrap_or_default();
        self
    }

    fn meeting(&self) -> PersistenceResult<Option<Meeting>> {
        if self.start.trim().is_empty() && self.end.trim().is_empty() {
            return Ok(None);
        }
        let days = parse_day_codes(&self.days)
            .map_err(|err| PersistenceError::InvalidData(format!("invalid days '{}': {err}", self.days)))?;
        let start = parse_f64(&self.start)?;
        let end = parse_f64(&self.end)?;
        let mut meeting = Meeting::new(days, start, end);
        if !self.location.trim().is_empty() {
            meeting.location = Some(self.location.trim().to_string());
        }
        Ok(Some(meeting))
    }
}

pub fn save_catalog_to_csv<P: AsRef<Path>>(catalog: &Catalog, path: P) -> PersistenceResult<()> {
    super::validate_catalog(catalog)?;
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(MeetingCsvRecord::term_row(catalog))?;
    let mut rows = 0usize;
    for department in catalog.departments() {
        for course in department.courses.values() {
            for (group_idx, group) in course.groups.iter().enumerate() {
                for section in group.sections() {
                    let meetings = section.meetings();
                    if meetings.is_empty() {
                        writer.serialize(MeetingCsvRecord::for_section(course, group_idx, section))?;
                        rows += 1;
                        continue;
                    }
                    for meeting in meetings {
                        writer.serialize(
                            MeetingCsvRecord::for_section(course, group_idx, section)
                                .with_meeting(meeting),
                        )?;
                        rows += 1;
                    }
                }
            }
        }
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), rows, "catalog saved as csv");
    Ok(())
}

struct CourseDraft {
    course: Course,
    groups: Vec<(String, Vec<Section>)>,
}

impl CourseDraft {
    fn section_mut(&mut self, record: &MeetingCsvRecord) -> PersistenceResult<&mut Section> {
        let group_pos = match self.groups.iter().position(|(key, _)| *key == record.group) {
            Some(pos) => pos,
            None => {
                self.groups.push((record.group.clone(), Vec::new()));
                self.groups.len() - 1
            }
        };
        let sections = &mut self.groups[group_pos].1;
        let tba = parse_bool(&record.tba)?;
        let existing = sections
            .iter()
            .position(|s| s.number == record.section && s.kind == record.kind);
        let pos = match existing {
            Some(pos) => pos,
            None => {
                let section = if tba {
                    Section::tba(&record.section, &record.kind, &record.instructor)
                } else {
                    Section::new(&record.section, &record.kind, &record.instructor)
                };
                sections.push(section);
                sections.len() - 1
            }
        };
        Ok(&mut sections[pos])
    }

    fn into_course(self) -> Course {
        let mut course = self.course;
        for (_, sections) in self.groups {
            let mut group = Group::new();
            for section in sections {
                group.add_section(section);
            }
            course.add_group(group);
        }
        course
    }
}

pub fn load_catalog_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Catalog> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::Reader::from_reader(file);
    let mut catalog = Catalog::new();
    let mut drafts: Vec<CourseDraft> = Vec::new();
    let mut saw_term_row = false;

    for record in reader.deserialize::<MeetingCsvRecord>() {
        let record = record?;
        if record.is_term_row() {
            if saw_term_row {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple term rows".into(),
                ));
            }
            saw_term_row = true;
            catalog.semester = parse_string_option(record.semester);
            catalog.year = parse_string_option(record.year);
            continue;
        }
        if record.department.trim().is_empty() || record.course.trim().is_empty() {
            return Err(PersistenceError::InvalidData(
                "CSV row is missing department or course".into(),
            ));
        }

        let draft_pos = match drafts.iter().position(|d| {
            d.course.department == record.department && d.course.code == record.course
        }) {
            Some(pos) => pos,
            None => {
                let credits = parse_f64(&record.credits)?;
                drafts.push(CourseDraft {
                    course: Course::new(
                        &record.department,
                        &record.course,
                        &record.course_name,
                        credits,
                    ),
                    groups: Vec::new(),
                });
                drafts.len() - 1
            }
        };
        let meeting = record.meeting()?;
        let section = drafts[draft_pos].section_mut(&record)?;
        if let Some(meeting) = meeting {
            section.add_meeting(meeting);
        }
    }

    if drafts.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no sections".into(),
        ));
    }

    for draft in drafts {
        let course = draft.into_course();
        debug!(course = %course.label(), groups = course.groups.len(), "course rebuilt from csv");
        match catalog.departments.get_mut(&course.department) {
            Some(department) => department.add_course(course),
            None => catalog.add_department(Department::new(&course.department).with_course(course)),
        }
    }

    super::validate_catalog(&catalog)?;
    info!(
        path = %path.as_ref().display(),
        departments = catalog.departments.len(),
        courses = catalog.course_count(),
        "catalog loaded from csv"
    );
    Ok(catalog)
}

fn parse_f64(input: &str) -> PersistenceResult<f64> {
    input
        .trim()
        .parse::<f64>()
        .map_err(|e| PersistenceError::InvalidData(format!("invalid number '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "false" => Ok(false),
        "true" => Ok(true),
        other => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{other}'"
        ))),
    }
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
