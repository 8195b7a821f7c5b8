use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Every weekday a meeting can fall on, in calendar order.
pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCodeError {
    code: char,
}

impl fmt::Display for DayCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown day code '{}' (expected one of M, T, W, R, F, S, U)",
            self.code
        )
    }
}

impl std::error::Error for DayCodeError {}

/// Registrar single-letter code for a weekday (`R` is Thursday, `U` Sunday).
pub fn day_code(day: Weekday) -> char {
    match day {
        Weekday::Mon => 'M',
        Weekday::Tue => 'T',
        Weekday::Wed => 'W',
        Weekday::Thu => 'R',
        Weekday::Fri => 'F',
        Weekday::Sat => 'S',
        Weekday::Sun => 'U',
    }
}

/// Parses a day pattern such as `MWF` or `TR`. Whitespace is ignored.
pub fn parse_day_codes(input: &str) -> Result<Vec<Weekday>, DayCodeError> {
    let mut days = Vec::with_capacity(input.len());
    for code in input.chars().filter(|c| !c.is_whitespace()) {
        let day = match code.to_ascii_uppercase() {
            'M' => Weekday::Mon,
            'T' => Weekday::Tue,
            'W' => Weekday::Wed,
            'R' => Weekday::Thu,
            'F' => Weekday::Fri,
            'S' => Weekday::Sat,
            'U' => Weekday::Sun,
            _ => return Err(DayCodeError { code }),
        };
        days.push(day);
    }
    Ok(normalize_days(days))
}

pub fn format_day_codes(days: &[Weekday]) -> String {
    days.iter().copied().map(day_code).collect()
}

fn normalize_days(mut days: Vec<Weekday>) -> Vec<Weekday> {
    days.sort_by_key(|d| d.num_days_from_monday());
    days.dedup();
    days
}

fn deserialize_days<'de, D>(deserializer: D) -> Result<Vec<Weekday>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Vec::<Weekday>::deserialize(deserializer).map(normalize_days)
}

/// One weekly meeting pattern. Times are hours on a 24-hour clock, so 13.5 is 1:30 PM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(deserialize_with = "deserialize_days")]
    pub days: Vec<Weekday>,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Meeting {
    pub fn new<I>(days: I, start: f64, end: f64) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self {
            days: normalize_days(days.into_iter().collect()),
            start,
            end,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn meets_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A single offering of a course component (lecture, recitation, lab, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub number: String,
    pub instructor: String,
    pub kind: String,
    /// `None` means the meeting pattern is to be announced.
    pub meetings: Option<Vec<Meeting>>,
}

impl Section {
    pub fn new(
        number: impl Into<String>,
        kind: impl Into<String>,
        instructor: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            instructor: instructor.into(),
            kind: kind.into(),
            meetings: Some(Vec::new()),
        }
    }

    pub fn tba(
        number: impl Into<String>,
        kind: impl Into<String>,
        instructor: impl Into<String>,
    ) -> Self {
        Self {
            meetings: None,
            ..Self::new(number, kind, instructor)
        }
    }

    pub fn with_meeting(mut self, meeting: Meeting) -> Self {
        self.add_meeting(meeting);
        self
    }

    /// Appends a meeting. Has no effect on a TBA section.
    pub fn add_meeting(&mut self, meeting: Meeting) {
        if let Some(meetings) = self.meetings.as_mut() {
            meetings.push(meeting);
        }
    }

    pub fn is_tba(&self) -> bool {
        self.meetings.is_none()
    }

    pub fn meetings(&self) -> &[Meeting] {
        self.meetings.as_deref().unwrap_or(&[])
    }
}

/// All sections of one type inside a group, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSlot {
    pub kind: String,
    pub sections: Vec<Arc<Section>>,
}

/// A bundle of sections that must be chosen together: a schedule picks one
/// section of every type from the same group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub slots: Vec<SectionSlot>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.add_section(section);
        self
    }

    pub fn add_section(&mut self, section: Section) {
        let section = Arc::new(section);
        match self.slots.iter_mut().find(|slot| slot.kind == section.kind) {
            Some(slot) => slot.sections.push(section),
            None => self.slots.push(SectionSlot {
                kind: section.kind.clone(),
                sections: vec![section],
            }),
        }
    }

    pub fn sections_of(&self, kind: &str) -> &[Arc<Section>] {
        self.slots
            .iter()
            .find(|slot| slot.kind == kind)
            .map(|slot| slot.sections.as_slice())
            .unwrap_or(&[])
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.kind.as_str())
    }

    pub fn sections(&self) -> impl Iterator<Item = &Arc<Section>> {
        self.slots.iter().flat_map(|slot| slot.sections.iter())
    }

    pub fn section_count(&self) -> usize {
        self.slots.iter().map(|slot| slot.sections.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.section_count() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub department: String,
    pub code: String,
    pub name: String,
    pub credits: f64,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Course {
    pub fn new(
        department: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        credits: f64,
    ) -> Self {
        Self {
            department: department.into(),
            code: code.into(),
            name: name.into(),
            credits,
            groups: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.add_group(group);
        self
    }

    /// Adds a group, dropping it when it holds no sections. Returns whether it was kept.
    pub fn add_group(&mut self, group: Group) -> bool {
        if group.is_empty() {
            return false;
        }
        self.groups.push(group);
        true
    }

    /// `DEPT-CODE`, the label the registrar prints for a course.
    pub fn label(&self) -> String {
        format!("{}-{}", self.department, self.code)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Arc<Section>> {
        self.groups.iter().flat_map(Group::sections)
    }

    pub fn section(&self, number: &str) -> Option<&Arc<Section>> {
        self.sections().find(|section| section.number == number)
    }

    pub fn group_of(&self, number: &str) -> Option<&Group> {
        self.groups
            .iter()
            .find(|group| group.sections().any(|section| section.number == number))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    #[serde(default)]
    pub courses: BTreeMap<String, Arc<Course>>,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            courses: BTreeMap::new(),
        }
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.add_course(course);
        self
    }

    pub fn add_course(&mut self, course: Course) {
        self.courses.insert(course.code.clone(), Arc::new(course));
    }

    pub fn course(&self, code: &str) -> Option<&Arc<Course>> {
        self.courses.get(code)
    }
}

/// Immutable snapshot of one term's offerings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default)]
    pub departments: BTreeMap<String, Department>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, semester: impl Into<String>, year: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self.year = Some(year.into());
        self
    }

    pub fn with_department(mut self, department: Department) -> Self {
        self.add_department(department);
        self
    }

    pub fn add_department(&mut self, department: Department) {
        self.departments.insert(department.name.clone(), department);
    }

    pub fn department(&self, name: &str) -> Option<&Department> {
        self.departments.get(name)
    }

    pub fn departments(&self) -> impl Iterator<Item = &Department> {
        self.departments.values()
    }

    pub fn course(&self, department: &str, code: &str) -> Option<&Arc<Course>> {
        self.department(department)?.course(code)
    }

    pub fn course_count(&self) -> usize {
        self.departments.values().map(|d| d.courses.len()).sum()
    }

    pub fn term_label(&self) -> Option<String> {
        match (&self.semester, &self.year) {
            (Some(semester), Some(year)) => Some(format!("{semester} {year}")),
            (Some(semester), None) => Some(semester.clone()),
            (None, Some(year)) => Some(year.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_codes_parse_and_normalize() {
        let days = parse_day_codes("FWM").unwrap();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(format_day_codes(&days), "MWF");
        assert_eq!(parse_day_codes("TR").unwrap(), vec![Weekday::Tue, Weekday::Thu]);
        assert!(parse_day_codes("MX").is_err());
    }

    #[test]
    fn group_keeps_type_discovery_order() {
        let group = Group::new()
            .with_section(Section::new("201", "REC", "TA"))
            .with_section(Section::new("001", "LEC", "Prof"))
            .with_section(Section::new("202", "REC", "TA"));
        let kinds: Vec<&str> = group.kinds().collect();
        assert_eq!(kinds, vec!["REC", "LEC"]);
        assert_eq!(group.sections_of("REC").len(), 2);
        assert_eq!(group.section_count(), 3);
    }

    #[test]
    fn empty_groups_are_dropped() {
        let mut course = Course::new("CIS", "120", "Programming", 1.0);
        assert!(!course.add_group(Group::new()));
        assert!(course.groups.is_empty());
    }

    #[test]
    fn deserialized_days_are_sorted_and_unique() {
        let meeting: Meeting =
            serde_json::from_str(r#"{"days": ["Wed", "Mon", "Mon"], "start": 9.0, "end": 10.0}"#)
                .unwrap();
        assert_eq!(meeting.days, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn tba_section_ignores_added_meetings() {
        let mut section = Section::tba("001", "LEC", "Staff");
        section.add_meeting(Meeting::new([Weekday::Mon], 9.0, 10.0));
        assert!(section.is_tba());
        assert!(section.meetings().is_empty());
    }
}
