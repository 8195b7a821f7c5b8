use crate::calculations::conflict::conflicts;
use crate::calculations::enumeration::Enumerator;
use crate::calculations::statistics::ScheduleStatistics;
use crate::catalog::{Course, Section};
use crate::ranking::{self, Comparator, resolve_comparator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    InvalidComparatorName(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidComparatorName(name) => write!(
                f,
                "unknown comparator '{name}' (expected one of early, late, compact, minGaps, minDays)"
            ),
        }
    }
}

impl std::error::Error for SearchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    ConflictingSections { first: String, second: String },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::ConflictingSections { first, second } => {
                write!(f, "sections {first} and {second} meet at the same time")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// A section picked for a schedule, together with the course it belongs to.
#[derive(Debug, Clone)]
pub struct ScheduledSection {
    pub course: Arc<Course>,
    pub section: Arc<Section>,
}

impl ScheduledSection {
    pub fn new(course: Arc<Course>, section: Arc<Section>) -> Self {
        Self { course, section }
    }

    /// `DEPT-CODE-SECTION`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.course.label(), self.section.number)
    }
}

/// One conflict-free selection of sections plus its derived statistics.
#[derive(Debug, Clone)]
pub struct Schedule {
    entries: Vec<ScheduledSection>,
    statistics: ScheduleStatistics,
}

impl Schedule {
    pub(crate) fn from_candidate(entries: Vec<ScheduledSection>) -> Self {
        let statistics = ScheduleStatistics::compute(entries.iter().map(|e| e.section.as_ref()));
        Self {
            entries,
            statistics,
        }
    }

    /// Builds a schedule from sections chosen outside the enumerator, rejecting
    /// any pair that meets at the same time.
    pub fn from_sections(entries: Vec<ScheduledSection>) -> Result<Self, ScheduleError> {
        for (idx, first) in entries.iter().enumerate() {
            for second in &entries[idx + 1..] {
                if conflicts(&first.section, &second.section) {
                    return Err(ScheduleError::ConflictingSections {
                        first: first.label(),
                        second: second.label(),
                    });
                }
            }
        }
        Ok(Self::from_candidate(entries))
    }

    pub fn entries(&self) -> &[ScheduledSection] {
        &self.entries
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.entries.iter().map(|entry| entry.section.as_ref())
    }

    pub fn statistics(&self) -> &ScheduleStatistics {
        &self.statistics
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_credits(&self) -> f64 {
        let mut seen: Vec<&Arc<Course>> = Vec::new();
        for entry in &self.entries {
            if !seen.iter().any(|course| Arc::ptr_eq(course, &entry.course)) {
                seen.push(&entry.course);
            }
        }
        seen.iter().map(|course| course.credits).sum()
    }

    /// Section labels in order, e.g. `CIS-120-001, CIS-120-201`.
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(ScheduledSection::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Optional bounds on the search. Limits stop enumeration between completed
/// schedules and apply before ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl SearchLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_results.is_none() && self.timeout_ms.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub schedules: Vec<Schedule>,
    pub truncated: bool,
}

/// Configurable search over a list of requested courses.
pub struct ScheduleSearch<'a> {
    courses: &'a [Arc<Course>],
    primary: Comparator,
    secondary: Comparator,
    limits: SearchLimits,
}

impl<'a> ScheduleSearch<'a> {
    pub fn new(courses: &'a [Arc<Course>]) -> Self {
        Self {
            courses,
            primary: Comparator::Early,
            secondary: Comparator::MinDays,
            limits: SearchLimits::default(),
        }
    }

    pub fn primary(mut self, comparator: Comparator) -> Self {
        self.primary = comparator;
        self
    }

    pub fn secondary(mut self, comparator: Comparator) -> Self {
        self.secondary = comparator;
        self
    }

    pub fn limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn run(&self) -> SearchOutcome {
        let enumeration = Enumerator::new(self.courses)
            .with_limits(self.limits)
            .execute();
        let schedules = enumeration
            .candidates
            .into_iter()
            .map(Schedule::from_candidate)
            .collect();
        SearchOutcome {
            schedules: ranking::rank(
                schedules,
                self.primary.function(),
                self.secondary.function(),
            ),
            truncated: enumeration.truncated,
        }
    }
}

/// Every conflict-free schedule for `courses`, best first. Comparator names
/// are checked before any search work starts. An empty result means no legal
/// combination exists.
pub fn find_schedules(
    courses: &[Arc<Course>],
    primary: &str,
    secondary: &str,
) -> Result<Vec<Schedule>, SearchError> {
    let primary = resolve_comparator(primary)?;
    let secondary = resolve_comparator(secondary)?;
    Ok(ScheduleSearch::new(courses)
        .primary(primary)
        .secondary(secondary)
        .run()
        .schedules)
}
