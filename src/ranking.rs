use crate::calculations::statistics::ScheduleStatistics;
use crate::schedule::{Schedule, SearchError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Three-way ordering over two schedules' statistics; `Less` ranks first.
pub type ComparatorFn = fn(&ScheduleStatistics, &ScheduleStatistics) -> Ordering;

/// Finish as early in the day as possible.
pub fn early(a: &ScheduleStatistics, b: &ScheduleStatistics) -> Ordering {
    a.latest_time
        .total_cmp(&b.latest_time)
        .then_with(|| a.average_end.total_cmp(&b.average_end))
}

/// Start as late in the day as possible.
pub fn late(a: &ScheduleStatistics, b: &ScheduleStatistics) -> Ordering {
    b.earliest_time
        .total_cmp(&a.earliest_time)
        .then_with(|| b.average_start.total_cmp(&a.average_start))
}

/// Smallest span between first start and last end.
pub fn compact(a: &ScheduleStatistics, b: &ScheduleStatistics) -> Ordering {
    a.span().total_cmp(&b.span())
}

pub fn min_gaps(a: &ScheduleStatistics, b: &ScheduleStatistics) -> Ordering {
    a.gap_hours.total_cmp(&b.gap_hours)
}

pub fn min_days(a: &ScheduleStatistics, b: &ScheduleStatistics) -> Ordering {
    a.days_of_class.cmp(&b.days_of_class)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "early")]
    Early,
    #[serde(rename = "late")]
    Late,
    #[serde(rename = "compact")]
    Compact,
    #[serde(rename = "minGaps", alias = "min_gaps")]
    MinGaps,
    #[serde(rename = "minDays", alias = "min_days")]
    MinDays,
}

impl Comparator {
    pub const ALL: [Comparator; 5] = [
        Comparator::Early,
        Comparator::Late,
        Comparator::Compact,
        Comparator::MinGaps,
        Comparator::MinDays,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Early => "early",
            Comparator::Late => "late",
            Comparator::Compact => "compact",
            Comparator::MinGaps => "minGaps",
            Comparator::MinDays => "minDays",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Comparator::Early => "Finish earliest (latest end, then average end)",
            Comparator::Late => "Start latest (earliest start, then average start)",
            Comparator::Compact => "Smallest span between first start and last end",
            Comparator::MinGaps => "Fewest idle hours between classes",
            Comparator::MinDays => "Fewest days on campus",
        }
    }

    pub fn variants() -> impl Iterator<Item = (&'static str, &'static str)> {
        Self::ALL
            .iter()
            .map(|comparator| (comparator.as_str(), comparator.description()))
    }

    pub fn function(&self) -> ComparatorFn {
        match self {
            Comparator::Early => early,
            Comparator::Late => late,
            Comparator::Compact => compact,
            Comparator::MinGaps => min_gaps,
            Comparator::MinDays => min_days,
        }
    }

    pub fn compare(&self, a: &ScheduleStatistics, b: &ScheduleStatistics) -> Ordering {
        (self.function())(a, b)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "").to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|comparator| comparator.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| SearchError::InvalidComparatorName(s.to_string()))
    }
}

pub fn resolve_comparator(name: &str) -> Result<Comparator, SearchError> {
    name.parse()
}

/// Stable sort by `primary`, falling back to `secondary` on exact ties.
/// Schedules tied on both keep their incoming order.
pub fn rank(
    mut schedules: Vec<Schedule>,
    primary: ComparatorFn,
    secondary: ComparatorFn,
) -> Vec<Schedule> {
    schedules.sort_by(|a, b| {
        primary(a.statistics(), b.statistics())
            .then_with(|| secondary(a.statistics(), b.statistics()))
    });
    schedules
}
