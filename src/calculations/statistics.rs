use crate::catalog::Section;
use serde::{Deserialize, Serialize};

/// Start time reported when a schedule has no meetings; no class starts this late.
pub const NO_START_SENTINEL: f64 = 24.0;
/// End time reported when a schedule has no meetings.
pub const NO_END_SENTINEL: f64 = 0.0;

/// Derived metrics of one schedule. Every meeting occurrence (a meeting on
/// one weekday) is one sample, so an `MWF` lecture counts three times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStatistics {
    pub earliest_time: f64,
    pub latest_time: f64,
    pub average_start: f64,
    pub average_end: f64,
    pub days_of_class: usize,
    /// Idle hours between consecutive meetings, summed over all days.
    pub gap_hours: f64,
    pub meeting_count: usize,
}

impl Default for ScheduleStatistics {
    fn default() -> Self {
        Self {
            earliest_time: NO_START_SENTINEL,
            latest_time: NO_END_SENTINEL,
            average_start: 0.0,
            average_end: 0.0,
            days_of_class: 0,
            gap_hours: 0.0,
            meeting_count: 0,
        }
    }
}

impl ScheduleStatistics {
    /// Computes statistics over the meetings of `sections`.
    ///
    /// Meetings on the same day are expected not to overlap, which holds for
    /// any schedule produced by the enumerator. With no meetings at all the
    /// sentinel values of [`ScheduleStatistics::default`] are returned.
    pub fn compute<'a, I>(sections: I) -> Self
    where
        I: IntoIterator<Item = &'a Section>,
    {
        let mut per_day: [Vec<(f64, f64)>; 7] = Default::default();
        for section in sections {
            for meeting in section.meetings() {
                for day in &meeting.days {
                    per_day[day.num_days_from_monday() as usize].push((meeting.start, meeting.end));
                }
            }
        }

        let mut stats = Self::default();
        let mut start_total = 0.0;
        let mut end_total = 0.0;
        for occurrences in per_day.iter_mut() {
            if occurrences.is_empty() {
                continue;
            }
            stats.days_of_class += 1;
            occurrences.sort_by(|a, b| a.0.total_cmp(&b.0));
            for &(start, end) in occurrences.iter() {
                stats.earliest_time = stats.earliest_time.min(start);
                stats.latest_time = stats.latest_time.max(end);
                start_total += start;
                end_total += end;
                stats.meeting_count += 1;
            }
            stats.gap_hours += occurrences
                .windows(2)
                .map(|pair| (pair[1].0 - pair[0].1).max(0.0))
                .sum::<f64>();
        }

        if stats.meeting_count > 0 {
            let samples = stats.meeting_count as f64;
            stats.average_start = start_total / samples;
            stats.average_end = end_total / samples;
        }
        stats
    }

    /// True when there were no meetings to measure and every field is a sentinel.
    pub fn is_empty(&self) -> bool {
        self.meeting_count == 0
    }

    /// Hours between the earliest start and the latest end.
    pub fn span(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.latest_time - self.earliest_time
        }
    }
}
