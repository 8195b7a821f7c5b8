use crate::catalog::{Meeting, Section};

impl Meeting {
    pub fn shares_day(&self, other: &Meeting) -> bool {
        self.days.iter().any(|day| other.days.contains(day))
    }

    /// Half-open `[start, end)` overlap on at least one common day.
    /// Back-to-back meetings do not overlap.
    pub fn overlaps(&self, other: &Meeting) -> bool {
        self.shares_day(other) && self.start < other.end && other.start < self.end
    }
}

/// Whether two sections meet at the same time on a shared day.
/// A TBA section never conflicts.
pub fn conflicts(a: &Section, b: &Section) -> bool {
    let (Some(left), Some(right)) = (a.meetings.as_deref(), b.meetings.as_deref()) else {
        return false;
    };
    left.iter().any(|m1| right.iter().any(|m2| m1.overlaps(m2)))
}

pub fn can_add_section<'a, I>(candidate: &Section, committed: I) -> bool
where
    I: IntoIterator<Item = &'a Section>,
{
    committed
        .into_iter()
        .all(|section| !conflicts(candidate, section))
}
