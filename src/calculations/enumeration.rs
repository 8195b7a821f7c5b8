use crate::calculations::conflict::conflicts;
use crate::catalog::{Course, Group, Section};
use crate::schedule::{ScheduledSection, SearchLimits};
use rayon::prelude::*;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Instant;

/// Every way of picking one group per course. The first course is the
/// outermost choice and the last course varies fastest.
pub struct GroupCombinations<'a> {
    courses: &'a [Arc<Course>],
    cursor: Option<Vec<usize>>,
}

impl<'a> GroupCombinations<'a> {
    pub fn new(courses: &'a [Arc<Course>]) -> Self {
        let cursor = if courses.iter().any(|course| course.groups.is_empty()) {
            None
        } else {
            Some(vec![0; courses.len()])
        };
        Self { courses, cursor }
    }
}

impl<'a> Iterator for GroupCombinations<'a> {
    type Item = Vec<(&'a Arc<Course>, &'a Group)>;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.cursor.as_mut()?;
        let combination = self
            .courses
            .iter()
            .zip(indices.iter())
            .map(|(course, &idx)| (course, &course.groups[idx]))
            .collect();

        // Advance the odometer; rolling over the first course ends the sequence.
        let mut exhausted = true;
        for position in (0..indices.len()).rev() {
            indices[position] += 1;
            if indices[position] < self.courses[position].groups.len() {
                exhausted = false;
                break;
            }
            indices[position] = 0;
        }
        if exhausted {
            self.cursor = None;
        }
        Some(combination)
    }
}

/// One section list that must contribute exactly one section.
struct Slot<'a> {
    course: &'a Arc<Course>,
    sections: &'a [Arc<Section>],
}

fn slots_for<'a>(combination: &[(&'a Arc<Course>, &'a Group)]) -> Vec<Slot<'a>> {
    combination
        .iter()
        .flat_map(|&(course, group)| {
            group.slots.iter().map(move |slot| Slot {
                course,
                sections: slot.sections.as_slice(),
            })
        })
        .collect()
}

struct Collector {
    candidates: Vec<Vec<ScheduledSection>>,
    max_results: Option<usize>,
    deadline: Option<Instant>,
    truncated: bool,
}

impl Collector {
    fn new(limits: &SearchLimits) -> Self {
        Self {
            candidates: Vec::new(),
            max_results: limits.max_results,
            deadline: limits.timeout().map(|timeout| Instant::now() + timeout),
            truncated: false,
        }
    }

    fn unbounded() -> Self {
        Self::new(&SearchLimits::default())
    }

    fn past_deadline(&mut self) -> bool {
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.truncated = true;
        }
        self.truncated
    }

    /// Reaching `max_results` ends the search at once.
    fn at_capacity(&mut self) -> bool {
        if self
            .max_results
            .is_some_and(|max| self.candidates.len() >= max)
        {
            self.truncated = true;
        }
        self.truncated
    }

    fn accept(&mut self, candidate: Vec<ScheduledSection>) -> ControlFlow<()> {
        self.candidates.push(candidate);
        if self.at_capacity() || self.past_deadline() {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}

/// Depth-first fill of `assigned`, one entry per slot. Entries before `depth`
/// form the committed partial schedule.
fn assign<'a>(
    slots: &[Slot<'a>],
    depth: usize,
    assigned: &mut [Option<&'a Arc<Section>>],
    collector: &mut Collector,
) -> ControlFlow<()> {
    if depth == slots.len() {
        let candidate = slots
            .iter()
            .zip(assigned.iter())
            .filter_map(|(slot, section)| {
                section.map(|section| ScheduledSection {
                    course: Arc::clone(slot.course),
                    section: Arc::clone(section),
                })
            })
            .collect();
        return collector.accept(candidate);
    }

    for section in slots[depth].sections {
        let admissible = assigned[..depth]
            .iter()
            .flatten()
            .all(|committed| !conflicts(section, committed));
        if !admissible {
            continue;
        }
        assigned[depth] = Some(section);
        let flow = assign(slots, depth + 1, assigned, collector);
        assigned[depth] = None;
        flow?;
    }
    ControlFlow::Continue(())
}

fn search_combination(
    combination: &[(&Arc<Course>, &Group)],
    collector: &mut Collector,
) -> ControlFlow<()> {
    let slots = slots_for(combination);
    let mut assigned = vec![None; slots.len()];
    assign(&slots, 0, &mut assigned, collector)
}

#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    pub candidates: Vec<Vec<ScheduledSection>>,
    /// Set when a limit stopped the search. The candidates found so far may
    /// be every candidate there is when the cap is hit on the last one.
    pub truncated: bool,
}

pub struct Enumerator<'a> {
    courses: &'a [Arc<Course>],
    limits: SearchLimits,
    parallel: bool,
}

impl<'a> Enumerator<'a> {
    pub fn new(courses: &'a [Arc<Course>]) -> Self {
        Self {
            courses,
            limits: SearchLimits::default(),
            parallel: true,
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Forces a single-threaded search even when no limits are set.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn execute(&self) -> Enumeration {
        if self.parallel && self.limits.is_unbounded() {
            self.execute_parallel()
        } else {
            self.execute_sequential()
        }
    }

    fn execute_sequential(&self) -> Enumeration {
        let mut collector = Collector::new(&self.limits);
        for combination in GroupCombinations::new(self.courses) {
            if collector.at_capacity() || collector.past_deadline() {
                break;
            }
            if search_combination(&combination, &mut collector).is_break() {
                break;
            }
        }
        Enumeration {
            candidates: collector.candidates,
            truncated: collector.truncated,
        }
    }

    fn execute_parallel(&self) -> Enumeration {
        let combinations: Vec<_> = GroupCombinations::new(self.courses).collect();
        // Per-combination results are concatenated in combination order.
        let per_combination: Vec<Vec<Vec<ScheduledSection>>> = combinations
            .par_iter()
            .map(|combination| {
                let mut collector = Collector::unbounded();
                let _ = search_combination(combination, &mut collector);
                collector.candidates
            })
            .collect();
        Enumeration {
            candidates: per_combination.into_iter().flatten().collect(),
            truncated: false,
        }
    }
}

pub fn enumerate(courses: &[Arc<Course>]) -> Vec<Vec<ScheduledSection>> {
    Enumerator::new(courses).execute().candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Meeting;
    use chrono::Weekday;

    fn course_with_groups(code: &str, groups: usize) -> Arc<Course> {
        let mut course = Course::new("TST", code, "Test", 1.0);
        for idx in 0..groups {
            course.add_group(Group::new().with_section(
                Section::new(format!("{idx:03}"), "LEC", "Staff")
                    .with_meeting(Meeting::new([Weekday::Sat], idx as f64, idx as f64 + 0.5)),
            ));
        }
        Arc::new(course)
    }

    #[test]
    fn group_combinations_vary_last_course_fastest() {
        let courses = vec![course_with_groups("100", 2), course_with_groups("200", 3)];
        let picks: Vec<Vec<String>> = GroupCombinations::new(&courses)
            .map(|combo| {
                combo
                    .iter()
                    .map(|(course, group)| {
                        format!("{}:{}", course.code, group.slots[0].sections[0].number)
                    })
                    .collect()
            })
            .collect();
        assert_eq!(picks.len(), 6);
        assert_eq!(picks[0], vec!["100:000", "200:000"]);
        assert_eq!(picks[1], vec!["100:000", "200:001"]);
        assert_eq!(picks[3], vec!["100:001", "200:000"]);
    }

    #[test]
    fn no_courses_yield_one_empty_combination() {
        let courses: Vec<Arc<Course>> = Vec::new();
        let combos: Vec<_> = GroupCombinations::new(&courses).collect();
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn course_without_groups_yields_nothing() {
        let courses = vec![course_with_groups("100", 2), course_with_groups("200", 0)];
        assert_eq!(GroupCombinations::new(&courses).count(), 0);
        assert!(enumerate(&courses).is_empty());
    }
}
