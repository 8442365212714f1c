use sched_core::pick::{try_resolve, PickRequest};
use sched_core::random::RandomSource;
use sched_core::tracker::TeacherTracker;
use std::collections::{BTreeSet, HashMap};
use types::{ClassRef, Day, GenerateRequest, Grid, Subject, SubjectId, TeacherId};

/// Per-class state of one run. Day counts, placed days and the class's
/// teacher per subject never leak into another class; the tracker is the only
/// state shared across classes.
pub(crate) struct ClassContext<'a> {
    pub req: &'a GenerateRequest,
    pub class: &'a ClassRef,
    pub slots: usize,
    pub grid: Grid,
    day_counts: HashMap<(Day, SubjectId), u32>,
    placed_days: HashMap<SubjectId, BTreeSet<Day>>,
    class_teacher: HashMap<SubjectId, TeacherId>,
}

impl<'a> ClassContext<'a> {
    pub fn new(req: &'a GenerateRequest, class: &'a ClassRef) -> Self {
        let class_teacher = req
            .subjects
            .iter()
            .filter_map(|s| {
                req.assignments
                    .pinned(&class.key, &s.id)
                    .map(|t| (s.id.clone(), t.clone()))
            })
            .collect();
        let slots = req.school.slots();
        Self {
            req,
            class,
            slots,
            grid: Grid::empty(slots),
            day_counts: HashMap::new(),
            placed_days: HashMap::new(),
            class_teacher,
        }
    }

    /// Subjects with weekly hours for this class's grade, in input order.
    pub fn demand(&self) -> Vec<(&'a Subject, u32)> {
        let req: &'a GenerateRequest = self.req;
        req.subjects
            .iter()
            .map(|s| (s, s.hours_for(&self.class.grade)))
            .filter(|&(_, h)| h > 0)
            .collect()
    }

    pub fn day_count(&self, day: Day, subject: &SubjectId) -> u32 {
        self.day_counts
            .get(&(day, subject.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn days_placed(&self, subject: &SubjectId) -> u32 {
        self.placed_days.get(subject).map_or(0, |d| d.len() as u32)
    }

    /// Same-subject cells directly before `slot`, looking back at most `window`.
    pub fn run_before(&self, day: Day, slot: usize, subject: &SubjectId, window: usize) -> u32 {
        let cells = self.grid.day(day);
        (1..=window.min(slot))
            .take_while(|k| cells[slot - k].holds(subject))
            .count() as u32
    }

    pub fn run_after(&self, day: Day, slot: usize, subject: &SubjectId) -> u32 {
        self.grid
            .day(day)
            .iter()
            .skip(slot + 1)
            .take_while(|c| c.holds(subject))
            .count() as u32
    }

    /// Trial pick for one cell, bound to the class's teacher for the subject
    /// once one is pinned or committed.
    pub fn resolve<R: RandomSource + ?Sized>(
        &self,
        tracker: &TeacherTracker,
        subject: &SubjectId,
        day: Day,
        slot: usize,
        rng: &mut R,
    ) -> Option<TeacherId> {
        let req = PickRequest {
            subject,
            grade: &self.class.grade,
            day,
            slot,
            required: self.class_teacher.get(subject),
        };
        try_resolve(&self.req.teachers, tracker, &req, rng)
    }

    pub fn place(
        &mut self,
        tracker: &mut TeacherTracker,
        day: Day,
        slot: usize,
        subject: &SubjectId,
        teacher: &TeacherId,
    ) {
        self.grid.place(day, slot, subject.clone(), teacher.clone());
        tracker.commit(teacher, day, slot);
        *self.day_counts.entry((day, subject.clone())).or_default() += 1;
        self.placed_days
            .entry(subject.clone())
            .or_default()
            .insert(day);
        self.class_teacher
            .entry(subject.clone())
            .or_insert_with(|| teacher.clone());
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }
}
