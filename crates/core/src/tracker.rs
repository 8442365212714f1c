use std::collections::{HashMap, HashSet};
use types::{Day, Teacher, TeacherId};

/// Cross-class teacher bookkeeping for one generation run.
///
/// Created fresh by every run and dropped with it. Occupancy stops a teacher
/// from being in two classes at the same `(day, slot)`; load counts committed
/// lessons against `maxHours`.
#[derive(Clone, Debug, Default)]
pub struct TeacherTracker {
    occupied: HashMap<TeacherId, HashSet<(Day, usize)>>,
    load: HashMap<TeacherId, u32>,
}

impl TeacherTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self, teacher: &TeacherId, day: Day, slot: usize) -> bool {
        self.occupied
            .get(teacher)
            .map_or(true, |slots| !slots.contains(&(day, slot)))
    }

    pub fn commit(&mut self, teacher: &TeacherId, day: Day, slot: usize) {
        if self
            .occupied
            .entry(teacher.clone())
            .or_default()
            .insert((day, slot))
        {
            *self.load.entry(teacher.clone()).or_default() += 1;
        }
    }

    pub fn load(&self, teacher: &TeacherId) -> u32 {
        self.load.get(teacher).copied().unwrap_or(0)
    }

    pub fn under_cap(&self, teacher: &Teacher) -> bool {
        self.has_capacity(teacher, 1)
    }

    /// Whether `hours` more lessons still fit under the teacher's weekly cap.
    pub fn has_capacity(&self, teacher: &Teacher, hours: u32) -> bool {
        teacher.max_hours == 0 || self.load(&teacher.id) + hours <= teacher.max_hours
    }
}
