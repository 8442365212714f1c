//! Teacher selection for a single `(day, slot)`.
//!
//! Resolution never touches the tracker; committing a resolved teacher is a
//! separate call to [`TeacherTracker::commit`]. Block placement relies on this
//! to test both halves of a pair before taking either.

use crate::eligibility::is_eligible;
use crate::random::RandomSource;
use crate::tracker::TeacherTracker;
use types::{Day, GradeId, SubjectId, Teacher, TeacherId};

#[derive(Clone, Copy, Debug)]
pub struct PickRequest<'a> {
    pub subject: &'a SubjectId,
    pub grade: &'a GradeId,
    pub day: Day,
    pub slot: usize,
    /// Restricts the pick to one teacher (a manual pin or the class's
    /// already-committed teacher for this subject).
    pub required: Option<&'a TeacherId>,
}

pub fn candidates<'a>(
    teachers: &'a [Teacher],
    tracker: &TeacherTracker,
    req: &PickRequest<'_>,
) -> Vec<&'a Teacher> {
    teachers
        .iter()
        .filter(|t| req.required.map_or(true, |r| &t.id == r))
        .filter(|t| is_eligible(t, req.subject, req.grade))
        .filter(|t| !t.is_unavailable(req.day, req.slot))
        .filter(|t| tracker.under_cap(t))
        .filter(|t| tracker.is_free(&t.id, req.day, req.slot))
        .collect()
}

/// Uniform random choice among [`candidates`]; `None` means the cell cannot
/// take this subject right now.
pub fn try_resolve<R: RandomSource + ?Sized>(
    teachers: &[Teacher],
    tracker: &TeacherTracker,
    req: &PickRequest<'_>,
    rng: &mut R,
) -> Option<TeacherId> {
    let cands = candidates(teachers, tracker, req);
    if cands.is_empty() {
        return None;
    }
    let i = rng.pick_index(cands.len()) % cands.len();
    Some(cands[i].id.clone())
}
