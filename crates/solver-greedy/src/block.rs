//! Two-slot block placement.
//!
//! Runs before the regular phase so pairs of adjacent free cells still exist.
//! Greedy and forward-only: once a pair is taken the scan moves past it and
//! never revisits earlier choices.

use crate::context::ClassContext;
use sched_core::random::RandomSource;
use sched_core::tracker::TeacherTracker;
use tracing::debug;
use types::{Day, Subject, TeacherId};

pub(crate) fn place_blocks<R: RandomSource + ?Sized>(
    ctx: &mut ClassContext<'_>,
    tracker: &mut TeacherTracker,
    rng: &mut R,
) {
    for (subject, count) in ctx.demand() {
        if subject.prefers_block() {
            place_subject(ctx, tracker, subject, count, rng);
        }
    }
}

fn place_subject<R: RandomSource + ?Sized>(
    ctx: &mut ClassContext<'_>,
    tracker: &mut TeacherTracker,
    subject: &Subject,
    count: u32,
    rng: &mut R,
) {
    let blocks_needed = count / 2;
    let single_needed = count % 2;
    let mut blocks = 0u32;

    'days: for day in Day::ALL {
        let mut si = 0;
        while si + 1 < ctx.slots {
            if blocks == blocks_needed {
                break 'days;
            }
            match pair_teacher(ctx, tracker, subject, day, si, rng) {
                Some(teacher) => {
                    ctx.place(tracker, day, si, &subject.id, &teacher);
                    ctx.place(tracker, day, si + 1, &subject.id, &teacher);
                    blocks += 1;
                    si += 2;
                }
                None => si += 1,
            }
        }
    }

    let residual = count - 2 * blocks;
    let single_placed = single_needed == 1 && residual > 0 && place_single(ctx, tracker, subject, rng);
    if blocks < blocks_needed || (single_needed == 1 && !single_placed) {
        debug!(
            class = %ctx.class.key,
            subject = %subject.id,
            blocks,
            blocks_needed,
            single_placed,
            "block subject under-filled"
        );
    }
}

/// Teacher for the pair `(si, si + 1)`, or `None` if the pair is not usable.
fn pair_teacher<R: RandomSource + ?Sized>(
    ctx: &ClassContext<'_>,
    tracker: &TeacherTracker,
    subject: &Subject,
    day: Day,
    si: usize,
    rng: &mut R,
) -> Option<TeacherId> {
    let id = &subject.id;
    if !ctx.grid.is_free(day, si) || !ctx.grid.is_free(day, si + 1) {
        return None;
    }
    if subject.avoids(si) || subject.avoids(si + 1) {
        return None;
    }
    if subject
        .per_day_max()
        .is_some_and(|max| ctx.day_count(day, id) + 2 > max)
    {
        return None;
    }
    if let Some(cap) = subject.max_consecutive() {
        let run = ctx.run_before(day, si, id, usize::MAX) + 2 + ctx.run_after(day, si + 1, id);
        if run > cap {
            return None;
        }
    }

    // Without a class teacher the two trials are independent and must agree.
    let first = ctx.resolve(tracker, id, day, si, rng)?;
    let second = ctx.resolve(tracker, id, day, si + 1, rng)?;
    if first != second {
        return None;
    }
    let teacher = ctx.req.teacher(&first)?;
    tracker.has_capacity(teacher, 2).then_some(first)
}

/// Odd remainder: first free, non-avoided cell in week order. It may sit next
/// to a block of the same subject as long as `maxConsecutive` still holds.
fn place_single<R: RandomSource + ?Sized>(
    ctx: &mut ClassContext<'_>,
    tracker: &mut TeacherTracker,
    subject: &Subject,
    rng: &mut R,
) -> bool {
    let id = &subject.id;
    for day in Day::ALL {
        if subject
            .per_day_max()
            .is_some_and(|max| ctx.day_count(day, id) + 1 > max)
        {
            continue;
        }
        for slot in 0..ctx.slots {
            if !ctx.grid.is_free(day, slot) || subject.avoids(slot) {
                continue;
            }
            if let Some(cap) = subject.max_consecutive() {
                let run = ctx.run_before(day, slot, id, usize::MAX) + 1 + ctx.run_after(day, slot, id);
                if run > cap {
                    continue;
                }
            }
            if let Some(teacher) = ctx.resolve(tracker, id, day, slot, rng) {
                ctx.place(tracker, day, slot, id, &teacher);
                return true;
            }
        }
    }
    false
}
