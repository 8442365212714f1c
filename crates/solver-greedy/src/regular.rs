//! Single-slot placement of everything that is not block-scheduled.
//!
//! Demand is flattened into a shuffled pool of subject ids; empty cells are
//! visited in week order and take the first pool entry whose subject fits.
//! A cell nobody fits stays empty.

use crate::context::ClassContext;
use sched_core::random::{shuffle, RandomSource};
use sched_core::tracker::TeacherTracker;
use std::collections::HashSet;
use tracing::debug;
use types::{Day, Subject};

/// How far back the consecutive-run check looks. Caps of 4 or more are
/// therefore not fully enforced.
pub(crate) const CONSECUTIVE_LOOKBACK: usize = 3;

pub(crate) fn place_regular<R: RandomSource + ?Sized>(
    ctx: &mut ClassContext<'_>,
    tracker: &mut TeacherTracker,
    rng: &mut R,
) {
    let mut pool: Vec<&Subject> = Vec::new();
    for (subject, count) in ctx.demand() {
        if subject.prefers_block() {
            continue;
        }
        pool.extend(std::iter::repeat(subject).take(count as usize));
    }
    shuffle(&mut pool, rng);

    for day in Day::ALL {
        for slot in 0..ctx.slots {
            if pool.is_empty() {
                return;
            }
            if !ctx.grid.is_free(day, slot) {
                continue;
            }

            let mut tried = HashSet::new();
            let mut chosen = None;
            for (i, &subject) in pool.iter().enumerate() {
                if !tried.insert(&subject.id) || !fits(ctx, subject, day, slot) {
                    continue;
                }
                if let Some(teacher) = ctx.resolve(tracker, &subject.id, day, slot, rng) {
                    chosen = Some((i, teacher));
                    break;
                }
            }

            if let Some((i, teacher)) = chosen {
                let subject = pool.remove(i);
                ctx.place(tracker, day, slot, &subject.id, &teacher);
            }
        }
    }

    if !pool.is_empty() {
        debug!(class = %ctx.class.key, unplaced = pool.len(), "regular pool not exhausted");
    }
}

/// Subject rules for one cell, teacher aside.
fn fits(ctx: &ClassContext<'_>, subject: &Subject, day: Day, slot: usize) -> bool {
    let id = &subject.id;
    if subject.avoids(slot) {
        return false;
    }
    let today = ctx.day_count(day, id);
    if subject.per_day_max().is_some_and(|cap| today >= cap) {
        return false;
    }
    if subject
        .max_consecutive()
        .is_some_and(|cap| ctx.run_before(day, slot, id, CONSECUTIVE_LOOKBACK) >= cap)
    {
        return false;
    }
    if let Some(min_days) = subject.min_days() {
        // A second lesson today is refused while the rest of the week can
        // still bring the subject up to `min_days` distinct days.
        let distinct = ctx.days_placed(id);
        if today > 0 && distinct < min_days && distinct + day.remaining_after() as u32 >= min_days {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::random::FirstPick;
    use std::collections::BTreeMap;
    use types::{GenerateRequest, GradeSections, Grid, SchoolConfig, SlotLabel, SubjectRule, Teacher};

    fn subject(id: &str, hours: u32, rule: Option<SubjectRule>) -> Subject {
        Subject {
            id: id.into(),
            name: id.to_uppercase(),
            weekly_hours_by_grade: BTreeMap::from([("5".into(), hours)]),
            rule,
            color: None,
        }
    }

    fn request(slots: u8, subjects: Vec<Subject>) -> GenerateRequest {
        let teachers = subjects
            .iter()
            .map(|s| Teacher {
                id: format!("t-{}", s.id).as_str().into(),
                subject_ids: vec![s.id.clone()],
                ..Default::default()
            })
            .collect();
        GenerateRequest {
            school: SchoolConfig {
                daily_lessons: slots,
                grades: vec![GradeSections {
                    grade: "5".into(),
                    sections: vec!["A".into()],
                }],
            },
            subjects,
            teachers,
            assignments: Default::default(),
            params: Default::default(),
        }
    }

    fn run(req: &GenerateRequest) -> Grid {
        let class = req.school.classes().remove(0);
        let mut ctx = ClassContext::new(req, &class);
        place_regular(&mut ctx, &mut TeacherTracker::new(), &mut FirstPick);
        ctx.into_grid()
    }

    fn per_day(grid: &Grid, id: &str) -> Vec<usize> {
        Day::ALL
            .iter()
            .map(|&d| grid.day(d).iter().filter(|c| c.holds(&id.into())).count())
            .collect()
    }

    #[test]
    fn unconstrained_subject_fills_from_monday() {
        let req = request(4, vec![subject("mat", 5, None)]);
        let grid = run(&req);
        assert_eq!(per_day(&grid, "mat"), vec![4, 1, 0, 0, 0]);
        assert!(grid
            .cells()
            .filter(|(_, _, c)| !c.is_empty())
            .all(|(_, _, c)| c.teacher_id == Some("t-mat".into())));
    }

    #[test]
    fn per_day_max_spreads_lessons() {
        let rule = SubjectRule {
            per_day_max: Some(2),
            ..Default::default()
        };
        let req = request(6, vec![subject("mat", 5, Some(rule))]);
        assert_eq!(per_day(&run(&req), "mat"), vec![2, 2, 1, 0, 0]);
    }

    #[test]
    fn max_consecutive_breaks_runs_with_gaps() {
        let rule = SubjectRule {
            max_consecutive: Some(2),
            ..Default::default()
        };
        let req = request(5, vec![subject("mat", 4, Some(rule))]);
        let grid = run(&req);
        let mon: Vec<bool> = grid.day(Day::Mon).iter().map(|c| !c.is_empty()).collect();
        assert_eq!(mon, vec![true, true, false, true, true]);
    }

    #[test]
    fn min_days_forces_distinct_days() {
        let rule = SubjectRule {
            min_days: Some(3),
            ..Default::default()
        };
        let req = request(6, vec![subject("fen", 3, Some(rule))]);
        assert_eq!(per_day(&run(&req), "fen"), vec![1, 1, 1, 0, 0]);
    }

    #[test]
    fn min_days_met_lifts_the_spread_check() {
        let rule = SubjectRule {
            min_days: Some(5),
            ..Default::default()
        };
        let req = request(3, vec![subject("fen", 7, Some(rule))]);
        assert_eq!(per_day(&run(&req), "fen"), vec![1, 1, 1, 1, 3]);
    }

    #[test]
    fn min_days_out_of_reach_allows_stacking() {
        let rule = SubjectRule {
            min_days: Some(5),
            ..Default::default()
        };
        let mut req = request(3, vec![subject("fen", 4, Some(rule))]);
        let all: Vec<_> = (0..3).map(SlotLabel::for_index).collect();
        for day in [Day::Tue, Day::Wed, Day::Thu] {
            req.teachers[0].unavailable.insert(day, all.clone());
        }
        // Monday refuses a second lesson; on Friday no later day is left
        assert_eq!(per_day(&run(&req), "fen"), vec![1, 0, 0, 0, 3]);
    }

    #[test]
    fn avoided_slots_stay_empty() {
        let rule = SubjectRule {
            avoid_slots: vec![SlotLabel("S1".into())],
            ..Default::default()
        };
        let req = request(2, vec![subject("mat", 10, Some(rule))]);
        let grid = run(&req);
        for day in Day::ALL {
            assert!(grid.day(day)[0].is_empty());
            assert!(!grid.day(day)[1].is_empty());
        }
    }

    #[test]
    fn block_subjects_are_left_to_the_block_phase() {
        let rule = SubjectRule {
            prefer_block_scheduling: true,
            ..Default::default()
        };
        let req = request(4, vec![subject("bed", 2, Some(rule))]);
        assert_eq!(run(&req).filled(), 0);
    }

    #[test]
    fn excess_demand_stops_when_grid_is_full() {
        let req = request(1, vec![subject("mat", 9, None)]);
        assert_eq!(run(&req).filled(), 5);
    }
}
