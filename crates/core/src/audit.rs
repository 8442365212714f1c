//! Independent re-check of a finished schedule.

use crate::eligibility::is_eligible;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use types::{ClassKey, Day, GenerateRequest, Grid, Subject, TeacherId, Violation};

fn violation(kind: &str, details: serde_json::Value) -> Violation {
    Violation {
        r#type: kind.into(),
        details,
    }
}

pub fn audit(req: &GenerateRequest, classes: &BTreeMap<ClassKey, Grid>) -> Vec<Violation> {
    let mut out = Vec::new();
    let grades: HashMap<_, _> = req
        .school
        .classes()
        .into_iter()
        .map(|c| (c.key, c.grade))
        .collect();

    let mut seats: HashMap<(&TeacherId, Day, usize), Vec<&ClassKey>> = HashMap::new();
    let mut hours: HashMap<&TeacherId, u32> = HashMap::new();

    for (key, grid) in classes {
        for (day, slot, cell) in grid.cells() {
            match (&cell.subject_id, &cell.teacher_id) {
                (None, None) => continue,
                (Some(subject), Some(teacher)) => {
                    seats.entry((teacher, day, slot)).or_default().push(key);
                    *hours.entry(teacher).or_default() += 1;

                    let Some(t) = req.teacher(teacher) else {
                        out.push(violation(
                            "unknown_teacher",
                            json!({"class": key, "teacher": teacher, "day": day, "slot": slot}),
                        ));
                        continue;
                    };
                    if t.is_unavailable(day, slot) {
                        out.push(violation(
                            "unavailable",
                            json!({"class": key, "teacher": teacher, "day": day, "slot": slot}),
                        ));
                    }
                    let eligible = grades
                        .get(key)
                        .is_some_and(|g| is_eligible(t, subject, g));
                    if !eligible {
                        out.push(violation(
                            "ineligible",
                            json!({"class": key, "teacher": teacher, "subject": subject}),
                        ));
                    }
                }
                _ => out.push(violation(
                    "incomplete_cell",
                    json!({"class": key, "day": day, "slot": slot}),
                )),
            }
        }

        for subject in &req.subjects {
            audit_subject_rules(key, grid, subject, &mut out);
        }
    }

    let mut double: Vec<_> = seats.into_iter().filter(|(_, c)| c.len() > 1).collect();
    double.sort_by(|a, b| a.0.cmp(&b.0));
    for ((teacher, day, slot), classes) in double {
        out.push(violation(
            "double_booking",
            json!({"teacher": teacher, "day": day, "slot": slot, "classes": classes}),
        ));
    }

    for t in &req.teachers {
        let h = hours.get(&t.id).copied().unwrap_or(0);
        if t.max_hours > 0 && h > t.max_hours {
            out.push(violation(
                "load_cap",
                json!({"teacher": t.id, "hours": h, "maxHours": t.max_hours}),
            ));
        }
    }
    out
}

fn audit_subject_rules(key: &ClassKey, grid: &Grid, subject: &Subject, out: &mut Vec<Violation>) {
    for (&day, cells) in &grid.0 {
        let mut today = 0u32;
        let mut run = 0u32;
        let mut longest = 0u32;
        for (slot, cell) in cells.iter().enumerate() {
            if cell.holds(&subject.id) {
                today += 1;
                run += 1;
                longest = longest.max(run);
                if subject.avoids(slot) {
                    out.push(violation(
                        "avoided_slot",
                        json!({"class": key, "subject": subject.id, "day": day, "slot": slot}),
                    ));
                }
            } else {
                run = 0;
            }
        }
        if let Some(cap) = subject.per_day_max() {
            if today > cap {
                out.push(violation(
                    "per_day_max",
                    json!({"class": key, "subject": subject.id, "day": day, "count": today, "cap": cap}),
                ));
            }
        }
        if let Some(cap) = subject.max_consecutive() {
            if longest > cap {
                out.push(violation(
                    "max_consecutive",
                    json!({"class": key, "subject": subject.id, "day": day, "run": longest, "cap": cap}),
                ));
            }
        }
    }
}
