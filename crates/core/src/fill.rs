use std::collections::{BTreeMap, HashMap};
use types::{ClassKey, FillReport, GenerateRequest, Grid, Shortfall, TeacherLoad};

/// Requested versus placed hours for every class and subject, plus each
/// teacher's resulting weekly load.
pub fn fill_report(req: &GenerateRequest, classes: &BTreeMap<ClassKey, Grid>) -> FillReport {
    let mut report = FillReport::default();

    for class in req.school.classes() {
        let grid = classes.get(&class.key);
        for subject in &req.subjects {
            let requested = subject.hours_for(&class.grade);
            if requested == 0 {
                continue;
            }
            let placed = grid.map_or(0, |g| g.count_of(&subject.id)) as u32;
            report.requested += requested;
            report.placed += placed.min(requested);
            if placed < requested {
                report.shortfalls.push(Shortfall {
                    class_key: class.key.clone(),
                    subject_id: subject.id.clone(),
                    requested,
                    placed,
                });
            }
        }
    }

    let mut hours: HashMap<&str, u32> = HashMap::new();
    for grid in classes.values() {
        for (_, _, cell) in grid.cells() {
            if let Some(t) = &cell.teacher_id {
                *hours.entry(t.0.as_str()).or_default() += 1;
            }
        }
    }
    for t in &req.teachers {
        let h = hours.get(t.id.0.as_str()).copied().unwrap_or(0);
        report.teacher_loads.push(TeacherLoad {
            teacher_id: t.id.clone(),
            hours: h,
            min_hours: t.min_hours,
            max_hours: t.max_hours,
            below_min: t.min_hours > 0 && h < t.min_hours,
            above_max: t.max_hours > 0 && h > t.max_hours,
        });
    }
    report
}
