use std::collections::{BTreeMap, HashMap};
use types::{ClassKey, ClassRef, Grid, Subject, Teacher, TeacherCell, TeacherGrid, TeacherId};

/// Inverts class grids into one grid per teacher.
///
/// Only cells carrying both a subject and a teacher are copied. The inversion
/// trusts that generation already prevented double-booking and does not check
/// it again. With no class grids the result is empty.
pub fn teacher_schedules(
    classes: &BTreeMap<ClassKey, Grid>,
    class_refs: &[ClassRef],
    teachers: &[Teacher],
    subjects: &[Subject],
    slots: usize,
) -> BTreeMap<TeacherId, TeacherGrid> {
    let mut out = BTreeMap::new();
    if classes.is_empty() {
        return out;
    }
    for t in teachers {
        out.insert(t.id.clone(), TeacherGrid::empty(slots));
    }

    let class_names: HashMap<&ClassKey, String> =
        class_refs.iter().map(|c| (&c.key, c.name())).collect();
    let subject_names: HashMap<_, _> = subjects.iter().map(|s| (&s.id, s.name.as_str())).collect();

    for (key, grid) in classes {
        for (day, slot, cell) in grid.cells() {
            let (Some(subject), Some(teacher)) = (&cell.subject_id, &cell.teacher_id) else {
                continue;
            };
            let entry = TeacherCell {
                class_key: key.clone(),
                class_name: class_names
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| key.0.clone()),
                subject_id: subject.clone(),
                subject_name: subject_names
                    .get(subject)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| subject.0.clone()),
            };
            let tgrid = out
                .entry(teacher.clone())
                .or_insert_with(|| TeacherGrid::empty(slots));
            let cells = tgrid.0.entry(day).or_default();
            if cells.len() <= slot {
                cells.resize(slot + 1, None);
            }
            cells[slot] = Some(entry);
        }
    }
    out
}
