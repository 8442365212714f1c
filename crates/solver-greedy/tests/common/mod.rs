#![allow(dead_code)]

use std::collections::BTreeMap;
use types::{
    ClassKey, Day, GenerateRequest, GradeSections, Grid, SchoolConfig, SlotLabel, Subject,
    SubjectRule, Teacher, TeacherId,
};

pub fn school(daily_lessons: u8, grades: &[(&str, &[&str])]) -> SchoolConfig {
    SchoolConfig {
        daily_lessons,
        grades: grades
            .iter()
            .map(|(g, sections)| GradeSections {
                grade: (*g).into(),
                sections: sections.iter().map(|s| s.to_string()).collect(),
            })
            .collect(),
    }
}

pub fn subject(id: &str, name: &str, hours: &[(&str, u32)], rule: Option<SubjectRule>) -> Subject {
    Subject {
        id: id.into(),
        name: name.into(),
        weekly_hours_by_grade: hours.iter().map(|&(g, h)| (g.into(), h)).collect(),
        rule,
        color: None,
    }
}

pub fn teacher(id: &str, subjects: &[&str], max_hours: u32) -> Teacher {
    Teacher {
        id: id.into(),
        name: id.to_uppercase(),
        subject_ids: subjects.iter().map(|&s| s.into()).collect(),
        max_hours,
        ..Default::default()
    }
}

pub fn block_all(t: &mut Teacher, day: Day, slots: usize) {
    t.unavailable
        .insert(day, (0..slots).map(SlotLabel::for_index).collect());
}

pub fn request(school: SchoolConfig, subjects: Vec<Subject>, teachers: Vec<Teacher>) -> GenerateRequest {
    GenerateRequest {
        school,
        subjects,
        teachers,
        assignments: Default::default(),
        params: Default::default(),
    }
}

pub fn cells_of<'a>(
    grid: &'a Grid,
    subject: &'a str,
) -> impl Iterator<Item = (Day, usize, &'a TeacherId)> + 'a {
    grid.cells().filter_map(move |(d, s, c)| {
        (c.subject_id.as_ref().map(|x| x.0.as_str()) == Some(subject))
            .then(|| c.teacher_id.as_ref().map(|t| (d, s, t)))
            .flatten()
    })
}

/// Slot indices holding `subject` on each day, Monday first.
pub fn slots_by_day(grid: &Grid, subject: &str) -> BTreeMap<Day, Vec<usize>> {
    let mut out: BTreeMap<Day, Vec<usize>> = BTreeMap::new();
    for (d, s, _) in cells_of(grid, subject) {
        out.entry(d).or_default().push(s);
    }
    out
}

pub fn grid<'a>(classes: &'a BTreeMap<ClassKey, Grid>, key: &str) -> &'a Grid {
    &classes[&ClassKey::from(key)]
}
