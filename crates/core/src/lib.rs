pub mod audit;
pub mod eligibility;
pub mod fill;
pub mod pick;
pub mod random;
pub mod teacher_view;
pub mod tracker;

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

pub use types::{
    Cell, ClassKey, ClassRef, Day, GenerateRequest, GenerateResult, Grid, ManualAssignments,
    SchoolConfig, SlotLabel, Subject, Teacher, TeacherGrid, TeacherId,
};

pub const MAX_DAILY_LESSONS: u8 = 12;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ValidationError {
    pub fn messages(&self) -> &[String] {
        match self {
            ValidationError::Invalid(m) => m,
        }
    }
}

/// Checks configuration the entity layer is expected to have sanitized.
/// Generation itself never calls this.
pub fn validate(req: &GenerateRequest) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();
    let slots = req.school.slots();

    if !(1..=MAX_DAILY_LESSONS).contains(&req.school.daily_lessons) {
        errors.push(format!(
            "dailyLessons must be within 1..={MAX_DAILY_LESSONS}, got {}",
            req.school.daily_lessons
        ));
    }

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    let classes = req.school.classes();
    chk_unique("subject", req.subjects.iter().map(|s| &s.id.0), &mut errors);
    chk_unique("teacher", req.teachers.iter().map(|t| &t.id.0), &mut errors);
    chk_unique("class", classes.iter().map(|c| &c.key.0), &mut errors);

    let chk_slot = |owner: String, label: &SlotLabel, errors: &mut Vec<String>| match label.index() {
        None => errors.push(format!("{owner} has malformed slot label {}", label.0)),
        Some(i) if i >= slots => errors.push(format!(
            "{owner} references {} beyond dailyLessons={slots}",
            label.0
        )),
        Some(_) => {}
    };

    let subject_ids: HashSet<_> = req.subjects.iter().map(|s| &s.id).collect();
    for s in &req.subjects {
        if let Some(rule) = &s.rule {
            for label in &rule.avoid_slots {
                chk_slot(format!("subject {}", s.id), label, &mut errors);
            }
        }
    }

    for t in &req.teachers {
        if t.subject_ids.is_empty() {
            errors.push(format!("teacher {} has no subjects", t.id));
        }
        for sid in &t.subject_ids {
            if !subject_ids.contains(sid) {
                errors.push(format!("teacher {} references missing subject {}", t.id, sid));
            }
        }
        for (day, labels) in &t.unavailable {
            for label in labels {
                chk_slot(format!("teacher {} on {}", t.id, day), label, &mut errors);
            }
        }
    }

    let class_keys: HashSet<_> = classes.iter().map(|c| &c.key).collect();
    for (key, teacher) in &req.assignments.0 {
        let Some((class, subject)) = ManualAssignments::split_key(key) else {
            errors.push(format!("assignment key {key} is not of the form class|subject"));
            continue;
        };
        if !class_keys.contains(&class) {
            errors.push(format!("assignment {key} references missing class {class}"));
        }
        if !subject_ids.contains(&subject) {
            errors.push(format!("assignment {key} references missing subject {subject}"));
        }
        if req.teacher(teacher).is_none() {
            errors.push(format!("assignment {key} references missing teacher {teacher}"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Invalid(errors))
    }
}

#[async_trait]
pub trait Generator: Send + Sync + 'static {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateResult>;
}
