use types::{ClassRef, GenerateRequest, GradeId, ReviewItem, ReviewReport, SubjectId, Teacher};

/// Subject set plus grade preference. A per-subject grade list, when its key is
/// present, replaces the general one; an empty list never restricts.
pub fn is_eligible(teacher: &Teacher, subject: &SubjectId, grade: &GradeId) -> bool {
    if !teacher.teaches(subject) {
        return false;
    }
    let grades = teacher
        .preferred_grades_by_subject
        .get(subject)
        .unwrap_or(&teacher.preferred_grades);
    grades.is_empty() || grades.contains(grade)
}

pub fn eligible_teachers<'a>(
    teachers: &'a [Teacher],
    subject: &SubjectId,
    grade: &GradeId,
) -> Vec<&'a Teacher> {
    teachers
        .iter()
        .filter(|t| is_eligible(t, subject, grade))
        .collect()
}

/// Lists every class/subject with demand and whether an operator still has to
/// choose its teacher.
pub fn review_assignments(req: &GenerateRequest) -> ReviewReport {
    let mut items = Vec::new();
    for class in req.school.classes() {
        for subject in &req.subjects {
            if subject.hours_for(&class.grade) == 0 {
                continue;
            }
            items.push(review_item(req, &class, &subject.id));
        }
    }
    let pending = items.iter().filter(|i| i.needs_choice).count();
    ReviewReport { pending, items }
}

fn review_item(req: &GenerateRequest, class: &ClassRef, subject: &SubjectId) -> ReviewItem {
    let eligible: Vec<_> = eligible_teachers(&req.teachers, subject, &class.grade)
        .into_iter()
        .map(|t| t.id.clone())
        .collect();
    let pinned = req.assignments.pinned(&class.key, subject).cloned();
    let pin_eligible = pinned.as_ref().is_some_and(|p| eligible.contains(p));
    ReviewItem {
        class_key: class.key.clone(),
        subject_id: subject.clone(),
        needs_choice: pinned.is_none() && eligible.len() > 1,
        eligible,
        pinned,
        pin_eligible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use types::{GradeSections, ManualAssignments, SchoolConfig, Subject};

    fn teacher(id: &str, subjects: &[&str]) -> Teacher {
        Teacher {
            id: id.into(),
            name: id.to_uppercase(),
            subject_ids: subjects.iter().map(|&s| s.into()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn requires_subject() {
        let t = teacher("t1", &["mat"]);
        assert!(is_eligible(&t, &"mat".into(), &"5".into()));
        assert!(!is_eligible(&t, &"fen".into(), &"5".into()));
    }

    #[test]
    fn no_subjects_means_never_eligible() {
        let t = teacher("t1", &[]);
        assert!(!is_eligible(&t, &"mat".into(), &"5".into()));
    }

    #[test]
    fn general_grade_preference_restricts() {
        let mut t = teacher("t1", &["mat"]);
        t.preferred_grades = vec!["5".into(), "6".into()];
        assert!(is_eligible(&t, &"mat".into(), &"6".into()));
        assert!(!is_eligible(&t, &"mat".into(), &"7".into()));
    }

    #[test]
    fn per_subject_preference_overrides_general() {
        let mut t = teacher("t1", &["mat", "fen"]);
        t.preferred_grades = vec!["5".into()];
        t.preferred_grades_by_subject
            .insert("fen".into(), vec!["7".into()]);
        assert!(is_eligible(&t, &"fen".into(), &"7".into()));
        assert!(!is_eligible(&t, &"fen".into(), &"5".into()));
        // mat has no per-subject key and falls back to the general list
        assert!(is_eligible(&t, &"mat".into(), &"5".into()));
        assert!(!is_eligible(&t, &"mat".into(), &"7".into()));
    }

    #[test]
    fn empty_per_subject_list_lifts_general_restriction() {
        let mut t = teacher("t1", &["mat"]);
        t.preferred_grades = vec!["5".into()];
        t.preferred_grades_by_subject.insert("mat".into(), vec![]);
        assert!(is_eligible(&t, &"mat".into(), &"8".into()));
    }

    #[test]
    fn eligible_teachers_filters() {
        let teachers = vec![
            teacher("t1", &["mat"]),
            teacher("t2", &["fen"]),
            teacher("t3", &["mat", "fen"]),
        ];
        let ids: Vec<_> = eligible_teachers(&teachers, &"mat".into(), &"5".into())
            .into_iter()
            .map(|t| t.id.0.as_str())
            .collect();
        assert_eq!(ids, vec!["t1", "t3"]);
    }

    fn review_request() -> GenerateRequest {
        GenerateRequest {
            school: SchoolConfig {
                daily_lessons: 6,
                grades: vec![GradeSections {
                    grade: "5".into(),
                    sections: vec!["A".into(), "B".into()],
                }],
            },
            subjects: vec![
                Subject {
                    id: "mat".into(),
                    name: "Matematik".into(),
                    weekly_hours_by_grade: BTreeMap::from([("5".into(), 5)]),
                    rule: None,
                    color: None,
                },
                Subject {
                    id: "tar".into(),
                    name: "Tarih".into(),
                    weekly_hours_by_grade: BTreeMap::from([("6".into(), 2)]),
                    rule: None,
                    color: None,
                },
            ],
            teachers: vec![teacher("t1", &["mat"]), teacher("t2", &["mat"])],
            assignments: ManualAssignments::default(),
            params: Default::default(),
        }
    }

    #[test]
    fn review_counts_choices_without_pins() {
        let mut req = review_request();
        let report = review_assignments(&req);
        // tar has no hours for grade 5
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.pending, 2);

        req.assignments.pin(&"5-A".into(), &"mat".into(), "t2".into());
        let report = review_assignments(&req);
        assert_eq!(report.pending, 1);
        let a = &report.items[0];
        assert_eq!(a.pinned, Some("t2".into()));
        assert!(a.pin_eligible);
        assert!(!a.needs_choice);
    }

    #[test]
    fn review_flags_stale_pin() {
        let mut req = review_request();
        req.assignments.pin(&"5-B".into(), &"mat".into(), "gone".into());
        let report = review_assignments(&req);
        let b = report
            .items
            .iter()
            .find(|i| i.class_key.0 == "5-B")
            .unwrap();
        assert!(!b.pin_eligible);
    }
}
