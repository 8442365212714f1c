use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Default,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(TeacherId);
id_newtype!(SubjectId);
id_newtype!(GradeId);
id_newtype!(ClassKey);

/// School week. Declaration order is the week order used by every scan.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
pub enum Day {
    #[serde(rename = "Pazartesi", alias = "mon")]
    Mon,
    #[serde(rename = "Salı", alias = "tue")]
    Tue,
    #[serde(rename = "Çarşamba", alias = "wed")]
    Wed,
    #[serde(rename = "Perşembe", alias = "thu")]
    Thu,
    #[serde(rename = "Cuma", alias = "fri")]
    Fri,
}

impl Day {
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of school days after this one.
    pub fn remaining_after(self) -> usize {
        Self::ALL.len() - self.index() - 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "Pazartesi",
            Day::Tue => "Salı",
            Day::Wed => "Çarşamba",
            Day::Thu => "Perşembe",
            Day::Fri => "Cuma",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 1-based slot label, `S1` is slot index 0.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(transparent)]
pub struct SlotLabel(pub String);

impl SlotLabel {
    pub fn for_index(slot: usize) -> Self {
        Self(format!("S{}", slot + 1))
    }

    pub fn index(&self) -> Option<usize> {
        let n = self.0.strip_prefix('S')?.parse::<usize>().ok()?;
        n.checked_sub(1)
    }

    pub fn is_valid_format(&self) -> bool {
        self.index().is_some()
    }

    pub fn is_slot(&self, slot: usize) -> bool {
        self.index() == Some(slot)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRule {
    #[serde(default)]
    pub per_day_max: Option<u32>,
    #[serde(default)]
    pub max_consecutive: Option<u32>,
    #[serde(default)]
    pub min_days: Option<u32>,
    #[serde(default)]
    pub prefer_block_scheduling: bool,
    #[serde(default)]
    pub avoid_slots: Vec<SlotLabel>,
}

fn nonzero(v: Option<u32>) -> Option<u32> {
    v.filter(|&x| x > 0)
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub weekly_hours_by_grade: BTreeMap<GradeId, u32>,
    #[serde(default)]
    pub rule: Option<SubjectRule>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Subject {
    pub fn hours_for(&self, grade: &GradeId) -> u32 {
        self.weekly_hours_by_grade.get(grade).copied().unwrap_or(0)
    }

    pub fn per_day_max(&self) -> Option<u32> {
        nonzero(self.rule.as_ref().and_then(|r| r.per_day_max))
    }

    pub fn max_consecutive(&self) -> Option<u32> {
        nonzero(self.rule.as_ref().and_then(|r| r.max_consecutive))
    }

    pub fn min_days(&self) -> Option<u32> {
        nonzero(self.rule.as_ref().and_then(|r| r.min_days))
    }

    pub fn prefers_block(&self) -> bool {
        self.rule.as_ref().is_some_and(|r| r.prefer_block_scheduling)
    }

    pub fn avoids(&self, slot: usize) -> bool {
        self.rule
            .as_ref()
            .is_some_and(|r| r.avoid_slots.iter().any(|s| s.is_slot(slot)))
    }
}

/// Wire shape of a teacher; older records carry a single `subjectId`.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct TeacherRecord {
    id: TeacherId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    subject_ids: Vec<SubjectId>,
    #[serde(default)]
    subject_id: Option<SubjectId>,
    #[serde(default)]
    min_hours: u32,
    #[serde(default)]
    max_hours: u32,
    #[serde(default)]
    unavailable: BTreeMap<Day, Vec<SlotLabel>>,
    #[serde(default)]
    preferred_grades: Vec<GradeId>,
    #[serde(default)]
    preferred_grades_by_subject: BTreeMap<SubjectId, Vec<GradeId>>,
}

impl From<TeacherRecord> for Teacher {
    fn from(r: TeacherRecord) -> Self {
        let subject_ids = if r.subject_ids.is_empty() {
            r.subject_id.into_iter().collect()
        } else {
            r.subject_ids
        };
        Teacher {
            id: r.id,
            name: r.name,
            subject_ids,
            min_hours: r.min_hours,
            max_hours: r.max_hours,
            unavailable: r.unavailable,
            preferred_grades: r.preferred_grades,
            preferred_grades_by_subject: r.preferred_grades_by_subject,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase", from = "TeacherRecord")]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub subject_ids: Vec<SubjectId>,
    pub min_hours: u32,
    /// 0 means no weekly cap.
    pub max_hours: u32,
    pub unavailable: BTreeMap<Day, Vec<SlotLabel>>,
    pub preferred_grades: Vec<GradeId>,
    pub preferred_grades_by_subject: BTreeMap<SubjectId, Vec<GradeId>>,
}

impl Teacher {
    pub fn teaches(&self, subject: &SubjectId) -> bool {
        self.subject_ids.contains(subject)
    }

    pub fn is_unavailable(&self, day: Day, slot: usize) -> bool {
        self.unavailable
            .get(&day)
            .is_some_and(|slots| slots.iter().any(|s| s.is_slot(slot)))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GradeSections {
    pub grade: GradeId,
    #[serde(default)]
    pub sections: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchoolConfig {
    pub daily_lessons: u8,
    #[serde(default)]
    pub grades: Vec<GradeSections>,
}

impl SchoolConfig {
    pub fn slots(&self) -> usize {
        self.daily_lessons as usize
    }

    pub fn classes(&self) -> Vec<ClassRef> {
        self.grades
            .iter()
            .flat_map(|g| {
                g.sections
                    .iter()
                    .map(move |s| ClassRef::new(g.grade.clone(), s.clone()))
            })
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct ClassRef {
    pub key: ClassKey,
    pub grade: GradeId,
    pub section: String,
}

impl ClassRef {
    pub fn new(grade: GradeId, section: String) -> Self {
        Self {
            key: ClassKey(format!("{}-{}", grade, section)),
            grade,
            section,
        }
    }

    pub fn name(&self) -> String {
        format!("{}. Sınıf {} Şubesi", self.grade, self.section)
    }
}

/// Operator pins keyed `"{classKey}|{subjectId}"`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(transparent)]
pub struct ManualAssignments(pub BTreeMap<String, TeacherId>);

impl ManualAssignments {
    pub fn key(class: &ClassKey, subject: &SubjectId) -> String {
        format!("{}|{}", class, subject)
    }

    pub fn pinned(&self, class: &ClassKey, subject: &SubjectId) -> Option<&TeacherId> {
        self.0.get(&Self::key(class, subject))
    }

    pub fn pin(&mut self, class: &ClassKey, subject: &SubjectId, teacher: TeacherId) {
        self.0.insert(Self::key(class, subject), teacher);
    }

    /// Splits a stored key back into its class and subject parts.
    pub fn split_key(key: &str) -> Option<(ClassKey, SubjectId)> {
        let (class, subject) = key.split_once('|')?;
        if class.is_empty() || subject.is_empty() {
            return None;
        }
        Some((ClassKey(class.into()), SubjectId(subject.into())))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<SubjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<TeacherId>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.subject_id.is_none()
    }

    pub fn holds(&self, subject: &SubjectId) -> bool {
        self.subject_id.as_ref() == Some(subject)
    }
}

/// One class's week: every day carries exactly `dailyLessons` cells.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(transparent)]
pub struct Grid(pub BTreeMap<Day, Vec<Cell>>);

impl Grid {
    pub fn empty(slots: usize) -> Self {
        Self(
            Day::ALL
                .iter()
                .map(|&d| (d, vec![Cell::default(); slots]))
                .collect(),
        )
    }

    pub fn day(&self, day: Day) -> &[Cell] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, day: Day, slot: usize) -> Option<&Cell> {
        self.day(day).get(slot)
    }

    pub fn is_free(&self, day: Day, slot: usize) -> bool {
        self.cell(day, slot).is_some_and(Cell::is_empty)
    }

    pub fn place(&mut self, day: Day, slot: usize, subject: SubjectId, teacher: TeacherId) {
        if let Some(cell) = self.0.get_mut(&day).and_then(|cells| cells.get_mut(slot)) {
            cell.subject_id = Some(subject);
            cell.teacher_id = Some(teacher);
        }
    }

    /// Iterates `(day, slot, cell)` in week order.
    pub fn cells(&self) -> impl Iterator<Item = (Day, usize, &Cell)> {
        self.0
            .iter()
            .flat_map(|(&d, cells)| cells.iter().enumerate().map(move |(i, c)| (d, i, c)))
    }

    pub fn count_of(&self, subject: &SubjectId) -> usize {
        self.cells().filter(|(_, _, c)| c.holds(subject)).count()
    }

    pub fn filled(&self) -> usize {
        self.cells().filter(|(_, _, c)| !c.is_empty()).count()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCell {
    pub class_key: ClassKey,
    pub class_name: String,
    pub subject_id: SubjectId,
    pub subject_name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(transparent)]
pub struct TeacherGrid(pub BTreeMap<Day, Vec<Option<TeacherCell>>>);

impl TeacherGrid {
    pub fn empty(slots: usize) -> Self {
        Self(Day::ALL.iter().map(|&d| (d, vec![None; slots])).collect())
    }

    pub fn cell(&self, day: Day, slot: usize) -> Option<&TeacherCell> {
        self.0.get(&day).and_then(|c| c.get(slot)).and_then(Option::as_ref)
    }

    pub fn lessons(&self) -> usize {
        self.0.values().flatten().filter(|c| c.is_some()).count()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerateParams {
    /// Fixed seed for a reproducible run; absent means a fresh roll every time.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerateRequest {
    pub school: SchoolConfig,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub assignments: ManualAssignments,
    #[serde(default)]
    pub params: GenerateParams,
}

impl GenerateRequest {
    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }

    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teachers.iter().find(|t| &t.id == id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    pub class_key: ClassKey,
    pub subject_id: SubjectId,
    pub requested: u32,
    pub placed: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLoad {
    pub teacher_id: TeacherId,
    pub hours: u32,
    pub min_hours: u32,
    pub max_hours: u32,
    pub below_min: bool,
    pub above_max: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub requested: u32,
    pub placed: u32,
    pub shortfalls: Vec<Shortfall>,
    pub teacher_loads: Vec<TeacherLoad>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Violation {
    pub r#type: String,
    pub details: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub class_key: ClassKey,
    pub subject_id: SubjectId,
    pub eligible: Vec<TeacherId>,
    #[serde(default)]
    pub pinned: Option<TeacherId>,
    /// False when the pinned teacher no longer passes the eligibility filter.
    pub pin_eligible: bool,
    pub needs_choice: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ReviewReport {
    pub pending: usize,
    pub items: Vec<ReviewItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerateResult {
    pub classes: BTreeMap<ClassKey, Grid>,
    pub fill: FillReport,
    pub stats: serde_json::Value,
}
