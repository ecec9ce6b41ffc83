use crate::scheduler::SchedError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort d'un département
    DepartmentId
);
string_id!(
    /// Identifiant fort d'un enseignant
    TeacherId
);
string_id!(
    /// Identifiant fort d'une matière
    SubjectId
);
string_id!(
    /// Identifiant fort d'une promotion (batch)
    BatchId
);
string_id!(AssignmentId);
string_id!(ClassroomId);

/// Enseignant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
}

impl Teacher {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: TeacherId::random(),
            name: name.into(),
        }
    }
}

/// Matière (nom + code court affiché dans la grille)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub code: String,
}

impl Subject {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, code: C) -> Self {
        Self {
            id: SubjectId::random(),
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Promotion d'étudiants partageant la même liste de matières.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: BatchId,
    pub name: String,
    #[serde(default)]
    pub subject_ids: Vec<SubjectId>,
}

impl Batch {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: BatchId::random(),
            name: name.into(),
            subject_ids: Vec::new(),
        }
    }

    pub fn with_subjects(mut self, subject_ids: Vec<SubjectId>) -> Self {
        self.subject_ids = subject_ids;
        self
    }
}

/// Charge d'enseignement : une matière, un enseignant, un volume hebdomadaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
    pub weekly_lectures: u32,
}

impl Assignment {
    pub fn new(teacher_id: TeacherId, subject_id: SubjectId, weekly_lectures: u32) -> Self {
        Self {
            id: AssignmentId::random(),
            teacher_id,
            subject_id,
            weekly_lectures,
        }
    }
}

/// Salle (conservée et persistée, jamais utilisée par le placement)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub equipment: Vec<String>,
}

/// Contraintes horaires d'un département.
///
/// L'ordre de `working_days` est l'ordre d'itération (pas forcément lundi→vendredi).
/// Le nombre de périodes par jour est le nombre de libellés dans `period_timings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSettings {
    pub working_days: Vec<String>,
    #[serde(default)]
    pub period_timings: Vec<String>,
    pub max_lectures_per_day: u32,
}

impl Default for TimetableSettings {
    fn default() -> Self {
        Self {
            working_days: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
                .into_iter()
                .map(String::from)
                .collect(),
            period_timings: [
                "09:00 - 10:00",
                "10:00 - 11:00",
                "11:00 - 12:00",
                "13:00 - 14:00",
                "14:00 - 15:00",
                "15:00 - 16:00",
                "16:00 - 17:00",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_lectures_per_day: 4,
        }
    }
}

impl TimetableSettings {
    pub fn periods_per_day(&self) -> usize {
        self.period_timings.len()
    }

    pub fn timing(&self, period: usize) -> Option<&str> {
        self.period_timings.get(period).map(String::as_str)
    }

    /// Premier jour listé deux fois ; la grille n'a qu'une entrée par jour.
    pub fn duplicate_day(&self) -> Option<&str> {
        self.working_days
            .iter()
            .enumerate()
            .find(|(i, day)| self.working_days[..*i].contains(day))
            .map(|(_, day)| day.as_str())
    }

    /// Nombre de cellules d'une promotion sur la semaine.
    pub fn weekly_capacity(&self) -> usize {
        self.working_days.len() * self.periods_per_day()
    }
}

/// Couple (matière, enseignant) posé dans une cellule.
///
/// Stocké par valeur : une grille publiée reste lisible après suppression
/// d'un enseignant ou d'une matière.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSlot {
    pub subject: Subject,
    pub teacher: Teacher,
}

/// Grille : jour → période → position de promotion.
///
/// Les positions de promotion suivent l'ordre des promotions au moment de la
/// génération ; réordonner les promotions invalide la grille.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimetableGrid(BTreeMap<String, Vec<Vec<Option<GeneratedSlot>>>>);

impl TimetableGrid {
    /// Grille entièrement libre, dimensionnée jours × périodes × promotions.
    pub fn empty(settings: &TimetableSettings, batch_count: usize) -> Self {
        let days = settings
            .working_days
            .iter()
            .map(|day| {
                let periods = (0..settings.periods_per_day())
                    .map(|_| vec![None; batch_count])
                    .collect();
                (day.clone(), periods)
            })
            .collect();
        Self(days)
    }

    pub fn day(&self, day: &str) -> Option<&[Vec<Option<GeneratedSlot>>]> {
        self.0.get(day).map(Vec::as_slice)
    }

    pub fn days(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, day: &str, period: usize, batch_index: usize) -> Option<&GeneratedSlot> {
        self.0
            .get(day)
            .and_then(|periods| periods.get(period))
            .and_then(|batches| batches.get(batch_index))
            .and_then(Option::as_ref)
    }

    pub(crate) fn cell_mut(
        &mut self,
        day: &str,
        period: usize,
        batch_index: usize,
    ) -> Option<&mut Option<GeneratedSlot>> {
        self.0
            .get_mut(day)
            .and_then(|periods| periods.get_mut(period))
            .and_then(|batches| batches.get_mut(batch_index))
    }

    /// Écrase une cellule ; `false` si les coordonnées sont hors grille.
    pub fn set(
        &mut self,
        day: &str,
        period: usize,
        batch_index: usize,
        slot: Option<GeneratedSlot>,
    ) -> bool {
        match self.cell_mut(day, period, batch_index) {
            Some(cell) => {
                *cell = slot;
                true
            }
            None => false,
        }
    }

    pub fn placed_count(&self) -> usize {
        self.0
            .values()
            .flatten()
            .flatten()
            .filter(|cell| cell.is_some())
            .count()
    }

    /// Vérifie les dimensions attendues (jours, périodes, promotions).
    pub fn matches_shape(&self, settings: &TimetableSettings, batch_count: usize) -> bool {
        self.0.len() == settings.working_days.len()
            && settings.working_days.iter().all(|day| {
                self.0.get(day).is_some_and(|periods| {
                    periods.len() == settings.periods_per_day()
                        && periods.iter().all(|row| row.len() == batch_count)
                })
            })
    }

    /// Parcourt les cellules occupées dans l'ordre des jours configurés,
    /// puis des périodes, puis des promotions.
    pub fn placed<'a>(
        &'a self,
        settings: &'a TimetableSettings,
    ) -> impl Iterator<Item = (&'a str, usize, usize, &'a GeneratedSlot)> + 'a {
        settings.working_days.iter().flat_map(move |day| {
            self.0
                .get(day)
                .into_iter()
                .flat_map(|periods| periods.iter().enumerate())
                .flat_map(move |(period, row)| {
                    row.iter().enumerate().filter_map(move |(batch_index, cell)| {
                        cell.as_ref()
                            .map(|slot| (day.as_str(), period, batch_index, slot))
                    })
                })
        })
    }
}

/// Département : propriétaire exclusif de son roster et de sa grille publiée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    #[serde(default)]
    pub settings: TimetableSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_timetable: Option<TimetableGrid>,
}

impl Department {
    /// Département vide avec les contraintes par défaut.
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: DepartmentId::random(),
            name: name.into(),
            teachers: Vec::new(),
            subjects: Vec::new(),
            assignments: Vec::new(),
            batches: Vec::new(),
            classrooms: Vec::new(),
            settings: TimetableSettings::default(),
            finalized_timetable: None,
        }
    }

    pub fn find_teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teachers.iter().find(|t| &t.id == id)
    }
    pub fn find_teacher_by_name(&self, name: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.name == name)
    }
    pub fn find_subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }
    pub fn find_subject_by_code(&self, code: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.code == code)
    }
    pub fn find_batch(&self, id: &BatchId) -> Option<&Batch> {
        self.batches.iter().find(|b| &b.id == id)
    }
    pub fn batch_index(&self, id: &BatchId) -> Option<usize> {
        self.batches.iter().position(|b| &b.id == id)
    }

    pub fn add_teacher(&mut self, teacher: Teacher) -> TeacherId {
        let id = teacher.id.clone();
        self.teachers.push(teacher);
        id
    }

    /// Supprime sans cascade : les affectations qui le référencent restent.
    pub fn remove_teacher(&mut self, id: &TeacherId) -> Option<Teacher> {
        let pos = self.teachers.iter().position(|t| &t.id == id)?;
        Some(self.teachers.remove(pos))
    }

    pub fn add_subject(&mut self, subject: Subject) -> SubjectId {
        let id = subject.id.clone();
        self.subjects.push(subject);
        id
    }

    /// Supprime sans cascade : listes de matières des promotions et affectations inchangées.
    pub fn remove_subject(&mut self, id: &SubjectId) -> Option<Subject> {
        let pos = self.subjects.iter().position(|s| &s.id == id)?;
        Some(self.subjects.remove(pos))
    }

    pub fn add_batch(&mut self, batch: Batch) -> BatchId {
        let id = batch.id.clone();
        self.batches.push(batch);
        id
    }

    pub fn remove_batch(&mut self, id: &BatchId) -> Option<Batch> {
        let pos = self.batch_index(id)?;
        Some(self.batches.remove(pos))
    }

    /// Ajoute ou retire une matière d'une promotion ; renvoie `true` si elle est désormais suivie.
    pub fn toggle_batch_subject(
        &mut self,
        batch_id: &BatchId,
        subject_id: &SubjectId,
    ) -> Result<bool, SchedError> {
        let batch = self
            .batches
            .iter_mut()
            .find(|b| &b.id == batch_id)
            .ok_or_else(|| SchedError::UnknownBatch(batch_id.to_string()))?;
        if let Some(pos) = batch.subject_ids.iter().position(|s| s == subject_id) {
            batch.subject_ids.remove(pos);
            Ok(false)
        } else {
            batch.subject_ids.push(subject_id.clone());
            Ok(true)
        }
    }

    pub fn add_assignment(&mut self, assignment: Assignment) -> AssignmentId {
        let id = assignment.id.clone();
        self.assignments.push(assignment);
        id
    }

    pub fn remove_assignment(&mut self, id: &AssignmentId) -> Option<Assignment> {
        let pos = self.assignments.iter().position(|a| &a.id == id)?;
        Some(self.assignments.remove(pos))
    }

    pub fn add_classroom(&mut self, classroom: Classroom) -> ClassroomId {
        let id = classroom.id.clone();
        self.classrooms.push(classroom);
        id
    }

    pub fn remove_classroom(&mut self, id: &ClassroomId) -> Option<Classroom> {
        let pos = self.classrooms.iter().position(|c| &c.id == id)?;
        Some(self.classrooms.remove(pos))
    }

    /// Règles de validité à respecter avant toute génération.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for a in &self.assignments {
            if a.teacher_id.is_empty() {
                errors.push(format!("assignment {} has no teacher", a.id));
            }
            if a.subject_id.is_empty() {
                errors.push(format!("assignment {} has no subject", a.id));
            }
            if a.weekly_lectures == 0 {
                errors.push(format!("assignment {} has zero weekly lectures", a.id));
            }
        }
        if self.batches.is_empty() {
            errors.push("department has no batch".to_string());
        }
        for b in &self.batches {
            if b.subject_ids.is_empty() {
                errors.push(format!("batch {} has no subject", b.name));
            }
        }
        if self.settings.working_days.is_empty() {
            errors.push("no working day configured".to_string());
        }
        if self.settings.periods_per_day() == 0 {
            errors.push("no period configured".to_string());
        }
        if let Some(day) = self.settings.duplicate_day() {
            errors.push(format!("working day {day} is listed twice"));
        }
        let capacity = self.settings.weekly_capacity();
        if capacity > 0 {
            for a in &self.assignments {
                if a.weekly_lectures as usize > capacity {
                    errors.push(format!(
                        "assignment {} has {} weekly lectures, more than the {} weekly slots",
                        a.id, a.weekly_lectures, capacity
                    ));
                }
            }
        }
        errors
    }

    pub fn is_config_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }

    /// Une grille publiée verrouille le planning du département.
    pub fn is_locked(&self) -> bool {
        self.finalized_timetable.is_some()
    }

    pub fn ensure_unlocked(&self) -> Result<(), SchedError> {
        if self.is_locked() {
            return Err(SchedError::Locked(self.id.to_string()));
        }
        Ok(())
    }

    /// Retire la grille publiée ; renvoie l'ancienne.
    pub fn unlock(&mut self) -> Option<TimetableGrid> {
        self.finalized_timetable.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(code: &str, teacher: &str) -> GeneratedSlot {
        GeneratedSlot {
            subject: Subject {
                id: SubjectId::new(code),
                name: code.to_string(),
                code: code.to_string(),
            },
            teacher: Teacher {
                id: TeacherId::new(teacher),
                name: teacher.to_string(),
            },
        }
    }

    #[test]
    fn empty_grid_has_expected_shape() {
        let settings = TimetableSettings::default();
        let grid = TimetableGrid::empty(&settings, 3);
        assert!(grid.matches_shape(&settings, 3));
        assert!(!grid.matches_shape(&settings, 2));
        assert_eq!(grid.days().count(), 5);
        assert_eq!(grid.day("Monday").map(|d| d.len()), Some(7));
        assert_eq!(grid.placed_count(), 0);
    }

    #[test]
    fn placed_iterates_in_configured_day_order() {
        let settings = TimetableSettings {
            working_days: vec!["Friday".into(), "Monday".into()],
            period_timings: vec!["09:00 - 10:00".into(), "10:00 - 11:00".into()],
            max_lectures_per_day: 3,
        };
        let mut grid = TimetableGrid::empty(&settings, 2);
        assert!(grid.set("Monday", 0, 0, Some(slot("CS101", "t1"))));
        assert!(grid.set("Friday", 1, 1, Some(slot("CS201", "t2"))));
        assert!(!grid.set("Sunday", 0, 0, Some(slot("CS201", "t2"))));
        assert!(!grid.set("Monday", 5, 0, None));

        let order: Vec<(&str, usize, usize)> = grid
            .placed(&settings)
            .map(|(day, period, batch, _)| (day, period, batch))
            .collect();
        assert_eq!(order, vec![("Friday", 1, 1), ("Monday", 0, 0)]);
        assert_eq!(grid.placed_count(), 2);
    }

    #[test]
    fn validation_reports_every_broken_rule() {
        let mut dept = Department::new("Empty");
        dept.settings.working_days.clear();
        dept.settings.period_timings.clear();
        dept.add_assignment(Assignment::new(TeacherId::new(""), SubjectId::new("s1"), 0));
        let errors = dept.validation_errors();
        assert_eq!(errors.len(), 5);
        assert!(!dept.is_config_valid());
    }

    #[test]
    fn repeated_day_and_oversized_load_are_invalid() {
        let mut dept = Department::new("CSE");
        let b = dept.add_batch(Batch::new("Batch A"));
        let s = dept.add_subject(Subject::new("Algorithms", "CS305"));
        dept.toggle_batch_subject(&b, &s).unwrap();
        let t = dept.add_teacher(Teacher::new("Dr. Tanwi"));
        dept.add_assignment(Assignment::new(t, s, 4_000_000_000));
        dept.settings.working_days = vec!["Monday".into(), "Tuesday".into(), "Monday".into()];

        assert_eq!(dept.settings.duplicate_day(), Some("Monday"));
        let errors = dept.validation_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Monday is listed twice"));
        assert!(errors[1].contains("more than the 21 weekly slots"));

        dept.settings.working_days.pop();
        dept.assignments[0].weekly_lectures = 14;
        assert!(dept.is_config_valid());
    }

    #[test]
    fn removing_teacher_keeps_dangling_assignment() {
        let mut dept = Department::new("CSE");
        let t = dept.add_teacher(Teacher::new("Dr. Tanwi"));
        let s = dept.add_subject(Subject::new("Algorithms", "CS305"));
        dept.add_assignment(Assignment::new(t.clone(), s, 3));

        assert!(dept.remove_teacher(&t).is_some());
        assert!(dept.remove_teacher(&t).is_none());
        assert_eq!(dept.assignments.len(), 1);
        assert_eq!(dept.assignments[0].teacher_id, t);
    }

    #[test]
    fn toggle_batch_subject_adds_then_removes() {
        let mut dept = Department::new("CSE");
        let b = dept.add_batch(Batch::new("Batch A"));
        let s = SubjectId::new("s1");
        assert!(dept.toggle_batch_subject(&b, &s).unwrap());
        assert_eq!(dept.batches[0].subject_ids, vec![s.clone()]);
        assert!(!dept.toggle_batch_subject(&b, &s).unwrap());
        assert!(dept.batches[0].subject_ids.is_empty());
        assert!(dept
            .toggle_batch_subject(&BatchId::new("nope"), &s)
            .is_err());
    }

    #[test]
    fn legacy_periods_per_day_key_is_ignored() {
        let raw = r#"{
            "workingDays": ["Monday"],
            "periodsPerDay": 9,
            "maxLecturesPerDay": 3,
            "periodTimings": ["09:00 - 10:00", "10:00 - 11:00"]
        }"#;
        let settings: TimetableSettings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.periods_per_day(), 2);
    }
}
