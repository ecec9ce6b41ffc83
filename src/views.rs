use crate::model::{BatchId, Department, GeneratedSlot};
use crate::scheduler::SchedError;

/// Entrée d'un emploi du temps personnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub course: String,
    pub batch: String,
    pub teacher: String,
}

/// Vue jour × période dérivée d'une grille publiée.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalSchedule {
    pub department: String,
    pub days: Vec<String>,
    pub timings: Vec<String>,
    /// `entries[jour][période]`, dans l'ordre de `days`.
    pub entries: Vec<Vec<Option<ScheduleEntry>>>,
}

impl PersonalSchedule {
    pub fn day(&self, day: &str) -> Option<&[Option<ScheduleEntry>]> {
        let idx = self.days.iter().position(|d| d == day)?;
        self.entries.get(idx).map(Vec::as_slice)
    }

    pub fn class_count(&self) -> usize {
        self.entries.iter().flatten().flatten().count()
    }
}

fn entry(department: &Department, batch_index: usize, slot: &GeneratedSlot) -> ScheduleEntry {
    ScheduleEntry {
        course: slot.subject.code.clone(),
        batch: department
            .batches
            .get(batch_index)
            .map(|b| b.name.clone())
            .unwrap_or_default(),
        teacher: slot.teacher.name.clone(),
    }
}

/// Emploi du temps d'un enseignant, repéré par son nom.
///
/// Département retenu : le premier publié dont le roster contient ce nom,
/// sinon le premier publié. Par créneau, la première promotion où il
/// enseigne est retenue. `None` si aucun département n'est publié.
pub fn faculty_schedule(departments: &[Department], teacher_name: &str) -> Option<PersonalSchedule> {
    let department = departments
        .iter()
        .find(|d| d.is_locked() && d.find_teacher_by_name(teacher_name).is_some())
        .or_else(|| departments.iter().find(|d| d.is_locked()))?;
    let grid = department.finalized_timetable.as_ref()?;
    let settings = &department.settings;

    let entries = settings
        .working_days
        .iter()
        .map(|day| {
            (0..settings.periods_per_day())
                .map(|period| {
                    grid.day(day)
                        .and_then(|periods| periods.get(period))
                        .and_then(|row| {
                            row.iter().enumerate().find_map(|(batch_index, cell)| {
                                cell.as_ref()
                                    .filter(|slot| slot.teacher.name == teacher_name)
                                    .map(|slot| entry(department, batch_index, slot))
                            })
                        })
                })
                .collect()
        })
        .collect();

    Some(PersonalSchedule {
        department: department.name.clone(),
        days: settings.working_days.clone(),
        timings: settings.period_timings.clone(),
        entries,
    })
}

/// Ligne d'une promotion dans la grille publiée de son département.
pub fn batch_schedule(
    department: &Department,
    batch_id: &BatchId,
) -> Result<Option<PersonalSchedule>, SchedError> {
    let batch_index = department
        .batch_index(batch_id)
        .ok_or_else(|| SchedError::UnknownBatch(batch_id.to_string()))?;
    let Some(grid) = department.finalized_timetable.as_ref() else {
        return Ok(None);
    };
    let settings = &department.settings;

    let entries = settings
        .working_days
        .iter()
        .map(|day| {
            (0..settings.periods_per_day())
                .map(|period| {
                    grid.get(day, period, batch_index)
                        .map(|slot| entry(department, batch_index, slot))
                })
                .collect()
        })
        .collect();

    Ok(Some(PersonalSchedule {
        department: department.name.clone(),
        days: settings.working_days.clone(),
        timings: settings.period_timings.clone(),
        entries,
    }))
}
