use super::{AnalysisOptions, Conflict, ConflictKind};
use crate::model::{Assignment, Teacher, TeacherId, TimetableGrid, TimetableSettings};
use std::collections::{HashMap, HashSet};

/// Charge déclarée (somme des volumes hebdomadaires) hors bornes.
///
/// Ne dépend que des affectations : le résultat du placement n'y entre pas.
pub fn utilization_warnings(
    teachers: &[Teacher],
    assignments: &[Assignment],
    opts: AnalysisOptions,
) -> Vec<Conflict> {
    let mut out = Vec::new();

    for teacher in unique_teachers(teachers) {
        let total: u32 = assignments
            .iter()
            .filter(|a| a.teacher_id == teacher.id)
            .fold(0u32, |acc, a| acc.saturating_add(a.weekly_lectures));

        if total > opts.over_utilized_hours {
            out.push(Conflict::warning(
                ConflictKind::Utilization,
                format!(
                    "{} is over-utilized with {} weekly lectures.",
                    teacher.name, total
                ),
            ));
        }
        if total < opts.under_utilized_hours && total > 0 {
            out.push(Conflict::warning(
                ConflictKind::Utilization,
                format!(
                    "{} may be under-utilized with only {} weekly lectures.",
                    teacher.name, total
                ),
            ));
        }
    }

    out
}

/// Dépassements du plafond journalier, calculés sur la grille posée.
///
/// Ordre : enseignant (ordre du roster) puis jour (ordre configuré). Les
/// cellules d'un enseignant absent du roster ne sont pas comptées.
pub fn excessive_daily_load(
    grid: &TimetableGrid,
    teachers: &[Teacher],
    settings: &TimetableSettings,
) -> Vec<Conflict> {
    let mut load: HashMap<(&TeacherId, &str), u32> = HashMap::new();
    for (day, _, _, slot) in grid.placed(settings) {
        *load.entry((&slot.teacher.id, day)).or_default() += 1;
    }

    let mut out = Vec::new();
    for teacher in unique_teachers(teachers) {
        for day in &settings.working_days {
            let count = load
                .get(&(&teacher.id, day.as_str()))
                .copied()
                .unwrap_or(0);
            if count > settings.max_lectures_per_day {
                out.push(Conflict::error(
                    ConflictKind::ExcessiveDailyLoad,
                    format!(
                        "{} has {} lectures on {}, exceeding the limit of {}.",
                        teacher.name, count, day, settings.max_lectures_per_day
                    ),
                ));
            }
        }
    }
    out
}

/// Enseignant présent dans plusieurs promotions au même créneau.
///
/// Le placement ne produit jamais ce cas ; utile sur une grille importée ou
/// modifiée à la main.
pub fn detect_teacher_clashes(grid: &TimetableGrid, settings: &TimetableSettings) -> Vec<Conflict> {
    let mut out = Vec::new();

    for day in &settings.working_days {
        let Some(periods) = grid.day(day) else {
            continue;
        };
        for (period, row) in periods.iter().enumerate() {
            let mut seen: Vec<(&Teacher, usize)> = Vec::new();
            for slot in row.iter().flatten() {
                match seen.iter_mut().find(|(t, _)| t.id == slot.teacher.id) {
                    Some((_, n)) => *n += 1,
                    None => seen.push((&slot.teacher, 1)),
                }
            }
            for (teacher, n) in seen.into_iter().filter(|(_, n)| *n > 1) {
                out.push(Conflict::error(
                    ConflictKind::TeacherClash,
                    format!(
                        "{} is booked for {} batches on {} at period {}.",
                        teacher.name,
                        n,
                        day,
                        period + 1
                    ),
                ));
            }
        }
    }

    out
}

/// Analyse complète d'une grille existante (sans les séances non placées,
/// connues seulement au moment du placement).
pub fn analyze(
    grid: &TimetableGrid,
    teachers: &[Teacher],
    assignments: &[Assignment],
    settings: &TimetableSettings,
    opts: AnalysisOptions,
) -> Vec<Conflict> {
    let mut out = utilization_warnings(teachers, assignments, opts);
    out.extend(excessive_daily_load(grid, teachers, settings));
    out
}

fn unique_teachers(teachers: &[Teacher]) -> impl Iterator<Item = &Teacher> {
    let mut seen = HashSet::new();
    teachers.iter().filter(move |&t| seen.insert(&t.id))
}
