use super::{Conflict, ConflictKind, RequiredSession};
use crate::model::{GeneratedSlot, TeacherId, TimetableGrid, TimetableSettings};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Placement glouton first-fit sur une demande mélangée.
///
/// Heuristique, pas un optimiseur : aucune séance n'est replacée, aucun
/// retour arrière. Chaque séance prend la première cellule (jour configuré,
/// puis période croissante) où la promotion est libre et l'enseignant n'est
/// pas déjà pris, toutes promotions confondues.
pub(super) fn place_sessions<R: Rng + ?Sized>(
    mut sessions: Vec<RequiredSession<'_>>,
    settings: &TimetableSettings,
    batch_count: usize,
    rng: &mut R,
) -> (TimetableGrid, Vec<Conflict>) {
    let mut grid = TimetableGrid::empty(settings, batch_count);
    let mut occupied: HashSet<(&TeacherId, &str, usize)> = HashSet::new();
    let mut unplaced = Vec::new();

    sessions.shuffle(rng);

    for session in &sessions {
        let free = first_free_cell(&grid, &occupied, session, settings);
        match free {
            Some((day, period)) => {
                if let Some(cell) = grid.cell_mut(day, period, session.batch_index) {
                    *cell = Some(GeneratedSlot {
                        subject: session.subject.clone(),
                        teacher: session.teacher.clone(),
                    });
                }
                occupied.insert((&session.teacher.id, day, period));
            }
            None => {
                unplaced.push(Conflict::error(
                    ConflictKind::UnplacedClass,
                    format!(
                        "Could not schedule {} for {}",
                        session.subject.code, session.batch.name
                    ),
                ));
            }
        }
    }

    (grid, unplaced)
}

fn first_free_cell<'s>(
    grid: &TimetableGrid,
    occupied: &HashSet<(&TeacherId, &str, usize)>,
    session: &RequiredSession<'_>,
    settings: &'s TimetableSettings,
) -> Option<(&'s str, usize)> {
    settings.working_days.iter().find_map(|day| {
        (0..settings.periods_per_day())
            .find(|&period| {
                let batch_free = grid
                    .day(day)
                    .and_then(|periods| periods.get(period))
                    .and_then(|row| row.get(session.batch_index))
                    .is_some_and(Option::is_none);
                batch_free && !occupied.contains(&(&session.teacher.id, day.as_str(), period))
            })
            .map(|period| (day.as_str(), period))
    })
}
