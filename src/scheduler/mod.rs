mod conflicts;
mod demand;
mod placement;
mod types;
mod util;

pub use conflicts::{
    analyze, detect_teacher_clashes, excessive_daily_load, utilization_warnings,
};
pub use demand::{
    expand_demand, expand_demand_with_diagnostics, DemandDiagnostics, UnresolvedDemand,
    UnresolvedReason,
};
pub use types::{
    AnalysisOptions, Conflict, ConflictKind, ConflictLevel, Generation, RequiredSession,
    SchedError,
};

use crate::model::{
    Assignment, Batch, Department, Subject, Teacher, TimetableGrid, TimetableSettings,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Génère une grille et la liste ordonnée des conflits.
///
/// Ordre des conflits : séances non placées (ordre de traitement), alertes de
/// charge (ordre des enseignants), surcharges journalières (enseignant puis jour).
/// Échoue uniquement si les contraintes n'ont ni jour ni période.
pub fn generate<R: Rng + ?Sized>(
    teachers: &[Teacher],
    subjects: &[Subject],
    batches: &[Batch],
    assignments: &[Assignment],
    settings: &TimetableSettings,
    opts: AnalysisOptions,
    rng: &mut R,
) -> Result<Generation, SchedError> {
    util::ensure_settings_usable(settings)?;

    let sessions = expand_demand(batches, subjects, assignments, teachers);
    let demand = sessions.len();
    let (grid, mut conflicts) = placement::place_sessions(sessions, settings, batches.len(), rng);

    tracing::debug!(
        demand,
        placed = grid.placed_count(),
        unplaced = conflicts.len(),
        "placement done"
    );

    conflicts.extend(analyze(&grid, teachers, assignments, settings, opts));
    Ok(Generation { grid, conflicts })
}

/// Attache la grille comme emploi du temps publié (remplace le précédent).
pub fn publish(department: &Department, grid: TimetableGrid) -> Result<Department, SchedError> {
    let batch_count = department.batches.len();
    if !grid.matches_shape(&department.settings, batch_count) {
        return Err(util::shape_error(&department.settings, batch_count));
    }
    let mut updated = department.clone();
    updated.finalized_timetable = Some(grid);
    tracing::info!(department = %updated.id, "timetable published");
    Ok(updated)
}

/// Scheduler : encapsule un Department en cours de planification
#[derive(Debug, Clone)]
pub struct Scheduler {
    department: Department,
    opts: AnalysisOptions,
}

impl Scheduler {
    pub fn new(department: Department) -> Self {
        Self {
            department,
            opts: AnalysisOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: AnalysisOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn department(&self) -> &Department {
        &self.department
    }
    pub fn department_mut(&mut self) -> &mut Department {
        &mut self.department
    }
    pub fn into_department(self) -> Department {
        self.department
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Generation, SchedError> {
        let d = &self.department;
        generate(
            &d.teachers,
            &d.subjects,
            &d.batches,
            &d.assignments,
            &d.settings,
            self.opts,
            rng,
        )
    }

    /// Deux appels successifs peuvent produire des grilles différentes.
    pub fn generate(&self) -> Result<Generation, SchedError> {
        self.generate_with(&mut rand::thread_rng())
    }

    /// Placement reproductible : même graine, même grille.
    pub fn generate_seeded(&self, seed: u64) -> Result<Generation, SchedError> {
        self.generate_with(&mut StdRng::seed_from_u64(seed))
    }

    pub fn demand_diagnostics(&self) -> DemandDiagnostics {
        let d = &self.department;
        expand_demand_with_diagnostics(&d.batches, &d.subjects, &d.assignments, &d.teachers).1
    }

    pub fn publish(&mut self, grid: TimetableGrid) -> Result<(), SchedError> {
        self.department = publish(&self.department, grid)?;
        Ok(())
    }

    /// Réanalyse de la grille publiée, conflits d'enseignant compris.
    pub fn check_published(&self) -> Option<Vec<Conflict>> {
        let d = &self.department;
        let grid = d.finalized_timetable.as_ref()?;
        let mut out = detect_teacher_clashes(grid, &d.settings);
        out.extend(analyze(
            grid,
            &d.teachers,
            &d.assignments,
            &d.settings,
            self.opts,
        ));
        Some(out)
    }
}
