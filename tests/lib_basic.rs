#![forbid(unsafe_code)]
use horaire::model::{Assignment, Batch, Department, Subject, Teacher, TimetableSettings};
use horaire::scheduler::{expand_demand, ConflictKind, SchedError};
use horaire::{sample::sample_departments, AnalysisOptions, Scheduler, TimetableGrid};
use std::collections::HashMap;

fn settings(periods: usize, max_per_day: u32) -> TimetableSettings {
    TimetableSettings {
        period_timings: (0..periods).map(|p| format!("P{}", p + 1)).collect(),
        max_lectures_per_day: max_per_day,
        ..TimetableSettings::default()
    }
}

/// 1 enseignant, 1 matière à 20 séances, 5 jours × 5 périodes, plafond 3.
fn single_heavy_teacher() -> Department {
    let mut dept = Department::new("Solo");
    let teacher = dept.add_teacher(Teacher::new("Solo"));
    let subject = dept.add_subject(Subject::new("Heavy", "HV100"));
    dept.add_batch(Batch::new("Only").with_subjects(vec![subject.clone()]));
    dept.add_assignment(Assignment::new(teacher, subject, 20));
    dept.settings = settings(5, 3);
    dept
}

fn count(conflicts: &[horaire::Conflict], kind: ConflictKind) -> usize {
    conflicts.iter().filter(|c| c.kind == kind).count()
}

#[test]
fn grid_has_configured_shape() {
    for dept in sample_departments() {
        let generation = Scheduler::new(dept.clone()).generate_seeded(1).unwrap();
        assert!(generation
            .grid
            .matches_shape(&dept.settings, dept.batches.len()));
        assert_eq!(generation.grid.days().count(), dept.settings.working_days.len());
    }
}

#[test]
fn teacher_never_double_booked() {
    let dept = sample_departments().remove(0);
    for seed in 0..20 {
        let generation = Scheduler::new(dept.clone()).generate_seeded(seed).unwrap();
        let mut seen: HashMap<(String, String, usize), usize> = HashMap::new();
        for (day, period, _, slot) in generation.grid.placed(&dept.settings) {
            *seen
                .entry((slot.teacher.id.to_string(), day.to_string(), period))
                .or_default() += 1;
        }
        assert!(seen.values().all(|&n| n == 1), "seed {seed}");
        assert!(Scheduler::new(dept.clone())
            .generate_seeded(seed)
            .map(|g| horaire::scheduler::detect_teacher_clashes(&g.grid, &dept.settings))
            .unwrap()
            .is_empty());
    }
}

#[test]
fn every_session_is_placed_or_reported() {
    let mut dept = sample_departments().remove(1);
    // 2 périodes × 5 jours : 10 cellules pour 10 séances
    dept.settings = settings(2, 4);
    let demand = expand_demand(&dept.batches, &dept.subjects, &dept.assignments, &dept.teachers);
    for seed in 0..10 {
        let generation = Scheduler::new(dept.clone()).generate_seeded(seed).unwrap();
        let unplaced = count(&generation.conflicts, ConflictKind::UnplacedClass);
        assert_eq!(generation.grid.placed_count() + unplaced, demand.len());
    }
}

#[test]
fn utilization_does_not_depend_on_shuffle() {
    let mut dept = sample_departments().remove(0);
    dept.add_assignment(Assignment::new(
        horaire::TeacherId::new("t3"),
        horaire::SubjectId::new("s1"),
        20,
    ));
    let utilization = |seed| {
        Scheduler::new(dept.clone())
            .generate_seeded(seed)
            .unwrap()
            .conflicts
            .into_iter()
            .filter(|c| c.kind == ConflictKind::Utilization)
            .collect::<Vec<_>>()
    };
    let first = utilization(0);
    assert!(!first.is_empty());
    for seed in 1..10 {
        assert_eq!(utilization(seed), first);
    }
}

#[test]
fn reanalysis_of_published_grid_is_stable() {
    let mut scheduler = Scheduler::new(sample_departments().remove(0));
    let generation = scheduler.generate_seeded(9).unwrap();
    let after_generation: Vec<_> = generation
        .conflicts
        .iter()
        .filter(|c| c.kind != ConflictKind::UnplacedClass)
        .cloned()
        .collect();
    scheduler.publish(generation.grid).unwrap();

    let first = scheduler.check_published().unwrap();
    let second = scheduler.check_published().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, after_generation);
}

#[test]
fn heavy_single_teacher_fills_days_in_order() {
    let dept = single_heavy_teacher();
    for seed in [0, 7, 42] {
        let generation = Scheduler::new(dept.clone()).generate_seeded(seed).unwrap();
        assert_eq!(count(&generation.conflicts, ConflictKind::UnplacedClass), 0);
        assert_eq!(generation.grid.placed_count(), 20);
        assert_eq!(count(&generation.conflicts, ConflictKind::Utilization), 1);
        assert_eq!(count(&generation.conflicts, ConflictKind::ExcessiveDailyLoad), 4);
    }

    let generation = Scheduler::new(dept).generate_seeded(0).unwrap();
    let rendered: Vec<String> = generation.conflicts.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    [warning] Utilization: Solo is over-utilized with 20 weekly lectures.
    [error] Excessive Daily Load: Solo has 5 lectures on Monday, exceeding the limit of 3.
    [error] Excessive Daily Load: Solo has 5 lectures on Tuesday, exceeding the limit of 3.
    [error] Excessive Daily Load: Solo has 5 lectures on Wednesday, exceeding the limit of 3.
    [error] Excessive Daily Load: Solo has 5 lectures on Thursday, exceeding the limit of 3.
    ");
}

#[test]
fn conflicts_list_unplaced_then_utilization_then_daily_load() {
    // un enseignant pour deux promotions : 10 créneaux pour 38 séances
    let mut dept = Department::new("Tight");
    let teacher = dept.add_teacher(Teacher::new("Busy"));
    let subject = dept.add_subject(Subject::new("Shared", "SH1"));
    dept.add_batch(Batch::new("A").with_subjects(vec![subject.clone()]));
    dept.add_batch(Batch::new("B").with_subjects(vec![subject.clone()]));
    dept.add_assignment(Assignment::new(teacher, subject, 19));
    dept.settings = settings(2, 1);

    let mut expected = vec![ConflictKind::UnplacedClass; 28];
    expected.push(ConflictKind::Utilization);
    expected.extend(vec![ConflictKind::ExcessiveDailyLoad; 5]);

    for seed in [0, 11, 99] {
        let generation = Scheduler::new(dept.clone()).generate_seeded(seed).unwrap();
        let kinds: Vec<ConflictKind> = generation.conflicts.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, expected, "seed {seed}");
        assert_eq!(generation.grid.placed_count(), 10);
        assert!(generation.has_errors());
    }
}

#[test]
fn repeated_working_day_is_rejected() {
    let mut dept = single_heavy_teacher();
    dept.settings.working_days = vec!["Monday".into(), "Monday".into()];
    assert!(matches!(
        Scheduler::new(dept).generate_seeded(0),
        Err(SchedError::InvalidSettings(_))
    ));
}

#[test]
fn subject_without_assignment_is_skipped_silently() {
    let mut dept = Department::new("Orphan");
    let teacher = dept.add_teacher(Teacher::new("T"));
    let taught = dept.add_subject(Subject::new("Taught", "TA1"));
    let orphan = dept.add_subject(Subject::new("Orphan", "OR1"));
    dept.add_batch(Batch::new("B").with_subjects(vec![taught.clone(), orphan]));
    dept.add_assignment(Assignment::new(teacher, taught, 10));
    dept.settings = settings(2, 4);

    let scheduler = Scheduler::new(dept);
    let generation = scheduler.generate_seeded(3).unwrap();
    assert_eq!(generation.grid.placed_count(), 10);
    assert!(generation.conflicts.is_empty());
    assert_eq!(scheduler.demand_diagnostics().unresolved.len(), 1);
}

#[test]
fn balanced_load_produces_no_utilization_warning() {
    let mut dept = Department::new("Balanced");
    let teacher = dept.add_teacher(Teacher::new("T"));
    let subject = dept.add_subject(Subject::new("S", "S1"));
    dept.add_batch(Batch::new("B").with_subjects(vec![subject.clone()]));
    dept.add_assignment(Assignment::new(teacher, subject, 10));
    dept.settings = settings(2, 4);

    let generation = Scheduler::new(dept)
        .with_options(AnalysisOptions::default())
        .generate_seeded(5)
        .unwrap();
    assert_eq!(count(&generation.conflicts, ConflictKind::Utilization), 0);
    assert_eq!(count(&generation.conflicts, ConflictKind::UnplacedClass), 0);
    assert_eq!(count(&generation.conflicts, ConflictKind::ExcessiveDailyLoad), 0);
}

#[test]
fn empty_settings_are_rejected() {
    let mut dept = single_heavy_teacher();
    dept.settings.period_timings.clear();
    let err = Scheduler::new(dept.clone()).generate_seeded(0).unwrap_err();
    assert!(matches!(err, SchedError::InvalidSettings(_)));

    dept.settings = settings(5, 3);
    dept.settings.working_days.clear();
    assert!(matches!(
        Scheduler::new(dept).generate_seeded(0),
        Err(SchedError::InvalidSettings(_))
    ));
}

#[test]
fn publish_rejects_foreign_grid() {
    let dept = single_heavy_teacher();
    let wrong = TimetableGrid::empty(&settings(3, 3), 1);
    let mut scheduler = Scheduler::new(dept);
    let err = scheduler.publish(wrong).unwrap_err();
    assert!(matches!(err, SchedError::GridShape { .. }));
    assert!(!scheduler.department().is_locked());

    let generation = scheduler.generate_seeded(0).unwrap();
    scheduler.publish(generation.grid).unwrap();
    assert!(scheduler.department().is_locked());
}
