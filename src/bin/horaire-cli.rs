#![forbid(unsafe_code)]
use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use horaire::{
    io,
    model::{Assignment, AssignmentId, Batch, BatchId, Department, Subject, SubjectId, Teacher, TeacherId},
    report::{faculty_workload, overall_totals},
    request::{self, ChangeRequest, RequestId, RequestKind, RequestTarget, SlotRef},
    sample::sample_departments,
    scheduler::{Conflict, SchedError, Scheduler},
    storage::{JsonStorage, Storage},
    views::faculty_schedule,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération d'emplois du temps (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Répertoire des documents JSON
    #[arg(long, global = true, default_value = "data")]
    data: String,

    /// Département ciblé (id)
    #[arg(long, short = 'd', global = true)]
    department: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lister les départements
    Departments,

    /// Créer un département vide (contraintes par défaut)
    AddDepartment {
        #[arg(long)]
        name: String,
    },

    /// Ajouter un enseignant
    AddTeacher {
        #[arg(long)]
        name: String,
    },

    /// Supprimer un enseignant (sans cascade)
    RemoveTeacher {
        #[arg(long)]
        id: String,
    },

    /// Ajouter une matière
    AddSubject {
        #[arg(long)]
        name: String,
        #[arg(long)]
        code: String,
    },

    /// Supprimer une matière (sans cascade)
    RemoveSubject {
        #[arg(long)]
        id: String,
    },

    /// Ajouter une promotion
    AddBatch {
        #[arg(long)]
        name: String,
        /// liste "s1,s2,..." (ids ou codes)
        #[arg(long)]
        subjects: Option<String>,
    },

    /// Supprimer une promotion
    RemoveBatch {
        #[arg(long)]
        id: String,
    },

    /// Ajouter/retirer une matière d'une promotion
    ToggleSubject {
        #[arg(long)]
        batch: String,
        /// id ou code
        #[arg(long)]
        subject: String,
    },

    /// Affecter une matière à un enseignant
    Assign {
        /// id ou nom
        #[arg(long)]
        teacher: String,
        /// id ou code
        #[arg(long)]
        subject: String,
        #[arg(long)]
        weekly: u32,
    },

    /// Supprimer une affectation
    Unassign {
        #[arg(long)]
        id: String,
    },

    /// Modifier les contraintes horaires
    Settings {
        /// liste ordonnée "Monday,Tuesday,..."
        #[arg(long)]
        days: Option<String>,
        /// liste "09:00 - 10:00,10:00 - 11:00,..."
        #[arg(long)]
        timings: Option<String>,
        #[arg(long)]
        max_per_day: Option<u32>,
    },

    /// Importer des enseignants depuis un CSV
    ImportTeachers {
        #[arg(long)]
        csv: String,
    },

    /// Importer des matières depuis un CSV
    ImportSubjects {
        #[arg(long)]
        csv: String,
    },

    /// Importer des affectations depuis un CSV
    ImportAssignments {
        #[arg(long)]
        csv: String,
    },

    /// Vérifier que la configuration permet une génération
    Validate,

    /// Générer un emploi du temps
    Generate {
        /// Graine pour un placement reproductible
        #[arg(long)]
        seed: Option<u64>,
        /// Publier la grille générée
        #[arg(long)]
        publish: bool,
        /// Remplacer une grille déjà publiée
        #[arg(long)]
        replace: bool,
        #[arg(long)]
        out_csv: Option<String>,
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Afficher la grille publiée
    Show {
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Retirer la grille publiée
    Unlock,

    /// Réanalyser la grille publiée
    Check {
        #[arg(long)]
        report: Option<String>,
    },

    /// Emploi du temps personnel d'un enseignant
    Faculty {
        #[arg(long)]
        name: String,
    },

    /// Rapport de charge tous départements confondus
    Workload {
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Demandes de changement
    Request {
        #[command(subcommand)]
        cmd: RequestCommands,
    },

    /// Export JSON de tous les départements
    Export {
        #[arg(long)]
        out: String,
    },

    /// Revenir aux départements de démonstration
    Reset,
}

#[derive(Subcommand, Debug)]
enum RequestCommands {
    Create {
        #[arg(long)]
        requester: String,
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long)]
        day: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        to_day: Option<String>,
        #[arg(long)]
        to_time: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long, default_value = "")]
        reason: String,
    },
    Cancel {
        #[arg(long)]
        id: String,
    },
    List {
        #[arg(long)]
        requester: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Swap,
    Reschedule,
    Takeover,
    Cancel,
}

impl From<KindArg> for RequestKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Swap => RequestKind::Swap,
            KindArg::Reschedule => RequestKind::Reschedule,
            KindArg::Takeover => RequestKind::Takeover,
            KindArg::Cancel => RequestKind::Cancel,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data)?;
    let mut departments = storage
        .load_departments()?
        .unwrap_or_else(sample_departments);
    let target = cli.department.as_deref();

    let code = match cli.cmd {
        Commands::Departments => {
            for d in &departments {
                println!(
                    "{} | {} | {} teachers | {} subjects | {}",
                    d.id,
                    d.name,
                    d.teachers.len(),
                    d.subjects.len(),
                    if d.is_locked() { "published" } else { "draft" }
                );
            }
            let totals = overall_totals(&departments);
            println!(
                "total: {} classrooms | {} faculty | {} subjects",
                totals.total_classrooms, totals.active_faculty, totals.total_subjects
            );
            0
        }
        Commands::AddDepartment { name } => {
            let dept = Department::new(name.trim());
            println!("{}", dept.id);
            departments.push(dept);
            storage.save_departments(&departments)?;
            0
        }
        Commands::AddTeacher { name } => {
            let dept = select(&mut departments, target)?;
            let id = dept.add_teacher(Teacher::new(name.trim()));
            println!("{id}");
            storage.save_departments(&departments)?;
            0
        }
        Commands::RemoveTeacher { id } => {
            let dept = select(&mut departments, target)?;
            dept.remove_teacher(&TeacherId::new(&id))
                .ok_or_else(|| SchedError::UnknownTeacher(id.clone()))?;
            storage.save_departments(&departments)?;
            0
        }
        Commands::AddSubject { name, code } => {
            let dept = select(&mut departments, target)?;
            let id = dept.add_subject(Subject::new(name.trim(), code.trim()));
            println!("{id}");
            storage.save_departments(&departments)?;
            0
        }
        Commands::RemoveSubject { id } => {
            let dept = select(&mut departments, target)?;
            dept.remove_subject(&SubjectId::new(&id))
                .ok_or_else(|| SchedError::UnknownSubject(id.clone()))?;
            storage.save_departments(&departments)?;
            0
        }
        Commands::AddBatch { name, subjects } => {
            let dept = select(&mut departments, target)?;
            dept.ensure_unlocked()?;
            let mut ids = Vec::new();
            for s in split_list(subjects.as_deref().unwrap_or("")) {
                ids.push(resolve_subject(dept, &s)?);
            }
            let id = dept.add_batch(Batch::new(name.trim()).with_subjects(ids));
            println!("{id}");
            storage.save_departments(&departments)?;
            0
        }
        Commands::RemoveBatch { id } => {
            let dept = select(&mut departments, target)?;
            // la grille publiée est indexée par position de promotion
            dept.ensure_unlocked()?;
            dept.remove_batch(&BatchId::new(&id))
                .ok_or_else(|| SchedError::UnknownBatch(id.clone()))?;
            storage.save_departments(&departments)?;
            0
        }
        Commands::ToggleSubject { batch, subject } => {
            let dept = select(&mut departments, target)?;
            dept.ensure_unlocked()?;
            let subject_id = resolve_subject(dept, &subject)?;
            let enrolled = dept.toggle_batch_subject(&BatchId::new(&batch), &subject_id)?;
            println!("{}", if enrolled { "added" } else { "removed" });
            storage.save_departments(&departments)?;
            0
        }
        Commands::Assign {
            teacher,
            subject,
            weekly,
        } => {
            if weekly == 0 {
                bail!("weekly lectures must be > 0");
            }
            let dept = select(&mut departments, target)?;
            let teacher_id = resolve_teacher(dept, &teacher)?;
            let subject_id = resolve_subject(dept, &subject)?;
            let id = dept.add_assignment(Assignment::new(teacher_id, subject_id, weekly));
            println!("{id}");
            storage.save_departments(&departments)?;
            0
        }
        Commands::Unassign { id } => {
            let dept = select(&mut departments, target)?;
            dept.remove_assignment(&AssignmentId::new(&id))
                .ok_or_else(|| anyhow!("unknown assignment: {}", id))?;
            storage.save_departments(&departments)?;
            0
        }
        Commands::Settings {
            days,
            timings,
            max_per_day,
        } => {
            let dept = select(&mut departments, target)?;
            dept.ensure_unlocked()?;
            if let Some(days) = days {
                dept.settings.working_days = split_list(&days);
            }
            if let Some(timings) = timings {
                dept.settings.period_timings = split_list(&timings);
            }
            if let Some(max) = max_per_day {
                dept.settings.max_lectures_per_day = max;
            }
            if let Some(day) = dept.settings.duplicate_day() {
                bail!("working day {} is listed twice", day);
            }
            storage.save_departments(&departments)?;
            0
        }
        Commands::ImportTeachers { csv } => {
            let teachers = io::import_teachers_csv(csv)?;
            select(&mut departments, target)?.teachers.extend(teachers);
            storage.save_departments(&departments)?;
            0
        }
        Commands::ImportSubjects { csv } => {
            let subjects = io::import_subjects_csv(csv)?;
            select(&mut departments, target)?.subjects.extend(subjects);
            storage.save_departments(&departments)?;
            0
        }
        Commands::ImportAssignments { csv } => {
            let dept = select(&mut departments, target)?;
            let assignments = io::import_assignments_csv(csv, dept)?;
            dept.assignments.extend(assignments);
            storage.save_departments(&departments)?;
            0
        }
        Commands::Validate => {
            let dept = select(&mut departments, target)?;
            let errors = dept.validation_errors();
            if errors.is_empty() {
                println!("OK: configuration valid");
                0
            } else {
                for e in &errors {
                    eprintln!("invalid: {e}");
                }
                2
            }
        }
        Commands::Generate {
            seed,
            publish,
            replace,
            out_csv,
            report,
        } => {
            let dept = select(&mut departments, target)?;
            let errors = dept.validation_errors();
            if !errors.is_empty() {
                bail!("configuration invalid: {}", errors.join("; "));
            }
            if publish && !replace {
                dept.ensure_unlocked()?;
            }

            let mut scheduler = Scheduler::new(dept.clone());
            let diagnostics = scheduler.demand_diagnostics();
            for u in &diagnostics.unresolved {
                eprintln!(
                    "note: batch {} / subject {} skipped ({:?})",
                    u.batch, u.subject, u.reason
                );
            }
            for a in &diagnostics.shadowed {
                eprintln!("note: assignment {a} ignored (subject already assigned)");
            }

            let generation = match seed {
                Some(seed) => scheduler.generate_seeded(seed)?,
                None => scheduler.generate()?,
            };
            print_grid(scheduler.department(), &generation.grid);
            print_conflicts(&generation.conflicts);

            if let Some(path) = out_csv {
                io::export_grid_csv(path, scheduler.department(), &generation.grid)?;
            }
            if let Some(path) = report {
                io::export_conflicts_csv(path, &generation.conflicts)?;
            }
            if publish {
                scheduler.publish(generation.grid)?;
                *dept = scheduler.into_department();
                storage.save_departments(&departments)?;
                println!("Timetable published");
            }
            // Code 2 = WARNING/INCOMPLETE
            if generation.conflicts.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::Show { out_csv } => {
            let dept = select(&mut departments, target)?;
            let Some(grid) = dept.finalized_timetable.as_ref() else {
                bail!("no published timetable for {}", dept.id);
            };
            print_grid(dept, grid);
            if let Some(path) = out_csv {
                io::export_grid_csv(path, dept, grid)?;
            }
            0
        }
        Commands::Unlock => {
            let dept = select(&mut departments, target)?;
            if dept.unlock().is_none() {
                bail!("no published timetable for {}", dept.id);
            }
            storage.save_departments(&departments)?;
            0
        }
        Commands::Check { report } => {
            let dept = select(&mut departments, target)?;
            let conflicts = Scheduler::new(dept.clone())
                .check_published()
                .ok_or_else(|| anyhow!("no published timetable for {}", dept.id))?;
            if let Some(path) = report {
                io::export_conflicts_csv(path, &conflicts)?;
            }
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                print_conflicts(&conflicts);
                2
            }
        }
        Commands::Faculty { name } => {
            let schedule = faculty_schedule(&departments, &name)
                .ok_or_else(|| anyhow!("no published timetable"))?;
            println!("{} ({})", name, schedule.department);
            for (day, row) in schedule.days.iter().zip(&schedule.entries) {
                for (timing, entry) in schedule.timings.iter().zip(row) {
                    if let Some(e) = entry {
                        println!("{day} | {timing} | {} | {}", e.course, e.batch);
                    }
                }
            }
            0
        }
        Commands::Workload { out_json } => {
            let report = faculty_workload(&departments);
            for w in &report {
                println!(
                    "{} | {}h | {} | {} dept(s)",
                    w.teacher_name,
                    w.total_hours,
                    w.status.label(),
                    w.department_count
                );
            }
            if let Some(path) = out_json {
                std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
            }
            0
        }
        Commands::Request { cmd } => {
            let mut requests = storage.load_requests()?.unwrap_or_default();
            match cmd {
                RequestCommands::Create {
                    requester,
                    kind,
                    day,
                    time,
                    course,
                    to_day,
                    to_time,
                    note,
                    reason,
                } => {
                    let to = match (to_day, to_time, note) {
                        (Some(day), Some(time), _) => Some(RequestTarget::Slot { day, time }),
                        (_, _, Some(note)) => Some(RequestTarget::Note { note }),
                        _ => None,
                    };
                    let req = ChangeRequest::new(
                        &requester,
                        kind.into(),
                        SlotRef { day, time, course },
                        to,
                        &reason,
                        Utc::now(),
                    )?;
                    println!("{}", req.id.as_str());
                    request::submit(&mut requests, req);
                }
                RequestCommands::Cancel { id } => {
                    request::cancel(&mut requests, &RequestId::new(id))?;
                }
                RequestCommands::List { requester } => {
                    let listed: Vec<&ChangeRequest> = match requester.as_deref() {
                        Some(name) => request::for_requester(&requests, name).collect(),
                        None => requests.iter().collect(),
                    };
                    for r in listed {
                        println!(
                            "{} | {} | {:?} | {} {} {} | {:?}",
                            r.id.as_str(),
                            r.requester_name,
                            r.kind,
                            r.from.day,
                            r.from.time,
                            r.from.course,
                            r.status
                        );
                    }
                }
            }
            storage.save_requests(&requests)?;
            0
        }
        Commands::Export { out } => {
            io::export_departments_json(out, &departments)?;
            0
        }
        Commands::Reset => {
            departments = sample_departments();
            storage.save_departments(&departments)?;
            0
        }
    };

    std::process::exit(code);
}

fn select<'a>(departments: &'a mut [Department], id: Option<&str>) -> Result<&'a mut Department> {
    let Some(id) = id else {
        bail!("--department is required for this command");
    };
    departments
        .iter_mut()
        .find(|d| d.id.as_str() == id)
        .ok_or_else(|| SchedError::UnknownDepartment(id.to_string()).into())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn resolve_teacher(dept: &Department, key: &str) -> Result<TeacherId> {
    dept.teachers
        .iter()
        .find(|t| t.id.as_str() == key || t.name == key)
        .map(|t| t.id.clone())
        .ok_or_else(|| SchedError::UnknownTeacher(key.to_string()).into())
}

fn resolve_subject(dept: &Department, key: &str) -> Result<SubjectId> {
    dept.subjects
        .iter()
        .find(|s| s.id.as_str() == key || s.code == key)
        .map(|s| s.id.clone())
        .ok_or_else(|| SchedError::UnknownSubject(key.to_string()).into())
}

fn print_grid(dept: &Department, grid: &horaire::TimetableGrid) {
    let settings = &dept.settings;
    for day in &settings.working_days {
        println!("== {day}");
        for (period, timing) in settings.period_timings.iter().enumerate() {
            let cells: Vec<String> = dept
                .batches
                .iter()
                .enumerate()
                .map(|(idx, b)| match grid.get(day, period, idx) {
                    Some(slot) => format!("{}: {} ({})", b.name, slot.subject.code, slot.teacher.name),
                    None => format!("{}: -", b.name),
                })
                .collect();
            println!("{timing} | {}", cells.join(" | "));
        }
    }
}

fn print_conflicts(conflicts: &[Conflict]) {
    if conflicts.is_empty() {
        println!("No major conflicts detected.");
        return;
    }
    for c in conflicts {
        println!("{c}");
    }
}
