#![forbid(unsafe_code)]
//! Horaire — génération d'emplois du temps de département, sans base de données.
//!
//! - Expansion de la demande (promotions × matières × volume hebdomadaire).
//! - Placement glouton first-fit sur un ordre aléatoire (graine injectable).
//! - Analyse des conflits : non placés, charge déclarée, surcharge journalière.
//! - Stockage fichiers (JSON) derrière un port, import/export CSV.

pub mod io;
pub mod model;
pub mod report;
pub mod request;
pub mod sample;
pub mod scheduler;
pub mod storage;
pub mod views;

pub use model::{
    Assignment, AssignmentId, Batch, BatchId, Classroom, ClassroomId, Department, DepartmentId,
    GeneratedSlot, Subject, SubjectId, Teacher, TeacherId, TimetableGrid, TimetableSettings,
};
pub use report::{faculty_workload, overall_totals, TeacherWorkload, UtilizationStatus};
pub use request::{ChangeRequest, RequestId, RequestKind, RequestStatus, RequestTarget, SlotRef};
pub use scheduler::{
    generate, publish, AnalysisOptions, Conflict, ConflictKind, ConflictLevel, Generation,
    SchedError, Scheduler,
};
pub use storage::{JsonStorage, Storage};
pub use views::{batch_schedule, faculty_schedule, PersonalSchedule, ScheduleEntry};
