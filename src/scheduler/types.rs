use crate::model::{Batch, Subject, Teacher, TimetableGrid};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Seuils d'analyse de charge (heures hebdomadaires déclarées)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub over_utilized_hours: u32,
    pub under_utilized_hours: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            over_utilized_hours: 18,
            under_utilized_hours: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    #[serde(rename = "Unplaced Class")]
    UnplacedClass,
    /// Jamais produit par le placement (il ne double-réserve pas un enseignant).
    #[serde(rename = "Teacher Clash")]
    TeacherClash,
    Utilization,
    #[serde(rename = "Excessive Daily Load")]
    ExcessiveDailyLoad,
}

impl ConflictKind {
    pub fn label(self) -> &'static str {
        match self {
            ConflictKind::UnplacedClass => "Unplaced Class",
            ConflictKind::TeacherClash => "Teacher Clash",
            ConflictKind::Utilization => "Utilization",
            ConflictKind::ExcessiveDailyLoad => "Excessive Daily Load",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictLevel {
    Error,
    Warning,
}

impl ConflictLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictLevel::Error => "error",
            ConflictLevel::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub description: String,
    pub level: ConflictLevel,
}

impl Conflict {
    pub fn error(kind: ConflictKind, description: String) -> Self {
        Self {
            kind,
            description,
            level: ConflictLevel::Error,
        }
    }

    pub fn warning(kind: ConflictKind, description: String) -> Self {
        Self {
            kind,
            description,
            level: ConflictLevel::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == ConflictLevel::Error
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.level.as_str(),
            self.kind.label(),
            self.description
        )
    }
}

/// Séance d'une heure à placer pour une promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredSession<'a> {
    pub batch: &'a Batch,
    pub batch_index: usize,
    pub subject: &'a Subject,
    pub teacher: &'a Teacher,
}

/// Résultat d'une génération : grille + conflits ordonnés.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub grid: TimetableGrid,
    pub conflicts: Vec<Conflict>,
}

impl Generation {
    pub fn has_errors(&self) -> bool {
        self.conflicts.iter().any(Conflict::is_error)
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),
    #[error("grid does not match department shape ({days} days x {periods} periods x {batches} batches)")]
    GridShape {
        days: usize,
        periods: usize,
        batches: usize,
    },
    #[error("department timetable is locked: {0}")]
    Locked(String),
    #[error("unknown department: {0}")]
    UnknownDepartment(String),
    #[error("unknown teacher: {0}")]
    UnknownTeacher(String),
    #[error("unknown subject: {0}")]
    UnknownSubject(String),
    #[error("unknown batch: {0}")]
    UnknownBatch(String),
    #[error("unknown request: {0}")]
    UnknownRequest(String),
    #[error("request invalid: {0}")]
    InvalidRequest(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
