use super::RequiredSession;
use crate::model::{Assignment, AssignmentId, Batch, BatchId, Subject, SubjectId, Teacher};

/// Raison pour laquelle un couple (promotion, matière) ne produit aucune séance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    UnknownSubject,
    NoAssignment,
    UnknownTeacher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDemand {
    pub batch: BatchId,
    pub subject: SubjectId,
    pub reason: UnresolvedReason,
}

/// Ce que l'expansion ignore en silence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemandDiagnostics {
    pub unresolved: Vec<UnresolvedDemand>,
    /// Affectations masquées par une affectation antérieure sur la même matière.
    pub shadowed: Vec<AssignmentId>,
}

impl DemandDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.shadowed.is_empty()
    }
}

/// Déplie promotions × matières × volume hebdomadaire en séances unitaires.
///
/// Seule la première affectation d'une matière est consultée. Un couple dont
/// la matière, l'affectation ou l'enseignant est introuvable ne produit rien.
pub fn expand_demand<'a>(
    batches: &'a [Batch],
    subjects: &'a [Subject],
    assignments: &'a [Assignment],
    teachers: &'a [Teacher],
) -> Vec<RequiredSession<'a>> {
    expand_demand_with_diagnostics(batches, subjects, assignments, teachers).0
}

pub fn expand_demand_with_diagnostics<'a>(
    batches: &'a [Batch],
    subjects: &'a [Subject],
    assignments: &'a [Assignment],
    teachers: &'a [Teacher],
) -> (Vec<RequiredSession<'a>>, DemandDiagnostics) {
    let mut sessions = Vec::new();
    let mut diagnostics = DemandDiagnostics::default();

    for (batch_index, batch) in batches.iter().enumerate() {
        for subject_id in &batch.subject_ids {
            match resolve(subject_id, subjects, assignments, teachers) {
                Ok((subject, assignment, teacher)) => {
                    let copies = assignment.weekly_lectures as usize;
                    let session = RequiredSession {
                        batch,
                        batch_index,
                        subject,
                        teacher,
                    };
                    sessions.extend(std::iter::repeat(session).take(copies));
                }
                Err(reason) => {
                    tracing::warn!(
                        batch = %batch.id,
                        subject = %subject_id,
                        ?reason,
                        "demand skipped"
                    );
                    diagnostics.unresolved.push(UnresolvedDemand {
                        batch: batch.id.clone(),
                        subject: subject_id.clone(),
                        reason,
                    });
                }
            }
        }
    }

    for (idx, a) in assignments.iter().enumerate() {
        if assignments[..idx].iter().any(|prev| prev.subject_id == a.subject_id) {
            diagnostics.shadowed.push(a.id.clone());
        }
    }

    (sessions, diagnostics)
}

fn resolve<'a>(
    subject_id: &SubjectId,
    subjects: &'a [Subject],
    assignments: &'a [Assignment],
    teachers: &'a [Teacher],
) -> Result<(&'a Subject, &'a Assignment, &'a Teacher), UnresolvedReason> {
    let subject = subjects
        .iter()
        .find(|s| &s.id == subject_id)
        .ok_or(UnresolvedReason::UnknownSubject)?;
    let assignment = assignments
        .iter()
        .find(|a| &a.subject_id == subject_id)
        .ok_or(UnresolvedReason::NoAssignment)?;
    let teacher = teachers
        .iter()
        .find(|t| t.id == assignment.teacher_id)
        .ok_or(UnresolvedReason::UnknownTeacher)?;
    Ok((subject, assignment, teacher))
}
