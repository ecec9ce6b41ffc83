use crate::model::Department;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UtilizationStatus {
    #[serde(rename = "Over-utilized")]
    OverUtilized,
    #[serde(rename = "Under-utilized")]
    UnderUtilized,
    Optimal,
}

impl UtilizationStatus {
    /// Seuils du rapport global (plus larges que l'alerte du générateur).
    pub fn from_hours(hours: u32) -> Self {
        if hours > 18 {
            UtilizationStatus::OverUtilized
        } else if hours < 10 {
            UtilizationStatus::UnderUtilized
        } else {
            UtilizationStatus::Optimal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UtilizationStatus::OverUtilized => "Over-utilized",
            UtilizationStatus::UnderUtilized => "Under-utilized",
            UtilizationStatus::Optimal => "Optimal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadLine {
    pub department_name: String,
    pub subject_name: String,
    pub hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherWorkload {
    pub teacher_name: String,
    pub total_hours: u32,
    pub department_count: usize,
    pub status: UtilizationStatus,
    pub assignments: Vec<WorkloadLine>,
}

/// Charge de chaque enseignant, tous départements confondus.
///
/// Les enseignants sont regroupés par nom (les ids ne sont uniques que dans
/// un département). Seules les affectations dont l'enseignant et la matière
/// existent comptent. Tri par total décroissant, stable.
pub fn faculty_workload(departments: &[Department]) -> Vec<TeacherWorkload> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, Vec<WorkloadLine>> = HashMap::new();

    for dept in departments {
        for a in &dept.assignments {
            let (Some(teacher), Some(subject)) =
                (dept.find_teacher(&a.teacher_id), dept.find_subject(&a.subject_id))
            else {
                continue;
            };
            let lines = by_name.entry(teacher.name.clone()).or_insert_with(|| {
                order.push(teacher.name.clone());
                Vec::new()
            });
            lines.push(WorkloadLine {
                department_name: dept.name.clone(),
                subject_name: subject.name.clone(),
                hours: a.weekly_lectures,
            });
        }
    }

    let mut out: Vec<TeacherWorkload> = order
        .into_iter()
        .filter_map(|name| {
            let assignments = by_name.remove(&name)?;
            let total_hours = assignments
                .iter()
                .fold(0u32, |acc, l| acc.saturating_add(l.hours));
            let department_count = {
                let mut names: Vec<&str> =
                    assignments.iter().map(|l| l.department_name.as_str()).collect();
                names.sort_unstable();
                names.dedup();
                names.len()
            };
            Some(TeacherWorkload {
                department_count,
                status: UtilizationStatus::from_hours(total_hours),
                teacher_name: name,
                total_hours,
                assignments,
            })
        })
        .collect();
    out.sort_by(|a, b| b.total_hours.cmp(&a.total_hours));
    out
}

/// Totaux globaux affichés par l'éditeur de contraintes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallTotals {
    pub total_classrooms: usize,
    pub active_faculty: usize,
    pub total_subjects: usize,
}

pub fn overall_totals(departments: &[Department]) -> OverallTotals {
    departments
        .iter()
        .fold(OverallTotals::default(), |acc, d| OverallTotals {
            total_classrooms: acc.total_classrooms + d.classrooms.len(),
            active_faculty: acc.active_faculty + d.teachers.len(),
            total_subjects: acc.total_subjects + d.subjects.len(),
        })
}
