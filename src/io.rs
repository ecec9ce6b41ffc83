use crate::model::{Assignment, Department, Subject, Teacher, TimetableGrid};
use crate::scheduler::Conflict;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import d'enseignants depuis CSV: header `name`
pub fn import_teachers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Teacher>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid teacher row (empty)");
        }
        out.push(Teacher::new(name));
    }
    Ok(out)
}

/// Import de matières: header `name,code`
pub fn import_subjects_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Subject>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let code = rec.get(1).context("missing code")?.trim();
        if name.is_empty() || code.is_empty() {
            bail!("invalid subject row (empty)");
        }
        out.push(Subject::new(name, code));
    }
    Ok(out)
}

/// Import d'affectations: header `teacher,subject,weekly_lectures`.
///
/// `teacher` : id ou nom ; `subject` : id ou code. Résolus dans `department`.
pub fn import_assignments_csv<P: AsRef<Path>>(
    path: P,
    department: &Department,
) -> anyhow::Result<Vec<Assignment>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let teacher = rec.get(0).context("missing teacher")?.trim();
        let subject = rec.get(1).context("missing subject")?.trim();
        let weekly: u32 = rec
            .get(2)
            .context("missing weekly_lectures")?
            .trim()
            .parse()
            .with_context(|| format!("invalid weekly_lectures for {teacher}/{subject}"))?;
        if weekly == 0 {
            bail!("weekly_lectures must be > 0 for {teacher}/{subject}");
        }
        let teacher_id = department
            .teachers
            .iter()
            .find(|t| t.id.as_str() == teacher || t.name == teacher)
            .map(|t| t.id.clone())
            .with_context(|| format!("unknown teacher: {teacher}"))?;
        let subject_id = department
            .subjects
            .iter()
            .find(|s| s.id.as_str() == subject || s.code == subject)
            .map(|s| s.id.clone())
            .with_context(|| format!("unknown subject: {subject}"))?;
        out.push(Assignment::new(teacher_id, subject_id, weekly));
    }
    Ok(out)
}

/// Export JSON des départements (jolie mise en forme)
pub fn export_departments_json<P: AsRef<Path>>(
    path: P,
    departments: &[Department],
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(departments)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV d'une grille: header `day,period,timing,batch,subject_code,subject_name,teacher`.
///
/// Une ligne par cellule occupée, dans l'ordre des jours configurés.
pub fn export_grid_csv<P: AsRef<Path>>(
    path: P,
    department: &Department,
    grid: &TimetableGrid,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "day",
        "period",
        "timing",
        "batch",
        "subject_code",
        "subject_name",
        "teacher",
    ])?;
    let mut buf = itoa::Buffer::new();
    for (day, period, batch_index, slot) in grid.placed(&department.settings) {
        let batch = department
            .batches
            .get(batch_index)
            .map(|b| b.name.as_str())
            .unwrap_or("");
        let timing = department.settings.timing(period).unwrap_or("");
        w.write_record([
            day,
            buf.format(period + 1),
            timing,
            batch,
            slot.subject.code.as_str(),
            slot.subject.name.as_str(),
            slot.teacher.name.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des conflits: header `type,level,description`
pub fn export_conflicts_csv<P: AsRef<Path>>(path: P, conflicts: &[Conflict]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["type", "level", "description"])?;
    for c in conflicts {
        w.write_record([c.kind.label(), c.level.as_str(), c.description.as_str()])?;
    }
    w.flush()?;
    Ok(())
}
