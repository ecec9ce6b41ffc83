use super::SchedError;
use crate::model::TimetableSettings;

/// Conditions fatales du moteur : aucun jour, aucune période, ou un jour répété.
pub(super) fn ensure_settings_usable(settings: &TimetableSettings) -> Result<(), SchedError> {
    if settings.working_days.is_empty() {
        return Err(SchedError::InvalidSettings("no working day configured"));
    }
    if settings.periods_per_day() == 0 {
        return Err(SchedError::InvalidSettings("no period configured"));
    }
    if settings.duplicate_day().is_some() {
        return Err(SchedError::InvalidSettings("working day listed twice"));
    }
    Ok(())
}

pub(super) fn shape_error(settings: &TimetableSettings, batch_count: usize) -> SchedError {
    SchedError::GridShape {
        days: settings.working_days.len(),
        periods: settings.periods_per_day(),
        batches: batch_count,
    }
}
