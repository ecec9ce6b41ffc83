use crate::scheduler::SchedError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiant fort d'une demande
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestKind {
    Swap,
    Reschedule,
    Takeover,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// Créneau visé par la demande (tel qu'affiché dans l'emploi du temps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    pub day: String,
    pub time: String,
    pub course: String,
}

/// Cible : nouveau créneau pour un report, note libre pour un échange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestTarget {
    Slot { day: String, time: String },
    Note { note: String },
}

/// Demande de changement déposée par un enseignant.
///
/// Le moteur ne la traite pas : elle est seulement persistée à côté des départements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub id: RequestId,
    pub created_at: DateTime<Utc>,
    pub requester_name: String,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub from: SlotRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<RequestTarget>,
    #[serde(default)]
    pub reason: String,
    pub status: RequestStatus,
}

impl ChangeRequest {
    pub fn new(
        requester_name: &str,
        kind: RequestKind,
        from: SlotRef,
        to: Option<RequestTarget>,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, SchedError> {
        if from.day.trim().is_empty() || from.time.trim().is_empty() || from.course.trim().is_empty()
        {
            return Err(SchedError::InvalidRequest(
                "from day, time and course are required",
            ));
        }
        Ok(Self {
            id: RequestId::random(),
            created_at: now,
            requester_name: requester_name.to_string(),
            kind,
            from,
            to,
            reason: reason.to_string(),
            status: RequestStatus::Pending,
        })
    }
}

/// Ajoute en tête (les plus récentes d'abord).
pub fn submit(requests: &mut Vec<ChangeRequest>, request: ChangeRequest) {
    requests.insert(0, request);
}

pub fn cancel(requests: &mut [ChangeRequest], id: &RequestId) -> Result<(), SchedError> {
    let request = requests
        .iter_mut()
        .find(|r| &r.id == id)
        .ok_or_else(|| SchedError::UnknownRequest(id.as_str().to_string()))?;
    request.status = RequestStatus::Cancelled;
    Ok(())
}

pub fn for_requester<'a>(
    requests: &'a [ChangeRequest],
    requester_name: &'a str,
) -> impl Iterator<Item = &'a ChangeRequest> + 'a {
    requests
        .iter()
        .filter(move |r| r.requester_name == requester_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn from() -> SlotRef {
        SlotRef {
            day: "Monday".into(),
            time: "09:00 - 10:00".into(),
            course: "CS101".into(),
        }
    }

    #[test]
    fn submit_prepends_and_cancel_flags() {
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap();
        let mut all = Vec::new();
        let first = ChangeRequest::new("Dr. Tanwi", RequestKind::Cancel, from(), None, "", now).unwrap();
        let second = ChangeRequest::new(
            "Prof. Sachin",
            RequestKind::Reschedule,
            from(),
            Some(RequestTarget::Slot {
                day: "Friday".into(),
                time: "14:00 - 15:00".into(),
            }),
            "conference",
            now,
        )
        .unwrap();
        let first_id = first.id.clone();
        submit(&mut all, first);
        submit(&mut all, second);
        assert_eq!(all[1].id, first_id);

        cancel(&mut all, &first_id).unwrap();
        assert_eq!(all[1].status, RequestStatus::Cancelled);
        assert!(cancel(&mut all, &RequestId::new("missing")).is_err());
        assert_eq!(for_requester(&all, "Prof. Sachin").count(), 1);
    }

    #[test]
    fn rejects_incomplete_origin() {
        let mut slot = from();
        slot.course.clear();
        let res = ChangeRequest::new("x", RequestKind::Swap, slot, None, "", Utc::now());
        assert!(res.is_err());
    }

    #[test]
    fn serializes_with_ticket_layout() {
        let now = Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap();
        let req = ChangeRequest::new(
            "Dr. Tanwi",
            RequestKind::Swap,
            from(),
            Some(RequestTarget::Note {
                note: "Prof. Sandeep".into(),
            }),
            "",
            now,
        )
        .unwrap();
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["type"], "SWAP");
        assert_eq!(value["status"], "PENDING");
        assert_eq!(value["to"]["note"], "Prof. Sandeep");
        assert_eq!(value["requesterName"], "Dr. Tanwi");
    }
}
