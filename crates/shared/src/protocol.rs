use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Doctor, DoctorId, Event, EventId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorQuery {
    pub doctor_id: DoctorId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub doctor_id: DoctorId,
    pub event_id: EventId,
    pub patient_name: String,
    pub appointment_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventInput {
    pub doctor_id: DoctorId,
    pub event_id: EventId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientNameInput {
    pub doctor_id: DoctorId,
    pub event_id: EventId,
    pub new_patient_name: String,
}

/// A named operation with its argument record, e.g.
/// `{"operation": "create-event", "args": {"doctorId": "1", ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", content = "args", rename_all = "kebab-case")]
pub enum OperationRequest {
    GetDoctor(DoctorQuery),
    ListEvents(DoctorQuery),
    CreateEvent(CreateEventInput),
    /// Delete takes its arguments grouped under `input`.
    DeleteEvent { input: DeleteEventInput },
    UpdatePatientName(UpdatePatientNameInput),
}

impl OperationRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetDoctor(_) => "get-doctor",
            Self::ListEvents(_) => "list-events",
            Self::CreateEvent(_) => "create-event",
            Self::DeleteEvent { .. } => "delete-event",
            Self::UpdatePatientName(_) => "update-patient-name",
        }
    }

    pub fn doctor_id(&self) -> &DoctorId {
        match self {
            Self::GetDoctor(q) | Self::ListEvents(q) => &q.doctor_id,
            Self::CreateEvent(input) => &input.doctor_id,
            Self::DeleteEvent { input } => &input.doctor_id,
            Self::UpdatePatientName(input) => &input.doctor_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationResponse {
    Doctor(Doctor),
    Events(Vec<Event>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    EventCreated {
        doctor_id: DoctorId,
        event: Event,
        at: DateTime<Utc>,
    },
    EventDeleted {
        doctor_id: DoctorId,
        event_id: EventId,
        at: DateTime<Utc>,
    },
    PatientRenamed {
        doctor_id: DoctorId,
        event: Event,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
