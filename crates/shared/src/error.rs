use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Doctor, DoctorId, Event, EventId};

pub const NULL_MARKER: &str = "null";
pub const INVALID_ID: &str = "Invalid ID";
pub const EXISTING_EVENT: &str = "Existing event";
pub const APPOINTMENT_FULL: &str = "Appointment full at that time";
pub const NON_EXISTING_EVENT: &str = "Non-existing event";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Conflict,
    Validation,
    Internal,
}

/// Transport-level failure body, used when a request never reaches a handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Scheduling failures. At the operation boundary each kind is rendered as a
/// sentinel record with the same shape as the success result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("no doctor with the given id")]
    InvalidDoctorId,
    #[error("an event with this id already exists")]
    DuplicateEventId,
    #[error("appointment time slot already taken")]
    TimeSlotTaken,
    #[error("no event with the given id")]
    EventNotFound,
}

impl ScheduleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidDoctorId | Self::EventNotFound => ErrorCode::NotFound,
            Self::DuplicateEventId | Self::TimeSlotTaken => ErrorCode::Conflict,
        }
    }

    pub fn event_sentinel(&self) -> Event {
        let (event_id, appointment_time) = match self {
            Self::InvalidDoctorId => (INVALID_ID, NULL_MARKER),
            Self::DuplicateEventId => (EXISTING_EVENT, NULL_MARKER),
            Self::TimeSlotTaken => (NULL_MARKER, APPOINTMENT_FULL),
            Self::EventNotFound => (NON_EXISTING_EVENT, NULL_MARKER),
        };
        Event {
            event_id: EventId::new(event_id),
            patient_name: NULL_MARKER.to_string(),
            appointment_time: appointment_time.to_string(),
        }
    }

    /// Only `InvalidDoctorId` can come out of a doctor lookup; the other kinds
    /// carry their message in `doctor_id` the same way.
    pub fn doctor_sentinel(&self) -> Doctor {
        let doctor_id = match self {
            Self::InvalidDoctorId => INVALID_ID,
            Self::DuplicateEventId => EXISTING_EVENT,
            Self::TimeSlotTaken => APPOINTMENT_FULL,
            Self::EventNotFound => NON_EXISTING_EVENT,
        };
        Doctor {
            doctor_id: DoctorId::new(doctor_id),
            doctor_name: NULL_MARKER.to_string(),
            clinic_name: NULL_MARKER.to_string(),
            specialty: NULL_MARKER.to_string(),
            events: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
