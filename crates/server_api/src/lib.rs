use chrono::Utc;
use shared::{
    domain::{Doctor, DoctorId, Event, RenamePolicy},
    error::ScheduleError,
    protocol::{
        CreateEventInput, DeleteEventInput, OperationRequest, OperationResponse, ServerEvent,
        UpdatePatientNameInput,
    },
};
use storage::{DoctorRecord, Registry};
use tracing::{debug, warn};

#[derive(Clone, Default)]
pub struct ApiContext {
    pub registry: Registry,
    pub rename_policy: RenamePolicy,
}

impl ApiContext {
    pub fn new(registry: Registry, rename_policy: RenamePolicy) -> Self {
        Self {
            registry,
            rename_policy,
        }
    }
}

/// Result of running one named operation at the transport boundary.
#[derive(Debug, Clone)]
pub struct Dispatched {
    /// Success value, or the sentinel record standing in for an error.
    pub response: OperationResponse,
    /// Change notification to publish; set only when a mutation went through.
    pub notification: Option<ServerEvent>,
}

pub fn get_doctor(ctx: &ApiContext, doctor_id: &DoctorId) -> Result<Doctor, ScheduleError> {
    Ok(find_doctor(ctx, doctor_id)?.snapshot())
}

pub fn list_events(ctx: &ApiContext, doctor_id: &DoctorId) -> Result<Vec<Event>, ScheduleError> {
    Ok(find_doctor(ctx, doctor_id)?.events().clone())
}

pub fn create_event(
    ctx: &ApiContext,
    input: &CreateEventInput,
) -> Result<Vec<Event>, ScheduleError> {
    let record = find_doctor(ctx, &input.doctor_id)?;
    let mut events = record.events();
    if events.iter().any(|event| event.event_id == input.event_id) {
        return Err(ScheduleError::DuplicateEventId);
    }
    if events
        .iter()
        .any(|event| event.appointment_time == input.appointment_time)
    {
        return Err(ScheduleError::TimeSlotTaken);
    }

    events.push(Event {
        event_id: input.event_id.clone(),
        patient_name: input.patient_name.clone(),
        appointment_time: input.appointment_time.clone(),
    });
    Ok(events.clone())
}

pub fn delete_event(
    ctx: &ApiContext,
    input: &DeleteEventInput,
) -> Result<Vec<Event>, ScheduleError> {
    let record = find_doctor(ctx, &input.doctor_id)?;
    let mut events = record.events();
    let position = events
        .iter()
        .position(|event| event.event_id == input.event_id)
        .ok_or(ScheduleError::EventNotFound)?;

    events.remove(position);
    Ok(events.clone())
}

/// Replaces the patient on an existing appointment. The event id and time
/// slot never change; under [`RenamePolicy::MoveToEnd`] the replacement is
/// appended after the remaining events.
pub fn update_patient_name(
    ctx: &ApiContext,
    input: &UpdatePatientNameInput,
) -> Result<Vec<Event>, ScheduleError> {
    let record = find_doctor(ctx, &input.doctor_id)?;
    let mut events = record.events();
    let position = events
        .iter()
        .position(|event| event.event_id == input.event_id)
        .ok_or(ScheduleError::EventNotFound)?;

    match ctx.rename_policy {
        RenamePolicy::MoveToEnd => {
            let previous = events.remove(position);
            events.push(Event {
                event_id: previous.event_id,
                patient_name: input.new_patient_name.clone(),
                appointment_time: previous.appointment_time,
            });
        }
        RenamePolicy::InPlace => {
            events[position].patient_name = input.new_patient_name.clone();
        }
    }
    Ok(events.clone())
}

/// Runs a named operation and folds any scheduling error into its sentinel
/// record, so callers always get a result of the operation's normal shape.
pub fn dispatch(ctx: &ApiContext, request: OperationRequest) -> Dispatched {
    let operation = request.name();
    let doctor_id = request.doctor_id().clone();

    let (outcome, notification) = match request {
        OperationRequest::GetDoctor(query) => {
            let outcome = get_doctor(ctx, &query.doctor_id);
            log_outcome(operation, &doctor_id, outcome.as_ref().err());
            let response = match outcome {
                Ok(doctor) => OperationResponse::Doctor(doctor),
                Err(err) => OperationResponse::Doctor(err.doctor_sentinel()),
            };
            return Dispatched {
                response,
                notification: None,
            };
        }
        OperationRequest::ListEvents(query) => (list_events(ctx, &query.doctor_id), None),
        OperationRequest::CreateEvent(input) => {
            let outcome = create_event(ctx, &input);
            let notification = outcome.is_ok().then(|| ServerEvent::EventCreated {
                doctor_id: input.doctor_id,
                event: Event {
                    event_id: input.event_id,
                    patient_name: input.patient_name,
                    appointment_time: input.appointment_time,
                },
                at: Utc::now(),
            });
            (outcome, notification)
        }
        OperationRequest::DeleteEvent { input } => {
            let outcome = delete_event(ctx, &input);
            let notification = outcome.is_ok().then(|| ServerEvent::EventDeleted {
                doctor_id: input.doctor_id,
                event_id: input.event_id,
                at: Utc::now(),
            });
            (outcome, notification)
        }
        OperationRequest::UpdatePatientName(input) => {
            let outcome = update_patient_name(ctx, &input);
            let renamed = outcome.as_ref().ok().and_then(|events| {
                events
                    .iter()
                    .find(|event| event.event_id == input.event_id)
                    .cloned()
            });
            let notification = renamed.map(|event| ServerEvent::PatientRenamed {
                doctor_id: input.doctor_id,
                event,
                at: Utc::now(),
            });
            (outcome, notification)
        }
    };

    log_outcome(operation, &doctor_id, outcome.as_ref().err());
    let events = outcome.unwrap_or_else(|err| vec![err.event_sentinel()]);
    Dispatched {
        response: OperationResponse::Events(events),
        notification,
    }
}

fn find_doctor<'a>(
    ctx: &'a ApiContext,
    doctor_id: &DoctorId,
) -> Result<&'a DoctorRecord, ScheduleError> {
    ctx.registry
        .find_doctor(doctor_id)
        .ok_or(ScheduleError::InvalidDoctorId)
}

fn log_outcome(operation: &str, doctor_id: &DoctorId, err: Option<&ScheduleError>) {
    match err {
        None => debug!(operation, %doctor_id, "operation succeeded"),
        Some(err) => warn!(
            operation,
            %doctor_id,
            code = ?err.code(),
            error = %err,
            "operation answered with sentinel"
        ),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
