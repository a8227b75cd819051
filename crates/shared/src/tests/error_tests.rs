use super::*;

#[test]
fn invalid_doctor_sentinel_matches_legacy_shape() {
    let value = serde_json::to_value(ScheduleError::InvalidDoctorId.event_sentinel()).expect("json");
    assert_eq!(
        value,
        serde_json::json!({
            "eventId": "Invalid ID",
            "patientName": "null",
            "appointmentTime": "null"
        })
    );
}

#[test]
fn time_slot_sentinel_carries_message_in_appointment_time() {
    let sentinel = ScheduleError::TimeSlotTaken.event_sentinel();
    assert_eq!(sentinel.event_id.as_str(), "null");
    assert_eq!(sentinel.patient_name, "null");
    assert_eq!(sentinel.appointment_time, "Appointment full at that time");
}

#[test]
fn event_level_sentinels_carry_message_in_event_id() {
    assert_eq!(
        ScheduleError::DuplicateEventId.event_sentinel().event_id.as_str(),
        "Existing event"
    );
    assert_eq!(
        ScheduleError::EventNotFound.event_sentinel().event_id.as_str(),
        "Non-existing event"
    );
}

#[test]
fn doctor_sentinel_nulls_descriptive_fields() {
    let doctor = ScheduleError::InvalidDoctorId.doctor_sentinel();
    assert_eq!(doctor.doctor_id.as_str(), "Invalid ID");
    assert_eq!(doctor.doctor_name, "null");
    assert_eq!(doctor.clinic_name, "null");
    assert_eq!(doctor.specialty, "null");
    assert!(doctor.events.is_empty());
}

#[test]
fn error_codes_split_missing_from_conflicting() {
    assert_eq!(ScheduleError::InvalidDoctorId.code(), ErrorCode::NotFound);
    assert_eq!(ScheduleError::EventNotFound.code(), ErrorCode::NotFound);
    assert_eq!(ScheduleError::DuplicateEventId.code(), ErrorCode::Conflict);
    assert_eq!(ScheduleError::TimeSlotTaken.code(), ErrorCode::Conflict);
}
