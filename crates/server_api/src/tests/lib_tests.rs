use super::*;
use shared::domain::EventId;
use std::{sync::Barrier, thread};

fn seeded() -> ApiContext {
    ApiContext::new(Registry::seeded(), RenamePolicy::MoveToEnd)
}

fn doctor_one() -> DoctorId {
    DoctorId::new("1")
}

fn create(event_id: &str, patient_name: &str, appointment_time: &str) -> CreateEventInput {
    CreateEventInput {
        doctor_id: doctor_one(),
        event_id: EventId::new(event_id),
        patient_name: patient_name.into(),
        appointment_time: appointment_time.into(),
    }
}

fn rename(event_id: &str, new_patient_name: &str) -> UpdatePatientNameInput {
    UpdatePatientNameInput {
        doctor_id: doctor_one(),
        event_id: EventId::new(event_id),
        new_patient_name: new_patient_name.into(),
    }
}

fn remove(event_id: &str) -> DeleteEventInput {
    DeleteEventInput {
        doctor_id: doctor_one(),
        event_id: EventId::new(event_id),
    }
}

fn stored_events(ctx: &ApiContext) -> Vec<Event> {
    list_events(ctx, &doctor_one()).expect("events")
}

#[test]
fn get_doctor_returns_full_record() {
    let ctx = seeded();
    let doctor = get_doctor(&ctx, &doctor_one()).expect("doctor");
    assert_eq!(doctor.doctor_name, "Angela");
    assert_eq!(doctor.events.len(), 2);
}

#[test]
fn unknown_doctor_is_rejected_by_every_operation() {
    let ctx = seeded();
    let missing = DoctorId::new("7");
    assert_eq!(
        get_doctor(&ctx, &missing),
        Err(ScheduleError::InvalidDoctorId)
    );
    assert_eq!(
        list_events(&ctx, &missing),
        Err(ScheduleError::InvalidDoctorId)
    );

    let mut input = create("3", "Sam", "11:00");
    input.doctor_id = missing.clone();
    assert_eq!(
        create_event(&ctx, &input),
        Err(ScheduleError::InvalidDoctorId)
    );

    let mut input = remove("1");
    input.doctor_id = missing.clone();
    assert_eq!(
        delete_event(&ctx, &input),
        Err(ScheduleError::InvalidDoctorId)
    );

    let mut input = rename("1", "Lee");
    input.doctor_id = missing;
    assert_eq!(
        update_patient_name(&ctx, &input),
        Err(ScheduleError::InvalidDoctorId)
    );
}

#[test]
fn create_appends_new_event() {
    let ctx = seeded();
    let events = create_event(&ctx, &create("3", "Sam", "11:00")).expect("create");
    assert_eq!(events.len(), 3);
    assert_eq!(events.last(), Some(&Event::new("3", "Sam", "11:00")));
    assert_eq!(stored_events(&ctx), events);
}

#[test]
fn create_with_existing_id_leaves_schedule_unchanged() {
    let ctx = seeded();
    let before = stored_events(&ctx);
    assert_eq!(
        create_event(&ctx, &create("1", "Sam", "11:00")),
        Err(ScheduleError::DuplicateEventId)
    );
    assert_eq!(stored_events(&ctx), before);
}

#[test]
fn duplicate_id_is_reported_before_taken_slot() {
    let ctx = seeded();
    assert_eq!(
        create_event(&ctx, &create("2", "Sam", "9:30")),
        Err(ScheduleError::DuplicateEventId)
    );
}

#[test]
fn create_in_taken_slot_leaves_schedule_unchanged() {
    let ctx = seeded();
    let before = stored_events(&ctx);
    assert_eq!(
        create_event(&ctx, &create("3", "Sam", "15:30")),
        Err(ScheduleError::TimeSlotTaken)
    );
    assert_eq!(stored_events(&ctx), before);
}

#[test]
fn delete_removes_only_the_matching_event() {
    let ctx = seeded();
    let events = delete_event(&ctx, &remove("1")).expect("delete");
    assert_eq!(events, vec![Event::new("2", "Chang", "15:30")]);
}

#[test]
fn delete_unknown_event_leaves_schedule_unchanged() {
    let ctx = seeded();
    let before = stored_events(&ctx);
    assert_eq!(
        delete_event(&ctx, &remove("9")),
        Err(ScheduleError::EventNotFound)
    );
    assert_eq!(stored_events(&ctx), before);
}

#[test]
fn deleted_slot_can_be_booked_again() {
    let ctx = seeded();
    delete_event(&ctx, &remove("1")).expect("delete");
    let events = create_event(&ctx, &create("1", "Sam", "9:30")).expect("rebook");
    assert_eq!(events.len(), 2);
}

#[test]
fn rename_moves_event_to_end_by_default() {
    let ctx = seeded();
    let events = update_patient_name(&ctx, &rename("1", "Lee")).expect("rename");
    assert_eq!(
        events,
        vec![
            Event::new("2", "Chang", "15:30"),
            Event::new("1", "Lee", "9:30"),
        ]
    );
}

#[test]
fn rename_in_place_keeps_order() {
    let ctx = ApiContext::new(Registry::seeded(), RenamePolicy::InPlace);
    let events = update_patient_name(&ctx, &rename("1", "Lee")).expect("rename");
    assert_eq!(
        events,
        vec![
            Event::new("1", "Lee", "9:30"),
            Event::new("2", "Chang", "15:30"),
        ]
    );
}

#[test]
fn rename_preserves_id_time_and_count() {
    let ctx = seeded();
    let events = update_patient_name(&ctx, &rename("2", "Lee")).expect("rename");
    assert_eq!(events.len(), 2);
    assert!(events.contains(&Event::new("2", "Lee", "15:30")));
}

#[test]
fn rename_unknown_event_is_rejected() {
    let ctx = seeded();
    assert_eq!(
        update_patient_name(&ctx, &rename("5", "Lee")),
        Err(ScheduleError::EventNotFound)
    );
}

#[test]
fn concurrent_creates_with_same_id_book_once() {
    let ctx = seeded();
    let workers = 8;
    let barrier = Barrier::new(workers);

    let successes = thread::scope(|scope| {
        let handles = (0..workers)
            .map(|worker| {
                let ctx = &ctx;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    create_event(ctx, &create("3", "Sam", &format!("slot-{worker}"))).is_ok()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker"))
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(successes, 1);
    assert_eq!(stored_events(&ctx).len(), 3);
}

#[test]
fn concurrent_creates_in_same_slot_book_once() {
    let ctx = seeded();
    let workers = 8;
    let barrier = Barrier::new(workers);

    let successes = thread::scope(|scope| {
        let handles = (0..workers)
            .map(|worker| {
                let ctx = &ctx;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    create_event(ctx, &create(&format!("w{worker}"), "Sam", "11:00")).is_ok()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker"))
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(successes, 1);
}

#[test]
fn dispatch_renders_unknown_doctor_as_sentinels() {
    let ctx = seeded();
    let request: OperationRequest = serde_json::from_value(serde_json::json!({
        "operation": "list-events",
        "args": { "doctorId": "404" }
    }))
    .expect("request");
    let dispatched = dispatch(&ctx, request);
    assert!(dispatched.notification.is_none());
    assert_eq!(
        serde_json::to_value(&dispatched.response).expect("json"),
        serde_json::json!([{
            "eventId": "Invalid ID",
            "patientName": "null",
            "appointmentTime": "null"
        }])
    );

    let request: OperationRequest = serde_json::from_value(serde_json::json!({
        "operation": "get-doctor",
        "args": { "doctorId": "404" }
    }))
    .expect("request");
    let OperationResponse::Doctor(doctor) = dispatch(&ctx, request).response else {
        panic!("expected doctor shape");
    };
    assert_eq!(doctor.doctor_id.as_str(), "Invalid ID");
    assert_eq!(doctor.specialty, "null");
}

#[test]
fn dispatch_create_publishes_notification() {
    let ctx = seeded();
    let dispatched = dispatch(
        &ctx,
        OperationRequest::CreateEvent(create("3", "Sam", "11:00")),
    );
    let OperationResponse::Events(events) = dispatched.response else {
        panic!("expected events");
    };
    assert_eq!(events.len(), 3);
    let Some(ServerEvent::EventCreated {
        doctor_id, event, ..
    }) = dispatched.notification
    else {
        panic!("expected created notification");
    };
    assert_eq!(doctor_id, doctor_one());
    assert_eq!(event, Event::new("3", "Sam", "11:00"));
}

#[test]
fn dispatch_conflicts_render_sentinels_without_notification() {
    let ctx = seeded();
    let dispatched = dispatch(
        &ctx,
        OperationRequest::CreateEvent(create("3", "Sam", "9:30")),
    );
    assert!(dispatched.notification.is_none());
    assert_eq!(
        dispatched.response,
        OperationResponse::Events(vec![Event::new(
            "null",
            "null",
            "Appointment full at that time"
        )])
    );

    let dispatched = dispatch(&ctx, OperationRequest::DeleteEvent { input: remove("8") });
    assert_eq!(
        dispatched.response,
        OperationResponse::Events(vec![Event::new("Non-existing event", "null", "null")])
    );
}

#[test]
fn dispatch_rename_reports_renamed_event() {
    let ctx = seeded();
    let dispatched = dispatch(&ctx, OperationRequest::UpdatePatientName(rename("2", "Lee")));
    let Some(ServerEvent::PatientRenamed { event, .. }) = dispatched.notification else {
        panic!("expected rename notification");
    };
    assert_eq!(event, Event::new("2", "Lee", "15:30"));
}

#[test]
fn dispatch_delete_reports_removed_id() {
    let ctx = seeded();
    let dispatched = dispatch(&ctx, OperationRequest::DeleteEvent { input: remove("1") });
    assert_eq!(
        dispatched.response,
        OperationResponse::Events(vec![Event::new("2", "Chang", "15:30")])
    );
    let Some(ServerEvent::EventDeleted { event_id, .. }) = dispatched.notification else {
        panic!("expected delete notification");
    };
    assert_eq!(event_id, EventId::new("1"));
}
