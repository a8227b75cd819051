use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use server_api::dispatch;
use shared::{
    domain::{DoctorId, EventId},
    error::{ApiError, ErrorCode},
    protocol::{
        CreateEventInput, DeleteEventInput, DoctorQuery, OperationRequest, OperationResponse,
        UpdatePatientNameInput,
    },
};
use tracing::{debug, warn};

use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewEventRequest {
    event_id: String,
    patient_name: String,
    appointment_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenamePatientRequest {
    new_patient_name: String,
}

type Rejection = (StatusCode, Json<ApiError>);

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

/// Named-operation endpoint: the body is an `OperationRequest`, the reply is
/// the operation's result (or its sentinel) unchanged.
pub(crate) async fn run_operation(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<OperationResponse>, Rejection> {
    let request: OperationRequest = parse_body(&body, "operation request")?;
    Ok(run(&state, request))
}

pub(crate) async fn http_get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Json<OperationResponse> {
    run(
        &state,
        OperationRequest::GetDoctor(DoctorQuery {
            doctor_id: DoctorId(doctor_id),
        }),
    )
}

pub(crate) async fn http_list_events(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Json<OperationResponse> {
    run(
        &state,
        OperationRequest::ListEvents(DoctorQuery {
            doctor_id: DoctorId(doctor_id),
        }),
    )
}

pub(crate) async fn http_create_event(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
    body: Bytes,
) -> Result<Json<OperationResponse>, Rejection> {
    let req: NewEventRequest = parse_body(&body, "event request")?;
    Ok(run(
        &state,
        OperationRequest::CreateEvent(CreateEventInput {
            doctor_id: DoctorId(doctor_id),
            event_id: EventId(req.event_id),
            patient_name: req.patient_name,
            appointment_time: req.appointment_time,
        }),
    ))
}

pub(crate) async fn http_delete_event(
    State(state): State<Arc<AppState>>,
    Path((doctor_id, event_id)): Path<(String, String)>,
) -> Json<OperationResponse> {
    run(
        &state,
        OperationRequest::DeleteEvent {
            input: DeleteEventInput {
                doctor_id: DoctorId(doctor_id),
                event_id: EventId(event_id),
            },
        },
    )
}

pub(crate) async fn http_rename_patient(
    State(state): State<Arc<AppState>>,
    Path((doctor_id, event_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<OperationResponse>, Rejection> {
    let req: RenamePatientRequest = parse_body(&body, "rename request")?;
    Ok(run(
        &state,
        OperationRequest::UpdatePatientName(UpdatePatientNameInput {
            doctor_id: DoctorId(doctor_id),
            event_id: EventId(event_id),
            new_patient_name: req.new_patient_name,
        }),
    ))
}

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

/// Streams schedule change notifications to one subscriber until it hangs up.
async fn ws_connection(state: Arc<AppState>, socket: axum::extract::ws::WebSocket) {
    use axum::extract::ws::Message;
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut events_rx = state.events.subscribe();

    let send_task = tokio::spawn(async move {
        while let Ok(event) = events_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(_msg)) = receiver.next().await {}

    send_task.abort();
    debug!("schedule subscriber disconnected");
}

/// Bodies are read as raw bytes so every malformed payload, whatever its
/// content type, is answered with a 400 `ApiError`.
fn parse_body<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, Rejection> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "rejecting malformed {what}");
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                format!("invalid {what}: {e}"),
            )),
        )
    })
}

fn run(state: &AppState, request: OperationRequest) -> Json<OperationResponse> {
    let dispatched = dispatch(&state.api, request);
    if let Some(event) = dispatched.notification {
        // No subscribers is not an error.
        let _ = state.events.send(event);
    }
    Json(dispatched.response)
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
