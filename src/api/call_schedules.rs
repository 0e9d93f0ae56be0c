//! Call scheduling endpoints: the step that commits a booking, plus a
//! listing used by the admin dashboard.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::booking::scheduling::{self, ScheduleCallRequest};
use crate::db::{gateway, CallSchedule};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_date_time, validate_email, validate_uuid, validate_whatsapp};

#[derive(Debug, Deserialize)]
pub struct CreateCallScheduleRequest {
    pub event_request_id: String,
    pub scheduled_time: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_whatsapp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCallScheduleResponse {
    pub success: bool,
    pub call_schedule: CallSchedule,
}

fn validate_create_request(req: &CreateCallScheduleRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_uuid(&req.event_request_id, "event_request_id") {
        errors.add("event_request_id", e);
    }
    if let Err(e) = validate_date_time(&req.scheduled_time) {
        errors.add("scheduled_time", e);
    }
    if let Some(email) = req.user_email.as_deref().filter(|s| !s.trim().is_empty()) {
        if let Err(e) = validate_email(email) {
            errors.add("user_email", e);
        }
    }
    if let Some(number) = req
        .user_whatsapp
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        if let Err(e) = validate_whatsapp(number) {
            errors.add("user_whatsapp", e);
        }
    }

    errors.finish()
}

/// Schedule the consultation call for an event request
///
/// POST /api/call-schedules
///
/// Confirms the owning request and fans out notifications; both are best
/// effort once the schedule row is in.
pub async fn create_call_schedule(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCallScheduleRequest>,
) -> Result<(StatusCode, Json<CreateCallScheduleResponse>), ApiError> {
    validate_create_request(&req)?;

    let call_schedule = scheduling::schedule_call(
        &state.db,
        &state.notifier,
        ScheduleCallRequest {
            event_request_id: req.event_request_id,
            scheduled_time: req.scheduled_time,
            user_email: req.user_email,
            user_whatsapp: req.user_whatsapp,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCallScheduleResponse {
            success: true,
            call_schedule,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ListCallSchedulesQuery {
    pub event_request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ListCallSchedulesResponse {
    pub success: bool,
    pub call_schedules: Vec<CallSchedule>,
}

/// List call schedules for an event request
///
/// GET /api/call-schedules?event_request_id=ID
pub async fn list_call_schedules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListCallSchedulesQuery>,
) -> Result<Json<ListCallSchedulesResponse>, ApiError> {
    if let Err(e) = validate_uuid(&query.event_request_id, "event_request_id") {
        return Err(ApiError::validation_field("event_request_id", e));
    }

    let call_schedules = gateway::list_call_schedules(&state.db, &query.event_request_id).await?;

    Ok(Json(ListCallSchedulesResponse {
        success: true,
        call_schedules,
    }))
}
