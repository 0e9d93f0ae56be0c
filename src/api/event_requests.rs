//! Event request endpoints: create (wizard step 2) and package selection
//! (wizard step 3).

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::booking::catalog;
use crate::db::{gateway, EventRequest, NewEventRequest, PackageTier};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_budget, validate_date_time, validate_guest_count, validate_location, validate_uuid,
};

#[derive(Debug, Deserialize)]
pub struct CreateEventRequestRequest {
    /// Catalog id of the chosen event type.
    #[serde(default)]
    pub event_id: Option<i64>,
    /// Alternative to `event_id`: the event-type tag, e.g. "wedding".
    /// Resolved against the live catalog with a static fallback for
    /// drifted entries.
    #[serde(default)]
    pub event_type: Option<String>,
    pub location: String,
    pub date_time: String,
    pub budget: i64,
    pub guest_count: i64,
    #[serde(default)]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub cart_service_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreateEventRequestResponse {
    pub success: bool,
    pub event_request: EventRequest,
}

fn validate_create_request(req: &CreateEventRequestRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if req.event_id.is_none() && req.event_type.is_none() {
        errors.add("event_id", "An event id or event type is required");
    }
    if let Err(e) = validate_location(&req.location) {
        errors.add("location", e);
    }
    if let Err(e) = validate_date_time(&req.date_time) {
        errors.add("date_time", e);
    }
    if let Err(e) = validate_budget(req.budget) {
        errors.add("budget", e);
    }
    if let Err(e) = validate_guest_count(req.guest_count) {
        errors.add("guest_count", e);
    }

    errors.finish()
}

/// Create an event request
///
/// POST /api/event-requests
///
/// Not idempotent: resubmitting creates a second request. Orphaned pending
/// requests are expected and cleaned up by the admin out of band.
pub async fn create_event_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequestRequest>,
) -> Result<(StatusCode, Json<CreateEventRequestResponse>), ApiError> {
    validate_create_request(&req)?;

    let event_catalog_id = match (req.event_id, req.event_type.as_deref()) {
        // Ids resolved through the static fallback table stay bookable
        // even when the live catalog row has drifted away.
        (Some(id), _) => {
            if gateway::find_catalog_entry(&state.db, id).await?.is_none()
                && !catalog::is_fallback_id(id)
            {
                return Err(ApiError::not_found(format!("Event type {} not found", id)));
            }
            id
        }
        (None, Some(tag)) => catalog::resolve_event_type(&state.db, tag).await?,
        (None, None) => {
            return Err(ApiError::validation_field(
                "event_id",
                "An event id or event type is required",
            ))
        }
    };

    let event_request = gateway::create_event_request(
        &state.db,
        &NewEventRequest {
            event_catalog_id,
            location: req.location.trim().to_string(),
            date_time: req.date_time.trim().to_string(),
            budget: req.budget,
            guest_count: req.guest_count,
            additional_notes: req.additional_notes.filter(|n| !n.trim().is_empty()),
            cart_service_ids: req.cart_service_ids,
        },
    )
    .await?;

    info!(
        event_request_id = %event_request.id,
        event_catalog_id,
        "Event request created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateEventRequestResponse {
            success: true,
            event_request,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePackageRequest {
    pub event_request_id: String,
    pub selected_package: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatePackageResponse {
    pub success: bool,
}

/// Record the selected package tier on an event request
///
/// POST /api/event-requests/update-package
pub async fn update_package(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdatePackageRequest>,
) -> Result<Json<UpdatePackageResponse>, ApiError> {
    if let Err(e) = validate_uuid(&req.event_request_id, "event_request_id") {
        return Err(ApiError::validation_field("event_request_id", e));
    }

    let tier: PackageTier = req
        .selected_package
        .parse()
        .map_err(|e: String| ApiError::validation_field("selected_package", e))?;

    let updated = gateway::update_selected_package(&state.db, &req.event_request_id, tier).await?;
    if !updated {
        return Err(ApiError::not_found("Event request not found"));
    }

    info!(
        event_request_id = %req.event_request_id,
        tier = %tier,
        "Package selection recorded"
    );

    Ok(Json(UpdatePackageResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;
    use axum::extract::State;
    use serde_json::json;

    fn create_body(event_id: Option<i64>, event_type: Option<&str>) -> CreateEventRequestRequest {
        CreateEventRequestRequest {
            event_id,
            event_type: event_type.map(String::from),
            location: "Mumbai".to_string(),
            date_time: "2026-09-01T10:00:00Z".to_string(),
            budget: 500_000,
            guest_count: 200,
            additional_notes: None,
            cart_service_ids: vec![1, 3],
        }
    }

    #[test]
    fn test_request_shape_accepts_event_id() {
        let req: CreateEventRequestRequest = serde_json::from_value(json!({
            "event_id": 1,
            "location": "Mumbai",
            "date_time": "2026-09-01T10:00:00Z",
            "budget": 500_000,
            "guest_count": 200,
        }))
        .unwrap();
        assert_eq!(req.event_id, Some(1));
        assert!(req.event_type.is_none());
        assert!(req.cart_service_ids.is_empty());
    }

    #[tokio::test]
    async fn test_create_by_event_id() {
        let state = test_state().await;
        let (status, response) =
            create_event_request(State(state), Json(create_body(Some(1), None)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(response.0.success);
        assert_eq!(response.0.event_request.event_catalog_id, 1);
        assert_eq!(response.0.event_request.status, "pending");
    }

    #[tokio::test]
    async fn test_create_by_event_type_tag() {
        let state = test_state().await;
        let (_, response) =
            create_event_request(State(state), Json(create_body(None, Some("corporate"))))
                .await
                .unwrap();
        assert_eq!(response.0.event_request.event_catalog_id, 3);
    }

    #[tokio::test]
    async fn test_create_requires_an_event_reference() {
        let state = test_state().await;
        let err = create_event_request(State(state), Json(create_body(None, None)))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("[validation_error]"));
    }

    #[tokio::test]
    async fn test_create_unknown_event_id_is_not_found() {
        let state = test_state().await;
        let err = create_event_request(State(state), Json(create_body(Some(999), None)))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("[not_found]"));
    }

    #[tokio::test]
    async fn test_update_package_round_trip() {
        let state = test_state().await;
        let (_, response) =
            create_event_request(State(state.clone()), Json(create_body(Some(1), None)))
                .await
                .unwrap();
        let id = response.0.event_request.id.clone();

        let updated = update_package(
            State(state.clone()),
            Json(UpdatePackageRequest {
                event_request_id: id.clone(),
                selected_package: "premium".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(updated.0.success);

        let found = gateway::find_event_request(&state.db, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.selected_package.as_deref(), Some("premium"));
    }
}
