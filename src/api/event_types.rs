//! Event-type catalog endpoints backing step 1 of the booking wizard.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::db::EventCatalogEntry;
use crate::AppState;

use super::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ListEventTypesResponse {
    pub success: bool,
    pub event_types: Vec<EventCatalogEntry>,
}

/// List the event-type catalog
///
/// GET /api/event-types
pub async fn list_event_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListEventTypesResponse>, ApiError> {
    let event_types = crate::db::gateway::list_catalog(&state.db).await?;
    Ok(Json(ListEventTypesResponse {
        success: true,
        event_types,
    }))
}
