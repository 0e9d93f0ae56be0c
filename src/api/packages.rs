//! Package recommendation endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::booking::recommend;
use crate::db::PackageRecommendation;
use crate::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RecommendPackagesRequest {
    pub event_id: i64,
    pub budget: i64,
    pub guest_count: i64,
}

#[derive(Debug, Serialize)]
pub struct RecommendPackagesResponse {
    pub success: bool,
    pub packages: Vec<PackageRecommendation>,
}

/// Recommend package tiers for a budget and guest count
///
/// POST /api/packages/recommend
///
/// Read-only and safe to retry. An empty candidate list is reported as an
/// error, never as an empty success.
pub async fn recommend_packages(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendPackagesRequest>,
) -> Result<Json<RecommendPackagesResponse>, ApiError> {
    let packages = recommend::recommend(&state.db, req.event_id, req.budget, req.guest_count)
        .await?;

    Ok(Json(RecommendPackagesResponse {
        success: true,
        packages,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;
    use axum::extract::State;
    use serde_json::json;

    #[test]
    fn test_request_shape_uses_event_id() {
        let req: RecommendPackagesRequest = serde_json::from_value(json!({
            "event_id": 1,
            "budget": 500_000,
            "guest_count": 200,
        }))
        .unwrap();
        assert_eq!(req.event_id, 1);
    }

    #[tokio::test]
    async fn test_recommend_returns_candidates() {
        let state = test_state().await;
        let response = recommend_packages(
            State(state),
            Json(RecommendPackagesRequest {
                event_id: 1,
                budget: 500_000,
                guest_count: 200,
            }),
        )
        .await
        .unwrap();
        assert!(response.0.success);
        assert!(!response.0.packages.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_empty_result_is_an_error() {
        let state = test_state().await;
        let err = recommend_packages(
            State(state),
            Json(RecommendPackagesRequest {
                event_id: 1,
                budget: 1_000,
                guest_count: 50,
            }),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().starts_with("[not_found]"));
    }
}
