mod call_schedules;
mod error;
mod event_requests;
mod event_types;
mod packages;
mod validation;

pub use error::{ApiError, ErrorCode};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Event-type catalog
        .route("/event-types", get(event_types::list_event_types))
        // Event requests
        .route("/event-requests", post(event_requests::create_event_request))
        .route(
            "/event-requests/update-package",
            post(event_requests::update_package),
        )
        // Package recommendations
        .route("/packages/recommend", post(packages::recommend_packages))
        // Call schedules
        .route("/call-schedules", post(call_schedules::create_call_schedule))
        .route("/call-schedules", get(call_schedules::list_call_schedules));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::config::Config;
    use crate::db::test_pool;
    use crate::notifications::{mock_mailer::MockMailer, Mailer, NotificationService};
    use crate::AppState;

    /// App state over an in-memory database and a recording mailer.
    pub(crate) async fn test_state() -> Arc<AppState> {
        let pool = test_pool().await;
        let notifier = Arc::new(NotificationService::new(
            pool.clone(),
            Arc::new(MockMailer::new()) as Arc<dyn Mailer>,
            None,
            "desk@planora.local".to_string(),
            "https://planora.example.com".to_string(),
        ));
        Arc::new(AppState::new(Config::default(), pool, notifier))
    }
}
