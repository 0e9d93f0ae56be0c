//! The 4-step booking wizard.
//!
//! `WizardState` is an explicit state object with pure transition
//! functions, so every step-entry precondition is unit-testable without a
//! UI harness or a database. `BookingWizard` is the I/O driver that runs
//! the persistence and service calls around those transitions. A failed
//! call leaves the state exactly as it was: mutation happens only after
//! the underlying operation succeeded.

use std::sync::Arc;

use tracing::info;

use super::scheduling::{self, ScheduleCallRequest};
use super::{catalog, recommend, BookingError};
use crate::db::{gateway, CallSchedule, DbPool, NewEventRequest, PackageRecommendation, PackageTier};
use crate::notifications::NotificationService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    SelectingEventType,
    EnteringDetails,
    SelectingPackage,
    SchedulingCall,
    Complete,
}

impl std::fmt::Display for BookingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelectingEventType => write!(f, "event type selection"),
            Self::EnteringDetails => write!(f, "event details"),
            Self::SelectingPackage => write!(f, "package selection"),
            Self::SchedulingCall => write!(f, "call scheduling"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Step-2 form data, held verbatim so a failed submission loses nothing.
#[derive(Debug, Clone)]
pub struct EventDetails {
    pub location: String,
    pub date_time: String,
    pub budget: i64,
    pub guest_count: i64,
    pub additional_notes: Option<String>,
    pub cart_service_ids: Vec<i64>,
}

/// Snapshot of an in-progress booking session.
#[derive(Debug, Clone)]
pub struct WizardState {
    pub step: BookingStep,
    pub event_catalog_id: Option<i64>,
    pub event_request_id: Option<String>,
    pub details: Option<EventDetails>,
    pub recommendations: Vec<PackageRecommendation>,
    pub selected_package: Option<PackageTier>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self {
            step: BookingStep::SelectingEventType,
            event_catalog_id: None,
            event_request_id: None,
            details: None,
            recommendations: Vec::new(),
            selected_package: None,
        }
    }

    /// Step 1 accepted. Always permitted: reselecting the event type
    /// restarts data entry, so downstream fields are cleared.
    pub fn event_type_selected(&self, event_catalog_id: i64) -> WizardState {
        WizardState {
            step: BookingStep::EnteringDetails,
            event_catalog_id: Some(event_catalog_id),
            ..WizardState::new()
        }
    }

    /// Step 2 accepted: an EventRequest exists and the recommendation
    /// fetch succeeded.
    pub fn details_accepted(
        &self,
        event_request_id: String,
        details: EventDetails,
        recommendations: Vec<PackageRecommendation>,
    ) -> Result<WizardState, BookingError> {
        let Some(event_catalog_id) = self.event_catalog_id else {
            return Err(BookingError::Validation(
                "Select an event type before entering event details".to_string(),
            ));
        };
        if recommendations.is_empty() {
            return Err(BookingError::NoPackagesMatched);
        }
        Ok(WizardState {
            step: BookingStep::SelectingPackage,
            event_catalog_id: Some(event_catalog_id),
            event_request_id: Some(event_request_id),
            details: Some(details),
            recommendations,
            selected_package: None,
        })
    }

    /// Step 3 accepted. Fails closed when the session is not on the
    /// package step or holds no EventRequest id, rather than attempting a
    /// null-keyed update. The step check matters after a failed
    /// recommendation fetch, which leaves a created request id behind
    /// while the session stays on the details step.
    pub fn package_confirmed(&self, tier: PackageTier) -> Result<WizardState, BookingError> {
        if self.step != BookingStep::SelectingPackage || self.event_request_id.is_none() {
            return Err(BookingError::Validation(
                "Complete the event details step before selecting a package".to_string(),
            ));
        }
        Ok(WizardState {
            step: BookingStep::SchedulingCall,
            selected_package: Some(tier),
            ..self.clone()
        })
    }

    /// Step 4 accepted: the call schedule row exists.
    pub fn call_scheduled(&self) -> Result<WizardState, BookingError> {
        if self.event_request_id.is_none() {
            return Err(BookingError::Validation(
                "Complete the earlier steps before scheduling a call".to_string(),
            ));
        }
        Ok(WizardState {
            step: BookingStep::Complete,
            ..self.clone()
        })
    }
}

/// I/O driver for a single booking session.
pub struct BookingWizard {
    db: DbPool,
    notifier: Arc<NotificationService>,
    state: WizardState,
}

impl BookingWizard {
    pub fn new(db: DbPool, notifier: Arc<NotificationService>) -> Self {
        Self {
            db,
            notifier,
            state: WizardState::new(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Step 1: resolve the chosen event-type tag (live catalog first, then
    /// the static fallback table).
    pub async fn select_event_type(&mut self, tag: &str) -> Result<i64, BookingError> {
        let event_catalog_id = catalog::resolve_event_type(&self.db, tag).await?;
        self.state = self.state.event_type_selected(event_catalog_id);
        info!(tag = %tag, event_catalog_id, "Event type selected");
        Ok(event_catalog_id)
    }

    /// Step 2: create the EventRequest, then fetch recommendations.
    ///
    /// When creation succeeds but the recommendation fetch fails, the
    /// created id is retained and the wizard stays on this step, so a
    /// retry can proceed without losing the request. Resubmission creates
    /// a second EventRequest; the flow is deliberately at-least-once.
    pub async fn submit_details(
        &mut self,
        details: EventDetails,
    ) -> Result<Vec<PackageRecommendation>, BookingError> {
        let Some(event_catalog_id) = self.state.event_catalog_id else {
            return Err(BookingError::Validation(
                "Select an event type before entering event details".to_string(),
            ));
        };

        // Field validation happens before anything is persisted.
        if details.location.trim().is_empty() {
            return Err(BookingError::Validation("Location is required".to_string()));
        }
        if details.date_time.trim().is_empty() {
            return Err(BookingError::Validation(
                "An event date is required".to_string(),
            ));
        }
        if details.budget <= 0 {
            return Err(BookingError::Validation(
                "Budget must be a positive amount".to_string(),
            ));
        }
        if details.guest_count <= 0 {
            return Err(BookingError::Validation(
                "Guest count must be a positive number".to_string(),
            ));
        }

        let request = gateway::create_event_request(
            &self.db,
            &NewEventRequest {
                event_catalog_id,
                location: details.location.trim().to_string(),
                date_time: details.date_time.trim().to_string(),
                budget: details.budget,
                guest_count: details.guest_count,
                additional_notes: details.additional_notes.clone(),
                cart_service_ids: details.cart_service_ids.clone(),
            },
        )
        .await?;

        // Hold on to the id before the recommendation fetch: if that fetch
        // fails, the request row exists and must not be forgotten.
        self.state.event_request_id = Some(request.id.clone());

        let recommendations =
            recommend::recommend(&self.db, event_catalog_id, details.budget, details.guest_count)
                .await?;

        self.state = self
            .state
            .details_accepted(request.id, details, recommendations.clone())?;
        Ok(recommendations)
    }

    /// Step 3: persist the package selection against the held request.
    pub async fn confirm_package(&mut self, tier: PackageTier) -> Result<(), BookingError> {
        // Fails closed: no held id means rejecting the transition instead
        // of attempting a null-keyed update.
        let next = self.state.package_confirmed(tier)?;
        let event_request_id = next
            .event_request_id
            .clone()
            .ok_or_else(|| BookingError::NotFound("Event request not found".to_string()))?;

        let updated =
            gateway::update_selected_package(&self.db, &event_request_id, tier).await?;
        if !updated {
            return Err(BookingError::NotFound(
                "Event request not found".to_string(),
            ));
        }

        self.state = next;
        Ok(())
    }

    /// Step 4: schedule the consultation call. Success consumes the
    /// session; the wizard resets for a fresh booking.
    pub async fn schedule_call(
        &mut self,
        scheduled_time: &str,
        user_email: Option<String>,
        user_whatsapp: Option<String>,
    ) -> Result<CallSchedule, BookingError> {
        let Some(event_request_id) = self.state.event_request_id.clone() else {
            return Err(BookingError::Validation(
                "Complete the earlier steps before scheduling a call".to_string(),
            ));
        };

        let schedule = scheduling::schedule_call(
            &self.db,
            &self.notifier,
            ScheduleCallRequest {
                event_request_id,
                scheduled_time: scheduled_time.to_string(),
                user_email,
                user_whatsapp,
            },
        )
        .await?;

        self.state = WizardState::new();
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, RequestStatus};
    use crate::notifications::mock_mailer::MockMailer;
    use crate::notifications::Mailer;

    fn details() -> EventDetails {
        EventDetails {
            location: "Mumbai".to_string(),
            date_time: "2026-09-01T10:00:00Z".to_string(),
            budget: 500_000,
            guest_count: 200,
            additional_notes: None,
            cart_service_ids: vec![1, 3],
        }
    }

    fn recommendation() -> PackageRecommendation {
        PackageRecommendation {
            id: 2,
            tier: PackageTier::Professional,
            name: "Signature".to_string(),
            price_range: "200,000 - 800,000".to_string(),
            features: vec!["Dedicated planner".to_string()],
        }
    }

    // ---------------------------------------------------------------------
    // Pure transition tests (no I/O)
    // ---------------------------------------------------------------------

    #[test]
    fn test_pure_chain_reaches_complete() {
        let state = WizardState::new();
        assert_eq!(state.step, BookingStep::SelectingEventType);

        let state = state.event_type_selected(1);
        assert_eq!(state.step, BookingStep::EnteringDetails);

        let state = state
            .details_accepted("req-1".to_string(), details(), vec![recommendation()])
            .unwrap();
        assert_eq!(state.step, BookingStep::SelectingPackage);
        assert_eq!(state.event_request_id.as_deref(), Some("req-1"));

        let state = state.package_confirmed(PackageTier::Premium).unwrap();
        assert_eq!(state.step, BookingStep::SchedulingCall);
        assert_eq!(state.selected_package, Some(PackageTier::Premium));

        let state = state.call_scheduled().unwrap();
        assert_eq!(state.step, BookingStep::Complete);
    }

    #[test]
    fn test_details_require_event_type() {
        let err = WizardState::new()
            .details_accepted("req-1".to_string(), details(), vec![recommendation()])
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn test_details_reject_empty_recommendations() {
        let state = WizardState::new().event_type_selected(1);
        let err = state
            .details_accepted("req-1".to_string(), details(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, BookingError::NoPackagesMatched));
    }

    #[test]
    fn test_package_confirmation_fails_closed_without_request_id() {
        let state = WizardState::new().event_type_selected(1);
        let err = state.package_confirmed(PackageTier::Basic).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));

        let err = WizardState::new().call_scheduled().unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn test_package_confirmation_requires_package_selection_step() {
        // A request id held on the details step (the shape left behind by
        // a failed recommendation fetch) is not enough to advance.
        let mut state = WizardState::new().event_type_selected(1);
        state.event_request_id = Some("req-1".to_string());
        let err = state.package_confirmed(PackageTier::Basic).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }

    #[test]
    fn test_reselecting_event_type_clears_downstream_state() {
        let state = WizardState::new().event_type_selected(1);
        let state = state
            .details_accepted("req-1".to_string(), details(), vec![recommendation()])
            .unwrap();
        let state = state.event_type_selected(2);
        assert_eq!(state.event_catalog_id, Some(2));
        assert!(state.event_request_id.is_none());
        assert!(state.recommendations.is_empty());
    }

    // ---------------------------------------------------------------------
    // Driver tests (in-memory database)
    // ---------------------------------------------------------------------

    async fn wizard(pool: &DbPool) -> BookingWizard {
        let notifier = Arc::new(NotificationService::new(
            pool.clone(),
            Arc::new(MockMailer::new()) as Arc<dyn Mailer>,
            None,
            "desk@planora.local".to_string(),
            "https://planora.example.com".to_string(),
        ));
        BookingWizard::new(pool.clone(), notifier)
    }

    async fn request_count(pool: &DbPool) -> i64 {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM event_requests")
            .fetch_one(pool)
            .await
            .unwrap();
        row.0
    }

    #[tokio::test]
    async fn test_full_booking_flow() {
        let pool = test_pool().await;
        gateway::insert_admin_settings(&pool, "admin@example.com", "+911111111111", true)
            .await
            .unwrap();
        let mut wizard = wizard(&pool).await;

        wizard.select_event_type("wedding").await.unwrap();
        let recommendations = wizard.submit_details(details()).await.unwrap();
        assert!(!recommendations.is_empty());
        assert_eq!(wizard.state().step, BookingStep::SelectingPackage);

        wizard.confirm_package(PackageTier::Premium).await.unwrap();
        assert_eq!(wizard.state().step, BookingStep::SchedulingCall);

        let schedule = wizard
            .schedule_call(
                "2026-09-02T15:00:00Z",
                Some("user@example.com".to_string()),
                None,
            )
            .await
            .unwrap();
        assert_eq!(schedule.status, "scheduled");

        // The session is single-use: success resets everything.
        assert_eq!(wizard.state().step, BookingStep::SelectingEventType);
        assert!(wizard.state().event_request_id.is_none());

        let request = gateway::find_event_request(&pool, &schedule.event_request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.get_status(), RequestStatus::Confirmed);
        assert_eq!(request.get_selected_package(), Some(PackageTier::Premium));
    }

    #[tokio::test]
    async fn test_failed_recommendation_keeps_created_request_id() {
        let pool = test_pool().await;
        let mut wizard = wizard(&pool).await;
        wizard.select_event_type("birthday").await.unwrap();

        // Budget below every tier's window: creation succeeds, the
        // recommendation fetch then fails.
        let mut low = details();
        low.budget = 20_000;
        let err = wizard.submit_details(low).await.unwrap_err();
        assert!(matches!(err, BookingError::NoPackagesMatched));

        assert_eq!(wizard.state().step, BookingStep::EnteringDetails);
        assert!(wizard.state().event_request_id.is_some());
        assert_eq!(request_count(&pool).await, 1);

        // The held id alone does not open the package step.
        let err = wizard.confirm_package(PackageTier::Basic).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));

        // Resubmission is at-least-once: a second request row appears.
        wizard.submit_details(details()).await.unwrap();
        assert_eq!(request_count(&pool).await, 2);
        assert_eq!(wizard.state().step, BookingStep::SelectingPackage);
    }

    #[tokio::test]
    async fn test_validation_failure_persists_nothing() {
        let pool = test_pool().await;
        let mut wizard = wizard(&pool).await;
        wizard.select_event_type("wedding").await.unwrap();

        let mut bad = details();
        bad.location = "  ".to_string();
        let err = wizard.submit_details(bad).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert_eq!(request_count(&pool).await, 0);
        assert_eq!(wizard.state().step, BookingStep::EnteringDetails);
    }

    #[tokio::test]
    async fn test_skipping_ahead_is_rejected() {
        let pool = test_pool().await;
        let mut wizard = wizard(&pool).await;

        let err = wizard.confirm_package(PackageTier::Basic).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));

        let err = wizard
            .schedule_call("2026-09-02T15:00:00Z", Some("user@example.com".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));

        assert_eq!(request_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_fallback_event_type_still_books() {
        let pool = test_pool().await;
        gateway::insert_admin_settings(&pool, "admin@example.com", "+911111111111", true)
            .await
            .unwrap();
        sqlx::query("DELETE FROM event_catalog WHERE tag = 'wedding'")
            .execute(&pool)
            .await
            .unwrap();

        let mut wizard = wizard(&pool).await;
        let id = wizard.select_event_type("wedding").await.unwrap();
        assert_eq!(id, 1);

        let recommendations = wizard.submit_details(details()).await.unwrap();
        assert!(!recommendations.is_empty());
    }
}
