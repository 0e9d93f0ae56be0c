//! Call scheduling: the step that commits a booking.
//!
//! Preconditions are checked in a fixed order so each failure mode is
//! distinct: field validation, then event-request existence, then the
//! exactly-one-active-admin-settings rule. Once the schedule row is in,
//! nothing rolls it back: the status flip is best effort and notification
//! failures stay inside the dispatcher.

use tracing::{error, info};

use super::BookingError;
use crate::db::{gateway, CallSchedule, DbPool};
use crate::notifications::NotificationService;

/// Input for scheduling a consultation call.
#[derive(Debug, Clone, Default)]
pub struct ScheduleCallRequest {
    pub event_request_id: String,
    pub scheduled_time: String,
    pub user_email: Option<String>,
    pub user_whatsapp: Option<String>,
}

impl ScheduleCallRequest {
    fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref().filter(|s| !s.trim().is_empty())
    }

    fn user_whatsapp(&self) -> Option<&str> {
        self.user_whatsapp.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Validate, persist the call schedule, flip the owning request to
/// confirmed, and trigger the notification fan-out.
pub async fn schedule_call(
    pool: &DbPool,
    notifier: &NotificationService,
    request: ScheduleCallRequest,
) -> Result<CallSchedule, BookingError> {
    // 1. Required fields.
    if request.event_request_id.trim().is_empty() {
        return Err(BookingError::Validation(
            "event_request_id is required".to_string(),
        ));
    }
    if request.scheduled_time.trim().is_empty() {
        return Err(BookingError::Validation(
            "scheduled_time is required".to_string(),
        ));
    }
    if request.user_email().is_none() && request.user_whatsapp().is_none() {
        return Err(BookingError::Validation(
            "A contact email or WhatsApp number is required".to_string(),
        ));
    }

    // 2. The owning event request must exist.
    let event_request = gateway::find_event_request(pool, &request.event_request_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Event request not found".to_string()))?;

    // 3. Exactly one active admin settings row. Zero and multiple are both
    // fatal misconfiguration; picking an arbitrary row would silently send
    // the customer to the wrong contact.
    let mut settings = gateway::active_admin_settings(pool).await?;
    let admin = match settings.len() {
        1 => settings.remove(0),
        0 => {
            return Err(BookingError::Configuration(
                "No active admin settings row found".to_string(),
            ))
        }
        n => {
            return Err(BookingError::Configuration(format!(
                "Expected exactly one active admin settings row, found {}",
                n
            )))
        }
    };

    // (a) Persist the schedule with a snapshot of the admin contact.
    let schedule = gateway::create_call_schedule(
        pool,
        gateway::NewCallSchedule {
            event_request_id: &event_request.id,
            scheduled_time: request.scheduled_time.trim(),
            admin: &admin,
            user_email: request.user_email(),
            user_whatsapp: request.user_whatsapp(),
        },
    )
    .await?;

    info!(
        call_schedule_id = %schedule.id,
        event_request_id = %event_request.id,
        "Consultation call scheduled"
    );

    // (b) Best-effort status flip. A failure here leaves the booking
    // scheduled from the user's perspective, so it is logged, not raised.
    let event_request = match gateway::confirm_event_request(pool, &event_request.id).await {
        Ok(_) => gateway::find_event_request(pool, &event_request.id)
            .await
            .ok()
            .flatten()
            .unwrap_or(event_request),
        Err(e) => {
            error!(
                event_request_id = %event_request.id,
                error = %e,
                "Failed to confirm event request after scheduling"
            );
            event_request
        }
    };

    // (c) Best-effort fan-out; never fails.
    notifier.notify(&event_request, &schedule, &admin).await;

    Ok(schedule)
}
