//! Notification dispatcher for completed bookings.
//!
//! Best-effort by contract: `notify` never returns an error. Each message
//! goes out through the primary transport, falls back to the secondary
//! transport once, and is logged and dropped if both fail. The booking is
//! already committed by the time this runs and must never be undone here.

mod mailer;
pub mod templates;

pub use mailer::{Mailer, SmtpMailer, TransportError};

#[cfg(test)]
pub(crate) use mailer::mock as mock_mailer;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::{EmailConfig, NotificationConfig};
use crate::db::{gateway, AdminSettings, CallSchedule, DbPool, EventRequest, MarketplaceService};
use templates::RenderedMessage;

pub struct NotificationService {
    db: DbPool,
    primary: Arc<dyn Mailer>,
    secondary: Option<Arc<dyn Mailer>>,
    digest_recipient: String,
    base_url: String,
}

impl NotificationService {
    pub fn new(
        db: DbPool,
        primary: Arc<dyn Mailer>,
        secondary: Option<Arc<dyn Mailer>>,
        digest_recipient: String,
        base_url: String,
    ) -> Self {
        Self {
            db,
            primary,
            secondary,
            digest_recipient,
            base_url,
        }
    }

    /// Build the service from config. A missing fallback block disables
    /// the second transport attempt.
    pub fn from_config(db: DbPool, email: &EmailConfig, notifications: &NotificationConfig) -> Self {
        let primary: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(email.primary.clone()));
        let secondary: Option<Arc<dyn Mailer>> = email
            .fallback
            .clone()
            .map(|config| Arc::new(SmtpMailer::new(config)) as Arc<dyn Mailer>);
        Self::new(
            db,
            primary,
            secondary,
            notifications.digest_recipient.clone(),
            notifications.base_url.clone(),
        )
    }

    /// Fan out the booking notifications: admin alert, internal cart
    /// digest, and a user confirmation when an email is on file. The three
    /// sends run concurrently; a failure in one never blocks the others.
    pub async fn notify(
        &self,
        request: &EventRequest,
        schedule: &CallSchedule,
        admin: &AdminSettings,
    ) {
        if !self.primary.is_configured() && self.secondary.is_none() {
            warn!("No email transport configured, skipping booking notifications");
            return;
        }

        let event_name = self.event_name(request).await;
        let breakdown = self.service_breakdown(request).await;

        let admin_message = templates::admin_alert(
            request,
            schedule,
            &event_name,
            breakdown.as_deref(),
            &self.base_url,
        );
        let digest_message = templates::cart_digest(request, breakdown.as_deref());
        let user_message = schedule
            .user_email
            .clone()
            .map(|email| {
                (
                    email,
                    templates::user_confirmation(request, schedule, &event_name, &self.base_url),
                )
            });

        tokio::join!(
            self.deliver(&admin.admin_email, &admin_message),
            self.deliver(&self.digest_recipient, &digest_message),
            async {
                if let Some((email, message)) = &user_message {
                    self.deliver(email, message).await;
                }
            },
        );
    }

    /// Display name for the event type; the raw id stands in when the
    /// catalog row has drifted away.
    async fn event_name(&self, request: &EventRequest) -> String {
        match gateway::find_catalog_entry(&self.db, request.event_catalog_id).await {
            Ok(Some(entry)) => entry.name,
            Ok(None) => format!("event type {}", request.event_catalog_id),
            Err(e) => {
                warn!(error = %e, "Catalog lookup failed while composing notification");
                format!("event type {}", request.event_catalog_id)
            }
        }
    }

    /// Resolve the cart's service ids for the category breakdown. Lookup
    /// failure degrades to None; the messages go out without the section.
    async fn service_breakdown(&self, request: &EventRequest) -> Option<Vec<MarketplaceService>> {
        let ids = request.cart_ids();
        if ids.is_empty() {
            return None;
        }
        match gateway::services_by_ids(&self.db, &ids).await {
            Ok(services) if !services.is_empty() => Some(services),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    event_request_id = %request.id,
                    error = %e,
                    "Service lookup failed, omitting category breakdown"
                );
                None
            }
        }
    }

    /// Send one message: primary transport first, secondary once on
    /// failure, then log and stop.
    async fn deliver(&self, to: &str, message: &RenderedMessage) {
        match self
            .primary
            .send(to, &message.subject, &message.html, &message.text)
            .await
        {
            Ok(message_id) => {
                info!(to = %to, message_id = %message_id, transport = "primary", "Notification sent");
                return;
            }
            Err(e) => {
                warn!(to = %to, error = %e, "Primary transport failed, trying fallback");
            }
        }

        let Some(secondary) = &self.secondary else {
            error!(to = %to, "Notification dropped: no fallback transport configured");
            return;
        };

        match secondary
            .send(to, &message.subject, &message.html, &message.text)
            .await
        {
            Ok(message_id) => {
                info!(to = %to, message_id = %message_id, transport = "secondary", "Notification sent");
            }
            Err(e) => {
                error!(to = %to, error = %e, "Both transports failed, notification dropped");
            }
        }

        debug!(to = %to, "Delivery attempt finished");
    }
}

#[cfg(test)]
mod tests {
    use super::mailer::mock::MockMailer;
    use super::*;
    use crate::db::{gateway::NewCallSchedule, test_pool, NewEventRequest};

    async fn fixtures(pool: &DbPool) -> (EventRequest, CallSchedule, AdminSettings) {
        let request = gateway::create_event_request(
            pool,
            &NewEventRequest {
                event_catalog_id: 1,
                location: "Mumbai".to_string(),
                date_time: "2026-09-01T10:00:00Z".to_string(),
                budget: 500_000,
                guest_count: 200,
                additional_notes: None,
                cart_service_ids: vec![1, 3],
            },
        )
        .await
        .unwrap();
        let admin = gateway::insert_admin_settings(pool, "admin@example.com", "+911111111111", true)
            .await
            .unwrap();
        let schedule = gateway::create_call_schedule(
            pool,
            NewCallSchedule {
                event_request_id: &request.id,
                scheduled_time: "2026-09-02T15:00:00Z",
                admin: &admin,
                user_email: Some("user@example.com"),
                user_whatsapp: None,
            },
        )
        .await
        .unwrap();
        (request, schedule, admin)
    }

    fn service_with(
        db: DbPool,
        primary: Arc<MockMailer>,
        secondary: Option<Arc<MockMailer>>,
    ) -> NotificationService {
        NotificationService::new(
            db,
            primary,
            secondary.map(|m| m as Arc<dyn Mailer>),
            "desk@planora.local".to_string(),
            "https://planora.example.com".to_string(),
        )
    }

    #[tokio::test]
    async fn test_notify_fans_out_three_messages() {
        let pool = test_pool().await;
        let (request, schedule, admin) = fixtures(&pool).await;

        let primary = Arc::new(MockMailer::new());
        let service = service_with(pool, primary.clone(), None);
        service.notify(&request, &schedule, &admin).await;

        let recipients = primary.sent_to();
        assert_eq!(recipients.len(), 3);
        assert!(recipients.contains(&"admin@example.com".to_string()));
        assert!(recipients.contains(&"desk@planora.local".to_string()));
        assert!(recipients.contains(&"user@example.com".to_string()));

        // The admin alert resolved the catalog name and the breakdown.
        let sent = primary.sent.lock().unwrap();
        let alert = sent.iter().find(|m| m.to == "admin@example.com").unwrap();
        assert!(alert.subject.contains("Wedding"));
        assert!(alert.html.contains("Gourmet Catering"));
    }

    #[tokio::test]
    async fn test_notify_skips_user_message_without_email() {
        let pool = test_pool().await;
        let (request, mut schedule, admin) = fixtures(&pool).await;
        schedule.user_email = None;
        schedule.user_whatsapp = Some("+919999999999".to_string());

        let primary = Arc::new(MockMailer::new());
        let service = service_with(pool, primary.clone(), None);
        service.notify(&request, &schedule, &admin).await;

        assert_eq!(primary.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_secondary() {
        let pool = test_pool().await;
        let (request, schedule, admin) = fixtures(&pool).await;

        let primary = Arc::new(MockMailer::failing());
        let secondary = Arc::new(MockMailer::new());
        let service = service_with(pool, primary.clone(), Some(secondary.clone()));
        service.notify(&request, &schedule, &admin).await;

        assert_eq!(primary.sent_count(), 0);
        assert_eq!(secondary.sent_count(), 3);
    }

    #[tokio::test]
    async fn test_double_failure_is_swallowed() {
        let pool = test_pool().await;
        let (request, schedule, admin) = fixtures(&pool).await;

        let primary = Arc::new(MockMailer::failing());
        let secondary = Arc::new(MockMailer::failing());
        let service = service_with(pool.clone(), primary, Some(secondary));

        // Must not panic or propagate; the booking stays untouched.
        service.notify(&request, &schedule, &admin).await;

        let after = gateway::find_event_request(&pool, &request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, request.status);
        assert_eq!(
            gateway::list_call_schedules(&pool, &request.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_breakdown_degrades_when_services_missing() {
        let pool = test_pool().await;
        let (mut request, schedule, admin) = fixtures(&pool).await;
        // Cart points at ids that no longer exist.
        request.cart_service_ids = Some("[998, 999]".to_string());

        let primary = Arc::new(MockMailer::new());
        let service = service_with(pool, primary.clone(), None);
        service.notify(&request, &schedule, &admin).await;

        let sent = primary.sent.lock().unwrap();
        let alert = sent.iter().find(|m| m.to == "admin@example.com").unwrap();
        assert!(!alert.html.contains("Selected services"));
        assert!(alert.html.contains("Mumbai"));
    }
}
