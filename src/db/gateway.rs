//! Persistence gateway: parameterized CRUD over the five booking entities.
//!
//! No business logic lives here. Preconditions (existence checks, the
//! exactly-one-active-settings rule, status monotonicity) are enforced by
//! the callers in `booking`; this module only issues queries.

use uuid::Uuid;

use super::models::{
    AdminSettings, CallSchedule, CallStatus, EventCatalogEntry, EventRequest, MarketplaceService,
    NewEventRequest, Package, PackageTier, RequestStatus,
};
use super::DbPool;

// -------------------------------------------------------------------------
// Event catalog
// -------------------------------------------------------------------------

pub async fn find_catalog_entry(
    pool: &DbPool,
    id: i64,
) -> Result<Option<EventCatalogEntry>, sqlx::Error> {
    sqlx::query_as::<_, EventCatalogEntry>("SELECT * FROM event_catalog WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_catalog_entry_by_tag(
    pool: &DbPool,
    tag: &str,
) -> Result<Option<EventCatalogEntry>, sqlx::Error> {
    sqlx::query_as::<_, EventCatalogEntry>("SELECT * FROM event_catalog WHERE tag = ?")
        .bind(tag)
        .fetch_optional(pool)
        .await
}

pub async fn list_catalog(pool: &DbPool) -> Result<Vec<EventCatalogEntry>, sqlx::Error> {
    sqlx::query_as::<_, EventCatalogEntry>("SELECT * FROM event_catalog ORDER BY id")
        .fetch_all(pool)
        .await
}

// -------------------------------------------------------------------------
// Event requests
// -------------------------------------------------------------------------

pub async fn create_event_request(
    pool: &DbPool,
    new: &NewEventRequest,
) -> Result<EventRequest, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let cart_json = if new.cart_service_ids.is_empty() {
        None
    } else {
        serde_json::to_string(&new.cart_service_ids).ok()
    };

    sqlx::query(
        r#"
        INSERT INTO event_requests
            (id, event_catalog_id, location, date_time, budget, guest_count,
             additional_notes, cart_service_ids, selected_package, status,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.event_catalog_id)
    .bind(&new.location)
    .bind(&new.date_time)
    .bind(new.budget)
    .bind(new.guest_count)
    .bind(&new.additional_notes)
    .bind(&cart_json)
    .bind(RequestStatus::Pending.to_string())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, EventRequest>("SELECT * FROM event_requests WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
}

pub async fn find_event_request(
    pool: &DbPool,
    id: &str,
) -> Result<Option<EventRequest>, sqlx::Error> {
    sqlx::query_as::<_, EventRequest>("SELECT * FROM event_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Set the selected package tier. Returns false when no row matched.
pub async fn update_selected_package(
    pool: &DbPool,
    id: &str,
    tier: PackageTier,
) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "UPDATE event_requests SET selected_package = ?, updated_at = ? WHERE id = ?",
    )
    .bind(tier.to_string())
    .bind(&now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Flip the request to confirmed. Only ever writes `confirmed`, which is
/// what keeps the pending -> confirmed transition monotonic.
pub async fn confirm_event_request(pool: &DbPool, id: &str) -> Result<bool, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE event_requests SET status = ?, updated_at = ? WHERE id = ?")
        .bind(RequestStatus::Confirmed.to_string())
        .bind(&now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// -------------------------------------------------------------------------
// Package catalog
// -------------------------------------------------------------------------

pub async fn list_packages(pool: &DbPool) -> Result<Vec<Package>, sqlx::Error> {
    sqlx::query_as::<_, Package>("SELECT * FROM packages ORDER BY min_budget")
        .fetch_all(pool)
        .await
}

// -------------------------------------------------------------------------
// Call schedules
// -------------------------------------------------------------------------

/// Input for creating a call schedule row.
#[derive(Debug, Clone)]
pub struct NewCallSchedule<'a> {
    pub event_request_id: &'a str,
    pub scheduled_time: &'a str,
    pub admin: &'a AdminSettings,
    pub user_email: Option<&'a str>,
    pub user_whatsapp: Option<&'a str>,
}

pub async fn create_call_schedule(
    pool: &DbPool,
    new: NewCallSchedule<'_>,
) -> Result<CallSchedule, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO call_schedules
            (id, event_request_id, scheduled_time, admin_email, admin_whatsapp,
             user_email, user_whatsapp, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.event_request_id)
    .bind(new.scheduled_time)
    .bind(&new.admin.admin_email)
    .bind(&new.admin.admin_whatsapp)
    .bind(new.user_email)
    .bind(new.user_whatsapp)
    .bind(CallStatus::Scheduled.to_string())
    .bind(&now)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, CallSchedule>("SELECT * FROM call_schedules WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
}

pub async fn list_call_schedules(
    pool: &DbPool,
    event_request_id: &str,
) -> Result<Vec<CallSchedule>, sqlx::Error> {
    sqlx::query_as::<_, CallSchedule>(
        "SELECT * FROM call_schedules WHERE event_request_id = ? ORDER BY created_at DESC",
    )
    .bind(event_request_id)
    .fetch_all(pool)
    .await
}

// -------------------------------------------------------------------------
// Admin settings
// -------------------------------------------------------------------------

/// All active admin settings rows. The scheduling service enforces the
/// exactly-one rule; the gateway reports what is there.
pub async fn active_admin_settings(pool: &DbPool) -> Result<Vec<AdminSettings>, sqlx::Error> {
    sqlx::query_as::<_, AdminSettings>("SELECT * FROM admin_settings WHERE is_active = 1")
        .fetch_all(pool)
        .await
}

pub async fn insert_admin_settings(
    pool: &DbPool,
    admin_email: &str,
    admin_whatsapp: &str,
    is_active: bool,
) -> Result<AdminSettings, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO admin_settings (id, admin_email, admin_whatsapp, is_active) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(admin_email)
    .bind(admin_whatsapp)
    .bind(is_active)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, AdminSettings>("SELECT * FROM admin_settings WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await
}

// -------------------------------------------------------------------------
// Marketplace services
// -------------------------------------------------------------------------

pub async fn services_by_ids(
    pool: &DbPool,
    ids: &[i64],
) -> Result<Vec<MarketplaceService>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM services WHERE id IN ({}) ORDER BY category, name",
        placeholders
    );

    let mut query = sqlx::query_as::<_, MarketplaceService>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    query.fetch_all(pool).await
}
