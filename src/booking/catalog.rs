//! Event-type resolution with a static fallback table.
//!
//! The live catalog is authoritative; when a tag the UI offers is missing
//! from it (catalog drift), a fixed tag -> id table keeps the flow moving
//! rather than blocking step 1. A fallback hit can map a selection to the
//! wrong entry if the catalog ids ever change, so each one is logged.

use tracing::warn;

use super::BookingError;
use crate::db::{gateway, DbPool};

/// Last-resort mapping from event-type tag to catalog id, mirroring the
/// seeded catalog.
pub fn fallback_catalog_id(tag: &str) -> Option<i64> {
    match tag {
        "wedding" => Some(1),
        "birthday" => Some(2),
        "corporate" => Some(3),
        "anniversary" => Some(4),
        "engagement" => Some(5),
        "other" => Some(6),
        _ => None,
    }
}

/// Whether an id is covered by the static fallback table. Such ids remain
/// bookable even when the corresponding live catalog row has been removed.
pub fn is_fallback_id(id: i64) -> bool {
    (1..=6).contains(&id)
}

/// Resolve an event-type tag to a catalog id, consulting the fallback
/// table when the live lookup misses.
pub async fn resolve_event_type(pool: &DbPool, tag: &str) -> Result<i64, BookingError> {
    let tag = tag.trim().to_lowercase();
    if tag.is_empty() {
        return Err(BookingError::Validation(
            "An event type is required".to_string(),
        ));
    }

    if let Some(entry) = gateway::find_catalog_entry_by_tag(pool, &tag).await? {
        return Ok(entry.id);
    }

    match fallback_catalog_id(&tag) {
        Some(id) => {
            warn!(
                tag = %tag,
                fallback_id = id,
                "Event type missing from live catalog, resolved via static fallback table"
            );
            Ok(id)
        }
        None => Err(BookingError::NotFound(format!(
            "Unknown event type: {}",
            tag
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[test]
    fn test_fallback_table_covers_known_tags() {
        assert_eq!(fallback_catalog_id("wedding"), Some(1));
        assert_eq!(fallback_catalog_id("corporate"), Some(3));
        assert_eq!(fallback_catalog_id("rave"), None);
    }

    #[tokio::test]
    async fn test_resolve_prefers_live_catalog() {
        let pool = test_pool().await;
        let id = resolve_event_type(&pool, "Wedding").await.unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_catalog_drift() {
        let pool = test_pool().await;
        sqlx::query("DELETE FROM event_catalog WHERE tag = 'wedding'")
            .execute(&pool)
            .await
            .unwrap();

        let id = resolve_event_type(&pool, "wedding").await.unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_resolve_unknown_tag_is_not_found() {
        let pool = test_pool().await;
        let err = resolve_event_type(&pool, "rave").await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_empty_tag_is_validation_error() {
        let pool = test_pool().await;
        let err = resolve_event_type(&pool, "   ").await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
    }
}
