//! Package recommendation engine.
//!
//! Pure read + compute: filters the package catalog against the supplied
//! budget and guest count and ranks the survivors by budget fit. Safe to
//! retry; nothing is persisted.

use super::{catalog, BookingError};
use crate::db::{builtin_packages, gateway, DbPool, Package, PackageRecommendation};

/// Recommend packages for an event, best fit first.
///
/// An empty candidate set after filtering is an error, never an empty Ok:
/// the wizard must not advance to package selection with nothing to show.
pub async fn recommend(
    pool: &DbPool,
    event_catalog_id: i64,
    budget: i64,
    guest_count: i64,
) -> Result<Vec<PackageRecommendation>, BookingError> {
    if budget <= 0 {
        return Err(BookingError::Validation(
            "Budget must be a positive amount".to_string(),
        ));
    }
    if guest_count <= 0 {
        return Err(BookingError::Validation(
            "Guest count must be a positive number".to_string(),
        ));
    }

    // Ids resolved through the static fallback table stay bookable even
    // when the live catalog row has drifted away.
    if gateway::find_catalog_entry(pool, event_catalog_id)
        .await?
        .is_none()
        && !catalog::is_fallback_id(event_catalog_id)
    {
        return Err(BookingError::NotFound(format!(
            "Event type {} not found",
            event_catalog_id
        )));
    }

    let mut packages = gateway::list_packages(pool).await?;
    if packages.is_empty() {
        // Empty package catalog should not block bookings; fall back to the
        // built-in tiers, same tradeoff as the event-type fallback table.
        packages = builtin_packages();
    }

    let mut candidates: Vec<(i64, Package)> = packages
        .into_iter()
        .filter(|p| admits(p, budget, guest_count))
        .map(|p| (fit_distance(&p, budget), p))
        .collect();

    // Closest budget fit first; tier order breaks ties deterministically.
    candidates.sort_by_key(|(distance, p)| {
        (*distance, p.get_tier().map(|t| t.rank()).unwrap_or(u8::MAX))
    });

    let recommendations: Vec<PackageRecommendation> = candidates
        .into_iter()
        .filter_map(|(_, p)| {
            let tier = p.get_tier()?;
            Some(PackageRecommendation {
                id: p.id,
                tier,
                name: p.name.clone(),
                price_range: p.price_range.clone(),
                features: p.feature_list(),
            })
        })
        .collect();

    if recommendations.is_empty() {
        return Err(BookingError::NoPackagesMatched);
    }
    Ok(recommendations)
}

/// Whether a package's budget window and guest cap admit the request.
fn admits(package: &Package, budget: i64, guest_count: i64) -> bool {
    if budget < package.min_budget {
        return false;
    }
    if package.max_budget.is_some_and(|max| budget > max) {
        return false;
    }
    if package.max_guests.is_some_and(|max| guest_count > max) {
        return false;
    }
    true
}

/// Distance from the budget to the middle of the package's budget window.
/// Uncapped tiers use twice the minimum as a nominal midpoint anchor.
fn fit_distance(package: &Package, budget: i64) -> i64 {
    let max = package
        .max_budget
        .unwrap_or_else(|| package.min_budget.saturating_mul(2));
    let midpoint = (package.min_budget + max) / 2;
    (budget - midpoint).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{test_pool, PackageTier};

    #[tokio::test]
    async fn test_recommend_filters_by_budget_window() {
        let pool = test_pool().await;
        // 500k budget, 200 guests: basic is over-budget and over-capacity,
        // premium starts at 600k, so only professional survives.
        let recs = recommend(&pool, 1, 500_000, 200).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].tier, PackageTier::Professional);
        assert!(!recs[0].features.is_empty());
    }

    #[tokio::test]
    async fn test_recommend_ranks_by_budget_fit() {
        let pool = test_pool().await;
        // 650k admits professional (window midpoint 500k) and premium
        // (nominal midpoint 900k); professional is the closer fit.
        let recs = recommend(&pool, 1, 650_000, 100).await.unwrap();
        let tiers: Vec<PackageTier> = recs.iter().map(|r| r.tier).collect();
        assert_eq!(tiers, vec![PackageTier::Professional, PackageTier::Premium]);
    }

    #[tokio::test]
    async fn test_recommend_low_budget_returns_basic_only() {
        let pool = test_pool().await;
        let recs = recommend(&pool, 2, 50_000, 40).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].tier, PackageTier::Basic);
    }

    #[tokio::test]
    async fn test_recommend_nothing_matches_is_an_explicit_error() {
        let pool = test_pool().await;
        let err = recommend(&pool, 1, 1_000, 50).await.unwrap_err();
        assert!(matches!(err, BookingError::NoPackagesMatched));
    }

    #[tokio::test]
    async fn test_recommend_rejects_nonpositive_inputs() {
        let pool = test_pool().await;
        assert!(matches!(
            recommend(&pool, 1, 0, 50).await.unwrap_err(),
            BookingError::Validation(_)
        ));
        assert!(matches!(
            recommend(&pool, 1, 100_000, -5).await.unwrap_err(),
            BookingError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_recommend_unknown_event_type() {
        let pool = test_pool().await;
        let err = recommend(&pool, 999, 100_000, 50).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recommend_survives_empty_package_catalog() {
        let pool = test_pool().await;
        sqlx::query("DELETE FROM packages").execute(&pool).await.unwrap();

        let recs = recommend(&pool, 1, 500_000, 200).await.unwrap();
        assert_eq!(recs[0].tier, PackageTier::Professional);
    }
}
