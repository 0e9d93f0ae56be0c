//! Database seeders for built-in reference data.
//!
//! The event catalog, package catalog, and marketplace services are
//! reference data maintained by administrators out of band; seeding gives a
//! fresh install a working set. Seeds run on every startup so updated
//! built-ins propagate.

use anyhow::Result;
use tracing::info;

use super::gateway;
use super::models::Package;
use super::DbPool;

/// Built-in event types. Ids are stable on purpose: the static fallback
/// table in `booking::catalog` maps tags to these ids when the live catalog
/// misses.
const EVENT_CATALOG: &[(i64, &str, &str, &str)] = &[
    (1, "wedding", "Wedding", "Full wedding planning, from venue to vidaai"),
    (2, "birthday", "Birthday Party", "Birthday celebrations for all ages"),
    (3, "corporate", "Corporate Event", "Conferences, offsites, and launches"),
    (4, "anniversary", "Anniversary", "Milestone anniversary celebrations"),
    (5, "engagement", "Engagement", "Engagement and roka ceremonies"),
    (6, "other", "Other Celebration", "Anything else worth celebrating"),
];

const SERVICES: &[(i64, &str, &str, i64)] = &[
    (1, "Gourmet Catering", "catering", 1200),
    (2, "Regional Cuisine Buffet", "catering", 800),
    (3, "Floral Decor", "decoration", 700),
    (4, "Stage & Lighting", "decoration", 1100),
    (5, "Photography & Film", "media", 1500),
    (6, "Live Band", "entertainment", 900),
    (7, "DJ Night", "entertainment", 600),
];

/// The three fixed tiers, also used by the recommendation engine as a
/// fallback when the package catalog table is empty.
pub(crate) fn builtin_packages() -> Vec<Package> {
    vec![
        Package {
            id: 1,
            tier: "basic".to_string(),
            name: "Essentials".to_string(),
            min_budget: 25_000,
            max_budget: Some(300_000),
            max_guests: Some(150),
            price_range: "25,000 - 300,000".to_string(),
            features: r#"["Venue shortlist","Decor essentials","Day-of coordination"]"#.to_string(),
        },
        Package {
            id: 2,
            tier: "professional".to_string(),
            name: "Signature".to_string(),
            min_budget: 200_000,
            max_budget: Some(800_000),
            max_guests: Some(500),
            price_range: "200,000 - 800,000".to_string(),
            features: r#"["Dedicated planner","Vendor management","Custom decor","Guest logistics"]"#
                .to_string(),
        },
        Package {
            id: 3,
            tier: "premium".to_string(),
            name: "Luxe".to_string(),
            min_budget: 600_000,
            max_budget: None,
            max_guests: None,
            price_range: "600,000+".to_string(),
            features: r#"["End-to-end planning","Designer decor","Celebrity entertainment","Concierge for every guest"]"#
                .to_string(),
        },
    ]
}

/// Seed event catalog, package catalog, and marketplace services.
pub async fn seed_reference_data(pool: &DbPool) -> Result<()> {
    info!("Seeding built-in reference data...");

    for (id, tag, name, description) in EVENT_CATALOG {
        sqlx::query(
            "INSERT OR IGNORE INTO event_catalog (id, tag, name, description) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(tag)
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    for package in builtin_packages() {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO packages
                (id, tier, name, min_budget, max_budget, max_guests, price_range, features)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(package.id)
        .bind(&package.tier)
        .bind(&package.name)
        .bind(package.min_budget)
        .bind(package.max_budget)
        .bind(package.max_guests)
        .bind(&package.price_range)
        .bind(&package.features)
        .execute(pool)
        .await?;
    }

    for (id, name, category, price) in SERVICES {
        sqlx::query(
            "INSERT OR REPLACE INTO services (id, name, category, price) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .bind(price)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Ensure one active admin settings row exists, creating it from config on
/// first boot. Existing rows are left untouched.
pub async fn ensure_admin_settings(
    pool: &DbPool,
    admin_email: &str,
    admin_whatsapp: &str,
) -> Result<()> {
    let active = gateway::active_admin_settings(pool).await?;
    if active.is_empty() {
        info!(admin_email = %admin_email, "No active admin settings found, seeding from config");
        gateway::insert_admin_settings(pool, admin_email, admin_whatsapp, true).await?;
    }
    Ok(())
}
