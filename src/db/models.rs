//! Database entities and request/response DTOs for the booking flow.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Service package tiers offered to the user.
///
/// Tier-specific behavior must match exhaustively on this enum rather than
/// branching on the raw strings stored in the database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PackageTier {
    Basic,
    Professional,
    Premium,
}

impl PackageTier {
    /// Stable ordering used to break ranking ties (basic first).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Basic => 0,
            Self::Professional => 1,
            Self::Premium => 2,
        }
    }
}

impl std::fmt::Display for PackageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Professional => write!(f, "professional"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

impl std::str::FromStr for PackageTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "professional" => Ok(Self::Professional),
            "premium" => Ok(Self::Premium),
            _ => Err(format!("Unknown package tier: {}", s)),
        }
    }
}

/// Event request lifecycle status. Transitions are monotonic:
/// pending -> confirmed, never back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Confirmed,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

impl From<String> for RequestStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "confirmed" => Self::Confirmed,
            _ => Self::Pending,
        }
    }
}

/// Call schedule status. The booking flow only ever writes `scheduled`;
/// the admin advances the rest out of band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown call status: {}", s)),
        }
    }
}

/// Immutable reference data describing an event type the marketplace offers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventCatalogEntry {
    pub id: i64,
    pub tag: String,
    pub name: String,
    pub description: String,
}

/// The central aggregate of a booking session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRequest {
    pub id: String,
    pub event_catalog_id: i64,
    pub location: String,
    pub date_time: String,
    pub budget: i64,
    pub guest_count: i64,
    pub additional_notes: Option<String>,
    /// JSON array of marketplace service ids captured from the cart.
    pub cart_service_ids: Option<String>,
    pub selected_package: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl EventRequest {
    pub fn get_status(&self) -> RequestStatus {
        RequestStatus::from(self.status.clone())
    }

    pub fn get_selected_package(&self) -> Option<PackageTier> {
        self.selected_package.as_deref().and_then(|s| s.parse().ok())
    }

    /// Parse the cart service ids, treating malformed JSON as an empty cart.
    pub fn cart_ids(&self) -> Vec<i64> {
        self.cart_service_ids
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

/// Package catalog row read by the recommendation engine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Package {
    pub id: i64,
    pub tier: String,
    pub name: String,
    pub min_budget: i64,
    /// None means uncapped.
    pub max_budget: Option<i64>,
    /// None means no guest limit.
    pub max_guests: Option<i64>,
    pub price_range: String,
    /// JSON array of feature strings.
    pub features: String,
}

impl Package {
    pub fn get_tier(&self) -> Option<PackageTier> {
        self.tier.parse().ok()
    }

    pub fn feature_list(&self) -> Vec<String> {
        serde_json::from_str(&self.features).unwrap_or_default()
    }
}

/// The persisted record of a confirmed consultation call.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CallSchedule {
    pub id: String,
    pub event_request_id: String,
    pub scheduled_time: String,
    pub admin_email: String,
    pub admin_whatsapp: String,
    pub user_email: Option<String>,
    pub user_whatsapp: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// Admin contact configuration. Exactly one row must be active for call
/// scheduling to proceed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminSettings {
    pub id: String,
    pub admin_email: String,
    pub admin_whatsapp: String,
    pub is_active: bool,
}

/// Marketplace vendor service, referenced by the cart and resolved for the
/// services-by-category breakdown in notifications.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketplaceService {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: i64,
}

/// Input for creating an event request.
#[derive(Debug, Clone)]
pub struct NewEventRequest {
    pub event_catalog_id: i64,
    pub location: String,
    pub date_time: String,
    pub budget: i64,
    pub guest_count: i64,
    pub additional_notes: Option<String>,
    pub cart_service_ids: Vec<i64>,
}

/// Ephemeral recommendation computed per request; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PackageRecommendation {
    pub id: i64,
    pub tier: PackageTier,
    pub name: String,
    pub price_range: String,
    pub features: Vec<String>,
}
