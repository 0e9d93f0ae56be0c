//! The booking orchestration core: catalog resolution, package
//! recommendation, the wizard state machine, and call scheduling.

pub mod catalog;
pub mod recommend;
pub mod scheduling;
pub mod wizard;

use thiserror::Error;

/// Errors produced by the booking flow.
///
/// Notification transport failures are deliberately absent: they are
/// swallowed inside `notifications` after the fallback attempt and never
/// reach the booking caller.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Missing or malformed input; surfaced verbatim to the user.
    #[error("{0}")]
    Validation(String),

    /// A referenced row does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Zero or multiple active admin settings rows; cannot be worked
    /// around client-side.
    #[error("{0}")]
    Configuration(String),

    /// The recommendation engine filtered every tier out. Distinct from an
    /// empty-but-successful result, which this flow never produces.
    #[error("No packages match the requested budget and guest count")]
    NoPackagesMatched,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
