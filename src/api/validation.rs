//! Input validation for API requests.
//!
//! Field validators return `Result<(), String>` so handlers can collect
//! multiple failures with `ValidationErrorBuilder` before answering.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Permissive email shape check; deliverability is the transport's problem
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// WhatsApp numbers in E.164-ish form: optional +, 7-15 digits
    static ref WHATSAPP_REGEX: Regex = Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

/// Validate a UUID string
pub fn validate_uuid(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| format!("{} must be a valid UUID", field))
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 {
        return Err("Email is too long".to_string());
    }
    if !EMAIL_REGEX.is_match(email.trim()) {
        return Err("Email address is not valid".to_string());
    }
    Ok(())
}

pub fn validate_whatsapp(number: &str) -> Result<(), String> {
    if !WHATSAPP_REGEX.is_match(number.trim()) {
        return Err("WhatsApp number must be 7-15 digits, optionally prefixed with +".to_string());
    }
    Ok(())
}

/// Validate an RFC 3339 timestamp
pub fn validate_date_time(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("A date and time is required".to_string());
    }
    chrono::DateTime::parse_from_rfc3339(value.trim())
        .map(|_| ())
        .map_err(|_| "Date must be an RFC 3339 timestamp".to_string())
}

pub fn validate_budget(budget: i64) -> Result<(), String> {
    if budget <= 0 {
        return Err("Budget must be a positive amount".to_string());
    }
    Ok(())
}

pub fn validate_guest_count(guest_count: i64) -> Result<(), String> {
    if guest_count <= 0 {
        return Err("Guest count must be a positive number".to_string());
    }
    Ok(())
}

pub fn validate_location(location: &str) -> Result<(), String> {
    if location.trim().is_empty() {
        return Err("Location is required".to_string());
    }
    if location.len() > 500 {
        return Err("Location must be 500 characters or less".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "id").is_ok());
        assert!(validate_uuid("not-a-uuid", "id").is_err());
        assert!(validate_uuid("", "id").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user@sub.example.co.in").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_whatsapp() {
        assert!(validate_whatsapp("+919876543210").is_ok());
        assert!(validate_whatsapp("9876543210").is_ok());
        assert!(validate_whatsapp("+91 98765").is_err());
        assert!(validate_whatsapp("12345").is_err());
    }

    #[test]
    fn test_validate_date_time() {
        assert!(validate_date_time("2026-09-01T10:00:00Z").is_ok());
        assert!(validate_date_time("2026-09-01T10:00:00+05:30").is_ok());
        assert!(validate_date_time("next tuesday").is_err());
        assert!(validate_date_time("").is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_budget(500_000).is_ok());
        assert!(validate_budget(0).is_err());
        assert!(validate_guest_count(200).is_ok());
        assert!(validate_guest_count(-1).is_err());
    }

    #[test]
    fn test_validate_location() {
        assert!(validate_location("Mumbai").is_ok());
        assert!(validate_location("   ").is_err());
        assert!(validate_location(&"x".repeat(501)).is_err());
    }
}
