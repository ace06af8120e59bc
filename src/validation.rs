// Validation utilities module
// Custom validation functions for domain-specific rules

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]{2,31}$").expect("valid regex"))
}

/// Validates usernames: 3-32 chars, starts with a letter, then letters,
/// digits, or underscores
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username_regex().is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// Validates that a service category is one of the accepted values
pub fn validate_category(category: &str) -> Result<(), ValidationError> {
    const VALID: [&str; 6] = [
        "design",
        "development",
        "writing",
        "marketing",
        "video",
        "consulting",
    ];
    if VALID.contains(&category.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_category"))
    }
}

/// Validates that a price in cents is positive
pub fn validate_positive_price(price_cents: i64) -> Result<(), ValidationError> {
    if price_cents <= 0 {
        Err(ValidationError::new("price_must_be_positive"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Alice_99").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("9lives").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn categories() {
        assert!(validate_category("design").is_ok());
        assert!(validate_category("Development").is_ok());
        assert!(validate_category("plumbing").is_err());
    }

    #[test]
    fn prices() {
        assert!(validate_positive_price(1).is_ok());
        assert!(validate_positive_price(0).is_err());
        assert!(validate_positive_price(-500).is_err());
    }
}
