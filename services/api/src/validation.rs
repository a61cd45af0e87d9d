//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    // bcrypt only reads the first 72 bytes
    if password.len() > 72 {
        return Err("Password must be at most 72 characters long".to_string());
    }

    Ok(())
}

/// Reject blank required text fields
pub fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

/// Ratings and votes are on a 1..=5 scale
pub fn validate_level(level: i32) -> Result<(), String> {
    if !(1..=5).contains(&level) {
        return Err("Level must be between 1 and 5".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana.souza+tag@mail.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ana@").is_err());
        assert!(validate_email("ana example.com").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }

    #[test]
    fn test_level_bounds() {
        assert!(validate_level(1).is_ok());
        assert!(validate_level(5).is_ok());
        assert!(validate_level(0).is_err());
        assert!(validate_level(6).is_err());
    }

    #[test]
    fn test_required_fields() {
        assert!(require("Title", "Soup").is_ok());
        assert_eq!(require("Title", "  ").unwrap_err(), "Title is required");
    }
}
