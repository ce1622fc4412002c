//! Input validation for API payloads.
//! Keeps garbage out of the store and error messages consistent.

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;

/// Maximum lengths accepted from clients
pub const MAX_NAME_LENGTH: usize = 128;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_TITLE_LENGTH: usize = 512;
pub const MAX_TEXT_LENGTH: usize = 10_000;

lazy_static! {
    // Deliberately loose: one '@', no whitespace, a dot in the domain.
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(anyhow!("email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(anyhow!(
            "email too long: {} chars (max: {})",
            email.len(),
            MAX_EMAIL_LENGTH
        ));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(anyhow!("email is not a valid address"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow!("name cannot be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(anyhow!(
            "name too long: {} chars (max: {})",
            name.len(),
            MAX_NAME_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(anyhow!("title cannot be empty"));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(anyhow!(
            "title too long: {} chars (max: {})",
            title.len(),
            MAX_TITLE_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_text(text: &str) -> Result<()> {
    if text.len() > MAX_TEXT_LENGTH {
        return Err(anyhow!(
            "text too long: {} chars (max: {})",
            text.len(),
            MAX_TEXT_LENGTH
        ));
    }
    Ok(())
}

/// Helper to convert validation failures into the API's InvalidInput error.
pub trait ValidationErrorExt<T> {
    fn map_validation_err(self, field: &str) -> crate::errors::Result<T>;
}

impl<T> ValidationErrorExt<T> for Result<T> {
    fn map_validation_err(self, field: &str) -> crate::errors::Result<T> {
        self.map_err(|e| crate::errors::AppError::InvalidInput {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("asha@riise.edu").is_ok());
        assert!(validate_email("a.rao+lab@dept.riise.edu").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@riise.edu").is_err());
        assert!(validate_email("spaces in@riise.edu").is_err());
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Low-power irrigation valve").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validation_error_maps_to_invalid_input() {
        let err = validate_email("bad").map_validation_err("email").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }
}
