use crate::utils::error::{InventoryError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> InventoryError {
    InventoryError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Only http(s) endpoints can serve the inventory API.
pub fn validate_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, value, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_path(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains('\0') {
        return Err(invalid(field, value, "Path must be non-empty and free of NUL bytes"));
    }
    Ok(())
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be blank"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(field, value, format!("Expected {}..={}", min, max)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("service.base_url", "https://example.com").is_ok());
        assert!(validate_url("service.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("service.base_url", "").is_err());
        assert!(validate_url("service.base_url", "not a url").is_err());
        assert!(validate_url("service.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("service.timeout_seconds", 30u64, 1, 300).is_ok());
        assert!(validate_range("service.timeout_seconds", 0u64, 1, 300).is_err());
        assert!(validate_range("service.retry_attempts", 11u32, 0, 10).is_err());
    }

    #[test]
    fn test_validate_path_and_strings() {
        assert!(validate_path("session.token_path", "session.json").is_ok());
        assert!(validate_path("session.token_path", "").is_err());
        assert!(validate_non_empty_string("stock.default_base", "  ").is_err());
    }

    #[test]
    fn test_error_names_field_and_value() {
        let err = validate_range("service.timeout_seconds", 0u64, 1, 600).unwrap_err();
        match err {
            InventoryError::InvalidConfigValueError { field, value, reason } => {
                assert_eq!(field, "service.timeout_seconds");
                assert_eq!(value, "0");
                assert_eq!(reason, "Expected 1..=600");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
