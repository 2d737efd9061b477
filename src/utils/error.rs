use std::fmt;
use thiserror::Error;

/// Distinguishes why a stock query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Missing, invalid or expired token (HTTP 401/403).
    Unauthorized,
    /// The service has nothing for this SKU/base (HTTP 404).
    NotFound,
    /// Network failure or timeout; no response was received.
    Transport,
    /// Any other non-2xx status.
    Server,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueryErrorKind::Unauthorized => "unauthorized",
            QueryErrorKind::NotFound => "not found",
            QueryErrorKind::Transport => "transport",
            QueryErrorKind::Server => "server",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Session storage failure: {message}")]
    StorageFailure { message: String },

    #[error("Login failed: {message}")]
    AuthenticationError { message: String },

    #[error("Registration failed: {message}")]
    RegistrationError { message: String },

    #[error("Stock query failed ({kind}): {message}")]
    QueryError {
        kind: QueryErrorKind,
        message: String,
    },

    #[error("Malformed response from {endpoint}: {message}")]
    DecodeError { endpoint: String, message: String },

    #[error("A stock query is already in progress")]
    QueryInProgress,

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl InventoryError {
    pub fn query(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        InventoryError::QueryError {
            kind,
            message: message.into(),
        }
    }

    pub fn storage(message: impl fmt::Display) -> Self {
        InventoryError::StorageFailure {
            message: message.to_string(),
        }
    }

    pub fn query_kind(&self) -> Option<QueryErrorKind> {
        match self {
            InventoryError::QueryError { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// True when the user has to log in again before retrying.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self.query_kind(), Some(QueryErrorKind::Unauthorized))
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            InventoryError::StorageFailure { .. } => {
                "The saved session could not be accessed".to_string()
            }
            InventoryError::AuthenticationError { message } => format!("Login failed: {}", message),
            InventoryError::RegistrationError { message } => {
                format!("Registration failed: {}", message)
            }
            InventoryError::QueryError { kind, message } => match kind {
                QueryErrorKind::Unauthorized => {
                    format!("Your session is no longer valid: {}", message)
                }
                QueryErrorKind::NotFound => format!("No stock found: {}", message),
                QueryErrorKind::Transport => {
                    format!("Could not reach the inventory service: {}", message)
                }
                QueryErrorKind::Server => format!("Could not fetch stock data: {}", message),
            },
            InventoryError::DecodeError { .. } => {
                "The inventory service sent an unexpected response".to_string()
            }
            InventoryError::QueryInProgress => "Please wait for the current query".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            InventoryError::StorageFailure { .. } => {
                "Check that the token file location is readable and writable"
            }
            InventoryError::AuthenticationError { .. } => "Check your username and password",
            InventoryError::RegistrationError { .. } => "Try a different username",
            InventoryError::QueryError { kind, .. } => match kind {
                QueryErrorKind::Unauthorized => "Log in again",
                QueryErrorKind::NotFound => "Check the SKU and the base",
                QueryErrorKind::Transport => "Check your connection and try again",
                QueryErrorKind::Server => "Try again later",
            },
            InventoryError::DecodeError { .. } => "Check that base_url points at the inventory service",
            InventoryError::QueryInProgress => "Wait for the previous query to finish",
            InventoryError::ValidationError { .. } => "Correct the input and try again",
            InventoryError::ConfigError { .. }
            | InventoryError::InvalidConfigValueError { .. } => "Fix the configuration file",
            InventoryError::IoError(_) => "Check file permissions",
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_requires_reauthentication() {
        let err = InventoryError::query(QueryErrorKind::Unauthorized, "token expired");
        assert!(err.requires_reauthentication());
        assert_eq!(err.recovery_suggestion(), "Log in again");

        let err = InventoryError::query(QueryErrorKind::Transport, "timed out");
        assert!(!err.requires_reauthentication());
    }

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = InventoryError::query(QueryErrorKind::NotFound, "unknown sku");
        assert_eq!(err.to_string(), "Stock query failed (not found): unknown sku");
    }
}
