//! Error types for the ipizza-rs library.
//!
//! This module defines all error types that can occur while building or
//! authenticating banklink messages. A signature that does not verify is not
//! an error: it is reported as [`PaymentStatus::Error`](crate::types::PaymentStatus).

use thiserror::Error;

/// Main error type for banklink operations.
#[derive(Error, Debug)]
pub enum IpizzaError {
    /// A field the service descriptor hashes is absent from the field map
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Inbound service id is not a payment notification service
    #[error("Unsupported service: {0}")]
    UnsupportedService(String),

    /// Service id has no descriptor in the registry
    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// Field value cannot be length-prefixed with 3 digits
    #[error("Field {field} is too long: {len} exceeds 999")]
    FieldTooLong {
        /// Field name
        field: String,
        /// Measured length of the value
        len: usize,
    },

    /// Key material could not be parsed or loaded
    #[error("Key error: {0}")]
    KeyError(String),

    /// The signing primitive rejected the key or message
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Invalid amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Transaction date in a notification could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error reading key files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for banklink operations.
pub type Result<T> = std::result::Result<T, IpizzaError>;

impl From<rsa::Error> for IpizzaError {
    fn from(err: rsa::Error) -> Self {
        IpizzaError::KeyError(err.to_string())
    }
}

impl From<rsa::pkcs8::Error> for IpizzaError {
    fn from(err: rsa::pkcs8::Error) -> Self {
        IpizzaError::KeyError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for IpizzaError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        IpizzaError::KeyError(err.to_string())
    }
}

impl From<rust_decimal::Error> for IpizzaError {
    fn from(err: rust_decimal::Error) -> Self {
        IpizzaError::InvalidAmount(err.to_string())
    }
}

impl From<chrono::ParseError> for IpizzaError {
    fn from(err: chrono::ParseError) -> Self {
        IpizzaError::InvalidDate(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IpizzaError::MissingField("VK_STAMP".to_string());
        assert_eq!(err.to_string(), "Missing required field: VK_STAMP");

        let err = IpizzaError::FieldTooLong {
            field: "VK_MSG".to_string(),
            len: 1200,
        };
        assert_eq!(err.to_string(), "Field VK_MSG is too long: 1200 exceeds 999");
    }

    #[test]
    fn test_error_conversion() {
        let date_err = chrono::NaiveDate::parse_from_str("not a date", "%d.%m.%Y").unwrap_err();
        let err: IpizzaError = date_err.into();
        assert!(matches!(err, IpizzaError::InvalidDate(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: IpizzaError = io_err.into();
        assert!(matches!(err, IpizzaError::Io(_)));
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<&'static str> {
            Ok("1101")
        }

        assert_eq!(returns_result().unwrap(), "1101");
    }
}
