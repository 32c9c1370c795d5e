//! Gateway Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Gateway-related errors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Invalid or incomplete gateway configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Customer submitted an unknown or ineligible payment option
    #[error("Invalid payment option selection: {0}")]
    InvalidSelection(String),

    /// Gateway cannot serve the current cart
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),

    /// Request fill ran with no stored installment schedule
    #[error("No stored installment schedule for order {0}")]
    MissingSchedule(u64),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Platform rejected a management call
    #[error("Platform error: {0}")]
    Platform(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Network(_) | GatewayError::Platform(_) | GatewayError::Storage(_)
        )
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            GatewayError::InvalidSelection(_) => "Please select a valid payment option.",
            GatewayError::Unavailable(_) => "This payment method is not available for your order.",
            GatewayError::MissingSchedule(_) => "Your payment session expired. Please try again.",
            GatewayError::Config(_) => "Payment method configuration error.",
            _ => "An error occurred processing your payment.",
        }
    }
}
