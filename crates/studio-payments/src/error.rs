//! Payment Error Types

use stripe::StripeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Message returned to callers for anything we did not anticipate.
pub const GENERIC_FAILURE_MESSAGE: &str = "Server error creating checkout session";

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Client-supplied amount missing, malformed or below the minimum
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Stripe answered with a non-success status and a Stripe error body
    #[error("Stripe rejected the request ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Transport failure, or a response the SDK could not decode
    #[error("Stripe client error: {0}")]
    Client(String),

    /// Stripe answered 2xx but the session was not usable
    #[error("Malformed Stripe response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<StripeError> for PaymentError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Stripe(request_error) => PaymentError::Upstream {
                status: request_error.http_status,
                message: request_error
                    .message
                    .unwrap_or_else(|| "Stripe error".into()),
            },
            other => PaymentError::Client(other.to_string()),
        }
    }
}

impl PaymentError {
    /// HTTP status this error should surface as.
    ///
    /// Upstream rejections keep the processor's own status; everything that
    /// is not the caller's fault collapses into a 500.
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::InvalidAmount(_) => 400,
            PaymentError::Upstream { status, .. } => *status,
            _ => 500,
        }
    }

    /// True for failures whose detail must stay server-side
    pub fn is_unexpected(&self) -> bool {
        !matches!(
            self,
            PaymentError::InvalidAmount(_) | PaymentError::Upstream { .. }
        )
    }

    /// Get user-facing message
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::InvalidAmount(_) => "Invalid amount. Must be at least $1.".into(),
            PaymentError::Upstream { message, .. } => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.into(),
        }
    }
}
