//! # Payment Errors
//!
//! Everything that can go wrong between the adapter and the provider.
//!
//! An adapter failure never changes order state: the order stays `pending`
//! with no session id, and the caller may retry.

use thiserror::Error;

use crate::config::ConfigError;
use orderdesk_core::CoreError;

/// Payment provider errors.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Network, TLS or timeout failure talking to the provider.
    #[error("Payment provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider answered 2xx with a body we could not use.
    #[error("Unexpected payment provider response: {0}")]
    MalformedResponse(String),

    /// The order could not be turned into a provider request.
    #[error(transparent)]
    Request(#[from] CoreError),

    /// Provider configuration is invalid.
    #[error("Payment provider misconfigured: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for payment operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message() {
        let err = PaymentError::Rejected {
            status: 402,
            message: "Your card was declined.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Payment provider rejected the request (402): Your card was declined."
        );
    }
}
