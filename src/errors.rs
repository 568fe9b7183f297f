use serde::Serialize;

/// Errors produced while driving a checkout attempt.
///
/// None of these are fatal to the process: every variant is scoped to a single
/// checkout attempt and recoverable by retry or cancellation.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum CheckoutError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Payment initiation failed: {0}")]
    PaymentInitiationFailed(String),

    #[error("Sale commit failed: {0}")]
    CommitFailed(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for CheckoutError {
    fn from(err: validator::ValidationErrors) -> Self {
        CheckoutError::ValidationError(err.to_string())
    }
}

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        CheckoutError::ExternalServiceError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = CheckoutError::ValidationError("Please enter a valid Kenya (+254) phone number".into());
        assert!(err.to_string().contains("Kenya (+254)"));

        let err = CheckoutError::CommitFailed("recorder unavailable".into());
        assert_eq!(err.to_string(), "Sale commit failed: recorder unavailable");
    }
}
