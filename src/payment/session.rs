use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use crate::errors::CheckoutError;
use crate::phone::PhoneProfile;

/// Progress of the phone-based mobile payment sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MobilePaymentStatus {
    Idle,
    Sending,
    Sent,
    Confirmed,
    Failed,
}

/// Ephemeral mobile-payment state, scoped to one checkout attempt.
///
/// Transition methods return whether they applied, so a stale event arriving
/// after the session moved on is a no-op rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobilePaymentSession {
    pub status: MobilePaymentStatus,
    pub phone_number: String,
    pub phone_error: Option<String>,
    pub checkout_request_id: Option<String>,
}

impl MobilePaymentSession {
    pub fn new(customer_phone: Option<&str>) -> Self {
        Self {
            status: MobilePaymentStatus::Idle,
            phone_number: customer_phone.unwrap_or_default().to_string(),
            phone_error: None,
            checkout_request_id: None,
        }
    }

    /// Updates the phone field, validating on every edit. An empty input
    /// clears the error without running the check.
    pub fn set_phone(&mut self, value: &str, profile: &PhoneProfile) {
        self.phone_number = value.to_string();
        self.phone_error = None;
        if value.trim().is_empty() {
            return;
        }
        if let Err(CheckoutError::ValidationError(msg)) = profile.validate(value) {
            self.phone_error = Some(msg);
        }
    }

    /// Whether a push may be submitted: a non-empty, error-free phone while
    /// idle or recovering from a failure.
    pub fn can_submit(&self) -> bool {
        self.phone_error.is_none()
            && !self.phone_number.trim().is_empty()
            && matches!(
                self.status,
                MobilePaymentStatus::Idle | MobilePaymentStatus::Failed
            )
    }

    /// Moves to `Sending` and returns the normalized phone the push should
    /// target. Only valid from `Idle` or `Failed` (resend).
    pub fn begin_sending(&mut self, profile: &PhoneProfile) -> Result<String, CheckoutError> {
        if !matches!(
            self.status,
            MobilePaymentStatus::Idle | MobilePaymentStatus::Failed
        ) {
            return Err(CheckoutError::InvalidOperation(format!(
                "Cannot send a payment push while {}",
                self.status
            )));
        }
        let normalized = profile.validate(&self.phone_number)?;
        self.status = MobilePaymentStatus::Sending;
        Ok(normalized)
    }

    /// Records the correlation id of a successfully initiated push.
    pub fn mark_sent(&mut self, checkout_request_id: String) -> bool {
        if self.status != MobilePaymentStatus::Sending {
            debug!(status = %self.status, "ignoring sent acknowledgment");
            return false;
        }
        self.status = MobilePaymentStatus::Sent;
        self.checkout_request_id = Some(checkout_request_id);
        true
    }

    /// Applies an initiation failure or a channel-reported decline.
    pub fn mark_failed(&mut self) -> bool {
        if !matches!(
            self.status,
            MobilePaymentStatus::Sending | MobilePaymentStatus::Sent
        ) {
            debug!(status = %self.status, "ignoring failure signal");
            return false;
        }
        self.status = MobilePaymentStatus::Failed;
        true
    }

    /// Applies a channel-reported confirmation. Only valid from `Sent`.
    pub fn confirm(&mut self) -> bool {
        if self.status != MobilePaymentStatus::Sent {
            debug!(status = %self.status, "ignoring confirmation signal");
            return false;
        }
        self.status = MobilePaymentStatus::Confirmed;
        true
    }

    /// "Change number": back to `Idle`, clearing the correlation id and any
    /// validation error, restoring the customer's saved phone or empty.
    pub fn reset(&mut self, customer_phone: Option<&str>) {
        self.status = MobilePaymentStatus::Idle;
        self.phone_number = customer_phone.unwrap_or_default().to_string();
        self.phone_error = None;
        self.checkout_request_id = None;
    }
}
