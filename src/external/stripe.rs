use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use stripe::{Event, Webhook};

/// Thin wrapper around the payment gateway. This service never initiates
/// payments; the storefront drives checkout and we only consume webhook
/// notifications.
#[derive(Clone)]
pub struct StripeService {
    config: StripeConfig,
}

impl StripeService {
    pub fn new(config: StripeConfig) -> Self {
        Self { config }
    }

    /// Verifies the `Stripe-Signature` header against the raw payload and
    /// returns the parsed event. Payloads failing verification are rejected
    /// before any business logic sees them.
    pub fn verify_webhook_signature(&self, payload: &str, signature: &str) -> AppResult<Event> {
        Webhook::construct_event(payload, signature, &self.config.webhook_secret)
            .map_err(|e| AppError::AuthError(format!("Invalid webhook signature: {e}")))
    }
}
