//! Driving port for starting a checkout.

use async_trait::async_trait;

use crate::domain::Error;

use super::PaymentIntent;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentIntentCommand: Send + Sync {
    /// Create an intent for `amount` major units.
    ///
    /// A missing or zero amount falls back to the placeholder amount.
    async fn create_payment_intent(&self, amount: Option<f64>) -> Result<PaymentIntent, Error>;
}
