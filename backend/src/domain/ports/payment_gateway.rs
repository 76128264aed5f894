//! Port for issuing client-confirmable payment intents.

use async_trait::async_trait;

use crate::domain::Price;

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// The gateway could not be reached or timed out.
        Transport { message: String } =>
            "payment gateway transport failed: {message}",
        /// The gateway refused the request.
        Rejected { status: u16, message: String } =>
            "payment gateway rejected request ({status}): {message}",
        /// The gateway answered with an unexpected payload.
        Decode { message: String } =>
            "payment gateway response invalid: {message}",
    }
}

/// Amount and currency for a new payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: Price,
    pub currency: String,
}

/// Intent returned to the client for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub client_secret: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError>;
}

/// Fixture gateway that issues deterministic secrets without network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentGateway;

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        Ok(PaymentIntent {
            client_secret: format!(
                "pi_fixture_{}_secret_{}",
                request.amount.minor_units(),
                request.currency
            ),
        })
    }
}
