//! Checkout: payment intent creation.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::ports::{
    PaymentGateway, PaymentGatewayError, PaymentIntent, PaymentIntentCommand, PaymentIntentRequest,
};
use crate::domain::{Error, Price};

/// Amount charged when the client omits one or sends zero.
pub const PLACEHOLDER_AMOUNT: Price = Price::from_minor_units(5000);

/// Smallest amount the processor accepts.
pub const MINIMUM_CHARGE: Price = Price::from_minor_units(50);

fn below_minimum() -> Error {
    Error::invalid_request("Amount must be at least $0.50").with_details(json!({
        "field": "amount",
        "code": "below_minimum",
    }))
}

/// Resolve the requested major-unit amount into a chargeable [`Price`].
///
/// # Examples
/// ```
/// use course_commerce::domain::{PLACEHOLDER_AMOUNT, resolve_intent_amount};
///
/// assert_eq!(resolve_intent_amount(None).expect("placeholder"), PLACEHOLDER_AMOUNT);
/// assert_eq!(resolve_intent_amount(Some(49.99)).expect("valid").minor_units(), 4999);
/// assert!(resolve_intent_amount(Some(0.2)).is_err());
/// ```
pub fn resolve_intent_amount(amount: Option<f64>) -> Result<Price, Error> {
    let major = match amount {
        None => return Ok(PLACEHOLDER_AMOUNT),
        Some(major) if major == 0.0 => return Ok(PLACEHOLDER_AMOUNT),
        Some(major) => major,
    };
    let price = Price::from_major_units(major).map_err(|_| below_minimum())?;
    if price < MINIMUM_CHARGE {
        return Err(below_minimum());
    }
    Ok(price)
}

/// Creates payment intents through a [`PaymentGateway`].
#[derive(Clone)]
pub struct PaymentIntentService<G: ?Sized> {
    gateway: Arc<G>,
    currency: String,
}

impl<G: ?Sized> PaymentIntentService<G> {
    pub fn new(gateway: Arc<G>, currency: impl Into<String>) -> Self {
        Self {
            gateway,
            currency: currency.into(),
        }
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> Error {
    warn!(error = %error, kind = error.kind(), "payment gateway call failed");
    Error::external_service(format!("Error creating payment intent: {error}"))
}

#[async_trait]
impl<G> PaymentIntentCommand for PaymentIntentService<G>
where
    G: PaymentGateway + ?Sized,
{
    async fn create_payment_intent(&self, amount: Option<f64>) -> Result<PaymentIntent, Error> {
        let amount = resolve_intent_amount(amount)?;
        let intent = self
            .gateway
            .create_payment_intent(PaymentIntentRequest {
                amount,
                currency: self.currency.clone(),
            })
            .await
            .map_err(map_gateway_error)?;
        info!(amount = amount.minor_units(), currency = %self.currency, "payment intent created");
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockPaymentGateway;
    use rstest::rstest;

    #[rstest]
    #[case(None, 5000)]
    #[case(Some(0.0), 5000)]
    #[case(Some(0.5), 50)]
    #[case(Some(49.99), 4999)]
    #[case(Some(120.0), 12000)]
    fn resolves_chargeable_amounts(#[case] amount: Option<f64>, #[case] expected: u64) {
        let price = resolve_intent_amount(amount).expect("chargeable");
        assert_eq!(price.minor_units(), expected);
    }

    #[rstest]
    #[case(0.49)]
    #[case(-3.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_amounts_below_minimum(#[case] amount: f64) {
        let err = resolve_intent_amount(Some(amount)).expect_err("not chargeable");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Amount must be at least $0.50");
    }

    #[rstest]
    #[tokio::test]
    async fn forwards_amount_and_currency_to_gateway() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_payment_intent()
            .withf(|request| request.amount.minor_units() == 1999 && request.currency == "usd")
            .times(1)
            .returning(|_| {
                Ok(PaymentIntent {
                    client_secret: "pi_1_secret_2".to_owned(),
                })
            });
        let service = PaymentIntentService::new(Arc::new(gateway), "usd");

        let intent = service
            .create_payment_intent(Some(19.99))
            .await
            .expect("intent created");
        assert_eq!(intent.client_secret, "pi_1_secret_2");
    }

    #[rstest]
    #[tokio::test]
    async fn gateway_failure_maps_to_external_service_error() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_payment_intent()
            .returning(|_| Err(PaymentGatewayError::rejected(402_u16, "card declined")));
        let service = PaymentIntentService::new(Arc::new(gateway), "usd");

        let err = service
            .create_payment_intent(None)
            .await
            .expect_err("gateway rejected");
        assert_eq!(err.code(), ErrorCode::ExternalServiceError);
        assert!(err.message().starts_with("Error creating payment intent"));
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_amount_never_reaches_gateway() {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_payment_intent().times(0);
        let service = PaymentIntentService::new(Arc::new(gateway), "usd");

        let err = service
            .create_payment_intent(Some(0.1))
            .await
            .expect_err("below minimum");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
