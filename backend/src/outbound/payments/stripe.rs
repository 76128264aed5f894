//! Reqwest-backed Stripe payment intent adapter.
//!
//! This adapter owns transport details only: form encoding, bearer
//! authentication, timeout and HTTP error mapping, and decoding the client
//! secret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::domain::ports::{
    PaymentGateway, PaymentGatewayError, PaymentIntent, PaymentIntentRequest,
};

const PAYMENT_INTENTS_PATH: &str = "v1/payment_intents";

/// Stripe adapter that creates payment intents with automatic payment methods.
pub struct StripePaymentGateway {
    client: Client,
    endpoint: Url,
    secret_key: String,
}

impl StripePaymentGateway {
    /// Build an adapter against `api_base` (normally `https://api.stripe.com`).
    ///
    /// # Errors
    ///
    /// Returns [`PaymentGatewayError::Transport`] when `api_base` is not a
    /// valid URL or the reqwest client cannot be constructed.
    pub fn new(
        api_base: &str,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PaymentGatewayError> {
        let endpoint = payment_intents_url(api_base)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| PaymentGatewayError::transport(error.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            secret_key: secret_key.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_payment_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.secret_key)
            .form(&intent_form(&request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_intent(body.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct IntentDto {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelopeDto {
    error: ErrorDto,
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    message: Option<String>,
}

fn payment_intents_url(api_base: &str) -> Result<Url, PaymentGatewayError> {
    let mut base = Url::parse(api_base).map_err(|error| {
        PaymentGatewayError::transport(format!("invalid Stripe API base {api_base}: {error}"))
    })?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(PAYMENT_INTENTS_PATH).map_err(|error| {
        PaymentGatewayError::transport(format!("invalid Stripe API base {api_base}: {error}"))
    })
}

fn intent_form(request: &PaymentIntentRequest) -> [(&'static str, String); 3] {
    [
        ("amount", request.amount.minor_units().to_string()),
        ("currency", request.currency.clone()),
        ("automatic_payment_methods[enabled]", "true".to_owned()),
    ]
}

fn parse_intent(body: &[u8]) -> Result<PaymentIntent, PaymentGatewayError> {
    let decoded: IntentDto = serde_json::from_slice(body).map_err(|error| {
        PaymentGatewayError::decode(format!("invalid payment intent JSON: {error}"))
    })?;
    decoded
        .client_secret
        .filter(|secret| !secret.is_empty())
        .map(|client_secret| PaymentIntent { client_secret })
        .ok_or_else(|| PaymentGatewayError::decode("payment intent has no client_secret"))
}

fn map_transport_error(error: reqwest::Error) -> PaymentGatewayError {
    PaymentGatewayError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PaymentGatewayError {
    let message = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| format!("status {}", status.as_u16()));
    if status.is_client_error() {
        PaymentGatewayError::rejected(status.as_u16(), message)
    } else {
        PaymentGatewayError::transport(message)
    }
}
