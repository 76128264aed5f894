//! Reqwest-backed identity provider resolving tokens via a userinfo endpoint.
//!
//! The endpoint is called with the caller's bearer token and must answer with
//! `{"sub": "<user id>", "userType": "teacher" | "student"}`. A missing
//! `userType` claim is treated as `student`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Principal, Role, UserId};

/// Identity provider adapter backed by an OIDC-style userinfo endpoint.
pub struct UserinfoIdentityProvider {
    client: Client,
    endpoint: Url,
}

impl UserinfoIdentityProvider {
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Transport`] when `endpoint` is not a
    /// valid URL or the reqwest client cannot be constructed.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, IdentityProviderError> {
        let endpoint = Url::parse(endpoint).map_err(|error| {
            IdentityProviderError::transport(format!("invalid userinfo URL {endpoint}: {error}"))
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| IdentityProviderError::transport(error.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl IdentityProvider for UserinfoIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<Principal, IdentityProviderError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| IdentityProviderError::transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| IdentityProviderError::transport(error.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        parse_claims(body.as_ref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimsDto {
    sub: String,
    user_type: Option<String>,
}

fn parse_claims(body: &[u8]) -> Result<Principal, IdentityProviderError> {
    let claims: ClaimsDto = serde_json::from_slice(body).map_err(|error| {
        IdentityProviderError::decode(format!("invalid userinfo JSON: {error}"))
    })?;
    let user_id = UserId::new(claims.sub)
        .map_err(|error| IdentityProviderError::decode(format!("invalid sub claim: {error}")))?;
    let role = match claims.user_type.as_deref() {
        None => Role::Student,
        Some(raw) => raw.parse().map_err(IdentityProviderError::decode)?,
    };
    Ok(Principal::new(user_id, role))
}

fn map_status_error(status: StatusCode) -> IdentityProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            IdentityProviderError::invalid_token(format!("status {}", status.as_u16()))
        }
        _ => IdentityProviderError::transport(format!("status {}", status.as_u16())),
    }
}
