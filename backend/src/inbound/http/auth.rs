//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers take an [`AuthenticatedPrincipal`] argument; extraction reads the
//! `Authorization: Bearer <token>` header and resolves it through the
//! [`IdentityProvider`] held in [`HttpState`].

use std::ops::Deref;
use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Error, Principal};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The caller's verified identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal(Principal);

impl AuthenticatedPrincipal {
    pub fn into_inner(self) -> Principal {
        self.0
    }
}

impl Deref for AuthenticatedPrincipal {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Pull the token out of an `Authorization` header value.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("bearer token required"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header must be ASCII"))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))?;
    Ok(token.to_owned())
}

pub(crate) fn map_identity_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::InvalidToken { message } => {
            Error::unauthorized(format!("invalid bearer token: {message}"))
        }
        other => {
            warn!(error = %other, kind = other.kind(), "identity provider unavailable");
            Error::external_service(format!("identity provider failed: {other}"))
        }
    }
}

async fn resolve(identity: Arc<dyn IdentityProvider>, token: String) -> Result<Principal, Error> {
    identity
        .authenticate(&token)
        .await
        .map_err(map_identity_error)
}

impl FromRequest for AuthenticatedPrincipal {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req
            .app_data::<web::Data<HttpState>>()
            .map(|state| Arc::clone(&state.identity));
        let token = bearer_token(req);
        Box::pin(async move {
            let identity =
                identity.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            resolve(identity, token?).await.map(AuthenticatedPrincipal)
        })
    }
}
