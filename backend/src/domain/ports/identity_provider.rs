//! Port for resolving bearer tokens into principals.

use async_trait::async_trait;

use crate::domain::{Principal, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The token is unknown, expired, or malformed.
        InvalidToken { message: String } =>
            "invalid bearer token: {message}",
        /// The provider could not be reached.
        Transport { message: String } =>
            "identity provider transport failed: {message}",
        /// The provider answered with claims that could not be decoded.
        Decode { message: String } =>
            "identity provider response invalid: {message}",
    }
}

/// Verifies a bearer token and returns the caller's identity and role claim.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<Principal, IdentityProviderError>;
}

/// Fixture provider for tests.
///
/// Treats the token as the user id. Tokens prefixed with `teacher-` carry the
/// teacher role; everything else is a student.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<Principal, IdentityProviderError> {
        let user_id = UserId::new(token)
            .map_err(|err| IdentityProviderError::invalid_token(err.to_string()))?;
        let role = if token.starts_with("teacher-") {
            Role::Teacher
        } else {
            Role::Student
        };
        Ok(Principal::new(user_id, role))
    }
}
