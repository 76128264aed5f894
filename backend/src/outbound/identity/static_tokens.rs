//! Identity provider backed by a fixed token table for local development.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Principal, Role, UserId};

/// Resolves tokens from a `token=userId:role` table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenIdentityProvider {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenIdentityProvider {
    /// Parse a comma separated list such as `t1=alice:teacher,t2=bob:student`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Decode`] naming the first malformed
    /// entry.
    pub fn parse(spec: &str) -> Result<Self, IdentityProviderError> {
        let tokens = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_entry)
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn parse_entry(entry: &str) -> Result<(String, Principal), IdentityProviderError> {
    let malformed = || IdentityProviderError::decode(format!("malformed dev token entry: {entry}"));
    let (token, claims) = entry.split_once('=').ok_or_else(malformed)?;
    let (user, role) = claims.split_once(':').ok_or_else(malformed)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(malformed());
    }
    let user_id = UserId::new(user.trim()).map_err(|_| malformed())?;
    let role: Role = role.trim().parse().map_err(IdentityProviderError::decode)?;
    Ok((token.to_owned(), Principal::new(user_id, role)))
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<Principal, IdentityProviderError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityProviderError::invalid_token("unknown token"))
    }
}
