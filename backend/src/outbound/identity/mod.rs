//! Identity provider adapters.

mod static_tokens;
mod userinfo;

pub use static_tokens::StaticTokenIdentityProvider;
pub use userinfo::UserinfoIdentityProvider;
