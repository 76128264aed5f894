//! Application settings loaded via OrthoConfig.
//!
//! Every field can be supplied on the command line, through a configuration
//! file, or with a `COURSE_COMMERCE_` prefixed environment variable.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
const DEFAULT_CURRENCY: &str = "usd";

/// Runtime configuration for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COURSE_COMMERCE")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Stripe secret key; the fixture gateway is used when absent.
    pub stripe_secret_key: Option<String>,
    /// Override for the Stripe API origin.
    pub stripe_api_base: Option<String>,
    /// ISO currency code for payment intents.
    pub currency: Option<String>,
    /// Userinfo endpoint used to resolve bearer tokens.
    pub identity_userinfo_url: Option<String>,
    /// Development tokens as `token=userId:role` pairs separated by commas.
    pub dev_tokens: Option<String>,
    /// Timeout in seconds applied to payment gateway and identity provider
    /// calls.
    #[ortho_config(default = 10)]
    pub gateway_timeout_secs: u64,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn stripe_api_base(&self) -> &str {
        self.stripe_api_base
            .as_deref()
            .unwrap_or(DEFAULT_STRIPE_API_BASE)
    }

    /// Return the configured currency, lower-cased as Stripe expects.
    pub fn currency(&self) -> String {
        self.currency
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY)
            .to_ascii_lowercase()
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }
}
