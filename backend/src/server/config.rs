//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use course_commerce::domain::ports::{
    FixtureIdentityProvider, FixturePaymentGateway, IdentityProvider, PaymentGateway,
};
use course_commerce::outbound::document_store::{
    InMemoryDocumentStore, PostgresDocumentStore, StoreConfig,
};
use course_commerce::outbound::identity::{
    StaticTokenIdentityProvider, UserinfoIdentityProvider,
};
use course_commerce::outbound::payments::StripePaymentGateway;
use course_commerce::settings::AppSettings;
use tracing::{info, warn};

/// Document store backing the domain services.
#[derive(Clone)]
pub enum StoreBackend {
    InMemory(Arc<InMemoryDocumentStore>),
    Postgres(Arc<PostgresDocumentStore>),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: StoreBackend,
    pub(crate) payment_gateway: Arc<dyn PaymentGateway>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
    pub(crate) currency: String,
}

impl ServerConfig {
    /// Configuration with the in-memory store and fixture adapters.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            store: StoreBackend::InMemory(Arc::new(InMemoryDocumentStore::new())),
            payment_gateway: Arc::new(FixturePaymentGateway),
            identity: Arc::new(FixtureIdentityProvider),
            currency: "usd".to_owned(),
        }
    }

    #[must_use]
    pub fn with_postgres(mut self, store: PostgresDocumentStore) -> Self {
        self.store = StoreBackend::Postgres(Arc::new(store));
        self
    }

    #[must_use]
    pub fn with_payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payment_gateway = gateway;
        self
    }

    #[must_use]
    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Resolve adapters from application settings.
    ///
    /// Optional settings select real adapters; anything left unset falls back
    /// to the in-memory store or fixture adapters with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when a configured adapter cannot be built,
    /// e.g. the database is unreachable or a URL is malformed.
    pub async fn from_settings(settings: &AppSettings) -> std::io::Result<Self> {
        let timeout = settings.gateway_timeout();
        let mut config = Self::new(settings.bind_addr()).with_currency(settings.currency());

        match &settings.database_url {
            Some(url) => {
                let store = PostgresDocumentStore::connect(&StoreConfig::new(url.as_str()))
                    .await
                    .map_err(|e| std::io::Error::other(format!("document store: {e}")))?;
                info!("using PostgreSQL document store");
                config = config.with_postgres(store);
            }
            None => warn!("no database URL configured; using in-memory document store"),
        }

        match &settings.stripe_secret_key {
            Some(key) => {
                let gateway =
                    StripePaymentGateway::new(settings.stripe_api_base(), key.as_str(), timeout)
                        .map_err(|e| std::io::Error::other(format!("payment gateway: {e}")))?;
                config = config.with_payment_gateway(Arc::new(gateway));
            }
            None => warn!("no Stripe secret key configured; using fixture payment gateway"),
        }

        let identity: Arc<dyn IdentityProvider> =
            match (&settings.identity_userinfo_url, &settings.dev_tokens) {
                (Some(url), _) => Arc::new(
                    UserinfoIdentityProvider::new(url, timeout)
                        .map_err(|e| std::io::Error::other(format!("identity provider: {e}")))?,
                ),
                (None, Some(tokens)) => {
                    let provider = StaticTokenIdentityProvider::parse(tokens)
                        .map_err(|e| std::io::Error::other(format!("dev tokens: {e}")))?;
                    warn!(tokens = provider.len(), "using static development tokens");
                    Arc::new(provider)
                }
                (None, None) => {
                    warn!("no identity provider configured; bearer tokens are trusted as user ids");
                    Arc::new(FixtureIdentityProvider)
                }
            };
        Ok(config.with_identity_provider(identity))
    }
}
