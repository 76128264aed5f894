//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **document_store**: in-memory and PostgreSQL JSONB document stores
//! - **payments**: Stripe payment intents over HTTP
//! - **identity**: userinfo and static-token identity providers
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod document_store;
pub mod identity;
pub mod payments;
