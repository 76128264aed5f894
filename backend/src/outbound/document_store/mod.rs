//! Document store adapters.

mod memory;
mod postgres;

pub use memory::InMemoryDocumentStore;
pub use postgres::{PostgresDocumentStore, StoreConfig};
