//! Course commerce backend library modules.
//!
//! Course catalogue, purchase enrollment, and learner progress tracking
//! behind an actix-web HTTP adapter.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

pub use middleware::Trace;
/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
