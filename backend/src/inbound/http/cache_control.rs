//! Cache-Control policies for HTTP handlers.

use actix_web::http::header::{CacheControl, CacheDirective};

/// Learner-specific data: never shared, always revalidated.
pub fn private_revalidate() -> CacheControl {
    CacheControl(vec![
        CacheDirective::Private,
        CacheDirective::NoCache,
        CacheDirective::MustRevalidate,
    ])
}

/// Probe responses must never be cached.
pub fn no_store() -> CacheControl {
    CacheControl(vec![CacheDirective::NoStore])
}
