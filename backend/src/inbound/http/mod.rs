//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod cache_control;
pub mod courses;
pub mod error;
pub mod health;
pub mod progress;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod transactions;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;
pub use validation::json_config;

/// Register every API route on `cfg`.
///
/// Health probes and documentation are mounted separately by the server.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(courses::list_courses)
        .service(courses::get_course)
        .service(courses::create_course)
        .service(courses::update_course)
        .service(courses::delete_course)
        .service(transactions::create_payment_intent)
        .service(transactions::create_transaction)
        .service(transactions::list_transactions)
        .service(progress::get_progress)
        .service(progress::update_progress);
}
