//! Builders wiring domain services onto the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use course_commerce::domain::ports::DocumentStore;
use course_commerce::domain::{
    CourseProgressService, CourseService, EnrollmentCoordinator, PaymentIntentService,
    TransactionService,
};
use course_commerce::inbound::http::state::HttpState;

use super::{ServerConfig, StoreBackend};

/// Build every driving port over one document store.
fn services_over<S>(store: Arc<S>, config: &ServerConfig) -> HttpState
where
    S: DocumentStore + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let courses = Arc::new(CourseService::new(Arc::clone(&store)));
    let progress = Arc::new(CourseProgressService::new(
        Arc::clone(&store),
        Arc::clone(&clock),
    ));
    HttpState {
        courses: courses.clone(),
        course_commands: courses,
        enrollments: Arc::new(EnrollmentCoordinator::new(Arc::clone(&store), clock)),
        transactions: Arc::new(TransactionService::new(store)),
        progress_query: progress.clone(),
        progress,
        payments: Arc::new(PaymentIntentService::new(
            Arc::clone(&config.payment_gateway),
            config.currency.as_str(),
        )),
        identity: Arc::clone(&config.identity),
    }
}

/// Build HTTP state for the configured store backend.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.store {
        StoreBackend::InMemory(store) => services_over(Arc::clone(store), config),
        StoreBackend::Postgres(store) => services_over(Arc::clone(store), config),
    };
    web::Data::new(state)
}
