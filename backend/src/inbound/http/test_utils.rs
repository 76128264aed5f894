//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::Trace;
use crate::domain::documents::encode;
use crate::domain::ports::{
    Collection, DocumentKey, DocumentStore, FixtureIdentityProvider, FixturePaymentGateway,
    WriteCondition,
};
use crate::domain::test_fixtures::fixture_clock;
use crate::domain::{
    Course, CourseProgressService, CourseService, EnrollmentCoordinator, PaymentIntentService,
    TransactionService,
};
use crate::outbound::document_store::InMemoryDocumentStore;

use super::state::HttpState;
use super::{configure_routes, validation::json_config};

/// State wired to an in-memory store and fixture adapters.
pub fn state_over(store: Arc<InMemoryDocumentStore>) -> HttpState {
    let course_service = Arc::new(CourseService::new(Arc::clone(&store)));
    let progress_service = Arc::new(CourseProgressService::new(
        Arc::clone(&store),
        fixture_clock(),
    ));
    HttpState {
        courses: course_service.clone(),
        course_commands: course_service,
        enrollments: Arc::new(EnrollmentCoordinator::new(
            Arc::clone(&store),
            fixture_clock(),
        )),
        transactions: Arc::new(TransactionService::new(store)),
        progress_query: progress_service.clone(),
        progress: progress_service,
        payments: Arc::new(PaymentIntentService::new(
            Arc::new(FixturePaymentGateway),
            "usd",
        )),
        identity: Arc::new(FixtureIdentityProvider),
    }
}

pub fn fixture_state() -> HttpState {
    state_over(Arc::new(InMemoryDocumentStore::new()))
}

/// Full route table over `state`, as the server mounts it.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(Trace)
        .configure(configure_routes)
}

pub async fn seed_course(store: &InMemoryDocumentStore, course: &Course) {
    store
        .put(
            Collection::Courses,
            &DocumentKey::course(&course.course_id),
            encode(Collection::Courses, course).expect("encode course"),
            WriteCondition::Always,
        )
        .await
        .expect("seed course");
}

/// `Authorization` header for the fixture identity provider.
pub fn bearer(user: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {user}"))
}
