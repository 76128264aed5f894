//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (courses,
//!   transactions, learner progress, health)
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`CourseSchema`],
//!   [`UserCourseProgressSchema`], ...) that provide OpenAPI definitions
//!   without coupling domain types to the utoipa framework
//! - **Security**: bearer token authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::courses::{CreateCourseBody, UpdateCourseBody};
use crate::inbound::http::progress::UpdateProgressBody;
use crate::inbound::http::schemas::{
    ChapterProgressSchema, ChapterSchema, CourseSchema, EnrollmentOutcomeSchema,
    EnrollmentSchema, ErrorCodeSchema, ErrorSchema, SectionProgressSchema, SectionSchema,
    TransactionSchema, UserCourseProgressSchema,
};
use crate::inbound::http::transactions::{
    CreateTransactionBody, PaymentIntentBody, PaymentIntentResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Session token issued by the identity provider."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Course commerce API",
        description = "Course catalogue, purchase enrollment, and learner progress.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::transactions::create_transaction,
        crate::inbound::http::transactions::list_transactions,
        crate::inbound::http::transactions::create_payment_intent,
        crate::inbound::http::progress::get_progress,
        crate::inbound::http::progress::update_progress,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ChapterSchema,
        SectionSchema,
        EnrollmentSchema,
        CourseSchema,
        TransactionSchema,
        ChapterProgressSchema,
        SectionProgressSchema,
        UserCourseProgressSchema,
        EnrollmentOutcomeSchema,
        CreateCourseBody,
        UpdateCourseBody,
        CreateTransactionBody,
        PaymentIntentBody,
        PaymentIntentResponse,
        UpdateProgressBody,
    )),
    tags(
        (name = "courses", description = "Course catalogue and authoring"),
        (name = "transactions", description = "Purchases and checkout"),
        (name = "progress", description = "Learner chapter completion"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
