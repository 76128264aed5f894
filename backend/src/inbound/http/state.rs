//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CourseCommand, CourseProgressCommand, CourseProgressQuery, CourseQuery, EnrollmentCommand,
    IdentityProvider, PaymentIntentCommand, TransactionQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub courses: Arc<dyn CourseQuery>,
    pub course_commands: Arc<dyn CourseCommand>,
    pub enrollments: Arc<dyn EnrollmentCommand>,
    pub transactions: Arc<dyn TransactionQuery>,
    pub progress_query: Arc<dyn CourseProgressQuery>,
    pub progress: Arc<dyn CourseProgressCommand>,
    pub payments: Arc<dyn PaymentIntentCommand>,
    pub identity: Arc<dyn IdentityProvider>,
}
