//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the strongly typed course-commerce model and the services
//! that implement the driving ports. Nothing here depends on HTTP or on a
//! concrete store; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - Error and ErrorCode: the API error payload and its stable identifiers.
//! - Course, Transaction, UserCourseProgress: the three persisted records.
//! - CourseStructureNormalizer, ProgressMergeEngine: pure rules applied
//!   before persistence.
//! - EnrollmentCoordinator and the other services: port implementations.
//! - OptimisticProgressCache: client-side speculative progress view.

pub mod course;
pub mod course_service;
pub mod course_structure;
pub(crate) mod documents;
pub mod enrollment;
pub mod error;
pub mod identity;
pub mod ids;
pub mod money;
pub mod optimistic_progress;
pub mod payment;
pub mod ports;
pub mod progress;
pub mod progress_merge;
pub mod progress_service;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod transaction;
pub mod transaction_service;

pub use self::course::{
    Chapter, ChapterType, Course, CourseLevel, CourseStatus, Enrollment, Section,
    UNCATEGORIZED, UNTITLED_COURSE,
};
pub use self::course_service::CourseService;
pub use self::course_structure::{ChapterDraft, CourseStructureNormalizer, SectionDraft};
pub use self::enrollment::{EnrollmentCoordinator, EnrollmentStep};
pub use self::error::{Error, ErrorCode};
pub use self::identity::{Principal, Role};
pub use self::ids::{
    ChapterId, CourseId, IDENTIFIER_MAX_LEN, IdentifierValidationError, SectionId,
    TransactionId, UserId,
};
pub use self::money::{MAX_MINOR_UNITS, Price, PriceValidationError};
pub use self::optimistic_progress::{OptimisticProgressCache, SpeculativePatch};
pub use self::payment::{
    MINIMUM_CHARGE, PLACEHOLDER_AMOUNT, PaymentIntentService, resolve_intent_amount,
};
pub use self::progress::{
    ChapterProgress, SectionProgress, UserCourseProgress, UserCourseProgressBuilder,
};
pub use self::progress_merge::{ChapterProgressUpdate, ProgressMergeEngine, SectionProgressUpdate};
pub use self::progress_service::CourseProgressService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transaction::{PaymentProvider, Transaction, TransactionStatus};
pub use self::transaction_service::TransactionService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use course_commerce::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
