//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their serialised shape and register under the domain
//! type's name.

#![expect(
    dead_code,
    reason = "Schema wrappers are only read by utoipa during OpenAPI generation"
)]

use utoipa::ToSchema;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request contradicts stored state.
    #[schema(rename = "conflict")]
    Conflict,
    /// The payment gateway or identity provider failed.
    #[schema(rename = "external_service_error")]
    ExternalServiceError,
    /// A purchase was recorded but enrollment is incomplete; retry.
    #[schema(rename = "consistency_gap")]
    ConsistencyGap,
    /// A backing service is temporarily unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// API error response payload.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "Something went wrong")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field or saga context; consistency gaps carry `transactionId`,
    /// `failedStep`, and `retryable`.
    details: Option<serde_json::Value>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Chapter, rename_all = "camelCase")]
pub struct ChapterSchema {
    chapter_id: String,
    #[schema(rename = "type", example = "Video")]
    chapter_type: String,
    title: String,
    content: String,
    video_ref: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Section, rename_all = "camelCase")]
pub struct SectionSchema {
    section_id: String,
    section_title: String,
    section_description: String,
    chapters: Vec<ChapterSchema>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::Enrollment, rename_all = "camelCase")]
pub struct EnrollmentSchema {
    user_id: String,
}

/// Catalogue entry with its structure and enrollment set.
#[derive(ToSchema)]
#[schema(as = crate::domain::Course, rename_all = "camelCase")]
pub struct CourseSchema {
    course_id: String,
    teacher_id: String,
    teacher_name: String,
    title: String,
    description: String,
    category: String,
    image: Option<String>,
    /// Minor currency units.
    #[schema(example = 4999)]
    price: u64,
    #[schema(example = "Beginner")]
    level: String,
    #[schema(example = "Draft")]
    status: String,
    sections: Vec<SectionSchema>,
    enrollments: Vec<EnrollmentSchema>,
}

/// A recorded purchase.
#[derive(ToSchema)]
#[schema(as = crate::domain::Transaction, rename_all = "camelCase")]
pub struct TransactionSchema {
    transaction_id: String,
    user_id: String,
    course_id: String,
    /// Minor currency units.
    amount: u64,
    #[schema(example = "stripe")]
    payment_provider: String,
    date_time: String,
    /// `pending` until progress and enrollment exist, then `complete`.
    #[schema(example = "complete")]
    status: String,
    completed_at: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::ChapterProgress, rename_all = "camelCase")]
pub struct ChapterProgressSchema {
    chapter_id: String,
    completed: bool,
}

#[derive(ToSchema)]
#[schema(as = crate::domain::SectionProgress, rename_all = "camelCase")]
pub struct SectionProgressSchema {
    section_id: String,
    chapters: Vec<ChapterProgressSchema>,
}

/// Per-learner progress document.
#[derive(ToSchema)]
#[schema(as = crate::domain::UserCourseProgress, rename_all = "camelCase")]
pub struct UserCourseProgressSchema {
    user_id: String,
    course_id: String,
    enrollment_date: String,
    last_accessed_timestamp: String,
    sections: Vec<SectionProgressSchema>,
    /// Completed chapters over total chapters, in `[0, 1]`.
    #[schema(example = 0.25)]
    overall_progress: f64,
}

/// Result of a successful enrollment.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::EnrollmentOutcome, rename_all = "camelCase")]
pub struct EnrollmentOutcomeSchema {
    transaction: TransactionSchema,
    course_progress: UserCourseProgressSchema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[rstest]
    fn error_code_schema_lists_every_code() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "external_service_error",
            "consistency_gap",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(schema_json.contains(code), "missing {code}");
        }
    }

    #[rstest]
    fn schemas_register_under_domain_names() {
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert_eq!(CourseSchema::name(), "crate.domain.Course");
        assert_eq!(
            UserCourseProgressSchema::name(),
            "crate.domain.UserCourseProgress"
        );
    }

    #[rstest]
    fn wire_names_are_camel_case() {
        let progress = schema_to_json::<UserCourseProgressSchema>();
        assert!(progress.contains("overallProgress"));
        assert!(progress.contains("lastAccessedTimestamp"));
        let error = schema_to_json::<ErrorSchema>();
        assert!(error.contains("traceId"));
    }
}
