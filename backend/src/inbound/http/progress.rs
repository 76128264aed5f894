//! Learner progress HTTP handlers.
//!
//! ```text
//! GET /users/course-progress/{userId}/courses/{courseId}
//! PUT /users/course-progress/{userId}/courses/{courseId}
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::ports::ApplyProgressRequest;
use crate::domain::{CourseId, SectionProgressUpdate, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedPrincipal;
use crate::inbound::http::cache_control::private_revalidate;
use crate::inbound::http::schemas::{ErrorSchema, UserCourseProgressSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_course_id, parse_user_id};

/// Path segments shared by both progress routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPath {
    user_id: String,
    course_id: String,
}

impl ProgressPath {
    fn parse(self) -> ApiResult<(UserId, CourseId)> {
        Ok((
            parse_user_id(&self.user_id, FieldName::new("userId"))?,
            parse_course_id(&self.course_id, FieldName::new("courseId"))?,
        ))
    }
}

/// Sparse completion update for `PUT`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressBody {
    /// Only the listed chapters change; others keep their state.
    #[schema(value_type = Vec<Object>)]
    pub sections: Vec<SectionProgressUpdate>,
}

/// Fetch the caller's progress in one course.
#[utoipa::path(
    get,
    path = "/users/course-progress/{userId}/courses/{courseId}",
    params(
        ("userId" = String, Path, description = "Learner identifier"),
        ("courseId" = String, Path, description = "Course identifier")
    ),
    responses(
        (
            status = 200,
            description = "Progress document",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = UserCourseProgressSchema
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "userId is not the caller", body = ErrorSchema),
        (status = 404, description = "Not enrolled", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "getCourseProgress"
)]
#[get("/users/course-progress/{userId}/courses/{courseId}")]
pub async fn get_progress(
    state: web::Data<HttpState>,
    principal: AuthenticatedPrincipal,
    path: web::Path<ProgressPath>,
) -> ApiResult<HttpResponse> {
    let (user_id, course_id) = path.into_inner().parse()?;
    principal.require_user(&user_id)?;
    let progress = state
        .progress_query
        .fetch_progress(&user_id, &course_id)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_revalidate())
        .json(progress))
}

/// Merge a sparse completion update.
#[utoipa::path(
    put,
    path = "/users/course-progress/{userId}/courses/{courseId}",
    params(
        ("userId" = String, Path, description = "Learner identifier"),
        ("courseId" = String, Path, description = "Course identifier")
    ),
    request_body = UpdateProgressBody,
    responses(
        (status = 200, description = "Merged progress document", body = UserCourseProgressSchema),
        (status = 400, description = "Update names an untracked chapter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "userId is not the caller", body = ErrorSchema),
        (status = 404, description = "Not enrolled", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "updateCourseProgress"
)]
#[put("/users/course-progress/{userId}/courses/{courseId}")]
pub async fn update_progress(
    state: web::Data<HttpState>,
    principal: AuthenticatedPrincipal,
    path: web::Path<ProgressPath>,
    payload: web::Json<UpdateProgressBody>,
) -> ApiResult<HttpResponse> {
    let (user_id, course_id) = path.into_inner().parse()?;
    principal.require_user(&user_id)?;
    let progress = state
        .progress
        .apply_progress(ApplyProgressRequest {
            user_id,
            course_id,
            sections: payload.into_inner().sections,
        })
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_revalidate())
        .json(progress))
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
