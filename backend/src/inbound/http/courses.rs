//! Course catalogue HTTP handlers.
//!
//! ```text
//! GET /courses
//! GET /courses/{courseId}
//! POST /courses
//! PUT /courses/{courseId}
//! DELETE /courses/{courseId}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateCourseRequest, UpdateCourseRequest};
use crate::domain::{Course, CourseLevel, CourseStatus, Error, SectionDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedPrincipal;
use crate::inbound::http::schemas::{CourseSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, PriceInput, invalid_json_error, parse_course_id,
};

const COURSE_ID: FieldName = FieldName::new("courseId");
const PRICE: FieldName = FieldName::new("price");
const SECTIONS: FieldName = FieldName::new("sections");

/// Sections supplied either as a JSON array or as a string holding one.
///
/// Multipart form clients send the structure JSON-encoded in a text field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SectionsInput {
    List(Vec<SectionDraft>),
    Encoded(String),
}

/// Optional body for `POST /courses`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseBody {
    /// Display name stored alongside the owner id.
    pub teacher_name: Option<String>,
}

/// Partial course edit for `PUT /courses/{courseId}`.
///
/// Every field is optional; only supplied fields are written.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Major currency units, as a number or numeric string.
    #[schema(value_type = Option<f64>, example = 49.99)]
    pub price: Option<PriceInput>,
    #[schema(value_type = Option<String>, example = "Intermediate")]
    pub level: Option<CourseLevel>,
    #[schema(value_type = Option<String>, example = "Published")]
    pub status: Option<CourseStatus>,
    pub image: Option<String>,
    /// Replacement structure; ids are kept when supplied and generated
    /// otherwise.
    #[schema(value_type = Option<Vec<Object>>)]
    pub sections: Option<SectionsInput>,
}

fn parse_sections(input: SectionsInput) -> Result<Vec<SectionDraft>, Error> {
    match input {
        SectionsInput::List(sections) => Ok(sections),
        SectionsInput::Encoded(raw) => serde_json::from_str(&raw)
            .map_err(|err| invalid_json_error(SECTIONS, &raw, &err.to_string())),
    }
}

impl TryFrom<UpdateCourseBody> for UpdateCourseRequest {
    type Error = Error;

    fn try_from(body: UpdateCourseBody) -> Result<Self, Self::Error> {
        Ok(Self {
            title: body.title,
            description: body.description,
            category: body.category,
            price: body
                .price
                .map(|price| price.into_major_units(PRICE))
                .transpose()?,
            level: body.level,
            status: body.status,
            image: body.image,
            sections: body.sections.map(parse_sections).transpose()?,
        })
    }
}

/// List every course in the catalogue.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "Courses", body = [CourseSchema]),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Course>>> {
    Ok(web::Json(state.courses.list_courses().await?))
}

/// Fetch one course.
#[utoipa::path(
    get,
    path = "/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course", body = CourseSchema),
        (status = 400, description = "Invalid course id", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security([])
)]
#[get("/courses/{courseId}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Course>> {
    let course_id = parse_course_id(&path.into_inner(), COURSE_ID)?;
    Ok(web::Json(state.courses.get_course(&course_id).await?))
}

/// Create an empty draft course owned by the caller.
#[utoipa::path(
    post,
    path = "/courses",
    request_body(content = CreateCourseBody, description = "Optional owner display name"),
    responses(
        (status = 201, description = "Draft created", body = CourseSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a teacher", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    principal: AuthenticatedPrincipal,
    payload: Option<web::Json<CreateCourseBody>>,
) -> ApiResult<HttpResponse> {
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let course = state
        .course_commands
        .create_course(CreateCourseRequest {
            principal: principal.into_inner(),
            teacher_name: body.teacher_name,
        })
        .await?;
    Ok(HttpResponse::Created().json(course))
}

/// Edit course metadata and structure.
#[utoipa::path(
    put,
    path = "/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    request_body = UpdateCourseBody,
    responses(
        (status = 200, description = "Updated course", body = CourseSchema),
        (status = 400, description = "Invalid price or structure", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the course", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{courseId}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    principal: AuthenticatedPrincipal,
    path: web::Path<String>,
    payload: web::Json<UpdateCourseBody>,
) -> ApiResult<web::Json<Course>> {
    let course_id = parse_course_id(&path.into_inner(), COURSE_ID)?;
    let request = UpdateCourseRequest::try_from(payload.into_inner())?;
    let course = state
        .course_commands
        .update_course(&principal, &course_id, request)
        .await?;
    Ok(web::Json(course))
}

/// Delete a course nobody is enrolled in.
#[utoipa::path(
    delete,
    path = "/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Deleted course", body = CourseSchema),
        (status = 400, description = "Invalid course id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the course", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 409, description = "Learners are enrolled", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{courseId}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    principal: AuthenticatedPrincipal,
    path: web::Path<String>,
) -> ApiResult<web::Json<Course>> {
    let course_id = parse_course_id(&path.into_inner(), COURSE_ID)?;
    let course = state
        .course_commands
        .delete_course(&principal, &course_id)
        .await?;
    Ok(web::Json(course))
}

#[cfg(test)]
#[path = "courses_tests.rs"]
mod tests;
