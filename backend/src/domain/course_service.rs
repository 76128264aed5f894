//! Catalogue service implementing [`CourseQuery`] and [`CourseCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::documents::{FieldPatch, decode, encode, map_store_error};
use crate::domain::ports::{
    Collection, CourseCommand, CourseQuery, CreateCourseRequest, DeleteCondition, DocumentKey,
    DocumentStore, DocumentStoreError, UpdateCourseRequest, WriteCondition,
};
use crate::domain::{Course, CourseId, CourseStructureNormalizer, Error, Principal};

const COURSES: Collection = Collection::Courses;

/// Course catalogue service backed by a [`DocumentStore`].
#[derive(Clone)]
pub struct CourseService<S> {
    store: Arc<S>,
    normalizer: CourseStructureNormalizer,
}

impl<S> CourseService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            normalizer: CourseStructureNormalizer::new(),
        }
    }
}

impl<S> CourseService<S>
where
    S: DocumentStore,
{
    async fn load(&self, course_id: &CourseId) -> Result<Course, Error> {
        let document = self
            .store
            .get(COURSES, &DocumentKey::course(course_id))
            .await
            .map_err(|err| map_store_error(COURSES, err))?
            .ok_or_else(|| Error::not_found(format!("course {course_id} not found")))?;
        decode(COURSES, document)
    }

    fn require_owner(course: &Course, principal: &Principal, action: &str) -> Result<(), Error> {
        if course.teacher_id == principal.user_id {
            return Ok(());
        }
        Err(Error::forbidden(format!("only the course teacher may {action} it")))
    }

    /// Validate the edit against `existing` and build the field patch.
    fn build_patch(&self, existing: &Course, request: UpdateCourseRequest) -> Result<FieldPatch, Error> {
        let price = request
            .price
            .map(|major| self.normalizer.normalize_price(major))
            .transpose()?;
        let sections = request
            .sections
            .map(|drafts| self.normalizer.normalize_sections(existing, drafts))
            .transpose()?;

        FieldPatch::new(COURSES)
            .set_opt("title", request.title.as_ref())?
            .set_opt("description", request.description.as_ref())?
            .set_opt("category", request.category.as_ref())?
            .set_opt("price", price.as_ref())?
            .set_opt("level", request.level.as_ref())?
            .set_opt("status", request.status.as_ref())?
            .set_opt("image", request.image.as_ref())?
            .set_opt("sections", sections.as_ref())
    }
}

#[async_trait]
impl<S> CourseQuery for CourseService<S>
where
    S: DocumentStore,
{
    async fn list_courses(&self) -> Result<Vec<Course>, Error> {
        self.store
            .scan(COURSES)
            .await
            .map_err(|err| map_store_error(COURSES, err))?
            .into_iter()
            .map(|document| decode(COURSES, document))
            .collect()
    }

    async fn get_course(&self, course_id: &CourseId) -> Result<Course, Error> {
        self.load(course_id).await
    }
}

#[async_trait]
impl<S> CourseCommand for CourseService<S>
where
    S: DocumentStore,
{
    async fn create_course(&self, request: CreateCourseRequest) -> Result<Course, Error> {
        request.principal.require_teacher()?;
        let course = Course::new_draft(
            CourseId::random(),
            request.principal.user_id.clone(),
            request.teacher_name.unwrap_or_default(),
        );
        self.store
            .put(
                COURSES,
                &DocumentKey::course(&course.course_id),
                encode(COURSES, &course)?,
                WriteCondition::IfAbsent,
            )
            .await
            .map_err(|err| map_store_error(COURSES, err))?;
        info!(course_id = %course.course_id, teacher_id = %course.teacher_id, "course created");
        Ok(course)
    }

    async fn update_course(
        &self,
        principal: &Principal,
        course_id: &CourseId,
        request: UpdateCourseRequest,
    ) -> Result<Course, Error> {
        let existing = self.load(course_id).await?;
        Self::require_owner(&existing, principal, "update")?;

        let patch = self.build_patch(&existing, request)?;
        if patch.is_empty() {
            return Ok(existing);
        }
        self.store
            .update_fields(COURSES, &DocumentKey::course(course_id), patch.into_fields())
            .await
            .map_err(|err| map_store_error(COURSES, err))?;
        info!(course_id = %course_id, "course updated");
        self.load(course_id).await
    }

    async fn delete_course(
        &self,
        principal: &Principal,
        course_id: &CourseId,
    ) -> Result<Course, Error> {
        let existing = self.load(course_id).await?;
        Self::require_owner(&existing, principal, "delete")?;
        if !existing.enrollments.is_empty() {
            return Err(enrolled_conflict(course_id));
        }

        // The store re-checks the set so an enrollment landing after the read
        // still blocks the delete.
        self.store
            .delete(
                COURSES,
                &DocumentKey::course(course_id),
                DeleteCondition::SetEmpty("enrollments"),
            )
            .await
            .map_err(|err| match err {
                DocumentStoreError::ConditionFailed { .. } => {
                    warn!(course_id = %course_id, "enrollment arrived during course delete");
                    enrolled_conflict(course_id)
                }
                other => map_store_error(COURSES, other),
            })?;
        info!(course_id = %course_id, teacher_id = %existing.teacher_id, "course deleted");
        Ok(existing)
    }
}

fn enrolled_conflict(course_id: &CourseId) -> Error {
    Error::conflict("Cannot delete a course with enrolled students").with_details(json!({
        "code": "course_has_enrollments",
        "courseId": course_id,
    }))
}
