//! Driving port for course authoring.
//!
//! Edits pass through [`crate::domain::CourseStructureNormalizer`] before
//! anything is written, and only the supplied fields are persisted so a
//! concurrent enrollment-set addition is never overwritten. Deletion is
//! refused while the enrollment set is non-empty.

use async_trait::async_trait;

use crate::domain::{
    Course, CourseId, CourseLevel, CourseStatus, Error, Principal, SectionDraft,
};

/// Request to create an empty draft course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCourseRequest {
    /// Must carry the teacher role; becomes the course owner.
    pub principal: Principal,
    pub teacher_name: Option<String>,
}

/// Partial course edit. `None` leaves the stored field untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Major currency units; converted to minor units on write.
    pub price: Option<f64>,
    pub level: Option<CourseLevel>,
    pub status: Option<CourseStatus>,
    pub image: Option<String>,
    /// Full replacement structure.
    pub sections: Option<Vec<SectionDraft>>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCommand: Send + Sync {
    async fn create_course(&self, request: CreateCourseRequest) -> Result<Course, Error>;

    /// Apply an edit owned by `principal`.
    ///
    /// # Errors
    ///
    /// - `not_found` when the course does not exist.
    /// - `forbidden` when `principal` is not the course's teacher.
    /// - `invalid_request` for a malformed price or structure.
    async fn update_course(
        &self,
        principal: &Principal,
        course_id: &CourseId,
        request: UpdateCourseRequest,
    ) -> Result<Course, Error>;

    /// Remove a course owned by `principal` and return its last state.
    ///
    /// # Errors
    ///
    /// - `not_found` when the course does not exist.
    /// - `forbidden` when `principal` is not the course's teacher.
    /// - `conflict` while any learner is enrolled.
    async fn delete_course(
        &self,
        principal: &Principal,
        course_id: &CourseId,
    ) -> Result<Course, Error>;
}
