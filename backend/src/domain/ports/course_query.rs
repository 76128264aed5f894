//! Driving port for catalogue reads.

use async_trait::async_trait;

use crate::domain::{Course, CourseId, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseQuery: Send + Sync {
    /// Every course in the catalogue.
    async fn list_courses(&self) -> Result<Vec<Course>, Error>;

    /// One course, or [`crate::domain::ErrorCode::NotFound`].
    async fn get_course(&self, course_id: &CourseId) -> Result<Course, Error>;
}
