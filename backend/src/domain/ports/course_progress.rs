//! Driving ports for reading and merging learner progress.

use async_trait::async_trait;

use crate::domain::{CourseId, Error, SectionProgressUpdate, UserCourseProgress, UserId};

/// Sparse completion update for one enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyProgressRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub sections: Vec<SectionProgressUpdate>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseProgressQuery: Send + Sync {
    async fn fetch_progress(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<UserCourseProgress, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseProgressCommand: Send + Sync {
    /// Merge a sparse update and persist the result.
    ///
    /// # Errors
    ///
    /// - `not_found` when no progress document exists for the pair.
    /// - `invalid_request` when the update names an untracked chapter.
    async fn apply_progress(
        &self,
        request: ApplyProgressRequest,
    ) -> Result<UserCourseProgress, Error>;
}
