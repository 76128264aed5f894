//! Progress service implementing [`CourseProgressQuery`] and
//! [`CourseProgressCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::documents::{FieldPatch, decode, map_store_error};
use crate::domain::ports::{
    ApplyProgressRequest, Collection, CourseProgressCommand, CourseProgressQuery, DocumentKey,
    DocumentStore,
};
use crate::domain::{CourseId, Error, ProgressMergeEngine, UserCourseProgress, UserId};

const PROGRESS: Collection = Collection::CourseProgress;

/// Reads progress documents and merges sparse updates into them.
#[derive(Clone)]
pub struct CourseProgressService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    engine: ProgressMergeEngine,
}

impl<S> CourseProgressService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            engine: ProgressMergeEngine::new(),
        }
    }
}

impl<S> CourseProgressService<S>
where
    S: DocumentStore,
{
    async fn load(&self, key: &DocumentKey) -> Result<UserCourseProgress, Error> {
        let document = self
            .store
            .get(PROGRESS, key)
            .await
            .map_err(|err| map_store_error(PROGRESS, err))?
            .ok_or_else(|| Error::not_found("course progress not found"))?;
        decode(PROGRESS, document)
    }
}

#[async_trait]
impl<S> CourseProgressQuery for CourseProgressService<S>
where
    S: DocumentStore,
{
    async fn fetch_progress(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<UserCourseProgress, Error> {
        self.load(&DocumentKey::progress(user_id, course_id)).await
    }
}

#[async_trait]
impl<S> CourseProgressCommand for CourseProgressService<S>
where
    S: DocumentStore,
{
    async fn apply_progress(
        &self,
        request: ApplyProgressRequest,
    ) -> Result<UserCourseProgress, Error> {
        let key = DocumentKey::progress(&request.user_id, &request.course_id);
        let mut progress = self.load(&key).await?;
        self.engine
            .apply(&mut progress, &request.sections, self.clock.utc())?;

        // Enrollment identity fields are never rewritten by a progress update.
        let patch = FieldPatch::new(PROGRESS)
            .set("sections", &progress.sections())?
            .set("overallProgress", &progress.overall_progress())?
            .set("lastAccessedTimestamp", &progress.last_accessed_timestamp)?;
        self.store
            .update_fields(PROGRESS, &key, patch.into_fields())
            .await
            .map_err(|err| map_store_error(PROGRESS, err))?;

        debug!(
            user_id = %request.user_id,
            course_id = %request.course_id,
            overall_progress = progress.overall_progress(),
            "progress merged"
        );
        Ok(progress)
    }
}
