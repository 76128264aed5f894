//! Client-side optimistic view of progress documents.
//!
//! A caller applies an update locally before the server confirms it, then
//! either confirms or rolls back the returned [`SpeculativePatch`]. Each patch
//! snapshots the view it was applied to, so a second update issued while the
//! first is in flight snapshots the already-optimistic state. Rolling back an
//! earlier patch restores its snapshot and replays the later patches still in
//! flight; rolling back in reverse order of issuance restores each snapshot
//! exactly.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{
    CourseId, Error, ProgressMergeEngine, SectionProgressUpdate, UserCourseProgress, UserId,
};

/// Handle for one speculative update.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a speculative patch must be confirmed or rolled back"]
pub struct SpeculativePatch {
    id: u64,
    user_id: UserId,
    course_id: CourseId,
}

impl SpeculativePatch {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    id: u64,
    snapshot: UserCourseProgress,
    update: Vec<SectionProgressUpdate>,
    applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Entry {
    view: UserCourseProgress,
    in_flight: Vec<InFlight>,
}

type Key = (UserId, CourseId);

/// Local progress documents plus the speculative patches applied to them.
#[derive(Debug, Default)]
pub struct OptimisticProgressCache {
    entries: HashMap<Key, Entry>,
    next_patch: u64,
    engine: ProgressMergeEngine,
}

impl OptimisticProgressCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the local view with server state, discarding in-flight patches.
    pub fn insert(&mut self, progress: UserCourseProgress) {
        let key = (progress.user_id.clone(), progress.course_id.clone());
        self.entries.insert(
            key,
            Entry {
                view: progress,
                in_flight: Vec::new(),
            },
        );
    }

    /// Current, possibly optimistic, view.
    pub fn view(&self, user_id: &UserId, course_id: &CourseId) -> Option<&UserCourseProgress> {
        self.entries
            .get(&(user_id.clone(), course_id.clone()))
            .map(|entry| &entry.view)
    }

    /// Number of unresolved patches for the pair.
    pub fn in_flight(&self, user_id: &UserId, course_id: &CourseId) -> usize {
        self.entries
            .get(&(user_id.clone(), course_id.clone()))
            .map_or(0, |entry| entry.in_flight.len())
    }

    /// Merge `update` into the local view as if the server had accepted it.
    ///
    /// # Errors
    ///
    /// `not_found` when no view is cached for the pair, and `invalid_request`
    /// when the update names an untracked chapter. The view is unchanged on
    /// error.
    pub fn apply_speculative(
        &mut self,
        user_id: &UserId,
        course_id: &CourseId,
        update: Vec<SectionProgressUpdate>,
        now: DateTime<Utc>,
    ) -> Result<SpeculativePatch, Error> {
        let entry = self
            .entries
            .get_mut(&(user_id.clone(), course_id.clone()))
            .ok_or_else(|| Error::not_found("course progress not cached"))?;
        let snapshot = entry.view.clone();
        self.engine.apply(&mut entry.view, &update, now)?;

        self.next_patch += 1;
        let id = self.next_patch;
        entry.in_flight.push(InFlight {
            id,
            snapshot,
            update,
            applied_at: now,
        });
        Ok(SpeculativePatch {
            id,
            user_id: user_id.clone(),
            course_id: course_id.clone(),
        })
    }

    /// Accept a patch; the local view already reflects it.
    ///
    /// Returns `false` when the patch is no longer in flight.
    pub fn confirm(&mut self, patch: &SpeculativePatch) -> bool {
        self.take(patch).is_some()
    }

    /// Undo a patch.
    ///
    /// Returns `false` when the patch is no longer in flight.
    pub fn rollback(&mut self, patch: &SpeculativePatch) -> bool {
        let Some((entry, position, undone)) = self.locate(patch) else {
            return false;
        };
        entry.view = undone.snapshot;
        for later in entry.in_flight.iter_mut().skip(position) {
            later.snapshot = entry.view.clone();
            for section in &later.update {
                for chapter in &section.chapters {
                    entry
                        .view
                        .set_completed(&section.section_id, &chapter.chapter_id, chapter.completed);
                }
            }
            entry.view.last_accessed_timestamp = later.applied_at;
        }
        debug!(
            user_id = %patch.user_id,
            course_id = %patch.course_id,
            replayed = entry.in_flight.len() - position,
            "speculative progress rolled back"
        );
        true
    }

    /// Apply `update` locally, send it with `send`, and settle the patch.
    ///
    /// On success the server's document becomes the view when nothing else
    /// is in flight for the pair. On failure the patch is rolled back and the
    /// error is returned.
    pub async fn apply_with<F, Fut>(
        &mut self,
        user_id: &UserId,
        course_id: &CourseId,
        update: Vec<SectionProgressUpdate>,
        now: DateTime<Utc>,
        send: F,
    ) -> Result<UserCourseProgress, Error>
    where
        F: FnOnce(Vec<SectionProgressUpdate>) -> Fut,
        Fut: Future<Output = Result<UserCourseProgress, Error>>,
    {
        let patch = self.apply_speculative(user_id, course_id, update.clone(), now)?;
        match send(update).await {
            Ok(confirmed) => {
                self.confirm(&patch);
                if self.in_flight(user_id, course_id) == 0 {
                    self.insert(confirmed.clone());
                }
                Ok(confirmed)
            }
            Err(err) => {
                self.rollback(&patch);
                Err(err)
            }
        }
    }

    fn locate(&mut self, patch: &SpeculativePatch) -> Option<(&mut Entry, usize, InFlight)> {
        let entry = self
            .entries
            .get_mut(&(patch.user_id.clone(), patch.course_id.clone()))?;
        let position = entry
            .in_flight
            .iter()
            .position(|in_flight| in_flight.id == patch.id)?;
        let removed = entry.in_flight.remove(position);
        Some((entry, position, removed))
    }

    fn take(&mut self, patch: &SpeculativePatch) -> Option<InFlight> {
        self.locate(patch).map(|(_, _, removed)| removed)
    }
}
