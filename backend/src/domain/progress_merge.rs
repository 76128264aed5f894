//! Sparse progress updates and the merge rules applied to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ChapterId, Error, SectionId, UserCourseProgress};

/// One chapter flag inside a sparse update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgressUpdate {
    pub chapter_id: ChapterId,
    pub completed: bool,
}

/// Chapter flags for one section inside a sparse update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgressUpdate {
    pub section_id: SectionId,
    #[serde(default)]
    pub chapters: Vec<ChapterProgressUpdate>,
}

/// Applies sparse completion updates to a progress document.
///
/// - Every `(sectionId, chapterId)` named in the update overwrites the stored
///   flag; unnamed chapters are left untouched.
/// - A pair the document does not track rejects the whole update before
///   anything changes.
/// - When a pair repeats within one update, the later entry wins.
/// - `lastAccessedTimestamp` is set to `now` on every successful call.
///
/// Applying the same update twice yields the same flags and ratio.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use course_commerce::domain::{
///     ChapterId, ChapterProgress, ChapterProgressUpdate, CourseId, ProgressMergeEngine,
///     SectionId, SectionProgress, SectionProgressUpdate, UserCourseProgress, UserId,
/// };
///
/// let section_id = SectionId::new("s1").expect("valid id");
/// let chapter_id = ChapterId::new("c1").expect("valid id");
/// let mut progress = UserCourseProgress::builder(
///     UserId::new("learner").expect("valid id"),
///     CourseId::new("course").expect("valid id"),
///     Utc::now(),
/// )
/// .sections(vec![SectionProgress {
///     section_id: section_id.clone(),
///     chapters: vec![ChapterProgress { chapter_id: chapter_id.clone(), completed: false }],
/// }])
/// .build();
///
/// let update = vec![SectionProgressUpdate {
///     section_id,
///     chapters: vec![ChapterProgressUpdate { chapter_id, completed: true }],
/// }];
/// ProgressMergeEngine::new()
///     .apply(&mut progress, &update, Utc::now())
///     .expect("known chapter");
/// assert_eq!(progress.overall_progress(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressMergeEngine;

impl ProgressMergeEngine {
    pub fn new() -> Self {
        Self
    }

    /// Reject updates naming pairs the document does not track.
    pub fn validate(
        &self,
        progress: &UserCourseProgress,
        update: &[SectionProgressUpdate],
    ) -> Result<(), Error> {
        let unknown = update.iter().find_map(|section| {
            section
                .chapters
                .iter()
                .find(|chapter| !progress.contains(&section.section_id, &chapter.chapter_id))
                .map(|chapter| (&section.section_id, &chapter.chapter_id))
        });
        match unknown {
            None => Ok(()),
            Some((section_id, chapter_id)) => Err(Error::invalid_request(
                "progress update names a chapter that is not tracked for this enrollment",
            )
            .with_details(json!({
                "field": "sections",
                "sectionId": section_id,
                "chapterId": chapter_id,
                "code": "unknown_chapter",
            }))),
        }
    }

    /// Merge `update` into `progress` in place.
    pub fn apply(
        &self,
        progress: &mut UserCourseProgress,
        update: &[SectionProgressUpdate],
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.validate(progress, update)?;
        for section in update {
            for chapter in &section.chapters {
                progress.set_completed(&section.section_id, &chapter.chapter_id, chapter.completed);
            }
        }
        progress.last_accessed_timestamp = now;
        Ok(())
    }
}
