//! Per-learner course progress.
//!
//! `overallProgress` is always derived from the chapter flags. It is written
//! to storage for readers, but on load it is recomputed from the sections and
//! any stored value is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChapterId, Course, CourseId, SectionId, UserId};

/// Completion flag for one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgress {
    pub chapter_id: ChapterId,
    pub completed: bool,
}

/// Completion flags for the chapters of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub section_id: SectionId,
    pub chapters: Vec<ChapterProgress>,
}

/// Progress document keyed by `(userId, courseId)`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use course_commerce::domain::{CourseId, UserCourseProgress, UserId};
///
/// let progress = UserCourseProgress::builder(
///     UserId::new("learner").expect("valid id"),
///     CourseId::new("course").expect("valid id"),
///     Utc::now(),
/// )
/// .build();
/// assert_eq!(progress.overall_progress(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UserCourseProgress {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub enrollment_date: DateTime<Utc>,
    pub last_accessed_timestamp: DateTime<Utc>,
    sections: Vec<SectionProgress>,
    overall_progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserCourseProgressDto {
    user_id: UserId,
    course_id: CourseId,
    enrollment_date: DateTime<Utc>,
    last_accessed_timestamp: DateTime<Utc>,
    #[serde(default)]
    sections: Vec<SectionProgress>,
    #[serde(default)]
    overall_progress: f64,
}

impl From<&UserCourseProgress> for UserCourseProgressDto {
    fn from(value: &UserCourseProgress) -> Self {
        Self {
            user_id: value.user_id.clone(),
            course_id: value.course_id.clone(),
            enrollment_date: value.enrollment_date,
            last_accessed_timestamp: value.last_accessed_timestamp,
            sections: value.sections.clone(),
            overall_progress: value.overall_progress,
        }
    }
}

impl From<UserCourseProgressDto> for UserCourseProgress {
    fn from(value: UserCourseProgressDto) -> Self {
        UserCourseProgress::builder(value.user_id, value.course_id, value.enrollment_date)
            .last_accessed_timestamp(value.last_accessed_timestamp)
            .sections(value.sections)
            .build()
    }
}

impl Serialize for UserCourseProgress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        UserCourseProgressDto::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UserCourseProgress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        UserCourseProgressDto::deserialize(deserializer).map(UserCourseProgress::from)
    }
}

impl UserCourseProgress {
    /// Start building a progress document with no sections.
    pub fn builder(
        user_id: UserId,
        course_id: CourseId,
        enrollment_date: DateTime<Utc>,
    ) -> UserCourseProgressBuilder {
        UserCourseProgressBuilder::new(user_id, course_id, enrollment_date)
    }

    /// Initial document mirroring every chapter of `course`, all incomplete.
    pub fn for_enrollment(user_id: UserId, course: &Course, now: DateTime<Utc>) -> Self {
        let sections = course
            .sections
            .iter()
            .map(|section| SectionProgress {
                section_id: section.section_id.clone(),
                chapters: section
                    .chapters
                    .iter()
                    .map(|chapter| ChapterProgress {
                        chapter_id: chapter.chapter_id.clone(),
                        completed: false,
                    })
                    .collect(),
            })
            .collect();
        Self::builder(user_id, course.course_id.clone(), now)
            .sections(sections)
            .build()
    }

    pub fn sections(&self) -> &[SectionProgress] {
        &self.sections
    }

    /// Completed chapters divided by total chapters; `0.0` with no chapters.
    pub fn overall_progress(&self) -> f64 {
        self.overall_progress
    }

    pub fn chapter_count(&self) -> usize {
        self.sections.iter().map(|section| section.chapters.len()).sum()
    }

    pub fn completed_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|section| section.chapters.iter())
            .filter(|chapter| chapter.completed)
            .count()
    }

    /// Whether the document tracks `(section_id, chapter_id)`.
    pub fn contains(&self, section_id: &SectionId, chapter_id: &ChapterId) -> bool {
        self.chapter(section_id, chapter_id).is_some()
    }

    pub fn chapter(
        &self,
        section_id: &SectionId,
        chapter_id: &ChapterId,
    ) -> Option<&ChapterProgress> {
        self.sections
            .iter()
            .find(|section| &section.section_id == section_id)
            .and_then(|section| {
                section
                    .chapters
                    .iter()
                    .find(|chapter| &chapter.chapter_id == chapter_id)
            })
    }

    /// Overwrite one chapter flag and refresh the derived ratio.
    ///
    /// Returns `false` when the pair is not tracked.
    pub fn set_completed(
        &mut self,
        section_id: &SectionId,
        chapter_id: &ChapterId,
        completed: bool,
    ) -> bool {
        let slot = self
            .sections
            .iter_mut()
            .find(|section| &section.section_id == section_id)
            .and_then(|section| {
                section
                    .chapters
                    .iter_mut()
                    .find(|chapter| &chapter.chapter_id == chapter_id)
            });
        let Some(chapter) = slot else {
            return false;
        };
        chapter.completed = completed;
        self.overall_progress = ratio(&self.sections);
        true
    }
}

fn ratio(sections: &[SectionProgress]) -> f64 {
    let (completed, total) = sections
        .iter()
        .flat_map(|section| section.chapters.iter())
        .fold((0_usize, 0_usize), |(done, total), chapter| {
            (done + usize::from(chapter.completed), total + 1)
        });
    if total == 0 {
        return 0.0;
    }
    completed as f64 / total as f64
}

/// Builder for [`UserCourseProgress`].
#[derive(Debug, Clone)]
pub struct UserCourseProgressBuilder {
    user_id: UserId,
    course_id: CourseId,
    enrollment_date: DateTime<Utc>,
    last_accessed_timestamp: Option<DateTime<Utc>>,
    sections: Vec<SectionProgress>,
}

impl UserCourseProgressBuilder {
    pub fn new(user_id: UserId, course_id: CourseId, enrollment_date: DateTime<Utc>) -> Self {
        Self {
            user_id,
            course_id,
            enrollment_date,
            last_accessed_timestamp: None,
            sections: Vec::new(),
        }
    }

    /// Defaults to the enrollment date when unset.
    pub fn last_accessed_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.last_accessed_timestamp = Some(ts);
        self
    }

    pub fn sections(mut self, sections: Vec<SectionProgress>) -> Self {
        self.sections = sections;
        self
    }

    pub fn build(self) -> UserCourseProgress {
        let overall_progress = ratio(&self.sections);
        UserCourseProgress {
            user_id: self.user_id,
            course_id: self.course_id,
            enrollment_date: self.enrollment_date,
            last_accessed_timestamp: self
                .last_accessed_timestamp
                .unwrap_or(self.enrollment_date),
            sections: self.sections,
            overall_progress,
        }
    }
}
