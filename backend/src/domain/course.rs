//! Course catalogue model.
//!
//! A course owns an ordered list of sections, each owning an ordered list of
//! chapters. Section and chapter identifiers are unique within the course for
//! its whole lifetime and are never reassigned; see
//! [`crate::domain::CourseStructureNormalizer`].

use serde::{Deserialize, Serialize};

use super::{ChapterId, CourseId, Price, SectionId, UserId};

/// Publication state of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
}

/// Difficulty label shown in the catalogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// Kind of content a chapter carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChapterType {
    #[default]
    Text,
    Quiz,
    Video,
}

/// A single unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub chapter_id: ChapterId,
    #[serde(rename = "type", default)]
    pub chapter_type: ChapterType,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Reference to uploaded video content, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_ref: Option<String>,
}

/// An ordered group of chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_id: SectionId,
    pub section_title: String,
    #[serde(default)]
    pub section_description: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// Membership entry in a course's enrollment set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub user_id: UserId,
}

/// A sellable course.
///
/// # Examples
/// ```
/// use course_commerce::domain::{Course, CourseId, CourseStatus, UserId};
///
/// let course = Course::new_draft(
///     CourseId::random(),
///     UserId::new("teacher_1").expect("valid id"),
///     "Ada".to_owned(),
/// );
/// assert_eq!(course.status, CourseStatus::Draft);
/// assert_eq!(course.chapter_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_id: CourseId,
    pub teacher_id: UserId,
    #[serde(default)]
    pub teacher_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

/// Placeholder title given to freshly created courses.
pub const UNTITLED_COURSE: &str = "Untitled Course";
/// Placeholder category given to freshly created courses.
pub const UNCATEGORIZED: &str = "Uncategorized";

impl Course {
    /// An empty draft owned by `teacher_id`.
    pub fn new_draft(course_id: CourseId, teacher_id: UserId, teacher_name: String) -> Self {
        Self {
            course_id,
            teacher_id,
            teacher_name,
            title: UNTITLED_COURSE.to_owned(),
            description: String::new(),
            category: UNCATEGORIZED.to_owned(),
            image: None,
            price: Price::default(),
            level: CourseLevel::default(),
            status: CourseStatus::Draft,
            sections: Vec::new(),
            enrollments: Vec::new(),
        }
    }

    /// Every `(sectionId, chapterId)` pair in structural order.
    pub fn chapter_pairs(&self) -> impl Iterator<Item = (&SectionId, &ChapterId)> {
        self.sections.iter().flat_map(|section| {
            section
                .chapters
                .iter()
                .map(move |chapter| (&section.section_id, &chapter.chapter_id))
        })
    }

    pub fn chapter_count(&self) -> usize {
        self.sections.iter().map(|section| section.chapters.len()).sum()
    }

    pub fn is_enrolled(&self, user_id: &UserId) -> bool {
        self.enrollments.iter().any(|entry| &entry.user_id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn deserialises_stored_documents_with_defaults() {
        let course: Course = serde_json::from_value(json!({
            "courseId": "c1",
            "teacherId": "t1",
            "title": "Rust",
            "price": 4999,
            "status": "Published",
            "sections": [{
                "sectionId": "s1",
                "sectionTitle": "Intro",
                "chapters": [{ "chapterId": "ch1", "type": "Video", "title": "Hello" }]
            }],
            "enrollments": [{ "userId": "u1" }]
        }))
        .expect("valid course");

        assert_eq!(course.price.minor_units(), 4999);
        assert_eq!(course.level, CourseLevel::Beginner);
        assert_eq!(course.chapter_count(), 1);
        assert!(course.is_enrolled(&UserId::new("u1").expect("id")));
        let pairs: Vec<_> = course
            .chapter_pairs()
            .map(|(s, c)| (s.as_str(), c.as_str()))
            .collect();
        assert_eq!(pairs, vec![("s1", "ch1")]);
    }
}
