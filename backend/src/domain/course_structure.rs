//! Section and chapter identity normalisation for course edits.
//!
//! Clients send the full replacement structure for a course. Entries that
//! carry a syntactically valid identifier keep it regardless of position or
//! content changes; entries without one (or with a malformed one) receive a
//! fresh UUID. Identity is keyed by id, never by index.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{
    Chapter, ChapterId, ChapterType, Course, Error, Price, PriceValidationError, Section,
    SectionId,
};

/// Proposed chapter as supplied by a course edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDraft {
    #[serde(default)]
    pub chapter_id: Option<String>,
    #[serde(rename = "type", default)]
    pub chapter_type: Option<ChapterType>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "video")]
    pub video_ref: Option<String>,
}

/// Proposed section as supplied by a course edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDraft {
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub section_description: String,
    #[serde(default)]
    pub chapters: Vec<ChapterDraft>,
}

/// Assigns or preserves section and chapter identifiers and validates prices.
///
/// # Examples
/// ```
/// use course_commerce::domain::{
///     ChapterDraft, Course, CourseId, CourseStructureNormalizer, SectionDraft, UserId,
/// };
///
/// let course = Course::new_draft(
///     CourseId::random(),
///     UserId::new("teacher_1").expect("valid id"),
///     String::new(),
/// );
/// let drafts = vec![SectionDraft {
///     section_id: Some("intro".to_owned()),
///     chapters: vec![ChapterDraft::default()],
///     ..SectionDraft::default()
/// }];
/// let sections = CourseStructureNormalizer::new()
///     .normalize_sections(&course, drafts)
///     .expect("valid structure");
/// assert_eq!(sections[0].section_id.as_str(), "intro");
/// assert!(!sections[0].chapters[0].chapter_id.as_str().is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseStructureNormalizer;

impl CourseStructureNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Produce the normalised replacement structure for `existing`.
    ///
    /// Supplied ids that parse are kept verbatim. Two entries supplying the
    /// same id are rejected, since ids must stay unique within a course.
    /// Generated ids never collide with any id in `existing` or the input.
    pub fn normalize_sections(
        &self,
        existing: &Course,
        drafts: Vec<SectionDraft>,
    ) -> Result<Vec<Section>, Error> {
        let mut section_ids = IdLedger::new(existing.sections.iter().map(|s| s.section_id.as_str()));
        let mut chapter_ids = IdLedger::new(existing.chapter_pairs().map(|(_, c)| c.as_str()));

        // Claim every supplied id first so generated ids can avoid all of them.
        let supplied_sections = drafts
            .iter()
            .map(|draft| parse_supplied(draft.section_id.as_deref(), SectionId::new))
            .collect::<Vec<_>>();
        for id in supplied_sections.iter().flatten() {
            section_ids.claim_supplied(id.as_str(), "sectionId")?;
        }
        let supplied_chapters = drafts
            .iter()
            .map(|draft| {
                draft
                    .chapters
                    .iter()
                    .map(|chapter| parse_supplied(chapter.chapter_id.as_deref(), ChapterId::new))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        for id in supplied_chapters.iter().flatten().flatten() {
            chapter_ids.claim_supplied(id.as_str(), "chapterId")?;
        }

        let mut generated = 0_usize;
        let sections = drafts
            .into_iter()
            .zip(supplied_sections)
            .zip(supplied_chapters)
            .map(|((draft, section_id), chapter_ids_in)| {
                let section_id = section_id.unwrap_or_else(|| {
                    generated += 1;
                    section_ids.fresh(SectionId::random)
                });
                let chapters = draft
                    .chapters
                    .into_iter()
                    .zip(chapter_ids_in)
                    .map(|(chapter, chapter_id)| Chapter {
                        chapter_id: chapter_id.unwrap_or_else(|| {
                            generated += 1;
                            chapter_ids.fresh(ChapterId::random)
                        }),
                        chapter_type: chapter.chapter_type.unwrap_or_default(),
                        title: chapter.title,
                        content: chapter.content,
                        video_ref: chapter.video_ref,
                    })
                    .collect();
                Section {
                    section_id,
                    section_title: draft.section_title,
                    section_description: draft.section_description,
                    chapters,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            course_id = %existing.course_id,
            sections = sections.len(),
            generated_ids = generated,
            "normalised course structure"
        );
        Ok(sections)
    }

    /// Convert a major-unit price to integer minor units.
    pub fn normalize_price(&self, major_units: f64) -> Result<Price, Error> {
        Price::from_major_units(major_units).map_err(|err| {
            let code = match err {
                PriceValidationError::NotFinite => "not_finite",
                PriceValidationError::Negative => "negative",
                PriceValidationError::TooLarge { .. } => "too_large",
            };
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "price",
                "code": code,
            }))
        })
    }
}

fn parse_supplied<T, E>(raw: Option<&str>, parse: impl Fn(String) -> Result<T, E>) -> Option<T> {
    raw.and_then(|value| parse(value.to_owned()).ok())
}

/// Tracks identifiers already in use while normalising one edit.
struct IdLedger {
    known: HashSet<String>,
    supplied: HashSet<String>,
}

impl IdLedger {
    fn new<'a>(existing: impl Iterator<Item = &'a str>) -> Self {
        Self {
            known: existing.map(str::to_owned).collect(),
            supplied: HashSet::new(),
        }
    }

    fn claim_supplied(&mut self, id: &str, field: &str) -> Result<(), Error> {
        if !self.supplied.insert(id.to_owned()) {
            return Err(
                Error::invalid_request(format!("duplicate {field} in course structure"))
                    .with_details(json!({
                        "field": field,
                        "value": id,
                        "code": "duplicate_id",
                    })),
            );
        }
        self.known.insert(id.to_owned());
        Ok(())
    }

    fn fresh<T: AsRef<str>>(&mut self, generate: impl Fn() -> T) -> T {
        loop {
            let candidate = generate();
            if self.known.insert(candidate.as_ref().to_owned()) {
                return candidate;
            }
        }
    }
}
