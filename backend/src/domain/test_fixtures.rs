//! Shared builders for domain unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{
    Chapter, ChapterId, ChapterType, Course, CourseId, Price, Section, SectionId, UserId,
};

pub(crate) struct FixtureClock {
    pub(crate) utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("fixture timestamp is unambiguous")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn user(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

pub(crate) fn course_id(raw: &str) -> CourseId {
    CourseId::new(raw).expect("valid course id")
}

pub(crate) fn section_id(raw: &str) -> SectionId {
    SectionId::new(raw).expect("valid section id")
}

pub(crate) fn chapter_id(raw: &str) -> ChapterId {
    ChapterId::new(raw).expect("valid chapter id")
}

fn chapter(raw: &str) -> Chapter {
    Chapter {
        chapter_id: chapter_id(raw),
        chapter_type: ChapterType::Video,
        title: format!("Chapter {raw}"),
        content: String::new(),
        video_ref: None,
    }
}

/// Course `c1` owned by `teacher` with sections `s1` (`c1a`, `c1b`) and
/// `s2` (`c2a`, `c2b`).
pub(crate) fn two_by_two_course() -> Course {
    let mut course = Course::new_draft(course_id("c1"), user("teacher"), "Ada".to_owned());
    course.price = Price::from_minor_units(4999);
    course.sections = vec![
        Section {
            section_id: section_id("s1"),
            section_title: "Basics".to_owned(),
            section_description: String::new(),
            chapters: vec![chapter("c1a"), chapter("c1b")],
        },
        Section {
            section_id: section_id("s2"),
            section_title: "Advanced".to_owned(),
            section_description: String::new(),
            chapters: vec![chapter("c2a"), chapter("c2b")],
        },
    ];
    course
}
