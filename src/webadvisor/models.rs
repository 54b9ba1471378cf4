//! Course offering records scraped from WebAdvisor.

use serde::Serialize;
use std::fmt;

/// One course offering.
///
/// `number` and `section` are normalized to zero-padded three digit strings
/// (`"7"` becomes `"007"`). Course numbers sometimes carry a suffix such as
/// `PHY-101L` for labs, so only the first three characters of the number are
/// parsed. An unparseable number leaves both fields empty; an unparseable
/// section leaves only the section empty. Sections wider than three digits
/// are kept as parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub subject: String,
    pub number: String,
    pub section: String,
    pub level: String,
    pub title: String,
    pub faculty: String,
    pub meeting: String,
    pub credits: String,
    pub capacity: String,
    pub status: String,
    /// Only filled in by schedule extraction.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start_date: String,
    /// Long-form course description, present only after a detail fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Section {
    /// Build a bare section from its identity parts, normalizing the numerics.
    pub fn new(subject: &str, number: &str, section: &str, level: &str) -> Self {
        let (number, section) = normalize_identity(number, section);
        Self {
            subject: subject.to_string(),
            number,
            section,
            level: level.to_string(),
            ..Self::default()
        }
    }

    /// Parse a `SUBJECT-NUMBER-SECTION[-LEVEL]` filter string.
    ///
    /// Missing parts become empty strings and anything past the level is ignored.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split('-');
        let mut next = || parts.next().unwrap_or_default();
        let (subject, number, section, level) = (next(), next(), next(), next());
        Self::new(subject, number, section, level)
    }

    /// `SUB-NUM-SEC`, the display identity of a section.
    pub fn section_string(&self) -> String {
        format!("{}-{}-{}", self.subject, self.number, self.section)
    }

    /// Values in the column order of the section-search row matrix.
    pub fn columns(&self) -> [&str; 4] {
        [&self.subject, &self.number, &self.section, &self.level]
    }

    /// Numeric course number, for range filtering.
    pub fn course_number(&self) -> Option<u32> {
        self.number.parse().ok()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.section_string(),
            self.title,
            self.faculty,
            self.meeting,
            self.credits,
            self.status,
            self.capacity
        )
    }
}

/// Zero-pad a parsed integer to three digits. Absent parts stay empty.
fn pad(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return Some(String::new());
    }
    raw.trim().parse::<u64>().ok().map(|n| format!("{n:03}"))
}

/// An unparseable course number blanks the section too; an unparseable
/// section only blanks itself.
fn normalize_identity(number: &str, section: &str) -> (String, String) {
    let number_prefix: String = number.chars().take(3).collect();

    let Some(padded_number) = pad(&number_prefix) else {
        tracing::debug!(number, section, "Unparseable course number, identity left blank");
        return (String::new(), String::new());
    };
    let padded_section = pad(section).unwrap_or_else(|| {
        tracing::debug!(number, section, "Unparseable section number, left blank");
        String::new()
    });
    (padded_number, padded_section)
}
