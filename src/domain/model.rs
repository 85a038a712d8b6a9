use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Two uppercase letters followed by three digits, e.g. `CP104`.
pub const COURSE_CODE_PATTERN: &str = r"[A-Z]{2}\d{3}";

pub(crate) static COURSE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(COURSE_CODE_PATTERN).expect("course code pattern is valid"));

static EXACT_COURSE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}$", COURSE_CODE_PATTERN)).expect("course code pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Accepts only a complete code; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        EXACT_COURSE_CODE_RE
            .is_match(trimmed)
            .then(|| CourseCode(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn unchecked(raw: &str) -> Self {
        CourseCode(raw.to_string())
    }
}

impl TryFrom<String> for CourseCode {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        CourseCode::parse(&raw).ok_or_else(|| format!("'{}' is not a course code", raw))
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> String {
        code.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A course found on the listing page, pointing at its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListing {
    pub code: CourseCode,
    pub detail_url: Url,
}

/// One scraped course, as written to the output files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub code: CourseCode,
    pub title: String,
    pub url: String,
    pub description: String,
    #[serde(default)]
    pub other_fields: BTreeMap<String, String>,
}

impl CourseRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "code" => Some(self.code.as_str()),
            "title" => Some(&self.title),
            "url" => Some(&self.url),
            "description" => Some(&self.description),
            other => self.other_fields.get(other).map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ListingFetch,
    ListingParse,
    DetailFetch,
    DetailParse,
    OutputWrite,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ListingFetch => "listing fetch",
            Stage::ListingParse => "listing parse",
            Stage::DetailFetch => "detail fetch",
            Stage::DetailParse => "detail parse",
            Stage::OutputWrite => "output write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedCourse {
    pub code: CourseCode,
    pub url: String,
    pub stage: Stage,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub listings_found: usize,
    pub duplicates_dropped: usize,
    pub records_emitted: usize,
    pub skipped: Vec<SkippedCourse>,
    pub output_files: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    pub fn skipped_codes(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.code.as_str()).collect()
    }
}
