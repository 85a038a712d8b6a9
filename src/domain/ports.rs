use crate::domain::model::CourseRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Retrieves the raw HTML behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Locates one element inside a page. The HTML adapter reads it as a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Anchor(String);

impl Anchor {
    pub fn new(spec: impl Into<String>) -> Self {
        Anchor(spec.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Read-only view of a parsed page. All returned text is trimmed.
pub trait ParsedPage {
    fn find_by_anchor(&self, anchor: &Anchor) -> Option<String>;

    /// Every `<a href>` in document order.
    fn links(&self) -> Vec<Link>;

    /// `(label, text)` for each element carrying a class that starts with
    /// `class_prefix`; the label is the class name without the prefix.
    fn labelled_blocks(&self, class_prefix: &str) -> Vec<(String, String)>;
}

pub trait HtmlParser: Send + Sync {
    type Page: ParsedPage;

    fn parse(&self, html: &str) -> Result<Self::Page>;
}

/// Sink for scraped records. Records are written in `append` order.
pub trait Emitter: Send {
    fn append(&mut self, record: &CourseRecord) -> Result<()>;

    /// Flushes and releases the output. Calling it twice is a no-op.
    fn close(&mut self) -> Result<()>;

    fn paths(&self) -> Vec<String>;
}

/// Where records go. Opening acquires the underlying resource.
pub trait Destination {
    fn open(&self) -> Result<Box<dyn Emitter>>;
}
