use crate::config::ExtractConfig;
use crate::domain::model::{CourseCode, CourseListing, CourseRecord, COURSE_CODE_RE};
use crate::domain::ports::{HtmlParser, Link, ParsedPage};
use crate::utils::error::{Result, ScrapeError};
use std::collections::BTreeMap;
use url::Url;

/// Labels already carried by dedicated `CourseRecord` fields.
const MODELLED_LABELS: [&str; 2] = ["title", "description"];

/// Links of a parsed listing page. Course listings are produced lazily by
/// [`ListingPage::iter`], which can be called any number of times.
#[derive(Debug, Clone)]
pub struct ListingPage {
    links: Vec<Link>,
    base_url: Url,
}

impl ListingPage {
    /// One listing per course code found in link text, in document order.
    /// Repeated codes are kept.
    pub fn iter(&self) -> impl Iterator<Item = CourseListing> + '_ {
        self.links.iter().flat_map(move |link| {
            let detail_url = resolve_href(&self.base_url, &link.href);
            COURSE_CODE_RE
                .find_iter(&link.text)
                .filter_map(move |m| {
                    let detail_url = detail_url.clone()?;
                    Some(CourseListing {
                        code: CourseCode::parse(m.as_str())?,
                        detail_url,
                    })
                })
        })
    }
}

impl<'a> IntoIterator for &'a ListingPage {
    type Item = CourseListing;
    type IntoIter = Box<dyn Iterator<Item = CourseListing> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

fn resolve_href(base_url: &Url, href: &str) -> Option<Url> {
    let lowered = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping unresolvable link '{}': {}", href, e);
            None
        }
    }
}

pub fn extract_listings<P: HtmlParser>(parser: &P, html: &str, base_url: &Url) -> Result<ListingPage> {
    let page = parser.parse(html)?;
    let links = page.links();
    tracing::debug!("Listing page has {} links", links.len());

    Ok(ListingPage {
        links,
        base_url: base_url.clone(),
    })
}

/// Builds the record for `code` from its detail page. Missing title or
/// description anchors fail the whole record.
pub fn extract_detail<P: HtmlParser>(
    parser: &P,
    html: &str,
    code: &CourseCode,
    url: &Url,
    config: &ExtractConfig,
) -> Result<CourseRecord> {
    let page = parser.parse(html)?;

    let heading = page.find_by_anchor(&config.title_anchor).ok_or_else(|| {
        ScrapeError::parse(format!("{}: title anchor '{}' not found", code, config.title_anchor))
    })?;
    let description = page.find_by_anchor(&config.description_anchor).ok_or_else(|| {
        ScrapeError::parse(format!(
            "{}: description anchor '{}' not found",
            code, config.description_anchor
        ))
    })?;

    if let Some(found) = COURSE_CODE_RE.find(&heading) {
        if found.as_str() != code.as_str() {
            tracing::warn!("{}: detail page heading names {}", code, found.as_str());
        }
    }

    let mut other_fields = BTreeMap::new();
    for (label, text) in page.labelled_blocks(&config.field_class_prefix) {
        if MODELLED_LABELS.contains(&label.as_str()) {
            continue;
        }
        other_fields.entry(label).or_insert(text);
    }

    Ok(CourseRecord {
        code: code.clone(),
        title: strip_code_prefix(&heading, code),
        url: url.to_string(),
        description,
        other_fields,
    })
}

/// Calendar headings read "CP104 Introduction to Programming"; keep the name only.
fn strip_code_prefix(heading: &str, code: &CourseCode) -> String {
    let is_separator = |c: char| c.is_whitespace() || matches!(c, '-' | ':' | '–' | '—');
    match heading.strip_prefix(code.as_str()) {
        // Only a whole token: "CS1010" or "CS101A" are different courses.
        Some(rest) if rest.chars().next().map_or(true, is_separator) => {
            rest.trim_start_matches(is_separator).trim_end().to_string()
        }
        _ => heading.to_string(),
    }
}
