use crate::domain::ports::{Anchor, HtmlParser, Link, ParsedPage};
use crate::utils::error::{Result, ScrapeError};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));
static CLASSED_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class]").expect("static selector"));

/// `HtmlParser` backed by the `scraper` crate; anchors are CSS selectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperHtmlParser;

pub struct ScraperPage {
    document: Html,
}

impl HtmlParser for ScraperHtmlParser {
    type Page = ScraperPage;

    fn parse(&self, html: &str) -> Result<ScraperPage> {
        if html.trim().is_empty() {
            return Err(ScrapeError::parse("document is empty"));
        }
        // html5ever recovers from nearly anything, so plain text is the only
        // input we refuse outright.
        if !html.contains('<') {
            return Err(ScrapeError::parse("document contains no markup"));
        }

        Ok(ScraperPage {
            document: Html::parse_document(html),
        })
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl ParsedPage for ScraperPage {
    fn find_by_anchor(&self, anchor: &Anchor) -> Option<String> {
        let selector = match Selector::parse(anchor.as_str()) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::warn!("Ignoring invalid anchor '{}': {:?}", anchor, e);
                return None;
            }
        };
        self.document.select(&selector).next().map(element_text)
    }

    fn links(&self) -> Vec<Link> {
        self.document
            .select(&LINK_SELECTOR)
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim();
                Some(Link {
                    text: element_text(a),
                    href: href.to_string(),
                })
            })
            .collect()
    }

    fn labelled_blocks(&self, class_prefix: &str) -> Vec<(String, String)> {
        self.document
            .select(&CLASSED_SELECTOR)
            .filter_map(|element| {
                let label = element
                    .value()
                    .classes()
                    .find_map(|class| class.strip_prefix(class_prefix))
                    .filter(|label| !label.is_empty())?;
                Some((label.to_string(), element_text(element)))
            })
            .collect()
    }
}
