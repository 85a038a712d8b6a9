use crate::config::{ExtractConfig, ScrapeConfig};
use crate::core::extractor::{extract_detail, extract_listings, ListingPage};
use crate::domain::model::{CourseListing, CourseRecord, RunSummary, SkippedCourse, Stage};
use crate::domain::ports::{Destination, Fetcher, HtmlParser};
use crate::utils::error::{Result, ScrapeError};
use chrono::Utc;
use std::collections::HashSet;

/// Drives one sequential scrape: listing page, then each detail page in turn.
pub struct ScrapeEngine<F: Fetcher, P: HtmlParser> {
    fetcher: F,
    parser: P,
}

impl<F: Fetcher, P: HtmlParser> ScrapeEngine<F, P> {
    pub fn new(fetcher: F, parser: P) -> Self {
        Self { fetcher, parser }
    }

    /// Listing-page and output failures abort the run. Detail-page failures
    /// only skip that course and are listed in the summary.
    pub async fn run<D>(&self, config: &ScrapeConfig, destination: &D) -> Result<RunSummary>
    where
        D: Destination + ?Sized,
    {
        let started_at = Utc::now();
        let listing_url = config
            .listing_url()
            .map_err(|e| e.abort(Stage::ListingFetch))?;
        let base_url = config.base_url().map_err(|e| e.abort(Stage::ListingParse))?;

        tracing::info!("🚀 Starting scrape of {}", listing_url);

        // Listing
        let html = self
            .fetcher
            .fetch(&listing_url)
            .await
            .map_err(|e| e.abort(Stage::ListingFetch))?;
        let page = extract_listings(&self.parser, &html, &base_url)
            .map_err(|e| e.abort(Stage::ListingParse))?;

        let listings_found = page.iter().count();
        let (listings, duplicates_dropped) = select_listings(&page, &config.extract);
        tracing::info!(
            "📋 Found {} course listings ({} duplicates dropped)",
            listings.len(),
            duplicates_dropped
        );

        // Details
        let mut emitter = destination
            .open()
            .map_err(|e| e.abort(Stage::OutputWrite))?;
        let mut skipped = Vec::new();
        let mut records_emitted = 0;

        for (i, listing) in listings.iter().enumerate() {
            tracing::info!(
                "Scraping course {}/{}: {} ({})",
                i + 1,
                listings.len(),
                listing.code,
                listing.detail_url
            );

            match self.scrape_course(listing, &config.extract).await {
                Ok(record) => {
                    emitter
                        .append(&record)
                        .map_err(|e| e.abort(Stage::OutputWrite))?;
                    records_emitted += 1;
                }
                Err((stage, e)) => {
                    tracing::warn!("⚠️ Skipping {} at {}: {}", listing.code, stage, e);
                    skipped.push(SkippedCourse {
                        code: listing.code.clone(),
                        url: listing.detail_url.to_string(),
                        stage,
                        reason: e.to_string(),
                    });
                }
            }
        }

        emitter.close().map_err(|e| e.abort(Stage::OutputWrite))?;

        let summary = RunSummary {
            listings_found,
            duplicates_dropped,
            records_emitted,
            skipped,
            output_files: emitter.paths(),
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            "✅ Emitted {} records, skipped {} courses",
            summary.records_emitted,
            summary.skipped.len()
        );

        Ok(summary)
    }

    async fn scrape_course(
        &self,
        listing: &CourseListing,
        config: &ExtractConfig,
    ) -> std::result::Result<CourseRecord, (Stage, ScrapeError)> {
        let html = self
            .fetcher
            .fetch(&listing.detail_url)
            .await
            .map_err(|e| (Stage::DetailFetch, e))?;

        extract_detail(
            &self.parser,
            &html,
            &listing.code,
            &listing.detail_url,
            config,
        )
        .map_err(|e| (Stage::DetailParse, e))
    }
}

/// Applies the duplicate policy and course limit. With `deduplicate` on,
/// the first listing of a code wins and later ones are never fetched.
fn select_listings(page: &ListingPage, config: &ExtractConfig) -> (Vec<CourseListing>, usize) {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    let mut duplicates = 0;

    for listing in page.iter() {
        if config.deduplicate && !seen.insert(listing.code.clone()) {
            tracing::debug!("Dropping duplicate listing {} -> {}", listing.code, listing.detail_url);
            duplicates += 1;
            continue;
        }
        if config.max_courses.is_some_and(|max| selected.len() >= max) {
            break;
        }
        selected.push(listing);
    }

    (selected, duplicates)
}
