pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{HttpFetcher, LocalDestination, ScraperHtmlParser};
pub use config::ScrapeConfig;
pub use core::engine::ScrapeEngine;
pub use domain::model::{CourseCode, CourseListing, CourseRecord, RunSummary, Stage};
pub use utils::error::{Result, ScrapeError};
