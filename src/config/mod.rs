#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::Anchor;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use url::Url;

pub const SUPPORTED_FORMATS: [&str; 2] = ["csv", "json"];

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Everything one scrape run needs. It is passed explicitly to the engine,
/// the fetcher and the output destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub listing_url: String,
    /// Relative course links are resolved against this; defaults to `listing_url`.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub title_anchor: Anchor,
    pub description_anchor: Anchor,
    pub field_class_prefix: String,
    pub deduplicate: bool,
    pub max_courses: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub filenames: FilenameConfig,
    /// Extra CSV columns after `code,title,url,description`, read from `other_fields`.
    pub csv_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilenameConfig {
    pub csv: String,
    pub json: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            title_anchor: Anchor::new("h1"),
            description_anchor: Anchor::new("div.cal_description"),
            field_class_prefix: "cal_".to_string(),
            deduplicate: true,
            max_courses: None,
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            output_formats: vec!["csv".to_string(), "json".to_string()],
            filenames: FilenameConfig::default(),
            csv_columns: vec![
                "hours".to_string(),
                "prerequisite".to_string(),
                "exclusion".to_string(),
            ],
        }
    }
}

impl Default for FilenameConfig {
    fn default() -> Self {
        Self {
            csv: "courses.csv".to_string(),
            json: "courses.json".to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Defaults everywhere except the listing page.
    pub fn new(listing_url: impl Into<String>) -> Self {
        Self {
            source: SourceConfig {
                listing_url: listing_url.into(),
                base_url: None,
                timeout_seconds: default_timeout_seconds(),
                user_agent: default_user_agent(),
            },
            extract: ExtractConfig::default(),
            load: LoadConfig::default(),
        }
    }

    pub fn listing_url(&self) -> Result<Url> {
        parse_url("source.listing_url", &self.source.listing_url)
    }

    pub fn base_url(&self) -> Result<Url> {
        match &self.source.base_url {
            Some(base) => parse_url("source.base_url", base),
            None => self.listing_url(),
        }
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| ScrapeError::InvalidConfigValueError {
        field: field.to_string(),
        value: raw.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })
}

impl Validate for ScrapeConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.listing_url", &self.source.listing_url)?;
        if let Some(base) = &self.source.base_url {
            validation::validate_url("source.base_url", base)?;
        }
        validation::validate_range("source.timeout_seconds", self.source.timeout_seconds, 1, 300)?;
        validation::validate_non_empty_string("source.user_agent", &self.source.user_agent)?;

        validation::validate_selector("extract.title_anchor", self.extract.title_anchor.as_str())?;
        validation::validate_selector(
            "extract.description_anchor",
            self.extract.description_anchor.as_str(),
        )?;
        validation::validate_non_empty_string(
            "extract.field_class_prefix",
            &self.extract.field_class_prefix,
        )?;
        if let Some(max) = self.extract.max_courses {
            validation::validate_range("extract.max_courses", max, 1, usize::MAX)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats(
            "load.output_formats",
            &self.load.output_formats,
            &SUPPORTED_FORMATS,
        )?;
        validation::validate_path("load.filenames.csv", &self.load.filenames.csv)?;
        validation::validate_path("load.filenames.json", &self.load.filenames.json)?;

        Ok(())
    }
}
