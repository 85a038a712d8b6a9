use crate::config::ScrapeConfig;
use crate::utils::error::{Result, ScrapeError};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "course-scraper")]
#[command(about = "Scrapes course listings and course details from an academic calendar")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Program page that lists the courses (overrides the config file)
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Base URL for relative course links
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Output formats: csv, json
    #[arg(long = "format", value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Stop after this many courses
    #[arg(long)]
    pub max_courses: Option<usize>,

    /// Fetch and emit every listing, even repeated course codes
    #[arg(long)]
    pub no_dedupe: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log as JSON lines instead of compact text
    #[arg(long)]
    pub log_json: bool,

    /// Show the resolved configuration without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Loads the config file if one was given, then applies command line overrides.
    pub fn resolve(&self) -> Result<ScrapeConfig> {
        let mut config = match (&self.config, &self.listing_url) {
            (Some(path), _) => ScrapeConfig::from_file(path)?,
            (None, Some(url)) => ScrapeConfig::new(url.clone()),
            (None, None) => {
                return Err(ScrapeError::MissingConfigError {
                    field: "--config or --listing-url".to_string(),
                })
            }
        };

        if let Some(url) = &self.listing_url {
            config.source.listing_url = url.clone();
        }
        if let Some(base) = &self.base_url {
            config.source.base_url = Some(base.clone());
        }
        if let Some(path) = &self.output_path {
            config.load.output_path = path.clone();
        }
        if !self.formats.is_empty() {
            config.load.output_formats = self.formats.clone();
        }
        if let Some(max) = self.max_courses {
            config.extract.max_courses = Some(max);
        }
        if self.no_dedupe {
            config.extract.deduplicate = false;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_without_config_file() {
        let args = CliArgs::parse_from([
            "course-scraper",
            "--listing-url",
            "https://calendar.example.edu/program.php",
            "--format",
            "csv",
            "--no-dedupe",
        ]);

        let config = args.resolve().unwrap();
        assert_eq!(config.source.listing_url, "https://calendar.example.edu/program.php");
        assert_eq!(config.load.output_formats, vec!["csv"]);
        assert!(!config.extract.deduplicate);
    }

    #[test]
    fn test_comma_separated_formats() {
        let args = CliArgs::parse_from([
            "course-scraper",
            "--listing-url",
            "https://calendar.example.edu/",
            "--format",
            "json,csv",
        ]);
        assert_eq!(args.resolve().unwrap().load.output_formats, vec!["json", "csv"]);
    }

    #[test]
    fn test_missing_source_is_reported() {
        let args = CliArgs::parse_from(["course-scraper"]);
        let err = args.resolve().unwrap_err();
        assert!(matches!(err, ScrapeError::MissingConfigError { .. }));
    }
}
