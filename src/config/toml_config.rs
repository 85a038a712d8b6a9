use crate::config::ScrapeConfig;
use crate::utils::error::{Result, ScrapeError};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

impl ScrapeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScrapeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// 替換環境變數 (例如 ${CALENDAR_URL})，未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_RE
        .replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[source]
listing_url = "https://calendar.example.edu/program.php?p=7090"
base_url = "https://calendar.example.edu/"
timeout_seconds = 10

[extract]
title_anchor = "h1.course-title"
description_anchor = "div.cal_description"
deduplicate = false
max_courses = 25

[load]
output_path = "./test-output"
output_formats = ["csv"]
csv_columns = ["hours"]

[load.filenames]
csv = "program.csv"
"#;

        let config = ScrapeConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.source.listing_url, "https://calendar.example.edu/program.php?p=7090");
        assert_eq!(config.source.timeout_seconds, 10);
        assert_eq!(config.extract.title_anchor.as_str(), "h1.course-title");
        assert!(!config.extract.deduplicate);
        assert_eq!(config.extract.max_courses, Some(25));
        assert_eq!(config.load.output_formats, vec!["csv"]);
        assert_eq!(config.load.filenames.csv, "program.csv");
        assert_eq!(config.load.filenames.json, "courses.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_content = r#"
[source]
listing_url = "https://calendar.example.edu/program.php"
"#;

        let config = ScrapeConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.extract.field_class_prefix, "cal_");
        assert_eq!(config.load.output_formats, vec!["csv", "json"]);
        assert_eq!(config.load.csv_columns.len(), 3);
        assert!(config.source.base_url.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COURSE_SCRAPER_TEST_LISTING", "https://test.example.edu/list");

        let toml_content = r#"
[source]
listing_url = "${COURSE_SCRAPER_TEST_LISTING}"

[load]
output_path = "${COURSE_SCRAPER_TEST_UNSET_DIR}"
"#;

        let config = ScrapeConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.listing_url, "https://test.example.edu/list");
        assert_eq!(config.load.output_path, "${COURSE_SCRAPER_TEST_UNSET_DIR}");

        std::env::remove_var("COURSE_SCRAPER_TEST_LISTING");
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let err = ScrapeConfig::from_toml_str("[load]\noutput_path = \"./out\"\n").unwrap_err();
        assert!(matches!(err, ScrapeError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[source]
listing_url = "invalid-url"
"#;

        let config = ScrapeConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[source]
listing_url = "https://calendar.example.edu/program.php"

[load]
output_path = "./output"
output_formats = ["json"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ScrapeConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.load.output_formats, vec!["json"]);
    }
}
