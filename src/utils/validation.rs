use crate::utils::error::{Result, ScrapeError};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScrapeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ScrapeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Anchors are CSS selectors; reject the ones the HTML adapter could not compile.
pub fn validate_selector(field_name: &str, selector: &str) -> Result<()> {
    validate_non_empty_string(field_name, selector)?;
    scraper::Selector::parse(selector).map_err(|e| ScrapeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: selector.to_string(),
        reason: format!("Invalid CSS selector: {:?}", e),
    })?;
    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String], allowed: &[&str]) -> Result<()> {
    if formats.is_empty() {
        return Err(ScrapeError::ConfigValidationError {
            field: field_name.to_string(),
            message: "At least one output format is required".to_string(),
        });
    }

    let allowed_set: HashSet<&str> = allowed.iter().copied().collect();
    for format in formats {
        if !allowed_set.contains(format.as_str()) {
            return Err(ScrapeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!("Unsupported format. Valid formats: {}", allowed.join(", ")),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.listing_url", "https://example.com").is_ok());
        assert!(validate_url("source.listing_url", "http://example.com").is_ok());
        assert!(validate_url("source.listing_url", "").is_err());
        assert!(validate_url("source.listing_url", "invalid-url").is_err());
        assert!(validate_url("source.listing_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("source.timeout_seconds", 30u64, 1, 300).is_ok());
        assert!(validate_range("source.timeout_seconds", 0u64, 1, 300).is_err());
        assert!(validate_range("source.timeout_seconds", 301u64, 1, 300).is_err());
    }

    #[test]
    fn test_validate_selector() {
        assert!(validate_selector("extract.title_anchor", "h1").is_ok());
        assert!(validate_selector("extract.description_anchor", "div.cal_description").is_ok());
        assert!(validate_selector("extract.title_anchor", "").is_err());
        assert!(validate_selector("extract.title_anchor", "div[").is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        let formats = vec!["csv".to_string(), "json".to_string()];
        assert!(validate_output_formats("load.output_formats", &formats, &["csv", "json"]).is_ok());

        let invalid = vec!["xml".to_string()];
        assert!(validate_output_formats("load.output_formats", &invalid, &["csv", "json"]).is_err());
        assert!(validate_output_formats("load.output_formats", &[], &["csv", "json"]).is_err());
    }
}
