//! Ad catalog configuration and validation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors that can occur while loading or validating the ad catalog.
#[derive(Debug, Error)]
pub enum AdCatalogError {
    #[error("No ads configured")]
    NoAds,

    #[error("Ad at index {index} is not a valid URL ({url}): {reason}")]
    InvalidUrl {
        index: usize,
        url: String,
        reason: url::ParseError,
    },

    #[error("Ad at index {index} uses unsupported scheme '{scheme}' (only http and https are allowed)")]
    UnsupportedScheme { index: usize, scheme: String },

    #[error("Duplicate ad URL found at index {index}: {url}")]
    DuplicateUrl { index: usize, url: String },

    #[error("Failed to read ad catalog file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse ad catalog file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Ordered list of ad URLs shown to users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdCatalog {
    /// Ad URLs; a user always sees the ad at `user_id mod len`.
    pub ads: Vec<String>,
}

impl AdCatalog {
    /// Creates a catalog from a list of URLs.
    #[must_use]
    pub const fn new(ads: Vec<String>) -> Self {
        Self { ads }
    }

    /// Loads the catalog from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AdCatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    /// Saves the catalog to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), AdCatalogError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates every ad, stopping at the first error.
    pub fn validate(&self) -> Result<(), AdCatalogError> {
        self.validate_all().into_iter().collect()
    }

    /// Returns one validation result per ad.
    #[must_use]
    pub fn validate_all(&self) -> Vec<Result<(), AdCatalogError>> {
        if self.ads.is_empty() {
            return vec![Err(AdCatalogError::NoAds)];
        }

        let mut seen = std::collections::HashSet::new();

        self.ads
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let url = Url::parse(raw).map_err(|reason| AdCatalogError::InvalidUrl {
                    index,
                    url: raw.clone(),
                    reason,
                })?;

                if !matches!(url.scheme(), "http" | "https") {
                    return Err(AdCatalogError::UnsupportedScheme {
                        index,
                        scheme: url.scheme().to_owned(),
                    });
                }

                if !seen.insert(raw.as_str()) {
                    return Err(AdCatalogError::DuplicateUrl {
                        index,
                        url: raw.clone(),
                    });
                }

                Ok(())
            })
            .collect()
    }

    /// Picks the ad shown to a user: `user_id mod len`.
    ///
    /// Returns `None` only for an empty catalog.
    #[must_use]
    pub fn select(&self, user_id: i64) -> Option<&str> {
        let len = i64::try_from(self.ads.len()).ok().filter(|&l| l > 0)?;
        let index = usize::try_from(user_id.rem_euclid(len)).ok()?;
        self.ads.get(index).map(String::as_str)
    }

    /// Returns the number of ads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ads.len()
    }

    /// Checks if there are no ads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }

    /// Creates an example catalog for users to reference.
    #[must_use]
    pub fn example() -> Self {
        Self {
            ads: vec![
                "https://your-ad-link-1.com".to_owned(),
                "https://your-ad-link-2.com".to_owned(),
                "https://your-ad-link-3.com".to_owned(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(urls: &[&str]) -> AdCatalog {
        AdCatalog::new(urls.iter().map(|u| (*u).to_owned()).collect())
    }

    #[test]
    fn test_select_is_user_id_mod_len() {
        let ads = catalog(&["https://a.com", "https://b.com", "https://c.com"]);
        assert_eq!(ads.select(7), Some("https://b.com"));
        assert_eq!(ads.select(7), Some("https://b.com"));
        assert_eq!(ads.select(9), Some("https://a.com"));
        assert_eq!(ads.select(11), Some("https://c.com"));
    }

    #[test]
    fn test_select_empty_catalog() {
        assert_eq!(catalog(&[]).select(7), None);
    }

    #[test]
    fn test_select_negative_id_stays_in_range() {
        let ads = catalog(&["https://a.com", "https://b.com", "https://c.com"]);
        assert_eq!(ads.select(-1), Some("https://c.com"));
    }

    #[test]
    fn test_example_is_valid() {
        let example = AdCatalog::example();
        assert_eq!(example.len(), 3);
        assert!(example.validate().is_ok());
    }

    #[test]
    fn test_validation_empty() {
        assert!(matches!(catalog(&[]).validate(), Err(AdCatalogError::NoAds)));
    }

    #[test]
    fn test_validation_invalid_url() {
        let ads = catalog(&["https://ok.com", "not a url"]);
        assert!(matches!(
            ads.validate(),
            Err(AdCatalogError::InvalidUrl { index: 1, .. })
        ));
    }

    #[test]
    fn test_validation_rejects_non_http_scheme() {
        let ads = catalog(&["ftp://files.example.com/ad"]);
        assert!(matches!(
            ads.validate(),
            Err(AdCatalogError::UnsupportedScheme { index: 0, .. })
        ));
    }

    #[test]
    fn test_validation_duplicate() {
        let ads = catalog(&["https://same.com", "https://same.com"]);
        assert!(matches!(
            ads.validate(),
            Err(AdCatalogError::DuplicateUrl { index: 1, .. })
        ));
    }

    #[test]
    fn test_validate_all_reports_each_ad() {
        let ads = catalog(&["https://ok.com", "bad", "https://ok.com"]);
        let results = ads.validate_all();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_err());
    }

    #[test]
    fn test_catalog_json_shape() {
        let parsed: AdCatalog =
            serde_json::from_str(r#"{"ads": ["https://a.com"]}"#).unwrap();
        assert_eq!(parsed, catalog(&["https://a.com"]));
    }
}
