use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Placeholder in [`SourceConfig::search_url_template`] replaced by the
/// URL-encoded search term.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// CSS selectors locating the parts of one product tile on a search page.
///
/// Each value may be a selector list (`".product-pod--default, .product-pod"`);
/// the first matching element wins for the per-item selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    /// One element per product on the results page.
    pub container: String,
    /// Anchor carrying the product name and `href`.
    pub title: String,
    pub price: String,
    pub delivery: String,
}

/// One store the pipeline can search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Stable store identifier written to every listing, e.g. `"Home Depot"`.
    pub name: String,
    /// Scheme + host used to absolutize relative product links.
    pub base_url: String,
    /// Search page URL containing [`QUERY_PLACEHOLDER`].
    pub search_url_template: String,
    pub selectors: SelectorSet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

/// Load and validate the source catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

/// Parse and validate a source catalog from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sources(content: &str) -> Result<SourcesFile, ConfigError> {
    let sources_file: SourcesFile = serde_yaml::from_str(content)?;
    validate_sources(&sources_file)?;
    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        if !(source.base_url.starts_with("http://") || source.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has base_url '{}'; must start with http:// or https://",
                source.name, source.base_url
            )));
        }

        if !source.search_url_template.contains(QUERY_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "source '{}' search_url_template is missing the {QUERY_PLACEHOLDER} placeholder",
                source.name
            )));
        }

        let selectors = [
            ("container", &source.selectors.container),
            ("title", &source.selectors.title),
            ("price", &source.selectors.price),
            ("delivery", &source.selectors.delivery),
        ];
        for (field, selector) in selectors {
            if selector.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has an empty {field} selector",
                    source.name
                )));
            }
        }
    }

    Ok(())
}
