//! Role-keyed selector cascades.
//!
//! Every lookup in the pipeline goes through one [`SelectorTable`]: a role
//! maps to an ordered list of CSS patterns, tried first to last. The built-in
//! table tracks the current results markup; a YAML file can replace the list
//! for any role without a rebuild when the markup shifts.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Semantic role of an element the pipeline needs to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// A search-result card in the listing.
    ResultCard,
    /// Looser card patterns tried when no `ResultCard` pattern matches.
    BroadCard,
    /// Container whose presence marks the page as loaded.
    RootContainer,
    /// Scrollable results list.
    Feed,
    Name,
    Phone,
    Address,
    Rating,
    Category,
    Hours,
    Status,
    Price,
    /// Generic text nodes scanned for a price hint when `Price` is absent.
    PriceText,
    Website,
    DetailPhone,
    DetailAddress,
}

impl FieldRole {
    pub const ALL: [FieldRole; 16] = [
        FieldRole::ResultCard,
        FieldRole::BroadCard,
        FieldRole::RootContainer,
        FieldRole::Feed,
        FieldRole::Name,
        FieldRole::Phone,
        FieldRole::Address,
        FieldRole::Rating,
        FieldRole::Category,
        FieldRole::Hours,
        FieldRole::Status,
        FieldRole::Price,
        FieldRole::PriceText,
        FieldRole::Website,
        FieldRole::DetailPhone,
        FieldRole::DetailAddress,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldRole::ResultCard => "result_card",
            FieldRole::BroadCard => "broad_card",
            FieldRole::RootContainer => "root_container",
            FieldRole::Feed => "feed",
            FieldRole::Name => "name",
            FieldRole::Phone => "phone",
            FieldRole::Address => "address",
            FieldRole::Rating => "rating",
            FieldRole::Category => "category",
            FieldRole::Hours => "hours",
            FieldRole::Status => "status",
            FieldRole::Price => "price",
            FieldRole::PriceText => "price_text",
            FieldRole::Website => "website",
            FieldRole::DetailPhone => "detail_phone",
            FieldRole::DetailAddress => "detail_address",
        }
    }

    fn default_patterns(self) -> &'static [&'static str] {
        match self {
            FieldRole::ResultCard => &[
                "[data-result-index]",
                "[jsaction*='pane.resultSection.click']",
                "[role='article']",
                ".Nv2PK",
                ".THOPZb",
                ".lI9IFe",
                ".VkpGBb",
                ".Nv2PK.THOPZb",
                ".lI9IFe.THOPZb",
            ],
            FieldRole::BroadCard => &[
                "[data-value='Business name']",
                ".fontHeadlineSmall",
                ".qBF1Pd",
                ".qBF1Pd.fontHeadlineSmall",
                "[role='button'][jsaction*='pane']",
                ".fontHeadlineSmall[role='button']",
                ".qBF1Pd[role='button']",
            ],
            FieldRole::RootContainer => &["[role='main']"],
            FieldRole::Feed => &["[role='feed']"],
            FieldRole::Name => &[
                "[data-value='Business name']",
                "h3",
                "h2",
                "[role='heading']",
                ".fontHeadlineSmall",
                ".qBF1Pd",
                ".fontDisplayLarge",
                ".fontHeadlineMedium",
            ],
            FieldRole::Phone => &[
                "[data-item-id^='phone']",
                "button[aria-label*='Telefon:']",
                "button[aria-label*='Phone:']",
                "a[href^='tel:']",
                ".Io6YTe.fontBodyMedium",
            ],
            FieldRole::Address => &[
                "[data-item-id='address']",
                "button[aria-label*='Adres:']",
                "button[aria-label*='Address:']",
                ".Io6YTe.fontBodyMedium",
            ],
            FieldRole::Rating => &[
                "[role='img']",
                "[aria-label*='star']",
                "[aria-label*='yıldız']",
                ".fontDisplayMedium",
                ".fontBodySmall",
                "[data-value*='rating']",
            ],
            FieldRole::Category => &["[data-value='Category']"],
            FieldRole::Hours => &["[data-item-id='oh']"],
            FieldRole::Status => &["[data-value='Open hours status']"],
            FieldRole::Price => &["[data-value='Price']"],
            FieldRole::PriceText => &[".fontBodyMedium", ".fontBodySmall"],
            FieldRole::Website => &["[data-item-id='authority']"],
            FieldRole::DetailPhone => &[
                "[data-item-id^='phone']",
                "button[aria-label*='Telefon:']",
                "button[aria-label*='Phone:']",
            ],
            FieldRole::DetailAddress => &[
                "[data-item-id='address']",
                "button[aria-label*='Adres:']",
                "button[aria-label*='Address:']",
            ],
        }
    }
}

impl std::fmt::Display for FieldRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered selector patterns per role. Read-only once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorTable {
    selectors: BTreeMap<FieldRole, Vec<String>>,
}

impl Default for SelectorTable {
    fn default() -> Self {
        let selectors = FieldRole::ALL
            .iter()
            .map(|role| {
                let patterns = role
                    .default_patterns()
                    .iter()
                    .map(|p| (*p).to_string())
                    .collect();
                (*role, patterns)
            })
            .collect();
        Self { selectors }
    }
}

impl SelectorTable {
    /// Patterns for `role` in priority order. Empty only for a table built
    /// by hand that skipped validation.
    #[must_use]
    pub fn patterns(&self, role: FieldRole) -> &[String] {
        self.selectors.get(&role).map_or(&[], Vec::as_slice)
    }

    /// Replaces the pattern list for each role present in `overrides`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSelectorTable`] if the merged table has a
    /// role with no patterns or a blank pattern.
    pub fn with_overrides(
        mut self,
        overrides: BTreeMap<FieldRole, Vec<String>>,
    ) -> Result<Self, ConfigError> {
        for (role, patterns) in overrides {
            let trimmed = patterns
                .into_iter()
                .map(|p| p.trim().to_string())
                .collect();
            self.selectors.insert(role, trimmed);
        }
        self.validate()?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSelectorTable`] naming the first role
    /// that has no patterns or a blank pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for role in FieldRole::ALL {
            let patterns = self.patterns(role);
            if patterns.is_empty() {
                return Err(ConfigError::InvalidSelectorTable(format!(
                    "role '{role}' has no patterns"
                )));
            }
            if patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidSelectorTable(format!(
                    "role '{role}' contains a blank pattern"
                )));
            }
        }
        Ok(())
    }

    /// Renders the table in the same shape the override file uses.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_yaml` error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[derive(Debug, Deserialize)]
struct SelectorsFile {
    #[serde(default)]
    selectors: BTreeMap<FieldRole, Vec<String>>,
}

/// Builds the effective selector table: built-in defaults, with any roles
/// listed in the YAML file at `path` replaced.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or yields an
/// invalid table.
pub fn load_selector_table(path: Option<&Path>) -> Result<SelectorTable, ConfigError> {
    let Some(path) = path else {
        return Ok(SelectorTable::default());
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SelectorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_selector_overrides(&content)
}

fn parse_selector_overrides(content: &str) -> Result<SelectorTable, ConfigError> {
    let file: SelectorsFile =
        serde_yaml::from_str(content).map_err(ConfigError::SelectorsFileParse)?;
    SelectorTable::default().with_overrides(file.selectors)
}

#[cfg(test)]
#[path = "selectors_test.rs"]
mod tests;
