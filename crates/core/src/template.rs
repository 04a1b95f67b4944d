//! Catalog entries.

use serde::{Deserialize, Serialize};

use crate::types::{Price, TemplateId};

/// A catalog entry pairing a background image with descriptive metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    /// Background image reference (URL or `data:` URL).
    pub image: String,
    pub category: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

impl Template {
    /// Price charged when this template is purchased.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.price.unwrap_or_else(Price::default_postcard)
    }

    /// Lower-cased name with whitespace runs collapsed to `-`, for file names.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Case-insensitive match against name and description.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}
