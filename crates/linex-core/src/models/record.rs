//! Extraction records produced by the line-item strategies.

use serde::{Deserialize, Serialize};

/// A single extracted line item: description plus total price.
///
/// Records are immutable once constructed and preserve the order in which
/// they appeared on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Normalized item description.
    pub description: String,

    /// Price text, e.g. `$425.00` or `$1,234.56`.
    pub total_price: String,
}

impl LineItem {
    /// Build a record, rejecting descriptions at or below the minimum length.
    pub fn new(description: &str, total_price: &str, min_description_len: usize) -> Option<Self> {
        let description = description.trim();
        if description.chars().count() <= min_description_len {
            return None;
        }

        Some(Self {
            description: description.to_string(),
            total_price: total_price.trim().to_string(),
        })
    }
}

/// The outcome of extracting one invoice page.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// Vendor identity derived from the filename.
    pub vendor: String,

    /// Name of the strategy that produced the records.
    pub strategy: &'static str,

    /// Extracted records, in order of appearance.
    pub items: Vec<LineItem>,
}
