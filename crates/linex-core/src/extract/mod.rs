//! Line-item extraction from a single invoice page.
//!
//! Strategies form an ordered list and are tried until one yields records:
//! structural table detection first, then the regex fallback over plain
//! text. The first non-empty result wins; later strategies never run once
//! one has succeeded.

mod table;
mod textline;
pub mod vendor;

pub use table::TableStrategy;
pub use textline::TextLineStrategy;

use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::{ExtractionConfig, VendorProfile};
use crate::models::record::{Extraction, LineItem};
use crate::pdf::PageContent;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A single extraction strategy. Returns an empty vector when the strategy
/// does not apply; errors are not part of the contract, failure is "empty".
pub trait ExtractionStrategy {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Attempt extraction from one page.
    fn extract(
        &self,
        page: &PageContent,
        page_text: &str,
        profile: Option<&VendorProfile>,
        config: &ExtractionConfig,
    ) -> Vec<LineItem>;
}

/// Default strategy order: table detection, then regex text search.
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![Box::new(TableStrategy), Box::new(TextLineStrategy)]
}

/// Run the strategy list in order and keep the first non-empty result.
pub fn extract_line_items(
    page: &PageContent,
    page_text: &str,
    vendor: &str,
    profile: Option<&VendorProfile>,
    config: &ExtractionConfig,
) -> Result<Extraction> {
    for strategy in default_strategies() {
        debug!("trying {} strategy", strategy.name());
        let items = strategy.extract(page, page_text, profile, config);
        if !items.is_empty() {
            info!(
                "{} strategy extracted {} items for vendor {}",
                strategy.name(),
                items.len(),
                vendor
            );
            return Ok(Extraction {
                vendor: vendor.to_string(),
                strategy: strategy.name(),
                items,
            });
        }
    }

    Err(ExtractionError::NoData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{Ruling, Word};
    use pretty_assertions::assert_eq;

    fn word(x: f32, top: f32, text: &str) -> Word {
        Word {
            x,
            top,
            text: text.to_string(),
        }
    }

    fn hline(top: f32, x0: f32, x1: f32) -> Ruling {
        Ruling {
            x0,
            top0: top,
            x1,
            top1: top,
        }
    }

    fn vline(x: f32, top0: f32, top1: f32) -> Ruling {
        Ruling {
            x0: x,
            top0,
            x1: x,
            top1,
        }
    }

    /// A two-column table (description, total) with two data rows.
    fn table_page() -> PageContent {
        let rulings = vec![
            hline(100.0, 50.0, 400.0),
            hline(130.0, 50.0, 400.0),
            hline(160.0, 50.0, 400.0),
            hline(190.0, 50.0, 400.0),
            vline(50.0, 100.0, 190.0),
            vline(300.0, 100.0, 190.0),
            vline(400.0, 100.0, 190.0),
        ];

        PageContent {
            width: 612.0,
            height: 792.0,
            words: vec![
                word(60.0, 110.0, "Description"),
                word(310.0, 110.0, "Total"),
                word(60.0, 140.0, "Concrete Pump Rental"),
                word(310.0, 140.0, "$425.00"),
                word(60.0, 170.0, "Crane Service"),
                word(310.0, 170.0, "$1,200.00"),
            ],
            rulings,
        }
    }

    #[test]
    fn test_table_strategy_takes_precedence() {
        // Page text that would also satisfy the regex fallback; the table
        // result must win.
        let page = table_page();
        let text = "Something Completely Different $999.99";
        let config = ExtractionConfig::default();

        let extraction = extract_line_items(&page, text, "Rinker", None, &config).unwrap();

        assert_eq!(extraction.strategy, "table");
        assert_eq!(extraction.items.len(), 2);
        assert_eq!(extraction.items[0].description, "Concrete Pump Rental");
        assert_eq!(extraction.items[0].total_price, "$425.00");
    }

    #[test]
    fn test_fallback_runs_when_no_table() {
        let page = PageContent {
            width: 612.0,
            height: 792.0,
            words: vec![],
            rulings: vec![],
        };
        let text = "Concrete Pump Rental 4 hrs $425.00";
        let config = ExtractionConfig::default();

        let extraction = extract_line_items(&page, text, "Foley", None, &config).unwrap();

        assert_eq!(extraction.strategy, "text");
        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].description, "Concrete Pump Rental 4 hrs");
    }

    #[test]
    fn test_no_data_when_both_strategies_fail() {
        let page = PageContent::default();
        let config = ExtractionConfig::default();

        let result = extract_line_items(&page, "nothing useful here", "Acme", None, &config);
        assert!(matches!(result, Err(ExtractionError::NoData)));
    }
}
