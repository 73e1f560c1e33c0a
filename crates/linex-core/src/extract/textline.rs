//! Regex fallback: text lines ending in a dollar price.

use lazy_static::lazy_static;
use regex::Regex;

use super::ExtractionStrategy;
use crate::models::config::{ExtractionConfig, VendorProfile};
use crate::models::record::LineItem;
use crate::pdf::PageContent;

lazy_static! {
    /// A description, optional junk tokens, then a `$`-prefixed price with
    /// thousands/decimal formatting anchored at end of line. The description
    /// capture is greedy so trailing words stay with the description; any
    /// quantity or unit-price fragment that leaks into it is stripped
    /// afterwards.
    static ref PRICE_LINE: Regex = Regex::new(
        r"(?mi)(.{10,})\s+(?:\S+\s+){0,5}\$(\d{1,3}(?:,\d{3})*\.\d{2})\s*$"
    ).unwrap();

    /// Trailing numeric/punctuation fragment at the end of a description.
    static ref TRAILING_FRAGMENT: Regex = Regex::new(r"\s+[\d,.]{1,10}\s*$").unwrap();
}

/// Regex-based text search (fallback strategy).
pub struct TextLineStrategy;

impl ExtractionStrategy for TextLineStrategy {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extract(
        &self,
        _page: &PageContent,
        page_text: &str,
        _profile: Option<&VendorProfile>,
        config: &ExtractionConfig,
    ) -> Vec<LineItem> {
        // Trim lines and drop blank ones so the end-of-line anchor lands
        // right after the price.
        let cleaned = page_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        PRICE_LINE
            .captures_iter(&cleaned)
            .filter_map(|caps| {
                let description = TRAILING_FRAGMENT.replace(&caps[1], "");
                let price = format!("${}", &caps[2]);
                LineItem::new(&description, &price, config.min_description_len)
            })
            .collect()
    }
}
