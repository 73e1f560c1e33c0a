//! Structural table extraction from ruling-line grids.
//!
//! Mirrors a line-based table finder: vertical and horizontal rulings are
//! clustered into column and row boundaries with a snap tolerance, words are
//! binned into the resulting cells, and the price column is picked by
//! scanning right-to-left for the first column where more than half of the
//! data cells look currency-like. Invoices reliably place price/total as the
//! last meaningful column, so the right-to-left scan avoids quantity or SKU
//! columns that also contain digits.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use super::ExtractionStrategy;
use crate::models::config::{ExtractionConfig, VendorProfile};
use crate::models::record::LineItem;
use crate::pdf::{PageContent, Word};

lazy_static! {
    /// A cell "looks like" a price when it contains a digit or `$`.
    static ref CURRENCY_LIKE: Regex = Regex::new(r"[0-9$]").unwrap();
}

/// Structural table detection (primary strategy).
pub struct TableStrategy;

impl ExtractionStrategy for TableStrategy {
    fn name(&self) -> &'static str {
        "table"
    }

    fn extract(
        &self,
        page: &PageContent,
        _page_text: &str,
        profile: Option<&VendorProfile>,
        config: &ExtractionConfig,
    ) -> Vec<LineItem> {
        let cropped;
        let page = match profile.and_then(|p| p.crop.as_ref()) {
            Some(region) => {
                cropped = page.crop(region);
                &cropped
            }
            None => page,
        };

        let Some(rows) = build_grid(page, config.snap_tolerance) else {
            debug!("no table grid found");
            return Vec::new();
        };

        if rows.len() < 2 {
            debug!("table has no data rows");
            return Vec::new();
        }

        // First row is the header.
        let data_rows = &rows[1..];

        let Some(price_col) = find_price_column(data_rows, config.currency_threshold) else {
            debug!("no price column found in {}-column table", rows[0].len());
            return Vec::new();
        };

        if price_col == 0 {
            // There is no column to the left to act as the description;
            // treating the price column as its own description would emit
            // garbage records, so let the fallback strategy handle the page.
            warn!("price column is the leftmost column, ignoring table");
            return Vec::new();
        }
        let desc_col = price_col - 1;

        data_rows
            .iter()
            .filter(|row| is_currency_like(row[price_col].as_deref()))
            .filter_map(|row| {
                let description = row[desc_col]
                    .as_deref()
                    .unwrap_or("")
                    .replace('\n', " ");
                let price = row[price_col].as_deref().unwrap_or("");
                LineItem::new(&description, price, config.min_description_len)
            })
            .collect()
    }
}

fn is_currency_like(cell: Option<&str>) -> bool {
    cell.map(|c| CURRENCY_LIKE.is_match(c)).unwrap_or(false)
}

/// Scan columns right-to-left; the first column where the currency-like
/// fraction (empty cells count against it) exceeds the threshold is the
/// price column.
fn find_price_column(rows: &[Vec<Option<String>>], threshold: f32) -> Option<usize> {
    let num_cols = rows.first().map(|r| r.len()).unwrap_or(0);

    for col in (0..num_cols).rev() {
        let matches = rows
            .iter()
            .filter(|row| is_currency_like(row[col].as_deref()))
            .count();
        if matches as f32 / rows.len() as f32 > threshold {
            return Some(col);
        }
    }

    None
}

/// Cluster ruling coordinates into grid boundaries and bin words into cells.
///
/// Returns rows of cells (top-to-bottom, left-to-right), or `None` when the
/// rulings do not form at least a one-column, two-row grid.
fn build_grid(page: &PageContent, snap_tolerance: f32) -> Option<Vec<Vec<Option<String>>>> {
    let xs: Vec<f32> = page
        .rulings
        .iter()
        .filter(|r| r.is_vertical())
        .map(|r| (r.x0 + r.x1) / 2.0)
        .collect();
    let tops: Vec<f32> = page
        .rulings
        .iter()
        .filter(|r| r.is_horizontal())
        .map(|r| (r.top0 + r.top1) / 2.0)
        .collect();

    let col_edges = cluster(xs, snap_tolerance);
    let row_edges = cluster(tops, snap_tolerance);

    if col_edges.len() < 2 || row_edges.len() < 3 {
        return None;
    }

    let num_cols = col_edges.len() - 1;
    let num_rows = row_edges.len() - 1;
    debug!("table grid: {} rows x {} cols", num_rows, num_cols);

    let mut cells: Vec<Vec<Vec<&Word>>> = vec![vec![Vec::new(); num_cols]; num_rows];
    for word in &page.words {
        let (Some(row), Some(col)) = (bin(word.top, &row_edges), bin(word.x, &col_edges)) else {
            continue;
        };
        cells[row][col].push(word);
    }

    let rows = cells
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect();
    Some(rows)
}

/// Cluster sorted coordinates: values within the tolerance of the previous
/// value join its cluster; each cluster is replaced by its mean.
fn cluster(mut values: Vec<f32>, tolerance: f32) -> Vec<f32> {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut clusters: Vec<Vec<f32>> = Vec::new();
    for v in values {
        match clusters.last_mut() {
            Some(cluster) if v - cluster[cluster.len() - 1] <= tolerance => cluster.push(v),
            _ => clusters.push(vec![v]),
        }
    }

    clusters
        .into_iter()
        .map(|c| c.iter().sum::<f32>() / c.len() as f32)
        .collect()
}

/// Index of the interval containing `value`, if any.
fn bin(value: f32, edges: &[f32]) -> Option<usize> {
    edges
        .windows(2)
        .position(|pair| value >= pair[0] && value <= pair[1])
}

/// Join a cell's words: left-to-right within a baseline, `\n` between
/// baselines.
fn cell_text(mut words: Vec<&Word>) -> Option<String> {
    if words.is_empty() {
        return None;
    }

    words.sort_by(|a, b| {
        a.top
            .partial_cmp(&b.top)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Vec<&Word>> = Vec::new();
    for word in words {
        match lines.last_mut() {
            Some(line) if (word.top - line[0].top).abs() <= 2.0 => line.push(word),
            _ => lines.push(vec![word]),
        }
    }

    let text = lines
        .iter()
        .map(|line| {
            line.iter()
                .map(|w| w.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n");

    Some(text)
}
