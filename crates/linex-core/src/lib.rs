//! Core library for invoice line-item extraction.
//!
//! This crate provides:
//! - PDF inspection (searchability check, text and page-content extraction)
//! - OCR conversion (searchable PDF with a hidden text layer via Tesseract)
//! - Line-item extraction (table-grid detection with a regex fallback)
//! - Markdown report rendering

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod report;

pub use error::{ExtractionError, LinexError, OcrError, PdfError, Result};
pub use extract::{extract_line_items, ExtractionStrategy, TableStrategy, TextLineStrategy};
pub use extract::vendor::vendor_for_file;
pub use models::config::{CropRegion, ExtractionConfig, LinexConfig, OcrConfig, PdfConfig, VendorProfile};
pub use models::record::{Extraction, LineItem};
pub use ocr::{convert_to_searchable, Conversion, TesseractEngine};
pub use pdf::{PageContent, PdfExtractor, Ruling, Searchability, Word};
