//! OCR conversion: produce a searchable PDF with a hidden text layer.

mod convert;
mod engine;

pub use convert::{convert_to_searchable, ocr_output_path, Conversion};
pub use engine::TesseractEngine;

use crate::error::OcrError;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;
