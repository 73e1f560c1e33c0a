//! Searchable-PDF conversion for unsearchable inputs.

use std::path::{Path, PathBuf};

use tracing::info;

use super::TesseractEngine;
use crate::error::Result;
use crate::models::config::LinexConfig;
use crate::pdf::{self, PdfExtractor, Searchability};

/// Outcome of a conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// The input already carries enough embedded text; returned unchanged.
    AlreadySearchable(PathBuf),
    /// OCR ran and wrote a new searchable PDF at this path.
    Converted(PathBuf),
    /// The input is a previous OCR output; nothing to do.
    Skipped,
}

impl Conversion {
    /// Path to use for downstream extraction, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Conversion::AlreadySearchable(p) | Conversion::Converted(p) => Some(p),
            Conversion::Skipped => None,
        }
    }
}

/// Output path for an OCR conversion: `<stem><marker>.pdf` next to the input.
pub fn ocr_output_path(input: &Path, marker: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}{}.pdf", stem, marker))
}

/// Check a PDF's searchability and, when needed, OCR its first page into a
/// new PDF with an invisible text layer.
///
/// The output is written in a single whole-buffer write. Inputs that already
/// carry the OCR marker are skipped so conversion never loops on its own
/// output.
pub fn convert_to_searchable(path: &Path, config: &LinexConfig) -> Result<Conversion> {
    match pdf::searchability(path, config) {
        Searchability::AlreadyProcessed => {
            info!("{}: already processed, skipping", path.display());
            Ok(Conversion::Skipped)
        }
        Searchability::Searchable => {
            info!("{}: appears searchable, skipping OCR", path.display());
            Ok(Conversion::AlreadySearchable(path.to_path_buf()))
        }
        Searchability::NeedsOcr => {
            info!("{}: unsearchable, running OCR on page 1", path.display());

            let data = std::fs::read(path)?;
            let mut extractor = PdfExtractor::new();
            extractor.load(&data)?;
            let image = extractor.first_page_image(config.pdf.render_dpi)?;

            let engine = TesseractEngine::new(&config.ocr, config.pdf.render_dpi);
            let pdf_bytes = engine.image_to_pdf(&image)?;

            let output = ocr_output_path(path, &config.ocr.marker);
            std::fs::write(&output, pdf_bytes)?;

            info!("{}: searchable PDF written", output.display());
            Ok(Conversion::Converted(output))
        }
    }
}
