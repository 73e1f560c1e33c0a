//! PDF processing module.

mod content;
mod extractor;

pub use content::{PageContent, Ruling, Word};
pub use extractor::PdfExtractor;

use std::path::Path;
use tracing::debug;

use crate::error::PdfError;
use crate::models::config::LinexConfig;

/// Searchability classification of an input PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Searchability {
    /// First page carries enough embedded text; no OCR needed.
    Searchable,
    /// Little or no embedded text; the page needs OCR.
    NeedsOcr,
    /// Filename carries the OCR marker; the file is our own output.
    AlreadyProcessed,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Classify a PDF as searchable, needing OCR, or already processed.
///
/// Read failures classify as `NeedsOcr` (fail open toward OCR); the marker
/// check runs first so OCR output is never re-processed.
pub fn searchability(path: &Path, config: &LinexConfig) -> Searchability {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if filename.contains(&config.ocr.marker) {
        debug!("{}: filename carries the OCR marker, skipping", filename);
        return Searchability::AlreadyProcessed;
    }

    let text = std::fs::read(path)
        .map_err(|e| PdfError::Parse(e.to_string()))
        .and_then(|data| {
            let mut extractor = PdfExtractor::new();
            extractor.load(&data)?;
            extractor.extract_page_text(1)
        });

    match text {
        Ok(text) if text.trim().len() > config.pdf.min_text_length => {
            debug!("{}: {} chars of embedded text, searchable", filename, text.trim().len());
            Searchability::Searchable
        }
        Ok(_) => Searchability::NeedsOcr,
        Err(e) => {
            debug!("{}: read failed ({}), assuming unsearchable", filename, e);
            Searchability::NeedsOcr
        }
    }
}

#[cfg(test)]
pub(crate) mod testdoc {
    //! Minimal in-memory PDFs for tests.

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with one page per entry; each entry's lines become
    /// `Tj` runs on that page. An empty entry produces a text-free page.
    pub(crate) fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("TL", vec![14.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
            ];
            for line in text.lines() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content stream"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("serialize pdf");
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_heavy_pdf_is_searchable() {
        let body: String = (0..10)
            .map(|i| format!("Concrete Pump Rental line {} $425.00\n", i))
            .collect();
        let data = testdoc::pdf_with_pages(&[&body]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Rinker_4417.pdf");
        std::fs::write(&path, data).unwrap();

        let config = LinexConfig::default();
        assert_eq!(searchability(&path, &config), Searchability::Searchable);
    }

    #[test]
    fn test_scanned_first_page_needs_ocr_despite_later_text() {
        // Page 1 carries no text at all; page 2 is text-heavy. The page-2
        // text must not count toward page 1's searchability.
        let page_two: String = (0..40)
            .map(|i| format!("Terms and conditions clause {}\n", i))
            .collect();
        let data = testdoc::pdf_with_pages(&["", &page_two]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foley_11.pdf");
        std::fs::write(&path, data).unwrap();

        let config = LinexConfig::default();
        assert_eq!(searchability(&path, &config), Searchability::NeedsOcr);
    }
}
