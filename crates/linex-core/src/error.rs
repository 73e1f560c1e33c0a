//! Error types for the linex-core library.

use thiserror::Error;

/// Main error type for the linex library.
#[derive(Error, Debug)]
pub enum LinexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Line-item extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to decode a page content stream.
    #[error("failed to decode content stream: {0}")]
    ContentStream(String),

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The first page carries no embedded raster image to OCR.
    #[error("page has no embedded image to rasterize")]
    NoPageImage,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR binary could not be spawned.
    #[error("OCR engine not found (is tesseract installed and on PATH?): {0}")]
    EngineNotFound(String),

    /// The OCR engine ran but failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Preparing the input image failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),
}

/// Errors related to line-item extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Neither extraction strategy produced any records.
    #[error("no line-item data found")]
    NoData,
}

/// Result type for the linex library.
pub type Result<T> = std::result::Result<T, LinexError>;
