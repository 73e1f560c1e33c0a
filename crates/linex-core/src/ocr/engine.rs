//! Tesseract subprocess wrapper.

use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace};

use super::Result;
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Invokes the external `tesseract` binary to OCR a page image into a PDF
/// with an invisible text layer.
pub struct TesseractEngine {
    binary: String,
    language: String,
    dpi: u32,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig, dpi: u32) -> Self {
        Self {
            binary: config.binary.clone(),
            language: config.language.clone(),
            dpi,
        }
    }

    /// Run OCR on a page image, returning the bytes of a searchable PDF.
    ///
    /// The image goes through a scratch PNG in a temporary directory; the
    /// directory and its contents are removed when this returns.
    pub fn image_to_pdf(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let scratch = tempfile::tempdir()
            .map_err(|e| OcrError::Preprocessing(format!("scratch dir: {}", e)))?;

        let input_path = scratch.path().join("page.png");
        image
            .save(&input_path)
            .map_err(|e| OcrError::Preprocessing(format!("write page image: {}", e)))?;

        // tesseract <input> <outbase> -l <lang> --dpi <dpi> pdf
        let output_base = scratch.path().join("ocr_output");
        trace!(
            "running {} {} -l {} --dpi {} pdf",
            self.binary,
            input_path.display(),
            self.language,
            self.dpi
        );

        let output = Command::new(&self.binary)
            .arg(&input_path)
            .arg(&output_base)
            .arg("-l")
            .arg(&self.language)
            .arg("--dpi")
            .arg(self.dpi.to_string())
            .arg("pdf")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OcrError::EngineNotFound(self.binary.clone())
                } else {
                    OcrError::Recognition(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let pdf_path = output_base.with_extension("pdf");
        let data = std::fs::read(&pdf_path)
            .map_err(|e| OcrError::Recognition(format!("missing OCR output: {}", e)))?;

        debug!("OCR produced {} bytes of searchable PDF", data.len());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_distinct_error() {
        let config = OcrConfig {
            binary: "definitely-not-a-real-ocr-binary".to_string(),
            ..OcrConfig::default()
        };
        let engine = TesseractEngine::new(&config, 300);
        let image = DynamicImage::new_rgb8(4, 4);

        match engine.image_to_pdf(&image) {
            Err(OcrError::EngineNotFound(name)) => {
                assert_eq!(name, "definitely-not-a-real-ocr-binary");
            }
            other => panic!("expected EngineNotFound, got {:?}", other.map(|d| d.len())),
        }
    }
}
