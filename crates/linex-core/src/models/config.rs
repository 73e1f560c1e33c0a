//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the linex pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinexConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Line-item extraction configuration.
    pub extraction: ExtractionConfig,

    /// Known vendor profiles, matched against input filenames.
    pub vendors: Vec<VendorProfile>,
}

impl Default for LinexConfig {
    fn default() -> Self {
        Self {
            pdf: PdfConfig::default(),
            ocr: OcrConfig::default(),
            extraction: ExtractionConfig::default(),
            vendors: VendorProfile::defaults(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum stripped text length on page one to consider a PDF searchable.
    pub min_text_length: usize,

    /// Target DPI when rasterizing a page for OCR.
    pub render_dpi: u32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 100,
            render_dpi: 300,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Name or path of the tesseract binary.
    pub binary: String,

    /// Recognition language passed to tesseract.
    pub language: String,

    /// Filename marker carried by OCR output files. Inputs whose name
    /// already contains the marker are never re-processed.
    pub marker: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            marker: "_OCR_Layer".to_string(),
        }
    }
}

/// Line-item extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Snap tolerance (points) when clustering ruling lines into a grid.
    pub snap_tolerance: f32,

    /// Fraction of currency-like cells a column needs to be the price column.
    pub currency_threshold: f32,

    /// Descriptions must be longer than this many characters.
    pub min_description_len: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 7.0,
            currency_threshold: 0.5,
            min_description_len: 5,
        }
    }
}

/// A rectangular page region in top-based coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl CropRegion {
    /// Check whether a point lies inside the region.
    pub fn contains(&self, x: f32, top: f32) -> bool {
        x >= self.x0 && x <= self.x1 && top >= self.top && top <= self.bottom
    }
}

/// Per-vendor extraction settings, matched against input filenames.
///
/// New vendors are added by data (config file), not code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorProfile {
    /// Vendor name used in reports.
    pub name: String,

    /// Filename substrings that identify this vendor.
    pub match_tokens: Vec<String>,

    /// Page region the line-item table is known to occupy, if any.
    #[serde(default)]
    pub crop: Option<CropRegion>,
}

impl VendorProfile {
    /// Built-in profiles for vendors with known layouts.
    pub fn defaults() -> Vec<Self> {
        let table_area = CropRegion {
            x0: 20.0,
            top: 250.0,
            x1: 590.0,
            bottom: 780.0,
        };

        vec![
            Self {
                name: "Rinker".to_string(),
                match_tokens: vec!["Haskins Inc".to_string(), "Rinker".to_string()],
                crop: Some(table_area),
            },
            Self {
                name: "Foley".to_string(),
                match_tokens: vec!["Foley".to_string()],
                crop: Some(table_area),
            },
        ]
    }
}

impl LinexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_roundtrip() {
        let config = LinexConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: LinexConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.pdf.min_text_length, 100);
        assert_eq!(parsed.pdf.render_dpi, 300);
        assert_eq!(parsed.ocr.marker, "_OCR_Layer");
        assert_eq!(parsed.vendors.len(), 2);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: LinexConfig =
            serde_json::from_str(r#"{"ocr": {"language": "deu"}}"#).unwrap();

        assert_eq!(parsed.ocr.language, "deu");
        assert_eq!(parsed.ocr.binary, "tesseract");
        assert_eq!(parsed.extraction.snap_tolerance, 7.0);
    }

    #[test]
    fn test_crop_region_contains() {
        let crop = CropRegion {
            x0: 20.0,
            top: 250.0,
            x1: 590.0,
            bottom: 780.0,
        };

        assert!(crop.contains(100.0, 300.0));
        assert!(!crop.contains(10.0, 300.0));
        assert!(!crop.contains(100.0, 100.0));
    }
}
