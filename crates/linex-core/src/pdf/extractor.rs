//! PDF loading, text extraction, and first-page rasterization.
//!
//! Structure access goes through `lopdf`; plain text through `pdf-extract`.
//! Rasterization extracts the page's embedded scan image: scanned invoices
//! carry the whole page as a single raster XObject, so pulling the largest
//! embedded image is equivalent to rendering the page.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::content::{self, PageContent};
use super::Result;
use crate::error::PdfError;

const POINTS_PER_INCH: f32 = 72.0;

/// PDF content extractor.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF from bytes.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("loaded PDF with {} pages", doc.get_pages().len());
        self.raw_data = data.to_vec();
        self.document = Some(doc);
        Ok(())
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    pub fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Extract text from the entire PDF.
    pub fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Extract text from a specific page (1-indexed). Text is attributed
    /// page-accurately; a text-free page yields an empty string even when
    /// later pages carry text.
    pub fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        let text = doc
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()));

        match text {
            Ok(t) if !t.trim().is_empty() => Ok(t),
            other => {
                // Single-page documents can fall back to the richer
                // whole-document extractor for fonts lopdf cannot decode.
                if self.page_count() == 1 {
                    self.extract_text()
                } else {
                    other
                }
            }
        }
    }

    /// Positioned words and ruling lines of the first page.
    pub fn first_page_content(&self) -> Result<PageContent> {
        let doc = self.document()?;
        let page_id = self.first_page_id()?;
        let (width, height) = page_dimensions(doc, page_id);

        let data = doc
            .get_page_content(page_id)
            .map_err(|e| PdfError::ContentStream(e.to_string()))?;
        let decoded = lopdf::content::Content::decode(&data)
            .map_err(|e| PdfError::ContentStream(e.to_string()))?;

        let page = content::walk(&decoded, width, height);
        debug!(
            "page 1: {} words, {} rulings ({}x{} pts)",
            page.words.len(),
            page.rulings.len(),
            width,
            height
        );
        Ok(page)
    }

    /// Rasterize the first page at the given DPI by extracting its largest
    /// embedded image and scaling it to the target resolution.
    pub fn first_page_image(&self, dpi: u32) -> Result<DynamicImage> {
        let doc = self.document()?;
        let page_id = self.first_page_id()?;
        let (page_width, _) = page_dimensions(doc, page_id);

        let mut largest: Option<DynamicImage> = None;
        for object in doc.objects.values() {
            if let Some(img) = try_extract_image(doc, object) {
                let keep = largest
                    .as_ref()
                    .map(|best| img.width() * img.height() > best.width() * best.height())
                    .unwrap_or(true);
                if keep {
                    largest = Some(img);
                }
            }
        }

        let image = largest.ok_or(PdfError::NoPageImage)?;

        // Scale so the raster width matches the requested DPI for the page.
        let target_width = (page_width / POINTS_PER_INCH * dpi as f32).round() as u32;
        let ratio = target_width as f32 / image.width() as f32;
        if !(0.95..=1.05).contains(&ratio) {
            let target_height =
                (image.height() as f32 * ratio).round().max(1.0) as u32;
            debug!(
                "scaling page image {}x{} -> {}x{} for {} DPI",
                image.width(),
                image.height(),
                target_width,
                target_height,
                dpi
            );
            return Ok(image.resize_exact(
                target_width.max(1),
                target_height,
                image::imageops::FilterType::Triangle,
            ));
        }

        Ok(image)
    }

    fn first_page_id(&self) -> Result<ObjectId> {
        let doc = self.document()?;
        doc.get_pages()
            .values()
            .next()
            .copied()
            .ok_or(PdfError::NoPages)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Page size from the MediaBox, following the Parent chain; US Letter when
/// absent.
fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let mut current = page_id;
    for _ in 0..8 {
        let Ok(dict) = doc.get_object(current).and_then(|o| o.as_dict()) else {
            break;
        };

        if let Ok(media_box) = dict.get(b"MediaBox") {
            let resolved = match media_box {
                Object::Reference(r) => doc.get_object(*r).ok(),
                other => Some(other),
            };
            if let Some(Object::Array(values)) = resolved {
                let nums: Vec<f32> = values
                    .iter()
                    .filter_map(|o| match o {
                        Object::Integer(i) => Some(*i as f32),
                        Object::Real(r) => Some(*r as f32),
                        _ => None,
                    })
                    .collect();
                if nums.len() == 4 {
                    return ((nums[2] - nums[0]).abs(), (nums[3] - nums[1]).abs());
                }
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(r)) => current = *r,
            _ => break,
        }
    }

    (612.0, 792.0)
}

fn try_extract_image(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    let subtype = dict.get(b"Subtype").ok()?;
    if subtype.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("found image object: {}x{}", width, height);

    if let Ok(filter) = dict.get(b"Filter") {
        let filter_name = match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) if !arr.is_empty() => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        };

        match filter_name {
            Some(b"DCTDecode") => {
                // JPEG data, stream content is the compressed image itself
                return image::load_from_memory_with_format(
                    &stream.content,
                    image::ImageFormat::Jpeg,
                )
                .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("unsupported image filter, skipping");
                return None;
            }
            _ => {}
        }
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("unsupported bits per component: {}", bits);
        return None;
    }

    create_image_from_raw(&data, width, height, color_space)
}

fn create_image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
) -> Option<DynamicImage> {
    let pixels = (width as usize) * (height as usize);

    match color_space {
        b"DeviceRGB" => {
            if data.len() < pixels * 3 {
                return None;
            }
            RgbImage::from_raw(width, height, data[..pixels * 3].to_vec())
                .map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" => {
            if data.len() < pixels {
                return None;
            }
            GrayImage::from_raw(width, height, data[..pixels].to_vec())
                .map(DynamicImage::ImageLuma8)
        }
        other => {
            trace!("unsupported color space: {:?}", String::from_utf8_lossy(other));
            None
        }
    }
}
