//! Positioned page content from PDF content streams.
//!
//! Walks a page's decoded operator stream and collects two things the
//! table-grid strategy needs: text show operations with their origins, and
//! straight line segments from path-painting operators (including rectangle
//! edges). Coordinates are converted to top-based page points.

use lopdf::content::Content;
use lopdf::Object;
use tracing::trace;

/// A positioned text run. `x`/`top` are the text origin in page points,
/// with `top` measured from the top edge of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub x: f32,
    pub top: f32,
    pub text: String,
}

/// A straight line segment in top-based page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruling {
    pub x0: f32,
    pub top0: f32,
    pub x1: f32,
    pub top1: f32,
}

impl Ruling {
    pub fn is_vertical(&self) -> bool {
        (self.x0 - self.x1).abs() <= 1.0 && (self.top0 - self.top1).abs() > 2.0
    }

    pub fn is_horizontal(&self) -> bool {
        (self.top0 - self.top1).abs() <= 1.0 && (self.x0 - self.x1).abs() > 2.0
    }
}

/// Positioned content of a single page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// Text runs in content-stream order.
    pub words: Vec<Word>,
    /// Line segments from `m`/`l` paths and `re` rectangles.
    pub rulings: Vec<Ruling>,
}

impl PageContent {
    /// Restrict content to a rectangular region. Words are kept when their
    /// origin falls inside; axis-aligned rulings are clipped to the region.
    pub fn crop(&self, region: &crate::models::config::CropRegion) -> PageContent {
        let words = self
            .words
            .iter()
            .filter(|w| region.contains(w.x, w.top))
            .cloned()
            .collect();

        let mut rulings = Vec::new();
        for r in &self.rulings {
            if r.is_vertical() {
                if r.x0 < region.x0 || r.x0 > region.x1 {
                    continue;
                }
                let lo = r.top0.min(r.top1).max(region.top);
                let hi = r.top0.max(r.top1).min(region.bottom);
                if hi > lo {
                    rulings.push(Ruling {
                        x0: r.x0,
                        top0: lo,
                        x1: r.x1,
                        top1: hi,
                    });
                }
            } else if r.is_horizontal() {
                if r.top0 < region.top || r.top0 > region.bottom {
                    continue;
                }
                let lo = r.x0.min(r.x1).max(region.x0);
                let hi = r.x0.max(r.x1).min(region.x1);
                if hi > lo {
                    rulings.push(Ruling {
                        x0: lo,
                        top0: r.top0,
                        x1: hi,
                        top1: r.top1,
                    });
                }
            }
        }

        PageContent {
            width: self.width,
            height: self.height,
            words,
            rulings,
        }
    }

    /// Reconstruct plain text in reading order: words grouped into baselines
    /// (top within 2 points), baselines top-to-bottom, words left-to-right.
    pub fn text(&self) -> String {
        let mut words: Vec<&Word> = self.words.iter().filter(|w| !w.text.trim().is_empty()).collect();
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

        for line in &mut lines {
            line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        }

        lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|w| w.text.trim())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A 2D affine transform in PDF order: [a b c d e f].
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn concat(a: Matrix, b: Matrix) -> Matrix {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

fn apply(m: Matrix, x: f32, y: f32) -> (f32, f32) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

fn translation(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn numbers(operands: &[Object]) -> Option<Vec<f32>> {
    operands.iter().map(as_number).collect()
}

/// Decode a PDF string operand: UTF-16BE with BOM, else UTF-8, else Latin-1.
fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        return bytes[2..]
            .chunks_exact(2)
            .filter_map(|pair| {
                char::from_u32(u32::from(pair[0]) << 8 | u32::from(pair[1]))
            })
            .collect();
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn show_text_operand(obj: &Object) -> String {
    match obj {
        Object::String(bytes, _) => decode_text(bytes),
        Object::Array(parts) => parts
            .iter()
            .filter_map(|o| match o {
                Object::String(bytes, _) => Some(decode_text(bytes)),
                _ => None,
            })
            .collect(),
        _ => String::new(),
    }
}

/// Walk a decoded content stream and collect positioned words and rulings.
pub(crate) fn walk(content: &Content, page_width: f32, page_height: f32) -> PageContent {
    let mut page = PageContent {
        width: page_width,
        height: page_height,
        words: Vec::new(),
        rulings: Vec::new(),
    };

    let mut ctm = IDENTITY;
    let mut ctm_stack: Vec<Matrix> = Vec::new();

    // Text state
    let mut tm = IDENTITY;
    let mut tlm = IDENTITY;
    let mut leading = 0.0f32;

    // Path state
    let mut current: Option<(f32, f32)> = None;

    let push_word = |page: &mut PageContent, tm: Matrix, ctm: Matrix, text: String| {
        if text.trim().is_empty() {
            return;
        }
        let trm = concat(tm, ctm);
        let (x, y) = (trm[4], trm[5]);
        page.words.push(Word {
            x,
            top: page_height - y,
            text,
        });
    };

    let push_segment = |page: &mut PageContent, ctm: Matrix, p0: (f32, f32), p1: (f32, f32)| {
        let (x0, y0) = apply(ctm, p0.0, p0.1);
        let (x1, y1) = apply(ctm, p1.0, p1.1);
        page.rulings.push(Ruling {
            x0,
            top0: page_height - y0,
            x1,
            top1: page_height - y1,
        });
    };

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_ref() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if let Some(n) = numbers(operands) {
                    if n.len() == 6 {
                        ctm = concat([n[0], n[1], n[2], n[3], n[4], n[5]], ctm);
                    }
                }
            }
            "BT" => {
                tm = IDENTITY;
                tlm = IDENTITY;
            }
            "ET" => {}
            "TL" => {
                if let Some(n) = numbers(operands) {
                    if n.len() == 1 {
                        leading = n[0];
                    }
                }
            }
            "Td" | "TD" => {
                if let Some(n) = numbers(operands) {
                    if n.len() == 2 {
                        if op.operator == "TD" {
                            leading = -n[1];
                        }
                        tlm = concat(translation(n[0], n[1]), tlm);
                        tm = tlm;
                    }
                }
            }
            "Tm" => {
                if let Some(n) = numbers(operands) {
                    if n.len() == 6 {
                        tlm = [n[0], n[1], n[2], n[3], n[4], n[5]];
                        tm = tlm;
                    }
                }
            }
            "T*" => {
                tlm = concat(translation(0.0, -leading), tlm);
                tm = tlm;
            }
            "Tj" | "TJ" => {
                if let Some(operand) = operands.first() {
                    push_word(&mut page, tm, ctm, show_text_operand(operand));
                }
            }
            "'" => {
                tlm = concat(translation(0.0, -leading), tlm);
                tm = tlm;
                if let Some(operand) = operands.first() {
                    push_word(&mut page, tm, ctm, show_text_operand(operand));
                }
            }
            "\"" => {
                tlm = concat(translation(0.0, -leading), tlm);
                tm = tlm;
                if let Some(operand) = operands.get(2) {
                    push_word(&mut page, tm, ctm, show_text_operand(operand));
                }
            }
            "m" => {
                if let Some(n) = numbers(operands) {
                    if n.len() == 2 {
                        current = Some((n[0], n[1]));
                    }
                }
            }
            "l" => {
                if let Some(n) = numbers(operands) {
                    if n.len() == 2 {
                        if let Some(from) = current {
                            push_segment(&mut page, ctm, from, (n[0], n[1]));
                        }
                        current = Some((n[0], n[1]));
                    }
                }
            }
            "re" => {
                if let Some(n) = numbers(operands) {
                    if n.len() == 4 {
                        let (x, y, w, h) = (n[0], n[1], n[2], n[3]);
                        push_segment(&mut page, ctm, (x, y), (x + w, y));
                        push_segment(&mut page, ctm, (x + w, y), (x + w, y + h));
                        push_segment(&mut page, ctm, (x + w, y + h), (x, y + h));
                        push_segment(&mut page, ctm, (x, y + h), (x, y));
                        current = Some((x, y));
                    }
                }
            }
            // Curves only move the current point; curved rules are not
            // table grid lines.
            "c" | "v" | "y" => {
                if let Some(n) = numbers(operands) {
                    if n.len() >= 2 {
                        current = Some((n[n.len() - 2], n[n.len() - 1]));
                    }
                }
            }
            other => trace!("ignoring operator {}", other),
        }
    }

    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::CropRegion;
    use lopdf::content::{Content, Operation};
    use pretty_assertions::assert_eq;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn text_op(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec(), lopdf::StringFormat::Literal)
    }

    #[test]
    fn test_words_positioned_from_td() {
        let content = Content {
            operations: vec![
                op("BT", vec![]),
                op("Td", vec![Object::Integer(100), Object::Integer(700)]),
                op("Tj", vec![text_op("Hello")]),
                op("Td", vec![Object::Integer(50), Object::Integer(0)]),
                op("Tj", vec![text_op("World")]),
                op("ET", vec![]),
            ],
        };

        let page = walk(&content, 612.0, 792.0);
        assert_eq!(page.words.len(), 2);
        assert_eq!(page.words[0].text, "Hello");
        assert_eq!(page.words[0].x, 100.0);
        assert_eq!(page.words[0].top, 92.0);
        assert_eq!(page.words[1].x, 150.0);
        assert_eq!(page.words[1].top, 92.0);
    }

    #[test]
    fn test_tj_array_concatenates() {
        let content = Content {
            operations: vec![
                op("BT", vec![]),
                op(
                    "Tm",
                    vec![
                        Object::Integer(1),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(1),
                        Object::Integer(72),
                        Object::Integer(720),
                    ],
                ),
                op(
                    "TJ",
                    vec![Object::Array(vec![
                        text_op("In"),
                        Object::Integer(-20),
                        text_op("voice"),
                    ])],
                ),
            ],
        };

        let page = walk(&content, 612.0, 792.0);
        assert_eq!(page.words.len(), 1);
        assert_eq!(page.words[0].text, "Invoice");
    }

    #[test]
    fn test_rectangle_produces_four_rulings() {
        let content = Content {
            operations: vec![op(
                "re",
                vec![
                    Object::Integer(20),
                    Object::Integer(100),
                    Object::Integer(200),
                    Object::Integer(50),
                ],
            )],
        };

        let page = walk(&content, 612.0, 792.0);
        assert_eq!(page.rulings.len(), 4);

        let verticals = page.rulings.iter().filter(|r| r.is_vertical()).count();
        let horizontals = page.rulings.iter().filter(|r| r.is_horizontal()).count();
        assert_eq!(verticals, 2);
        assert_eq!(horizontals, 2);
    }

    #[test]
    fn test_cm_transform_applies_to_lines() {
        let content = Content {
            operations: vec![
                op(
                    "cm",
                    vec![
                        Object::Integer(2),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(2),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                op("m", vec![Object::Integer(10), Object::Integer(10)]),
                op("l", vec![Object::Integer(10), Object::Integer(100)]),
            ],
        };

        let page = walk(&content, 612.0, 792.0);
        assert_eq!(page.rulings.len(), 1);
        assert_eq!(page.rulings[0].x0, 20.0);
        assert_eq!(page.rulings[0].top0, 792.0 - 20.0);
        assert_eq!(page.rulings[0].top1, 792.0 - 200.0);
        assert!(page.rulings[0].is_vertical());
    }

    #[test]
    fn test_text_reading_order() {
        let page = PageContent {
            width: 612.0,
            height: 792.0,
            words: vec![
                Word { x: 200.0, top: 100.0, text: "Pump".into() },
                Word { x: 72.0, top: 100.5, text: "Concrete".into() },
                Word { x: 72.0, top: 120.0, text: "Rental".into() },
            ],
            rulings: vec![],
        };

        assert_eq!(page.text(), "Concrete Pump\nRental");
    }

    #[test]
    fn test_crop_clips_rulings_and_filters_words() {
        let page = PageContent {
            width: 612.0,
            height: 792.0,
            words: vec![
                Word { x: 100.0, top: 300.0, text: "inside".into() },
                Word { x: 100.0, top: 100.0, text: "above".into() },
            ],
            rulings: vec![
                // Full-width horizontal line through the region
                Ruling { x0: 0.0, top0: 400.0, x1: 612.0, top1: 400.0 },
                // Horizontal line above the region
                Ruling { x0: 0.0, top0: 100.0, x1: 612.0, top1: 100.0 },
            ],
        };

        let region = CropRegion { x0: 20.0, top: 250.0, x1: 590.0, bottom: 780.0 };
        let cropped = page.crop(&region);

        assert_eq!(cropped.words.len(), 1);
        assert_eq!(cropped.words[0].text, "inside");
        assert_eq!(cropped.rulings.len(), 1);
        assert_eq!(cropped.rulings[0].x0, 20.0);
        assert_eq!(cropped.rulings[0].x1, 590.0);
    }
}
