//! PDF renderer (§4.4): the most tightly specified renderer since its
//! output is bit-identity-sensitive. Produces a PDF 1.5 document with an
//! invisible Type-0/CIDFontType2 font whose `CIDToGIDMap` forces every
//! CID to GID 1, so the recognized text is selectable and copyable but
//! never rendered, overlaying wherever the caller places the background
//! image.
//!
//! Object numbers are assigned as objects are completed; `objects` grows
//! by object number, and the `/Pages` object (number 2) is reserved at
//! construction time and only filled in once `on_end_document` knows
//! every page's object number, per §4.4 "the `/Pages` object is reserved
//! early and back-patched at document end".

use super::{RenderableSession, RendererHandler};
use crate::enums::{PageIteratorLevel, WritingDirection};
use crate::error::Result;
use crate::iterator::LinearIterator;
use crate::page_result::Baseline;
use std::fmt::Write as _;

/// Horizontal-scaling tuning constant (§4.4 `Tz` formula).
const K_CHAR_WIDTH: f32 = 2.0;
const POINTS_PER_INCH: f32 = 72.0;
const DEFAULT_FONT_SIZE_PT: f32 = 10.0;

const CATALOG_OBJ: u32 = 1;
const PAGES_OBJ: u32 = 2;
const FONT_OBJ: u32 = 3;
const CIDFONT_OBJ: u32 = 4;
const DESCRIPTOR_OBJ: u32 = 5;
const CID_TO_GID_OBJ: u32 = 6;

pub struct PdfRenderer {
    objects: Vec<Vec<u8>>,
    page_obj_nums: Vec<u32>,
    finalized: Vec<u8>,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRenderer {
    pub fn new() -> Self {
        let mut r = PdfRenderer {
            objects: Vec::new(),
            page_obj_nums: Vec::new(),
            finalized: Vec::new(),
        };
        for _ in 0..6 {
            r.objects.push(Vec::new());
        }
        r.write_static_objects();
        r
    }

    /// Fully assembled document bytes; populated by `on_end_document`.
    pub fn bytes(&self) -> &[u8] {
        &self.finalized
    }

    fn set_obj(&mut self, num: u32, body: Vec<u8>) {
        let idx = (num - 1) as usize;
        if idx >= self.objects.len() {
            self.objects.resize(idx + 1, Vec::new());
        }
        self.objects[idx] = body;
    }

    fn alloc_obj(&mut self) -> u32 {
        self.objects.push(Vec::new());
        self.objects.len() as u32
    }

    fn write_static_objects(&mut self) {
        self.set_obj(CATALOG_OBJ, format!("<< /Type /Catalog /Pages {PAGES_OBJ} 0 R >>").into_bytes());

        self.set_obj(
            FONT_OBJ,
            format!(
                "<< /Type /Font /Subtype /Type0 /BaseFont /GlyphLessFont \
                 /Encoding /Identity-H /DescendantFonts [{CIDFONT_OBJ} 0 R] >>"
            )
            .into_bytes(),
        );

        self.set_obj(
            CIDFONT_OBJ,
            format!(
                "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /GlyphLessFont \
                 /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
                 /FontDescriptor {DESCRIPTOR_OBJ} 0 R /DW 0 /CIDToGIDMap {CID_TO_GID_OBJ} 0 R >>"
            )
            .into_bytes(),
        );

        self.set_obj(
            DESCRIPTOR_OBJ,
            "<< /Type /FontDescriptor /FontName /GlyphLessFont /Flags 5 \
             /FontBBox [0 0 1 1] /ItalicAngle 0 /Ascent 1000 /Descent 0 \
             /CapHeight 1000 /StemV 80 >>"
                .as_bytes()
                .to_vec(),
        );

        // Every CID maps to GID 1, the invisible placeholder glyph, so
        // overlaid text never paints visible ink (§4.4). CID 0 keeps the
        // PDF-mandated `.notdef` mapping.
        let cid_to_gid: Vec<u8> = vec![0x00, 0x00, 0x00, 0x01];
        let mut stream = format!("<< /Length {} >>\nstream\n", cid_to_gid.len()).into_bytes();
        stream.extend_from_slice(&cid_to_gid);
        stream.extend_from_slice(b"\nendstream");
        self.set_obj(CID_TO_GID_OBJ, stream);
    }

    fn finalize(&mut self) {
        let kids: String = self
            .page_obj_nums
            .iter()
            .map(|n| format!("{n} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_obj(
            PAGES_OBJ,
            format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", self.page_obj_nums.len()).into_bytes(),
        );

        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.5\n%\xE2\xE3\xCF\xD3\n");
        let mut offsets = vec![0usize; self.objects.len() + 1];
        for (i, body) in self.objects.iter().enumerate() {
            let num = i + 1;
            offsets[num] = out.len();
            out.extend_from_slice(format!("{num} 0 obj\n").as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }
        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", self.objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for num in 1..=self.objects.len() {
            out.extend_from_slice(format!("{:010} 00000 n \n", offsets[num]).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {CATALOG_OBJ} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                self.objects.len() + 1
            )
            .as_bytes(),
        );
        self.finalized = out;
    }
}

/// Encodes `s` as UTF-16BE, surrogate-pairing code points at or above
/// U+10000 (§4.4). Every Rust `char` is by construction a valid scalar
/// value, so there is nothing here to drop as invalid.
fn utf16be(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

fn hex_string(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2 + 2);
    s.push('<');
    for b in bytes {
        write!(s, "{b:02X}").ok();
    }
    s.push('>');
    s
}

/// Rotates and scales an internal-coordinate point into image points,
/// mirroring `CoordinateFrame::map_bbox`'s per-corner formula (§4.2) but
/// for a single baseline endpoint rather than a whole bbox.
fn map_point(frame: crate::iterator::CoordinateFrame, x: f32, y: f32, (cos_t, sin_t): (f32, f32)) -> (f32, f32) {
    let (rx, ry) = (cos_t * x - sin_t * y, sin_t * x + cos_t * y);
    let scale = if frame.scale.abs() < f32::EPSILON { 1.0 } else { frame.scale };
    let image_x = rx / scale + frame.rect_left as f32;
    let image_y = (frame.rect_height as f32 - ry) / scale + frame.rect_top as f32;
    (image_x, image_y)
}

/// Baseline slope angle per §4.4: `theta = atan2(y1-y2, x2-x1)`, clipped
/// to exactly horizontal when the line is near-horizontal enough that a
/// weak viewer would otherwise show a visible tilt seam
/// (`|Δy|*72/ppi < 2 < |Δx|*72/ppi`).
fn baseline_theta(baseline: Baseline, ppi: f32) -> f32 {
    let dy = baseline.y1 - baseline.y2;
    let dx = baseline.x2 - baseline.x1;
    let dy_pt = dy.abs() * POINTS_PER_INCH / ppi;
    let dx_pt = dx.abs() * POINTS_PER_INCH / ppi;
    if dy_pt < 2.0 && dx_pt > 2.0 {
        0.0
    } else {
        dy.atan2(dx)
    }
}

struct Transform {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
}

impl Transform {
    fn from_theta(theta: f32, rtl: bool) -> Self {
        let (mut a, mut b) = (theta.cos(), theta.sin());
        let c = -b;
        let d = a;
        if rtl {
            a = -a;
            b = -b;
        }
        Transform { a, b, c, d }
    }

    /// Applies this transform's inverse to a delta in user space,
    /// recovering the `Td` offset that reproduces `delta` under `Tm`
    /// (§4.4 "relative Td moves computed by applying the inverse of the
    /// current transform").
    fn inverse_apply(&self, dx: f32, dy: f32) -> (f32, f32) {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f32::EPSILON {
            return (dx, dy);
        }
        let inv_a = self.d / det;
        let inv_b = -self.b / det;
        let inv_c = -self.c / det;
        let inv_d = self.a / det;
        (inv_a * dx + inv_c * dy, inv_b * dx + inv_d * dy)
    }
}

impl RendererHandler for PdfRenderer {
    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        let page = session.page_result();
        let frame = session.coordinate_frame();
        let ppi = session.source_resolution().max(1) as f32;
        let page_width_pt = frame.rect_width as f32 * POINTS_PER_INCH / ppi;
        let page_height_pt = frame.rect_height as f32 * POINTS_PER_INCH / ppi;

        let mut content = String::new();
        content.push_str("q\n% background image intentionally omitted: image codec is out of scope\nBT\n3 Tr\n");

        if !page.is_empty() {
            let mut linear = LinearIterator::begin(page, frame);
            loop {
                let cursor = linear.cursor();
                let block = page.block(page.blocks_order[cursor.block]);
                let para = page.paragraph(block.paragraphs[cursor.para]);
                let row = page.row(para.rows[cursor.row]);

                let theta = baseline_theta(row.baseline, ppi);
                let rtl = row
                    .words
                    .first()
                    .map(|&w| page.word(w).direction == WritingDirection::RightToLeft)
                    .unwrap_or(false);
                let transform = Transform::from_theta(theta, rtl);

                let mut prev_origin: Option<(f32, f32)> = None;
                for &word_h in &row.words {
                    let word = page.word(word_h);
                    let text = word.text(session.unicharset());
                    if text.is_empty() {
                        continue;
                    }
                    let n_codepoints = text.chars().count().max(1) as f32;
                    let (ix, iy) = map_point(frame, word.baseline.x1, word.baseline.y1, block.re_rotation);
                    let x_pt = ix * POINTS_PER_INCH / ppi;
                    let y_pt = page_height_pt - iy * POINTS_PER_INCH / ppi;

                    let fontsize = if word.font.pointsize > 0 {
                        word.font.pointsize as f32
                    } else {
                        DEFAULT_FONT_SIZE_PT
                    };
                    let word_width_pt = word.quad.bounding_box().width() as f32 * POINTS_PER_INCH / ppi;
                    let tz = K_CHAR_WIDTH * 100.0 * word_width_pt / (fontsize * n_codepoints);

                    match prev_origin {
                        None => {
                            writeln!(
                                content,
                                "{:.4} {:.4} {:.4} {:.4} {:.4} {:.4} Tm",
                                transform.a, transform.b, transform.c, transform.d, x_pt, y_pt
                            )
                            .ok();
                        }
                        Some((px, py)) => {
                            let (tx, ty) = transform.inverse_apply(x_pt - px, y_pt - py);
                            writeln!(content, "{:.4} {:.4} Td", tx, ty).ok();
                        }
                    }
                    prev_origin = Some((x_pt, y_pt));

                    writeln!(content, "/F1 {:.2} Tf {:.4} Tz", fontsize, tz).ok();
                    writeln!(content, "{} Tj", hex_string(&utf16be(&text))).ok();
                }

                if !linear.next(PageIteratorLevel::Textline) {
                    break;
                }
            }
        }

        content.push_str("ET\nQ\n");

        let content_bytes = content.into_bytes();
        let page_obj = self.alloc_obj();
        let contents_obj = self.alloc_obj();

        self.set_obj(
            page_obj,
            format!(
                "<< /Type /Page /Parent {PAGES_OBJ} 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 {FONT_OBJ} 0 R >> >> /Contents {contents_obj} 0 R >>",
                page_width_pt, page_height_pt
            )
            .into_bytes(),
        );

        let mut stream = format!("<< /Length {} >>\nstream\n", content_bytes.len()).into_bytes();
        stream.extend_from_slice(&content_bytes);
        stream.extend_from_slice(b"\nendstream");
        self.set_obj(contents_obj, stream);

        self.page_obj_nums.push(page_obj);
        Ok(())
    }

    fn on_end_document(&mut self) -> Result<()> {
        self.finalize();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{PermuterTag, PolyBlockType};
    use crate::iterator::CoordinateFrame;
    use crate::page_result::{BBox, Block, Choice, FontAttributes, PageResult, Paragraph, Quad, Row, Symbol, Word};
    use crate::unicharset::UnicharSet;

    struct Fixture {
        page: PageResult,
        unicharset: UnicharSet,
    }

    impl RenderableSession for Fixture {
        fn page_result(&self) -> &PageResult {
            &self.page
        }
        fn unicharset(&self) -> &UnicharSet {
            &self.unicharset
        }
        fn coordinate_frame(&self) -> CoordinateFrame {
            CoordinateFrame {
                scale: 1.0,
                scaled_y_resolution: 300.0,
                rect_left: 0,
                rect_top: 0,
                rect_width: 1000,
                rect_height: 1000,
            }
        }
        fn preserve_interword_spaces(&self) -> bool {
            false
        }
        fn source_resolution(&self) -> u32 {
            300
        }
        fn page_number(&self) -> i32 {
            0
        }
    }

    fn one_word_page() -> (PageResult, UnicharSet) {
        let mut unicharset = UnicharSet::new();
        let id = unicharset.insert("A", UnicharSet::classify_char('A'));
        let mut page = PageResult::new();
        let w = page.push_word(Word {
            quad: Quad::from_bbox(BBox::new(10, 10, 30, 30)),
            baseline: Baseline { x1: 10.0, y1: 28.0, x2: 30.0, y2: 28.0 },
            symbols: vec![Symbol {
                bbox: BBox::new(10, 10, 30, 30),
                choices: vec![Choice { unichar_id: id, certainty: -1.0 }],
                best_choice: Some(0),
                superscript: false,
                subscript: false,
                dropcap: false,
            }],
            certainty: -1.0,
            permuter_tag: PermuterTag::default(),
            rejected: false,
            font: FontAttributes::default(),
            direction: WritingDirection::LeftToRight,
            is_numeric: false,
            from_dictionary: false,
            blanks_before: 1,
        });
        let row = page.push_row(Row {
            baseline: Baseline { x1: 10.0, y1: 28.0, x2: 30.0, y2: 28.0 },
            words: vec![w],
            ..Default::default()
        });
        let para = page.push_paragraph(Paragraph {
            rows: vec![row],
            ..Default::default()
        });
        page.push_block(Block {
            block_type: PolyBlockType::FlowingText,
            paragraphs: vec![para],
            ..Default::default()
        });
        (page, unicharset)
    }

    #[test]
    fn utf16be_surrogate_pairs_a_supplementary_codepoint() {
        let bytes = utf16be("\u{1F600}");
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes[0], 0xD8);
    }

    #[test]
    fn document_has_header_trailer_and_one_page() {
        let (page, unicharset) = one_word_page();
        let fixture = Fixture { page, unicharset };
        let mut r = PdfRenderer::new();
        r.on_add_image(&fixture).unwrap();
        r.on_end_document().unwrap();
        let bytes = r.bytes().to_vec();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.5"));
        assert!(text.contains("/Type /Page "));
        assert!(text.contains("/Count 1"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("xref"));
    }

    #[test]
    fn near_horizontal_baseline_is_clipped_to_zero_theta() {
        let baseline = Baseline { x1: 0.0, y1: 100.0, x2: 500.0, y2: 101.0 };
        assert_eq!(baseline_theta(baseline, 300.0), 0.0);
    }
}
