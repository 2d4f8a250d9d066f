//! hOCR renderer (§6.3): XHTML 1.0 Transitional, UTF-8, with
//! `ocr_page`/`ocr_carea`/`ocr_par`/`ocr_line`/`ocrx_word` elements, each
//! carrying a `title` attribute of `bbox l t r b; baseline m c; x_wconf N`.

use super::{RenderableSession, RendererHandler};
use crate::enums::PageIteratorLevel;
use crate::error::Result;
use crate::iterator::LinearIterator;
use crate::iterator::reading_order::ReadingOrderIterator;
use std::fmt::Write as _;

#[derive(Debug, Default)]
pub struct HocrRenderer {
    buffer: String,
}

impl HocrRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

/// Escapes the five XML predefined entities; hOCR text content is never
/// trusted to be entity-free since recognized text may contain `&`, `<`,
/// or quotes verbatim.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl RendererHandler for HocrRenderer {
    fn file_extension(&self) -> &'static str {
        "hocr"
    }

    fn on_begin_document(&mut self, title: &str) -> Result<()> {
        writeln!(
            self.buffer,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
             \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n\
             <html xmlns=\"http://www.w3.org/1999/xhtml\">\n<head>\n<title>{}</title>\n\
             <meta http-equiv=\"Content-Type\" content=\"text/html;charset=utf-8\"/>\n</head>\n<body>",
            escape_xml(title)
        )
        .ok();
        Ok(())
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        let page = session.page_result();
        let page_no = session.page_number();
        let linear = LinearIterator::begin(page, session.coordinate_frame());
        let bbox = if page.is_empty() {
            Default::default()
        } else {
            linear.bounding_box(PageIteratorLevel::Block)
        };
        writeln!(
            self.buffer,
            "<div class='ocr_page' id='page_{}' title='bbox {} {} {} {}'>",
            page_no + 1,
            bbox.left,
            bbox.top,
            bbox.right,
            bbox.bottom
        )
        .ok();

        if !page.is_empty() {
            let mut it = ReadingOrderIterator::new(LinearIterator::begin(page, session.coordinate_frame()), session.unicharset());
            self.render_blocks(page, session, &mut it)?;
        }

        writeln!(self.buffer, "</div>").ok();
        Ok(())
    }

    fn on_end_document(&mut self) -> Result<()> {
        writeln!(self.buffer, "</body>\n</html>").ok();
        Ok(())
    }
}

impl HocrRenderer {
    fn render_blocks(
        &mut self,
        page: &crate::page_result::PageResult,
        session: &dyn RenderableSession,
        it: &mut ReadingOrderIterator,
    ) -> Result<()> {
        let mut linear = LinearIterator::begin(page, session.coordinate_frame());
        let mut block_idx = 0;
        loop {
            let block_bbox = linear.bounding_box(PageIteratorLevel::Block);
            writeln!(
                self.buffer,
                "<div class='ocr_carea' id='block_{}' title='bbox {} {} {} {}'>",
                block_idx + 1,
                block_bbox.left,
                block_bbox.top,
                block_bbox.right,
                block_bbox.bottom
            )
            .ok();

            let mut para_idx = 0;
            loop {
                let para_bbox = linear.bounding_box(PageIteratorLevel::Para);
                let dir = if it.paragraph_is_ltr() { "ltr" } else { "rtl" };
                writeln!(
                    self.buffer,
                    "<p class='ocr_par' dir='{dir}' id='par_{}_{}' title='bbox {} {} {} {}'>",
                    block_idx + 1,
                    para_idx + 1,
                    para_bbox.left,
                    para_bbox.top,
                    para_bbox.right,
                    para_bbox.bottom
                )
                .ok();

                loop {
                    self.render_line(page, session, it, &linear);
                    let was_last_line = it.is_at_last_textline_of_paragraph();
                    linear.next(PageIteratorLevel::Textline);
                    if was_last_line || !it.next_textline() {
                        break;
                    }
                }
                writeln!(self.buffer, "</p>").ok();

                let was_last_para = linear.is_at_final_element(PageIteratorLevel::Block, PageIteratorLevel::Para);
                para_idx += 1;
                if was_last_para {
                    break;
                }
                linear.next(PageIteratorLevel::Para);
            }
            writeln!(self.buffer, "</div>").ok();

            let was_last_block = linear.is_at_final_element(PageIteratorLevel::Block, PageIteratorLevel::Block);
            block_idx += 1;
            if was_last_block {
                break;
            }
            linear.next(PageIteratorLevel::Block);
        }
        Ok(())
    }

    fn render_line(
        &mut self,
        page: &crate::page_result::PageResult,
        session: &dyn RenderableSession,
        it: &ReadingOrderIterator,
        linear: &LinearIterator,
    ) {
        let line_bbox = linear.bounding_box(PageIteratorLevel::Textline);
        let baseline = linear.baseline(PageIteratorLevel::Textline);
        let upright = (baseline.y2 - baseline.y1).abs() < 1.0;
        let mut title = format!(
            "bbox {} {} {} {}",
            line_bbox.left, line_bbox.top, line_bbox.right, line_bbox.bottom
        );
        if upright {
            let (m, c) = baseline.slope_intercept(line_bbox.left as f32, line_bbox.bottom as f32);
            write!(title, "; baseline {:.3} {:.3}", m, c).ok();
        } else {
            let angle = (baseline.y2 - baseline.y1).atan2(baseline.x2 - baseline.x1).to_degrees();
            write!(title, "; textangle {:.2}", angle).ok();
        }
        writeln!(self.buffer, "<span class='ocr_line' title=\"{title}\">").ok();

        for token in it.textline_order() {
            let crate::iterator::reading_order::OrderToken::Word(idx) = token else {
                continue;
            };
            let cursor = linear.cursor();
            let row = page.row(page.paragraph(page.block(page.blocks_order[cursor.block]).paragraphs[cursor.para]).rows[cursor.row]);
            let word = page.word(row.words[idx]);
            let wbox = word.quad.bounding_box();
            let frame = session.coordinate_frame();
            let img_box = frame.map_bbox(wbox, page.block(page.blocks_order[cursor.block]).re_rotation);
            writeln!(
                self.buffer,
                "<span class='ocrx_word' title=\"bbox {} {} {} {}; x_wconf {}\">{}</span>",
                img_box.left,
                img_box.top,
                img_box.right,
                img_box.bottom,
                word.confidence_percent(),
                escape_xml(&word.text(session.unicharset()))
            )
            .ok();
        }
        writeln!(self.buffer, "</span>").ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{PermuterTag, PolyBlockType, WritingDirection};
    use crate::iterator::CoordinateFrame;
    use crate::page_result::{BBox, Baseline, Block, Choice, FontAttributes, PageResult, Paragraph, Quad, Row, Symbol, Word};
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
            quad: Quad::from_bbox(BBox::new(0, 0, 10, 10)),
            baseline: Baseline::default(),
            symbols: vec![Symbol {
                bbox: BBox::new(0, 0, 10, 10),
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
    fn bbox_has_four_non_negative_integers_left_lt_right_top_lt_bottom() {
        let (page, unicharset) = one_word_page();
        let fixture = Fixture { page, unicharset };
        let mut r = HocrRenderer::new();
        r.on_begin_document("t").unwrap();
        r.on_add_image(&fixture).unwrap();
        r.on_end_document().unwrap();
        let body = r.buffer();
        assert!(body.contains("ocrx_word"));
        // Every "bbox l t r b" occurrence has l<r and t<b (P4 hOCR scenario).
        for caps in body.split("bbox ").skip(1) {
            let nums: Vec<i32> = caps
                .split(|c: char| c == ';' || c == '\'' || c == '"')
                .next()
                .unwrap()
                .split_whitespace()
                .filter_map(|s| s.parse().ok())
                .collect();
            assert_eq!(nums.len(), 4);
            assert!(nums[0] < nums[2]);
            assert!(nums[1] < nums[3]);
        }
    }

    #[test]
    fn empty_page_still_emits_page_div() {
        let fixture = Fixture {
            page: PageResult::new(),
            unicharset: UnicharSet::new(),
        };
        let mut r = HocrRenderer::new();
        r.on_add_image(&fixture).unwrap();
        assert!(r.buffer().contains("ocr_page"));
    }
}
