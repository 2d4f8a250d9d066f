//! TSV renderer (§4.4 concrete renderers list): one row per page, block,
//! paragraph, line and word, in the Tesseract `tsv` column order:
//! `level page_num block_num par_num line_num word_num left top width
//! height conf text`.

use super::{RenderableSession, RendererHandler};
use crate::enums::PageIteratorLevel;
use crate::error::Result;
use crate::iterator::LinearIterator;
use std::fmt::Write as _;

const HEADER: &str = "level\tpage\tblock\tpar\tline\tword\tleft\ttop\twidth\theight\tconf\ttext\n";

#[derive(Debug, Default)]
pub struct TsvRenderer {
    buffer: String,
    header_written: bool,
}

impl TsvRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

impl RendererHandler for TsvRenderer {
    fn file_extension(&self) -> &'static str {
        "tsv"
    }

    fn on_begin_document(&mut self, _title: &str) -> Result<()> {
        if !self.header_written {
            self.buffer.push_str(HEADER);
            self.header_written = true;
        }
        Ok(())
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        if !self.header_written {
            self.buffer.push_str(HEADER);
            self.header_written = true;
        }
        let page = session.page_result();
        let page_num = session.page_number() + 1;
        if page.is_empty() {
            return Ok(());
        }

        let mut linear = LinearIterator::begin(page, session.coordinate_frame());
        let page_bbox = {
            let mut probe = LinearIterator::begin(page, session.coordinate_frame());
            let mut bbox = probe.bounding_box(PageIteratorLevel::Block);
            while probe.next(PageIteratorLevel::Block) {
                let b = probe.bounding_box(PageIteratorLevel::Block);
                bbox.left = bbox.left.min(b.left);
                bbox.top = bbox.top.min(b.top);
                bbox.right = bbox.right.max(b.right);
                bbox.bottom = bbox.bottom.max(b.bottom);
            }
            bbox
        };
        row(&mut self.buffer, 1, page_num, 0, 0, 0, 0, page_bbox, None, "");

        let mut block_num = 0;
        loop {
            let bbox = linear.bounding_box(PageIteratorLevel::Block);
            row(&mut self.buffer, 2, page_num, block_num + 1, 0, 0, 0, bbox, None, "");

            let mut para_num = 0;
            loop {
                let para_bbox = linear.bounding_box(PageIteratorLevel::Para);
                row(&mut self.buffer, 3, page_num, block_num + 1, para_num + 1, 0, 0, para_bbox, None, "");

                let mut line_num = 0;
                loop {
                    let line_bbox = linear.bounding_box(PageIteratorLevel::Textline);
                    row(
                        &mut self.buffer,
                        4,
                        page_num,
                        block_num + 1,
                        para_num + 1,
                        line_num + 1,
                        0,
                        line_bbox,
                        None,
                        "",
                    );

                    let cursor = linear.cursor();
                    let block = page.block(page.blocks_order[cursor.block]);
                    let para_h = block.paragraphs[cursor.para];
                    let row_h = page.paragraph(para_h).rows[cursor.row];
                    let words = &page.row(row_h).words;
                    for (word_idx, &word_h) in words.iter().enumerate() {
                        let word = page.word(word_h);
                        let wbox = word.quad.bounding_box();
                        row(
                            &mut self.buffer,
                            5,
                            page_num,
                            block_num + 1,
                            para_num + 1,
                            line_num + 1,
                            word_idx + 1,
                            wbox,
                            Some(word.confidence_percent()),
                            &word.text(session.unicharset()),
                        );
                    }

                    let was_last_line = linear.is_at_final_element(PageIteratorLevel::Para, PageIteratorLevel::Textline);
                    line_num += 1;
                    linear.next(PageIteratorLevel::Textline);
                    if was_last_line {
                        break;
                    }
                }

                let was_last_para = linear.is_at_final_element(PageIteratorLevel::Block, PageIteratorLevel::Para);
                para_num += 1;
                if was_last_para {
                    break;
                }
                linear.next(PageIteratorLevel::Para);
            }

            let was_last_block = linear.is_at_final_element(PageIteratorLevel::Block, PageIteratorLevel::Block);
            block_num += 1;
            if was_last_block {
                break;
            }
            linear.next(PageIteratorLevel::Block);
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn row(
    buffer: &mut String,
    level: u8,
    page_num: i32,
    block_num: usize,
    par_num: usize,
    line_num: usize,
    word_num: usize,
    bbox: crate::page_result::BBox,
    conf: Option<u8>,
    text: &str,
) {
    let conf = match conf {
        Some(c) => c.to_string(),
        None => "-1".to_string(),
    };
    let escaped: String = text.chars().map(|c| if c == '\t' || c == '\n' { ' ' } else { c }).collect();
    writeln!(
        buffer,
        "{level}\t{page_num}\t{block_num}\t{par_num}\t{line_num}\t{word_num}\t{}\t{}\t{}\t{}\t{conf}\t{escaped}",
        bbox.left,
        bbox.top,
        bbox.width(),
        bbox.height()
    )
    .ok();
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
        let r = page.push_row(Row {
            words: vec![w],
            ..Default::default()
        });
        let para = page.push_paragraph(Paragraph {
            rows: vec![r],
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
    fn emits_header_then_one_row_per_level() {
        let (page, unicharset) = one_word_page();
        let fixture = Fixture { page, unicharset };
        let mut r = TsvRenderer::new();
        r.on_begin_document("t").unwrap();
        r.on_add_image(&fixture).unwrap();
        let lines: Vec<&str> = r.buffer().lines().collect();
        assert_eq!(lines[0], HEADER.trim_end());
        // page+block+par+line+word = 5 data rows for a single-word page.
        assert_eq!(lines.len(), 6);
        assert!(lines.last().unwrap().ends_with("A"));
    }

    #[test]
    fn empty_page_emits_only_header() {
        let fixture = Fixture {
            page: PageResult::new(),
            unicharset: UnicharSet::new(),
        };
        let mut r = TsvRenderer::new();
        r.on_begin_document("t").unwrap();
        r.on_add_image(&fixture).unwrap();
        assert_eq!(r.buffer(), HEADER);
    }
}
