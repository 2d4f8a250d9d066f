//! Plain-text renderer (§6.3): UTF-8, line separator U+000A, an extra
//! U+000A between paragraphs, with bidi marks per §4.2.4.

use super::{RenderableSession, RendererHandler};
use crate::error::Result;
use crate::iterator::LinearIterator;
use crate::iterator::reading_order::ReadingOrderIterator;

/// Accumulates one page's worth of text per `add_image` call, buffered in
/// memory; a real sink writes `take_buffer()` out to a file or stdout
/// between pages.
#[derive(Debug, Default)]
pub struct TextRenderer {
    buffer: String,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

impl RendererHandler for TextRenderer {
    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        let page = session.page_result();
        if page.is_empty() {
            return Ok(());
        }
        let linear = LinearIterator::begin(page, session.coordinate_frame());
        let mut it = ReadingOrderIterator::new(linear, session.unicharset());
        loop {
            self.buffer.push_str(&it.textline_text(session.preserve_interword_spaces()));
            self.buffer.push('\n');
            let was_last_row_in_para = it.is_at_last_textline_of_paragraph();
            if !it.next_textline() {
                break;
            }
            if was_last_row_in_para {
                self.buffer.push('\n');
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{PermuterTag, PolyBlockType, WritingDirection};
    use crate::page_result::{BBox, Baseline, Block, Choice, FontAttributes, PageResult, Paragraph, Quad, Row, Symbol, Word};
    use crate::unicharset::UnicharSet;

    fn word(unicharset: &mut UnicharSet, text: &str) -> Word {
        let symbols = text
            .chars()
            .map(|c| {
                let id = unicharset.insert(&c.to_string(), UnicharSet::classify_char(c));
                Symbol {
                    bbox: BBox::new(0, 0, 10, 10),
                    choices: vec![Choice { unichar_id: id, certainty: 0.0 }],
                    best_choice: Some(0),
                    superscript: false,
                    subscript: false,
                    dropcap: false,
                }
            })
            .collect();
        Word {
            quad: Quad::from_bbox(BBox::new(0, 0, 10, 10)),
            baseline: Baseline::default(),
            symbols,
            certainty: 0.0,
            permuter_tag: PermuterTag::default(),
            rejected: false,
            font: FontAttributes::default(),
            direction: WritingDirection::LeftToRight,
            is_numeric: false,
            from_dictionary: false,
            blanks_before: 1,
        }
    }

    struct Fixture {
        page: PageResult,
        unicharset: UnicharSet,
    }

    impl super::RenderableSession for Fixture {
        fn page_result(&self) -> &PageResult {
            &self.page
        }
        fn unicharset(&self) -> &UnicharSet {
            &self.unicharset
        }
        fn coordinate_frame(&self) -> crate::iterator::CoordinateFrame {
            crate::iterator::CoordinateFrame {
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

    #[test]
    fn renders_one_line_per_textline_with_trailing_newline() {
        let mut unicharset = UnicharSet::new();
        let w1 = word(&mut unicharset, "Hi");
        let mut page = PageResult::new();
        let wh = page.push_word(w1);
        let row = page.push_row(Row {
            words: vec![wh],
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

        let fixture = Fixture { page, unicharset };
        let mut renderer = TextRenderer::new();
        renderer.on_add_image(&fixture).unwrap();
        assert_eq!(renderer.buffer(), "Hi\n");
    }

    #[test]
    fn empty_page_renders_empty_buffer() {
        let fixture = Fixture {
            page: PageResult::new(),
            unicharset: UnicharSet::new(),
        };
        let mut renderer = TextRenderer::new();
        renderer.on_add_image(&fixture).unwrap();
        assert_eq!(renderer.buffer(), "");
    }
}
