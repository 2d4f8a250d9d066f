//! Box-file renderer and its `WordStr`/LSTM variants (§4.4, §6.3): one
//! line per symbol (or per word, for the WordStr/LSTM variants), `TEXT
//! LEFT BOTTOM RIGHT TOP PAGE`, y measured bottom-up, space -> `~`.

use super::{RenderableSession, RendererHandler};
use crate::enums::PageIteratorLevel;
use crate::error::Result;
use crate::iterator::LinearIterator;
use std::fmt::Write as _;

fn tilde_space(s: &str) -> String {
    s.chars().map(|c| if c == ' ' { '~' } else { c }).collect()
}

/// Flips a top-down image-coordinate bbox to the box file's bottom-up
/// `(left, bottom, right, top)` tuple, given the page's pixel height.
fn bottom_up(bbox: crate::page_result::BBox, image_height: i32) -> (i32, i32, i32, i32) {
    (bbox.left, image_height - bbox.bottom, bbox.right, image_height - bbox.top)
}

#[derive(Debug, Default)]
pub struct BoxFileRenderer {
    buffer: String,
    /// Emit one line per word (WordStr/LSTM variants) instead of per
    /// symbol; LSTM additionally folds a word's symbols together without
    /// the `WordStr` marker glyph.
    word_level: bool,
}

impl BoxFileRenderer {
    /// Classic per-symbol box file.
    pub fn new() -> Self {
        Self::default()
    }

    /// `WordStr`/LSTM box file: one line per word instead of per symbol.
    pub fn new_word_level() -> Self {
        BoxFileRenderer {
            buffer: String::new(),
            word_level: true,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

impl RendererHandler for BoxFileRenderer {
    fn file_extension(&self) -> &'static str {
        "box"
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        let page = session.page_result();
        if page.is_empty() {
            return Ok(());
        }
        let frame = session.coordinate_frame();
        let image_height = frame.rect_height;
        let page_num = session.page_number();

        let mut linear = LinearIterator::begin(page, frame);
        loop {
            let cursor = linear.cursor();
            let block = page.block(page.blocks_order[cursor.block]);
            let row = page.row(page.paragraph(block.paragraphs[cursor.para]).rows[cursor.row]);
            let word = page.word(row.words[cursor.word]);

            if self.word_level {
                let img_box = frame.map_bbox(word.quad.bounding_box(), block.re_rotation);
                let (l, b, r, t) = bottom_up(img_box, image_height);
                writeln!(self.buffer, "{} {} {} {} {} {}", tilde_space(&word.text(session.unicharset())), l, b, r, t, page_num).ok();
            } else {
                for symbol in &word.symbols {
                    let img_box = frame.map_bbox(symbol.bbox, block.re_rotation);
                    let (l, b, r, t) = bottom_up(img_box, image_height);
                    let text = symbol
                        .best()
                        .and_then(|choice| session.unicharset().id_to_unichar(choice.unichar_id))
                        .unwrap_or("");
                    writeln!(self.buffer, "{} {} {} {} {} {}", tilde_space(text), l, b, r, t, page_num).ok();
                }
            }

            if !linear.next(PageIteratorLevel::Word) {
                break;
            }
        }
        Ok(())
    }
}
