//! UNLV renderer (§6.3): Latin-1 text with `~` reject and `^` suspect
//! markers, and a fixed table of non-Latin fallback substitutions.

use super::{RenderableSession, RendererHandler};
use crate::error::Result;
use crate::iterator::LinearIterator;
use crate::iterator::reading_order::{OrderToken, ReadingOrderIterator};

/// Below this confidence a recognized word is marked suspect (`^`) rather
/// than trusted outright, mirroring the reject-vs-suspect split Tesseract's
/// UNLV writer makes on certainty.
const SUSPECT_CONFIDENCE: u8 = 80;

fn latin1_fallback(c: char) -> char {
    match c {
        '\u{20AC}' => '\u{00A2}',
        '\u{201C}' | '\u{201D}' => '\u{0022}',
        '\u{2018}' | '\u{2019}' => '\u{0027}',
        '\u{2022}' => '\u{00B7}',
        '\u{2014}' => '\u{002D}',
        _ => c,
    }
}

#[derive(Debug, Default)]
pub struct UnlvRenderer {
    buffer: String,
}

impl UnlvRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

impl RendererHandler for UnlvRenderer {
    fn file_extension(&self) -> &'static str {
        "unlv"
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        let page = session.page_result();
        if page.is_empty() {
            return Ok(());
        }
        let linear = LinearIterator::begin(page, session.coordinate_frame());
        let mut it = ReadingOrderIterator::new(linear, session.unicharset());
        loop {
            for (token_idx, token) in it.textline_order().into_iter().enumerate() {
                if token_idx > 0 {
                    self.buffer.push(' ');
                }
                match token {
                    OrderToken::Word(idx) => self.push_word(page, session, &it, idx),
                    _ => {}
                }
            }
            self.buffer.push('\n');
            let was_last = it.is_at_last_textline_of_paragraph();
            if !it.next_textline() {
                break;
            }
            if was_last {
                self.buffer.push('\n');
            }
        }
        Ok(())
    }
}

impl UnlvRenderer {
    fn push_word(&mut self, page: &crate::page_result::PageResult, session: &dyn RenderableSession, it: &ReadingOrderIterator, idx: usize) {
        let cursor = it.cursor();
        let block = page.block(page.blocks_order[cursor.block]);
        let row_h = page.paragraph(block.paragraphs[cursor.para]).rows[cursor.row];
        let word = page.word(page.row(row_h).words[idx]);
        let text = word.text(session.unicharset());
        let marker = if word.rejected {
            Some('~')
        } else if word.confidence_percent() < SUSPECT_CONFIDENCE {
            Some('^')
        } else {
            None
        };
        for c in text.chars() {
            self.buffer.push(latin1_fallback(c));
        }
        if let Some(m) = marker {
            self.buffer.push(m);
        }
    }
}
