//! Iterator hierarchy (§4.2): `LinearIterator` walks a [`PageResult`] in
//! strict left-to-right, top-to-bottom order. [`crate::iterator::reading_order`]
//! builds the bidi-aware `ReadingOrderIterator` on top of it.
//!
//! A cursor is a path of arena indices rather than a pointer chain (§9
//! redesign note): `(block_pos, para_pos, row_pos, word_pos, symbol_pos)`
//! into, respectively, `PageResult::blocks_order` and each parent's
//! `Vec<Handle>` child list.

pub mod reading_order;

use crate::enums::PageIteratorLevel;
use crate::page_result::{BBox, Baseline, PageResult, certainty_to_confidence};

/// Non-owning crop descriptor: an external image codec (out of scope,
/// §1) is responsible for turning this into actual pixels. The iterator's
/// contract (P3) is only that the crop's dimensions equal `bounding_box`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageCrop {
    pub bbox: BBox,
    pub padding: i32,
}

/// Minimum/maximum credible resolution (ppi) a `Session` will accept
/// (§4.1 `set_source_resolution`).
pub const K_MIN_CREDIBLE_RESOLUTION: u32 = 70;
pub const K_MAX_CREDIBLE_RESOLUTION: u32 = 2400;

/// The rectangle-of-interest and scale state shared by every cursor
/// position, set once at iterator construction from the owning
/// `Session` (§3.1 "Iterator state").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFrame {
    pub scale: f32,
    pub scaled_y_resolution: f32,
    pub rect_left: i32,
    pub rect_top: i32,
    pub rect_width: i32,
    pub rect_height: i32,
}

impl CoordinateFrame {
    /// Maps an internal (block-rotated) bounding box to image coordinates
    /// per §4.2's mapping formula, clipped to the rectangle-of-interest.
    /// `re_rotation` undoes the upright-normalization the block underwent
    /// during layout, applied before scaling.
    pub fn map_bbox(&self, internal: BBox, re_rotation: (f32, f32)) -> BBox {
        let rotated = rotate_bbox(internal, re_rotation);
        let scale = if self.scale.abs() < f32::EPSILON { 1.0 } else { self.scale };
        let left = rotated.left as f32 / scale + self.rect_left as f32;
        let top = (self.rect_height as f32 - rotated.top as f32) / scale + self.rect_top as f32;
        let right = (rotated.right as f32 + scale - 1.0) / scale + self.rect_left as f32;
        let bottom = (self.rect_height as f32 - rotated.bottom as f32 + scale - 1.0) / scale + self.rect_top as f32;
        self.clip(BBox::new(left as i32, top as i32, right as i32, bottom as i32))
    }

    fn clip(&self, b: BBox) -> BBox {
        let roi = BBox::new(
            self.rect_left,
            self.rect_top,
            self.rect_left + self.rect_width,
            self.rect_top + self.rect_height,
        );
        BBox::new(
            b.left.clamp(roi.left, roi.right),
            b.top.clamp(roi.top, roi.bottom),
            b.right.clamp(roi.left, roi.right),
            b.bottom.clamp(roi.top, roi.bottom),
        )
    }
}

fn rotate_bbox(b: BBox, (cos_t, sin_t): (f32, f32)) -> BBox {
    if (cos_t - 1.0).abs() < f32::EPSILON && sin_t.abs() < f32::EPSILON {
        return b;
    }
    let corners = [
        (b.left as f32, b.top as f32),
        (b.right as f32, b.top as f32),
        (b.right as f32, b.bottom as f32),
        (b.left as f32, b.bottom as f32),
    ];
    let rotated: Vec<(f32, f32)> = corners
        .iter()
        .map(|&(x, y)| (cos_t * x - sin_t * y, sin_t * x + cos_t * y))
        .collect();
    let xs = rotated.iter().map(|p| p.0);
    let ys = rotated.iter().map(|p| p.1);
    BBox::new(
        xs.clone().fold(f32::INFINITY, f32::min) as i32,
        ys.clone().fold(f32::INFINITY, f32::min) as i32,
        xs.fold(f32::NEG_INFINITY, f32::max) as i32,
        ys.fold(f32::NEG_INFINITY, f32::max) as i32,
    )
}

/// A cursor position: index into `blocks_order`, then into each parent's
/// child-handle vector. `None` at a level means "iterator exhausted at or
/// above that level".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub block: usize,
    pub para: usize,
    pub row: usize,
    pub word: usize,
    pub symbol: usize,
}

/// Walks a `PageResult` strictly left-to-right, top-to-bottom (§4.2).
#[derive(Debug, Clone)]
pub struct LinearIterator<'a> {
    page: &'a PageResult,
    frame: CoordinateFrame,
    cursor: Cursor,
    exhausted: bool,
}

impl<'a> LinearIterator<'a> {
    pub fn begin(page: &'a PageResult, frame: CoordinateFrame) -> Self {
        LinearIterator {
            page,
            frame,
            cursor: Cursor::default(),
            exhausted: page.is_empty(),
        }
    }

    pub fn page(&self) -> &'a PageResult {
        self.page
    }

    pub fn is_empty(&self) -> bool {
        self.exhausted
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn block_handle(&self) -> u32 {
        self.page.blocks_order[self.cursor.block]
    }

    fn para_handle(&self) -> u32 {
        self.page.block(self.block_handle()).paragraphs[self.cursor.para]
    }

    fn row_handle(&self) -> u32 {
        self.page.paragraph(self.para_handle()).rows[self.cursor.row]
    }

    fn word_handle(&self) -> u32 {
        self.page.row(self.row_handle()).words[self.cursor.word]
    }

    /// Advances the cursor to the next element at `level`, carrying any
    /// coarser levels forward as needed. Returns `false` once the page is
    /// exhausted.
    pub fn next(&mut self, level: PageIteratorLevel) -> bool {
        if self.exhausted {
            return false;
        }
        match level {
            PageIteratorLevel::Symbol => {
                let word = self.page.word(self.word_handle());
                if self.cursor.symbol + 1 < word.symbols.len() {
                    self.cursor.symbol += 1;
                    return true;
                }
                self.cursor.symbol = 0;
                self.advance_word()
            }
            PageIteratorLevel::Word => {
                self.cursor.symbol = 0;
                self.advance_word()
            }
            PageIteratorLevel::Textline => {
                self.cursor.symbol = 0;
                self.cursor.word = 0;
                self.advance_row()
            }
            PageIteratorLevel::Para => {
                self.cursor.symbol = 0;
                self.cursor.word = 0;
                self.cursor.row = 0;
                self.advance_para()
            }
            PageIteratorLevel::Block => {
                self.cursor.symbol = 0;
                self.cursor.word = 0;
                self.cursor.row = 0;
                self.cursor.para = 0;
                self.advance_block()
            }
        }
    }

    fn advance_word(&mut self) -> bool {
        let row = self.page.row(self.row_handle());
        if self.cursor.word + 1 < row.words.len() {
            self.cursor.word += 1;
            return true;
        }
        self.cursor.word = 0;
        self.advance_row()
    }

    fn advance_row(&mut self) -> bool {
        let para = self.page.paragraph(self.para_handle());
        if self.cursor.row + 1 < para.rows.len() {
            self.cursor.row += 1;
            return true;
        }
        self.cursor.row = 0;
        self.advance_para()
    }

    fn advance_para(&mut self) -> bool {
        let block = self.page.block(self.block_handle());
        if self.cursor.para + 1 < block.paragraphs.len() {
            self.cursor.para += 1;
            return true;
        }
        self.cursor.para = 0;
        self.advance_block()
    }

    fn advance_block(&mut self) -> bool {
        if self.cursor.block + 1 < self.page.blocks_order.len() {
            self.cursor.block += 1;
            true
        } else {
            self.exhausted = true;
            false
        }
    }

    /// True when the cursor sits on the first element of `level`'s
    /// enclosing parent.
    pub fn is_at_beginning_of(&self, level: PageIteratorLevel) -> bool {
        match level {
            PageIteratorLevel::Block => self.cursor.block == 0,
            PageIteratorLevel::Para => self.cursor.para == 0,
            PageIteratorLevel::Textline => self.cursor.row == 0,
            PageIteratorLevel::Word => self.cursor.word == 0,
            PageIteratorLevel::Symbol => self.cursor.symbol == 0,
        }
    }

    /// True when the cursor sits on the last element of `this_level`
    /// within its `parent_level` container.
    pub fn is_at_final_element(&self, parent_level: PageIteratorLevel, this_level: PageIteratorLevel) -> bool {
        let _ = parent_level;
        match this_level {
            PageIteratorLevel::Block => self.cursor.block + 1 == self.page.blocks_order.len(),
            PageIteratorLevel::Para => {
                self.cursor.para + 1 == self.page.block(self.block_handle()).paragraphs.len()
            }
            PageIteratorLevel::Textline => {
                self.cursor.row + 1 == self.page.paragraph(self.para_handle()).rows.len()
            }
            PageIteratorLevel::Word => self.cursor.word + 1 == self.page.row(self.row_handle()).words.len(),
            PageIteratorLevel::Symbol => {
                self.cursor.symbol + 1 == self.page.word(self.word_handle()).symbols.len()
            }
        }
    }

    pub fn block_type(&self) -> crate::enums::PolyBlockType {
        self.page.block(self.block_handle()).block_type
    }

    /// Bounding box of the element at `level` in image coordinates,
    /// computed through the shared coordinate-mapping transform (§4.2),
    /// so that it always agrees with `binary_image`/`greyscale_image`.
    pub fn bounding_box(&self, level: PageIteratorLevel) -> BBox {
        let block = self.page.block(self.block_handle());
        let internal = match level {
            PageIteratorLevel::Block => block.bbox,
            PageIteratorLevel::Para => self.page.paragraph(self.para_handle()).bbox,
            PageIteratorLevel::Textline => self.page.row(self.row_handle()).bbox,
            PageIteratorLevel::Word => self.page.word(self.word_handle()).quad.bounding_box(),
            PageIteratorLevel::Symbol => self.page.word(self.word_handle()).symbols[self.cursor.symbol].bbox,
        };
        self.frame.map_bbox(internal, block.re_rotation)
    }

    pub fn binary_image(&self, level: PageIteratorLevel) -> ImageCrop {
        ImageCrop {
            bbox: self.bounding_box(level),
            padding: 0,
        }
    }

    pub fn greyscale_image(&self, level: PageIteratorLevel, padding: i32) -> ImageCrop {
        ImageCrop {
            bbox: self.bounding_box(level),
            padding,
        }
    }

    pub fn baseline(&self, level: PageIteratorLevel) -> Baseline {
        match level {
            PageIteratorLevel::Textline | PageIteratorLevel::Para | PageIteratorLevel::Block => {
                self.page.row(self.row_handle()).baseline
            }
            PageIteratorLevel::Word | PageIteratorLevel::Symbol => self.page.word(self.word_handle()).baseline,
        }
    }

    /// Font size in points from the row's x-height metrics (§4.2.4):
    /// `points = row_xheight * cell_over_xheight * 72 / scaled_y_resolution`.
    pub fn font_size_points(&self, cell_over_xheight: f32) -> u32 {
        let row = self.page.row(self.row_handle());
        let yres = if self.frame.scaled_y_resolution.abs() < f32::EPSILON {
            1.0
        } else {
            self.frame.scaled_y_resolution
        };
        (row.x_height * cell_over_xheight * 72.0 / yres).round() as u32
    }

    /// Confidence at `level`: symbol level returns the best choice's
    /// clamped percentage; word/line/paragraph/block average over
    /// contained words (§4.2.4).
    pub fn confidence(&self, level: PageIteratorLevel) -> u8 {
        match level {
            PageIteratorLevel::Symbol => self
                .page
                .word(self.word_handle())
                .symbols
                .get(self.cursor.symbol)
                .and_then(|s| s.best())
                .map(|c| certainty_to_confidence(c.certainty))
                .unwrap_or(0),
            PageIteratorLevel::Word => self.page.word(self.word_handle()).confidence_percent(),
            PageIteratorLevel::Textline => self.average_confidence(self.page.row(self.row_handle()).words.iter()),
            PageIteratorLevel::Para => {
                let rows = &self.page.paragraph(self.para_handle()).rows;
                let words: Vec<u32> = rows
                    .iter()
                    .flat_map(|&r| self.page.row(r).words.clone())
                    .collect();
                self.average_confidence(words.iter())
            }
            PageIteratorLevel::Block => {
                let paras = &self.page.block(self.block_handle()).paragraphs;
                let words: Vec<u32> = paras
                    .iter()
                    .flat_map(|&p| self.page.paragraph(p).rows.iter().flat_map(|&r| self.page.row(r).words.clone()))
                    .collect();
                self.average_confidence(words.iter())
            }
        }
    }

    fn average_confidence<'w>(&self, words: impl Iterator<Item = &'w u32>) -> u8 {
        let mut total = 0u32;
        let mut count = 0u32;
        for &h in words {
            total += self.page.word(h).confidence_percent() as u32;
            count += 1;
        }
        if count == 0 { 0 } else { (total / count) as u8 }
    }

    pub fn word_font(&self) -> &crate::page_result::FontAttributes {
        &self.page.word(self.word_handle()).font
    }

    pub fn word_is_numeric(&self) -> bool {
        self.page.word(self.word_handle()).is_numeric
    }

    pub fn word_from_dictionary(&self) -> bool {
        self.page.word(self.word_handle()).from_dictionary
    }

    pub fn symbol_superscript(&self) -> bool {
        self.page.word(self.word_handle()).symbols[self.cursor.symbol].superscript
    }

    pub fn symbol_subscript(&self) -> bool {
        self.page.word(self.word_handle()).symbols[self.cursor.symbol].subscript
    }

    pub fn symbol_dropcap(&self) -> bool {
        self.page.word(self.word_handle()).symbols[self.cursor.symbol].dropcap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{PermuterTag, PolyBlockType, WritingDirection};
    use crate::page_result::{Block, Choice, FontAttributes, Paragraph, Quad, Row, Symbol, Word};

    fn identity_frame() -> CoordinateFrame {
        CoordinateFrame {
            scale: 1.0,
            scaled_y_resolution: 300.0,
            rect_left: 0,
            rect_top: 0,
            rect_width: 1000,
            rect_height: 1000,
        }
    }

    fn word_with_symbols(n: usize) -> Word {
        Word {
            quad: Quad::from_bbox(BBox::new(0, 0, 10 * n as i32, 10)),
            baseline: Baseline::default(),
            symbols: (0..n)
                .map(|i| Symbol {
                    bbox: BBox::new(i as i32 * 10, 0, i as i32 * 10 + 10, 10),
                    choices: vec![Choice {
                        unichar_id: 0,
                        certainty: 0.0,
                    }],
                    best_choice: Some(0),
                    superscript: false,
                    subscript: false,
                    dropcap: false,
                })
                .collect(),
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

    fn two_word_page() -> PageResult {
        let mut page = PageResult::new();
        let w1 = page.push_word(word_with_symbols(2));
        let w2 = page.push_word(word_with_symbols(3));
        let row = page.push_row(Row {
            words: vec![w1, w2],
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
        page
    }

    #[test]
    fn symbol_level_visits_every_symbol_in_order() {
        let page = two_word_page();
        let mut it = LinearIterator::begin(&page, identity_frame());
        let mut count = 1;
        while it.next(PageIteratorLevel::Symbol) {
            count += 1;
        }
        assert_eq!(count, 5); // P1: 2 + 3 symbols total
    }

    #[test]
    fn word_level_skips_to_next_word() {
        let page = two_word_page();
        let mut it = LinearIterator::begin(&page, identity_frame());
        assert_eq!(it.cursor().word, 0);
        assert!(it.next(PageIteratorLevel::Word));
        assert_eq!(it.cursor().word, 1);
        assert!(!it.next(PageIteratorLevel::Word));
    }

    #[test]
    fn is_at_final_element_at_last_word() {
        let page = two_word_page();
        let mut it = LinearIterator::begin(&page, identity_frame());
        it.next(PageIteratorLevel::Word);
        assert!(it.is_at_final_element(PageIteratorLevel::Textline, PageIteratorLevel::Word));
    }

    #[test]
    fn bounding_box_matches_binary_image_dims() {
        let page = two_word_page();
        let it = LinearIterator::begin(&page, identity_frame());
        let bbox = it.bounding_box(PageIteratorLevel::Word);
        let crop = it.binary_image(PageIteratorLevel::Word);
        assert_eq!(bbox, crop.bbox); // P3
    }
}
