//! `PageResult`: the recognized-page object graph (§3.1, §3.2).
//!
//! Expressed as arena-allocated nodes indexed by integer handles rather
//! than a pointer graph with parent/prev back-links, per the redesign
//! guidance for systems languages: a [`PageResult`] owns four flat arenas
//! (blocks, paragraphs, rows, words) plus each word's symbol and choice
//! vectors, and every parent-child edge is a `Vec<Handle>` of indices into
//! the child arena. Iterators (see [`crate::iterator`]) hold a
//! `(&PageResult, path-of-indices)` pair instead of a cursor of raw
//! pointers.

use crate::enums::{PermuterTag, PolyBlockType, WritingDirection};

/// Handle into one of `PageResult`'s arenas. Indices are stable for the
/// lifetime of the `PageResult` that produced them; a `PageResult` is
/// immutable once built except through whole-graph replacement (§3.2).
pub type Handle = u32;

/// Axis-aligned bounding box in pixel-crack coordinates (§3.2): the
/// top-left pixel of the image has bounding box `(0,0)->(1,1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        BBox { left, top, right, bottom }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_valid(&self) -> bool {
        self.left < self.right && self.top < self.bottom
    }
}

/// A word's bounding quadrilateral: four corners, clockwise from top-left.
/// Axis-aligned words degenerate to a rectangle's four corners; rotated
/// words (vertical text, skewed baselines) use all four independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [(f32, f32); 4],
}

impl Quad {
    pub fn from_bbox(b: BBox) -> Self {
        Quad {
            points: [
                (b.left as f32, b.top as f32),
                (b.right as f32, b.top as f32),
                (b.right as f32, b.bottom as f32),
                (b.left as f32, b.bottom as f32),
            ],
        }
    }

    pub fn bounding_box(&self) -> BBox {
        let xs = self.points.map(|p| p.0);
        let ys = self.points.map(|p| p.1);
        BBox {
            left: xs.iter().cloned().fold(f32::INFINITY, f32::min) as i32,
            top: ys.iter().cloned().fold(f32::INFINITY, f32::min) as i32,
            right: xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max) as i32,
            bottom: ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max) as i32,
        }
    }
}

/// A notional baseline `(x1,y1) -> (x2,y2)` on which non-descender
/// characters rest (GLOSSARY "Baseline").
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Baseline {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Baseline {
    /// Line slope `m` and intercept `c`, with the bottom-left of a word's
    /// bounding box as origin, as hOCR's `title` attribute requires
    /// (§6.3).
    pub fn slope_intercept(&self, origin_x: f32, origin_y: f32) -> (f32, f32) {
        let dx = self.x2 - self.x1;
        if dx.abs() < f32::EPSILON {
            return (0.0, self.y1 - origin_y);
        }
        let m = (self.y2 - self.y1) / dx;
        let c = (self.y1 - origin_y) - m * (self.x1 - origin_x);
        (m, c)
    }
}

/// Bold/italic/underline/monospace/serif/small-caps bundle plus font id
/// and point size, carried on every `Word` (§3.1).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontAttributes {
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub monospace: bool,
    pub serif: bool,
    pub smallcaps: bool,
    pub pointsize: u32,
    pub font_id: i32,
}

/// One candidate reading for a symbol, with its per-symbol certainty
/// (GLOSSARY "Certainty": an internal negative-or-zero classifier score).
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub unichar_id: u32,
    pub certainty: f32,
}

impl Choice {
    /// Maps internal certainty to a clamped 0-100 confidence percentage
    /// (§4.1, P4): `clamp(round(100 + 5c), 0, 100)`.
    pub fn confidence_percent(&self) -> u8 {
        certainty_to_confidence(self.certainty)
    }
}

/// Maps an internal certainty score to the 0-100 confidence percentage
/// contract shared by `Session::mean_text_confidence`,
/// `Session::all_word_confidences`, and `Iterator::confidence` (§4.1,
/// §4.2.4, P4).
pub fn certainty_to_confidence(certainty: f32) -> u8 {
    let pct = (100.0 + 5.0 * certainty).round();
    pct.clamp(0.0, 100.0) as u8
}

/// One recognized glyph within a word.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub bbox: BBox,
    pub choices: Vec<Choice>,
    pub best_choice: Option<usize>,
    pub superscript: bool,
    pub subscript: bool,
    pub dropcap: bool,
}

impl Symbol {
    pub fn best(&self) -> Option<&Choice> {
        self.best_choice.and_then(|i| self.choices.get(i))
    }
}

/// One recognized word: a bounding quad, a best-choice symbol sequence,
/// and the metadata carried per §3.1.
#[derive(Debug, Clone)]
pub struct Word {
    pub quad: Quad,
    pub baseline: Baseline,
    pub symbols: Vec<Symbol>,
    pub certainty: f32,
    pub permuter_tag: PermuterTag,
    pub rejected: bool,
    pub font: FontAttributes,
    pub direction: WritingDirection,
    pub is_numeric: bool,
    pub from_dictionary: bool,
    pub blanks_before: u32,
}

impl Word {
    /// Symbol count of the best choice must equal the box-word length
    /// (§3.2 invariant); a word with no symbols is a valid empty word.
    pub fn best_choice_len(&self) -> usize {
        self.symbols.len()
    }

    pub fn confidence_percent(&self) -> u8 {
        certainty_to_confidence(self.certainty)
    }

    pub fn text(&self, unicharset: &crate::unicharset::UnicharSet) -> String {
        self.symbols
            .iter()
            .filter_map(|s| s.best())
            .filter_map(|c| unicharset.id_to_unichar(c.unichar_id))
            .collect()
    }
}

/// One textline: an ordered run of words.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub bbox: BBox,
    pub baseline: Baseline,
    pub words: Vec<Handle>,
    /// Row x-height, used by the font-size formula in §4.2.4.
    pub x_height: f32,
}

/// A paragraph: an ordered run of rows plus its inferred direction.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub bbox: BBox,
    pub rows: Vec<Handle>,
    /// Decided once per paragraph and stable for the PageResult's lifetime
    /// (§3.2 invariant).
    pub is_ltr: Option<bool>,
}

/// A block: bounding box, type tag, re-rotation vector, and its
/// paragraph partition (§3.1).
#[derive(Debug, Clone)]
pub struct Block {
    pub bbox: BBox,
    pub block_type: PolyBlockType,
    /// `(cos theta, sin theta)` describing how the block was rotated to
    /// reach upright internal coordinates; applied before scaling when
    /// mapping back to image coordinates (§4.2).
    pub re_rotation: (f32, f32),
    pub classify_rotation: (f32, f32),
    pub paragraphs: Vec<Handle>,
}

impl Default for Block {
    fn default() -> Self {
        Block {
            bbox: BBox::default(),
            block_type: PolyBlockType::default(),
            re_rotation: (1.0, 0.0),
            classify_rotation: (1.0, 0.0),
            paragraphs: Vec::new(),
        }
    }
}

/// The recognized-page object graph: a directed tree of
/// `Block -> Paragraph -> Row -> Word -> Symbol`, owned exclusively by the
/// `PageResult` (§3.1 Ownership).
#[derive(Debug, Clone, Default)]
pub struct PageResult {
    blocks: Vec<Block>,
    paragraphs: Vec<Paragraph>,
    rows: Vec<Row>,
    words: Vec<Word>,
    pub blocks_order: Vec<Handle>,
}

impl PageResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&self, h: Handle) -> &Block {
        &self.blocks[h as usize]
    }

    pub fn paragraph(&self, h: Handle) -> &Paragraph {
        &self.paragraphs[h as usize]
    }

    pub fn row(&self, h: Handle) -> &Row {
        &self.rows[h as usize]
    }

    pub fn word(&self, h: Handle) -> &Word {
        &self.words[h as usize]
    }

    pub fn block_count(&self) -> usize {
        self.blocks_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks_order.is_empty()
    }

    /// Appends a block and returns its handle. Builders populate
    /// `paragraphs`/`rows`/`words` first (bottom-up) so that each parent's
    /// child handle list can reference already-inserted arena entries.
    pub fn push_block(&mut self, block: Block) -> Handle {
        let h = self.blocks.len() as Handle;
        self.blocks.push(block);
        self.blocks_order.push(h);
        h
    }

    pub fn push_paragraph(&mut self, p: Paragraph) -> Handle {
        let h = self.paragraphs.len() as Handle;
        self.paragraphs.push(p);
        h
    }

    pub fn push_row(&mut self, r: Row) -> Handle {
        let h = self.rows.len() as Handle;
        self.rows.push(r);
        h
    }

    pub fn push_word(&mut self, w: Word) -> Handle {
        let h = self.words.len() as Handle;
        self.words.push(w);
        h
    }

    /// Mean confidence over every word in the page (§4.1
    /// `mean_text_confidence`), 0 for an empty page.
    pub fn mean_text_confidence(&self) -> u8 {
        let confidences = self.all_word_confidences();
        if confidences.is_empty() {
            return 0;
        }
        let sum: u32 = confidences.iter().map(|&c| c as u32).sum();
        (sum / confidences.len() as u32) as u8
    }

    /// Word confidences in the same left-to-right-then-top-down order as
    /// `LinearIterator` (§5 ordering guarantee).
    pub fn all_word_confidences(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for &block_h in &self.blocks_order {
            for &para_h in &self.block(block_h).paragraphs {
                for &row_h in &self.paragraph(para_h).rows {
                    for &word_h in &self.row(row_h).words {
                        out.push(self.word(word_h).confidence_percent());
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_word(certainty: f32) -> Word {
        Word {
            quad: Quad::from_bbox(BBox::new(0, 0, 10, 10)),
            baseline: Baseline::default(),
            symbols: Vec::new(),
            certainty,
            permuter_tag: PermuterTag::default(),
            rejected: false,
            font: FontAttributes::default(),
            direction: WritingDirection::LeftToRight,
            is_numeric: false,
            from_dictionary: false,
            blanks_before: 1,
        }
    }

    #[test]
    fn certainty_to_confidence_clamps() {
        assert_eq!(certainty_to_confidence(0.0), 100);
        assert_eq!(certainty_to_confidence(-30.0), 0);
        assert_eq!(certainty_to_confidence(-2.0), 90);
    }

    #[test]
    fn mean_text_confidence_over_words() {
        let mut page = PageResult::new();
        let w1 = page.push_word(sample_word(0.0));
        let w2 = page.push_word(sample_word(-4.0));
        let row = page.push_row(Row {
            words: vec![w1, w2],
            ..Default::default()
        });
        let para = page.push_paragraph(Paragraph {
            rows: vec![row],
            ..Default::default()
        });
        page.push_block(Block {
            paragraphs: vec![para],
            ..Default::default()
        });
        assert_eq!(page.all_word_confidences(), vec![100, 80]);
        assert_eq!(page.mean_text_confidence(), 90);
    }

    #[test]
    fn empty_page_has_zero_mean_confidence() {
        let page = PageResult::new();
        assert!(page.is_empty());
        assert_eq!(page.mean_text_confidence(), 0);
    }

    #[test]
    fn bbox_validity() {
        assert!(BBox::new(0, 0, 1, 1).is_valid());
        assert!(!BBox::new(5, 5, 5, 5).is_valid());
    }

    #[test]
    fn quad_bounding_box_from_rotated_points() {
        let quad = Quad {
            points: [(2.0, 0.0), (12.0, 2.0), (10.0, 12.0), (0.0, 10.0)],
        };
        let bbox = quad.bounding_box();
        assert_eq!(bbox.left, 0);
        assert_eq!(bbox.right, 12);
    }
}
