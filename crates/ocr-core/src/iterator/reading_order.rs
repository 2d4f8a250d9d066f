//! Bidirectional reading-order logic (§4.2.1-§4.2.4).
//!
//! Ported algorithm-for-algorithm from the reference recognizer's
//! `ResultIterator::CurrentParagraphIsLtr`, `CalculateTextlineOrder`, and
//! `CalculateBlobOrder`: the three functions below are not a
//! reinterpretation, they reproduce the same scan order and tie-breaking
//! rules so that reading order matches bit-for-bit on the same input.

use crate::enums::{BidiClass, PageIteratorLevel, StrongDirection};
use crate::page_result::Word;

/// Sentinel-bearing element of a textline's reading order (§4.2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderToken {
    Word(usize),
    MinorRunStart,
    MinorRunEnd,
    ComplexWord,
}

/// §4.2.1 paragraph-direction inference: majority rule with the two
/// leftmost/rightmost exceptions. `first_line` is every word's direction
/// in the paragraph's first textline, in left-to-right visual order;
/// `paragraph` is every word's direction across the whole paragraph in
/// the same order.
pub fn infer_paragraph_is_ltr(first_line: &[StrongDirection], paragraph: &[StrongDirection]) -> bool {
    if first_line.is_empty() {
        return true;
    }
    let leftmost_rtl = first_line[0] == StrongDirection::Rtl;
    let rightmost_ltr = first_line[first_line.len() - 1] == StrongDirection::Ltr;
    if leftmost_rtl {
        return false;
    }
    if rightmost_ltr {
        return true;
    }
    let num_rtl = paragraph.iter().filter(|&&d| d == StrongDirection::Rtl).count();
    let num_ltr = paragraph.iter().filter(|&&d| d == StrongDirection::Ltr).count();
    num_ltr >= num_rtl
}

/// §4.2.2: produces the reading order of a textline's words, interleaved
/// with `MinorRunStart`/`MinorRunEnd`/`ComplexWord` sentinels. `word_dirs`
/// is in left-to-right visual order regardless of `paragraph_is_ltr`.
pub fn calculate_textline_order(paragraph_is_ltr: bool, word_dirs: &[StrongDirection]) -> Vec<OrderToken> {
    let mut order = Vec::new();
    if word_dirs.is_empty() {
        return order;
    }

    let n = word_dirs.len() as isize;
    let (mut start, end, major_step, major_direction, minor_direction): (isize, isize, isize, StrongDirection, StrongDirection);
    if paragraph_is_ltr {
        start = 0;
        end = n;
        major_step = 1;
        major_direction = StrongDirection::Ltr;
        minor_direction = StrongDirection::Rtl;
    } else {
        start = n - 1;
        end = -1;
        major_step = -1;
        major_direction = StrongDirection::Rtl;
        minor_direction = StrongDirection::Ltr;

        // Trailing neutrals followed by an LTR word at the line end are
        // folded into a single LTR minor run (§4.2.2 special case).
        if word_dirs[start as usize] == StrongDirection::Neutral {
            let mut neutral_end = start;
            while neutral_end > 0 && word_dirs[neutral_end as usize] == StrongDirection::Neutral {
                neutral_end -= 1;
            }
            if neutral_end >= 0 && word_dirs[neutral_end as usize] == StrongDirection::Ltr {
                let mut left = neutral_end;
                let mut i = left;
                while i >= 0 && word_dirs[i as usize] != StrongDirection::Rtl {
                    if word_dirs[i as usize] == StrongDirection::Ltr {
                        left = i;
                    }
                    i -= 1;
                }
                order.push(OrderToken::MinorRunStart);
                for i in left..n {
                    order.push(OrderToken::Word(i as usize));
                    if word_dirs[i as usize] == StrongDirection::Mix {
                        order.push(OrderToken::ComplexWord);
                    }
                }
                order.push(OrderToken::MinorRunEnd);
                start = left - 1;
            }
        }
    }

    let mut i = start;
    while i != end {
        if word_dirs[i as usize] == minor_direction {
            let mut j = i;
            while j != end && word_dirs[j as usize] != major_direction {
                j += major_step;
            }
            if j == end {
                j -= major_step;
            }
            while j != i && word_dirs[j as usize] != minor_direction {
                j -= major_step;
            }
            // [j..i] (stepping by major_step) is a minor-direction run.
            order.push(OrderToken::MinorRunStart);
            let mut k = j;
            while k != i {
                order.push(OrderToken::Word(k as usize));
                k -= major_step;
            }
            order.push(OrderToken::Word(i as usize));
            order.push(OrderToken::MinorRunEnd);
            i = j + major_step;
        } else {
            order.push(OrderToken::Word(i as usize));
            if word_dirs[i as usize] == StrongDirection::Mix {
                order.push(OrderToken::ComplexWord);
            }
            i += major_step;
        }
    }
    let _ = major_direction;
    order
}

/// Strips sentinels, yielding the word-index permutation (used by P2's
/// self-check and by output-generation passes that just need visit order).
pub fn word_order(tokens: &[OrderToken]) -> Vec<usize> {
    tokens
        .iter()
        .filter_map(|t| match t {
            OrderToken::Word(i) => Some(*i),
            _ => None,
        })
        .collect()
}

/// §4.2.3: reorders a word's symbols for display when the word is read in
/// an RTL context but its symbols are stored left-to-right. Returns blob
/// indices in logical reading order; if `context_is_ltr` or the word is
/// already tagged as stored in reading order, the identity order is
/// returned untouched.
pub fn calculate_blob_order(context_is_ltr: bool, already_in_reading_order: bool, classes: &[BidiClass]) -> Vec<usize> {
    let n = classes.len();
    if context_is_ltr || already_in_reading_order {
        return (0..n).collect();
    }

    let mut types = classes.to_vec();

    // Step 1: collapse ET*EN+((ES|CS)?EN+)*ET* sequences to EN.
    for i in 0..n.saturating_sub(2) {
        if types[i] == BidiClass::En
            && types[i + 2] == BidiClass::En
            && matches!(types[i + 1], BidiClass::Es | BidiClass::Cs)
        {
            types[i + 1] = BidiClass::En;
        }
    }
    let mut i = 0;
    while i < n {
        if types[i] == BidiClass::Et {
            let mut j = i + 1;
            while j < n && types[j] == BidiClass::Et {
                j += 1;
            }
            if j < n && types[j] == BidiClass::En {
                for t in types.iter_mut().take(j).skip(i) {
                    *t = BidiClass::En;
                }
            }
            let mut j = i as isize - 1;
            while j > -1 && types[j as usize] == BidiClass::Et {
                j -= 1;
            }
            if j > -1 && types[j as usize] == BidiClass::En {
                for t in types.iter_mut().take(i + 1).skip(j as usize) {
                    *t = BidiClass::En;
                }
            }
        }
        i += 1;
    }

    // Step 2: collapse everything to L or R.
    // (L|EN)+ ((CS|ON)+ (L|EN)+)* -> L, everything else -> R.
    #[derive(Clone, Copy, PartialEq)]
    enum Coarse {
        L,
        R,
    }
    let mut coarse = vec![Coarse::R; n];
    let mut i = 0;
    while i < n {
        if matches!(types[i], BidiClass::L | BidiClass::En) {
            let mut last_good = i;
            let mut j = i + 1;
            while j < n {
                match types[j] {
                    BidiClass::L | BidiClass::En => last_good = j,
                    BidiClass::Cs | BidiClass::On => {}
                    _ => break,
                }
                j += 1;
            }
            for c in coarse.iter_mut().take(last_good + 1).skip(i) {
                *c = Coarse::L;
            }
            i = last_good + 1;
        } else {
            coarse[i] = Coarse::R;
            i += 1;
        }
    }

    // Step 3: right-to-left scan; R symbols emitted in place, contiguous
    // L runs reversed.
    let mut order = Vec::with_capacity(n);
    let mut i = n as isize - 1;
    while i >= 0 {
        if coarse[i as usize] == Coarse::R {
            order.push(i as usize);
            i -= 1;
        } else {
            let mut j = i - 1;
            while j >= 0 && coarse[j as usize] != Coarse::R {
                j -= 1;
            }
            for k in (j + 1)..=i {
                order.push(k as usize);
            }
            i = j;
        }
    }
    debug_assert_eq!(order.len(), n);
    order
}

/// Classifies a word's overall strong direction from its symbols' bidi
/// classes, used as the per-word input to `calculate_textline_order`.
pub fn word_strong_direction(word: &Word, unicharset: &crate::unicharset::UnicharSet) -> StrongDirection {
    let mut saw_l = false;
    let mut saw_r = false;
    for symbol in &word.symbols {
        let Some(choice) = symbol.best() else { continue };
        match unicharset.bidi_class(choice.unichar_id) {
            BidiClass::L | BidiClass::En => saw_l = true,
            BidiClass::R => saw_r = true,
            _ => {}
        }
    }
    match (saw_l, saw_r) {
        (true, true) => StrongDirection::Mix,
        (true, false) => StrongDirection::Ltr,
        (false, true) => StrongDirection::Rtl,
        (false, false) => StrongDirection::Neutral,
    }
}

/// Wraps [`super::LinearIterator`], re-entering each paragraph at its
/// logical start and re-ordering words/symbols for bidi-correct reading
/// order (§4.2).
pub struct ReadingOrderIterator<'a> {
    inner: super::LinearIterator<'a>,
    unicharset: &'a crate::unicharset::UnicharSet,
    current_paragraph_is_ltr: bool,
    in_minor_direction: bool,
    at_beginning_of_minor_run: bool,
}

impl<'a> ReadingOrderIterator<'a> {
    pub fn new(inner: super::LinearIterator<'a>, unicharset: &'a crate::unicharset::UnicharSet) -> Self {
        let mut it = ReadingOrderIterator {
            inner,
            unicharset,
            current_paragraph_is_ltr: true,
            in_minor_direction: false,
            at_beginning_of_minor_run: false,
        };
        it.recompute_paragraph_direction();
        it
    }

    fn recompute_paragraph_direction(&mut self) {
        if self.inner.is_empty() {
            return;
        }
        let page = self.inner.page();
        let para = page.paragraph(page.block(page.blocks_order[self.inner.cursor().block]).paragraphs[self.inner.cursor().para]);
        let Some(&first_row) = para.rows.first() else {
            return;
        };
        let first_line_dirs: Vec<StrongDirection> = page
            .row(first_row)
            .words
            .iter()
            .map(|&w| word_strong_direction(page.word(w), self.unicharset))
            .collect();
        let paragraph_dirs: Vec<StrongDirection> = para
            .rows
            .iter()
            .flat_map(|&r| page.row(r).words.iter())
            .map(|&w| word_strong_direction(page.word(w), self.unicharset))
            .collect();
        self.current_paragraph_is_ltr = infer_paragraph_is_ltr(&first_line_dirs, &paragraph_dirs);
    }

    pub fn paragraph_is_ltr(&self) -> bool {
        self.current_paragraph_is_ltr
    }

    /// The underlying linear cursor, for renderers that need to resolve
    /// the current row's word handles directly.
    pub fn cursor(&self) -> super::Cursor {
        self.inner.cursor()
    }

    pub fn in_minor_direction(&self) -> bool {
        self.in_minor_direction
    }

    pub fn at_beginning_of_minor_run(&self) -> bool {
        self.at_beginning_of_minor_run
    }

    /// Whether the current textline is the last one in its paragraph,
    /// used by renderers to decide where to emit the extra paragraph
    /// separator (§6.3 "Plain text").
    pub fn is_at_last_textline_of_paragraph(&self) -> bool {
        self.inner.is_at_final_element(PageIteratorLevel::Para, PageIteratorLevel::Textline)
    }

    /// Advances one textline, recomputing paragraph direction on a
    /// paragraph transition, per the construction-time and
    /// transition-time re-entry rule (§4.2).
    pub fn next_textline(&mut self) -> bool {
        let advanced = self.inner.next(PageIteratorLevel::Textline);
        if advanced && self.inner.is_at_beginning_of(PageIteratorLevel::Para) {
            self.recompute_paragraph_direction();
        }
        advanced
    }

    /// Reading order of the current textline's words (§4.2.2).
    pub fn textline_order(&self) -> Vec<OrderToken> {
        let page = self.inner.page();
        let cursor = self.inner.cursor();
        let row = page.row(
            page.paragraph(page.block(page.blocks_order[cursor.block]).paragraphs[cursor.para]).rows[cursor.row],
        );
        let dirs: Vec<StrongDirection> = row
            .words
            .iter()
            .map(|&w| word_strong_direction(page.word(w), self.unicharset))
            .collect();
        calculate_textline_order(self.current_paragraph_is_ltr, &dirs)
    }

    /// Concatenates the current textline's text in logical reading order,
    /// inserting LRM/RLM marks at minor-run boundaries and honoring
    /// `preserve_interword_spaces` (§4.2.4).
    pub fn textline_text(&self, preserve_interword_spaces: bool) -> String {
        const LRM: char = '\u{200E}';
        const RLM: char = '\u{200F}';

        let page = self.inner.page();
        let cursor = self.inner.cursor();
        let row = page.row(
            page.paragraph(page.block(page.blocks_order[cursor.block]).paragraphs[cursor.para]).rows[cursor.row],
        );
        let order = self.textline_order();
        let mut out = String::new();
        let mut last_was_word = false;
        for token in &order {
            match token {
                OrderToken::MinorRunStart => {}
                OrderToken::MinorRunEnd => {
                    out.push(if self.current_paragraph_is_ltr { LRM } else { RLM });
                    last_was_word = false;
                }
                OrderToken::ComplexWord => {
                    out.push(if self.current_paragraph_is_ltr { LRM } else { RLM });
                }
                OrderToken::Word(idx) => {
                    if last_was_word {
                        let word = page.word(row.words[*idx]);
                        if preserve_interword_spaces {
                            for _ in 0..word.blanks_before.max(1) {
                                out.push(' ');
                            }
                        } else {
                            out.push(' ');
                        }
                    }
                    out.push_str(&page.word(row.words[*idx]).text(self.unicharset));
                    last_was_word = true;
                }
            }
        }
        out
    }
}
