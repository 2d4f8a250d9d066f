//! Integration coverage for the bidi reading-order iterator (§4.2),
//! exercised end to end through a `PageResult` built with the public
//! arena API rather than the unit-level helpers in
//! `iterator::reading_order`'s own test module.

use ocr_core::enums::{PermuterTag, PolyBlockType, WritingDirection};
use ocr_core::iterator::reading_order::ReadingOrderIterator;
use ocr_core::iterator::{CoordinateFrame, LinearIterator};
use ocr_core::page_result::{BBox, Baseline, Block, Choice, FontAttributes, Paragraph, PageResult, Quad, Row, Symbol, Word};
use ocr_core::unicharset::UnicharSet;

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

fn word_with_text(unicharset: &mut UnicharSet, text: &str, left: i32) -> Word {
    let symbols: Vec<Symbol> = text
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let id = unicharset.insert(&c.to_string(), UnicharSet::classify_char(c));
            Symbol {
                bbox: BBox::new(left + i as i32 * 10, 0, left + i as i32 * 10 + 10, 10),
                choices: vec![Choice { unichar_id: id, certainty: 0.0 }],
                best_choice: Some(0),
                superscript: false,
                subscript: false,
                dropcap: false,
            }
        })
        .collect();
    Word {
        quad: Quad::from_bbox(BBox::new(left, 0, left + text.chars().count() as i32 * 10, 10)),
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

/// A one-block, one-paragraph, one-row page with the given words, built
/// bottom-up through the public arena API (mirrors how a real `Classifier`
/// would populate a `PageResult`).
fn single_line_page(unicharset: &mut UnicharSet, words: &[&str]) -> PageResult {
    let mut page = PageResult::new();
    let handles: Vec<_> = words.iter().enumerate().map(|(i, w)| page.push_word(word_with_text(unicharset, w, i as i32 * 20))).collect();
    let row = page.push_row(Row {
        words: handles,
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
fn english_only_paragraph_is_ltr() {
    let mut unicharset = UnicharSet::new();
    let page = single_line_page(&mut unicharset, &["hello", "world"]);
    let linear = LinearIterator::begin(&page, identity_frame());
    let it = ReadingOrderIterator::new(linear, &unicharset);
    assert!(it.paragraph_is_ltr());
}

#[test]
fn hebrew_only_paragraph_is_rtl() {
    // Hebrew letters (U+05D0..U+05EA) are strong-RTL in the unicharset's
    // bidi classification.
    let mut unicharset = UnicharSet::new();
    let page = single_line_page(&mut unicharset, &["\u{05D0}\u{05D1}", "\u{05D2}\u{05D3}"]);
    let linear = LinearIterator::begin(&page, identity_frame());
    let it = ReadingOrderIterator::new(linear, &unicharset);
    assert!(!it.paragraph_is_ltr());
}

#[test]
fn textline_text_concatenates_words_with_single_space() {
    let mut unicharset = UnicharSet::new();
    let page = single_line_page(&mut unicharset, &["foo", "bar"]);
    let linear = LinearIterator::begin(&page, identity_frame());
    let it = ReadingOrderIterator::new(linear, &unicharset);
    assert_eq!(it.textline_text(false), "foo bar");
}

#[test]
fn textline_text_honors_preserve_interword_spaces() {
    let mut unicharset = UnicharSet::new();
    let mut page = PageResult::new();
    let mut w2 = word_with_text(&mut unicharset, "bar", 40);
    w2.blanks_before = 3;
    let w1 = page.push_word(word_with_text(&mut unicharset, "foo", 0));
    let w2 = page.push_word(w2);
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
    let linear = LinearIterator::begin(&page, identity_frame());
    let it = ReadingOrderIterator::new(linear, &unicharset);
    assert_eq!(it.textline_text(true), "foo   bar");
}

#[test]
fn reading_order_iterator_visits_every_paragraph_transition() {
    // Two paragraphs, each with its own row; `next_textline` must report
    // no more lines after the second paragraph's single row.
    let mut unicharset = UnicharSet::new();
    let mut page = PageResult::new();
    let w1 = page.push_word(word_with_text(&mut unicharset, "one", 0));
    let row1 = page.push_row(Row {
        words: vec![w1],
        ..Default::default()
    });
    let para1 = page.push_paragraph(Paragraph {
        rows: vec![row1],
        ..Default::default()
    });
    let w2 = page.push_word(word_with_text(&mut unicharset, "two", 0));
    let row2 = page.push_row(Row {
        words: vec![w2],
        ..Default::default()
    });
    let para2 = page.push_paragraph(Paragraph {
        rows: vec![row2],
        ..Default::default()
    });
    page.push_block(Block {
        paragraphs: vec![para1, para2],
        ..Default::default()
    });

    let linear = LinearIterator::begin(&page, identity_frame());
    let mut it = ReadingOrderIterator::new(linear, &unicharset);
    assert!(it.paragraph_is_ltr());
    assert!(it.next_textline());
    assert!(!it.next_textline());
}
