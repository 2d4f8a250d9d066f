use criterion::{Criterion, criterion_group, criterion_main};
use ocr_core::enums::{PageIteratorLevel, PermuterTag, PolyBlockType, WritingDirection};
use ocr_core::iterator::reading_order::ReadingOrderIterator;
use ocr_core::iterator::{CoordinateFrame, LinearIterator};
use ocr_core::page_result::{BBox, Baseline, Block, Choice, FontAttributes, PageResult, Paragraph, Quad, Row, Symbol, Word};
use ocr_core::unicharset::UnicharSet;

fn word(unicharset: &mut UnicharSet, text: &str) -> Word {
    let symbols = text
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let id = unicharset.insert(&c.to_string(), UnicharSet::classify_char(c));
            Symbol {
                bbox: BBox::new(i as i32 * 10, 0, i as i32 * 10 + 10, 20),
                choices: vec![Choice { unichar_id: id, certainty: -1.0 }],
                best_choice: Some(0),
                superscript: false,
                subscript: false,
                dropcap: false,
            }
        })
        .collect();
    Word {
        quad: Quad::from_bbox(BBox::new(0, 0, text.len() as i32 * 10, 20)),
        baseline: Baseline::default(),
        symbols,
        certainty: -1.0,
        permuter_tag: PermuterTag::default(),
        rejected: false,
        font: FontAttributes::default(),
        direction: WritingDirection::LeftToRight,
        is_numeric: false,
        from_dictionary: false,
        blanks_before: 1,
    }
}

/// A page with `rows` textlines of `words_per_row` words each, all in one
/// block/paragraph, to exercise the iterator over a realistic page size.
fn large_page(rows: usize, words_per_row: usize) -> (PageResult, UnicharSet) {
    let mut unicharset = UnicharSet::new();
    let mut page = PageResult::new();
    let mut row_handles = Vec::with_capacity(rows);
    for _ in 0..rows {
        let word_handles: Vec<_> = (0..words_per_row).map(|i| page.push_word(word(&mut unicharset, &format!("word{i}")))).collect();
        row_handles.push(page.push_row(Row {
            words: word_handles,
            ..Default::default()
        }));
    }
    let para = page.push_paragraph(Paragraph {
        rows: row_handles,
        ..Default::default()
    });
    page.push_block(Block {
        block_type: PolyBlockType::FlowingText,
        paragraphs: vec![para],
        ..Default::default()
    });
    (page, unicharset)
}

fn identity_frame() -> CoordinateFrame {
    CoordinateFrame {
        scale: 1.0,
        scaled_y_resolution: 300.0,
        rect_left: 0,
        rect_top: 0,
        rect_width: 5000,
        rect_height: 5000,
    }
}

fn bench_linear_iterator_symbol_walk(c: &mut Criterion) {
    let (page, _unicharset) = large_page(200, 10);
    c.bench_function("linear_iterator_symbol_walk_200x10", |b| {
        b.iter(|| {
            let mut it = LinearIterator::begin(&page, identity_frame());
            let mut count = 0u32;
            loop {
                count += 1;
                if !it.next(PageIteratorLevel::Symbol) {
                    break;
                }
            }
            count
        })
    });
}

fn bench_reading_order_textline_walk(c: &mut Criterion) {
    let (page, unicharset) = large_page(200, 10);
    c.bench_function("reading_order_textline_walk_200x10", |b| {
        b.iter(|| {
            let linear = LinearIterator::begin(&page, identity_frame());
            let mut it = ReadingOrderIterator::new(linear, &unicharset);
            let mut count = 0u32;
            loop {
                count += 1;
                let _ = it.textline_text(false);
                if !it.next_textline() {
                    break;
                }
            }
            count
        })
    });
}

criterion_group!(benches, bench_linear_iterator_symbol_walk, bench_reading_order_textline_walk);
criterion_main!(benches);
