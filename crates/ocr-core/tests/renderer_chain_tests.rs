//! Integration coverage of the renderer chain (§4.4) and a handful of
//! concrete formats driven through it end to end, complementing the
//! chain-propagation unit tests colocated in `renderer::mod`.

use ocr_core::enums::{PermuterTag, PolyBlockType, WritingDirection};
use ocr_core::iterator::CoordinateFrame;
use ocr_core::page_result::{BBox, Baseline, Block, Choice, FontAttributes, PageResult, Paragraph, Quad, Row, Symbol, Word};
use ocr_core::renderer::hocr::HocrRenderer;
use ocr_core::renderer::plain_text::TextRenderer;
use ocr_core::renderer::tsv::TsvRenderer;
use ocr_core::renderer::unlv::UnlvRenderer;
use ocr_core::renderer::{RenderableSession, RendererNode};
use ocr_core::unicharset::UnicharSet;

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

fn one_word_page(unicharset: &mut UnicharSet, text: &str) -> PageResult {
    let mut page = PageResult::new();
    let symbols: Vec<Symbol> = text
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let id = unicharset.insert(&c.to_string(), UnicharSet::classify_char(c));
            Symbol {
                bbox: BBox::new(i as i32 * 10, 0, i as i32 * 10 + 10, 10),
                choices: vec![Choice { unichar_id: id, certainty: -1.0 }],
                best_choice: Some(0),
                superscript: false,
                subscript: false,
                dropcap: false,
            }
        })
        .collect();
    let w = page.push_word(Word {
        quad: Quad::from_bbox(BBox::new(0, 0, text.chars().count() as i32 * 10, 10)),
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
    page
}

#[test]
fn p7_chain_of_three_formats_sees_same_page_count() {
    let mut unicharset = UnicharSet::new();
    let fixture = Fixture {
        page: one_word_page(&mut unicharset, "hi"),
        unicharset,
    };

    let mut chain = RendererNode::new(Box::new(TextRenderer::new()));
    chain.insert(Box::new(RendererNode::new(Box::new(HocrRenderer::new()))));
    chain.insert(Box::new(RendererNode::new(Box::new(TsvRenderer::new()))));

    chain.begin_document("doc").unwrap();
    for _ in 0..2 {
        chain.add_image(&fixture).unwrap();
    }
    chain.end_document().unwrap();

    assert_eq!(chain.image_num(), 1); // two pages -> last index 1
}

#[test]
fn hocr_output_has_required_structural_elements() {
    let mut unicharset = UnicharSet::new();
    let fixture = Fixture {
        page: one_word_page(&mut unicharset, "ok"),
        unicharset,
    };
    let mut renderer = HocrRenderer::new();
    renderer.on_begin_document("title").unwrap();
    renderer.on_add_image(&fixture).unwrap();
    renderer.on_end_document().unwrap();

    let out = renderer.buffer();
    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(out.contains("<div class='ocr_page'"));
    assert!(out.contains("class='ocr_carea'"));
    assert!(out.contains("class='ocr_par'"));
    assert!(out.contains("</html>"));
}

#[test]
fn plain_text_ends_with_single_newline_per_line() {
    let mut unicharset = UnicharSet::new();
    let fixture = Fixture {
        page: one_word_page(&mut unicharset, "ok"),
        unicharset,
    };
    let mut renderer = TextRenderer::new();
    renderer.on_add_image(&fixture).unwrap();
    assert_eq!(renderer.buffer(), "ok\n");
}

#[test]
fn unlv_renderer_maps_curly_quote_fallbacks() {
    let mut unicharset = UnicharSet::new();
    let fixture = Fixture {
        page: one_word_page(&mut unicharset, "\u{2019}"),
        unicharset,
    };
    let mut renderer = UnlvRenderer::new();
    renderer.on_add_image(&fixture).unwrap();
    assert!(renderer.buffer().contains('\''));
}

#[test]
fn empty_page_produces_no_rows_but_no_error() {
    let fixture = Fixture {
        page: PageResult::new(),
        unicharset: UnicharSet::new(),
    };
    let mut renderer = TextRenderer::new();
    assert!(renderer.on_add_image(&fixture).is_ok());
    assert!(renderer.buffer().is_empty());
}
