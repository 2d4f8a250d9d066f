//! ALTO XML renderer (§4.4 concrete renderers list). Not detailed
//! line-by-line in §6.3 the way hOCR is; grounded in the same bbox/baseline
//! geometry every renderer shares, emitting the ALTO 4.x
//! `Page/PrintSpace/TextBlock/TextLine/String` hierarchy with `WC` (word
//! confidence) on each `String`.

use super::{RenderableSession, RendererHandler};
use crate::enums::PageIteratorLevel;
use crate::error::Result;
use crate::iterator::LinearIterator;
use crate::iterator::reading_order::ReadingOrderIterator;
use std::fmt::Write as _;

#[derive(Debug, Default)]
pub struct AltoRenderer {
    buffer: String,
    page_count: u32,
}

impl AltoRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl RendererHandler for AltoRenderer {
    fn file_extension(&self) -> &'static str {
        "alto"
    }

    fn on_begin_document(&mut self, title: &str) -> Result<()> {
        writeln!(
            self.buffer,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <alto xmlns=\"http://www.loc.gov/standards/alto/ns-v4#\">\n\
             <Description><sourceImageInformation><fileName>{}</fileName></sourceImageInformation></Description>\n\
             <Layout>",
            escape_xml(title)
        )
        .ok();
        Ok(())
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        let page = session.page_result();
        self.page_count += 1;
        writeln!(self.buffer, "<Page ID=\"page_{}\" PHYSICAL_IMG_NR=\"{}\">", self.page_count, self.page_count).ok();
        writeln!(self.buffer, "<PrintSpace>").ok();

        if !page.is_empty() {
            let mut linear = LinearIterator::begin(page, session.coordinate_frame());
            let mut it = ReadingOrderIterator::new(LinearIterator::begin(page, session.coordinate_frame()), session.unicharset());
            let mut block_idx = 0;
            loop {
                let bbox = linear.bounding_box(PageIteratorLevel::Block);
                writeln!(
                    self.buffer,
                    "<TextBlock ID=\"block_{}\" HPOS=\"{}\" VPOS=\"{}\" WIDTH=\"{}\" HEIGHT=\"{}\">",
                    block_idx + 1,
                    bbox.left,
                    bbox.top,
                    bbox.width(),
                    bbox.height()
                )
                .ok();

                loop {
                    loop {
                        let line_bbox = linear.bounding_box(PageIteratorLevel::Textline);
                        writeln!(
                            self.buffer,
                            "<TextLine HPOS=\"{}\" VPOS=\"{}\" WIDTH=\"{}\" HEIGHT=\"{}\">",
                            line_bbox.left,
                            line_bbox.top,
                            line_bbox.width(),
                            line_bbox.height()
                        )
                        .ok();

                        let cursor = linear.cursor();
                        let row = page.row(
                            page.paragraph(page.block(page.blocks_order[cursor.block]).paragraphs[cursor.para]).rows[cursor.row],
                        );
                        for token in it.textline_order() {
                            let crate::iterator::reading_order::OrderToken::Word(idx) = token else {
                                continue;
                            };
                            let word = page.word(row.words[idx]);
                            let wbox = word.quad.bounding_box();
                            writeln!(
                                self.buffer,
                                "<String HPOS=\"{}\" VPOS=\"{}\" WIDTH=\"{}\" HEIGHT=\"{}\" CONTENT=\"{}\" WC=\"{:.2}\"/>",
                                wbox.left,
                                wbox.top,
                                wbox.width(),
                                wbox.height(),
                                escape_xml(&word.text(session.unicharset())),
                                word.confidence_percent() as f32 / 100.0
                            )
                            .ok();
                        }
                        writeln!(self.buffer, "</TextLine>").ok();

                        let was_last_line = it.is_at_last_textline_of_paragraph();
                        it.next_textline();
                        linear.next(PageIteratorLevel::Textline);
                        if was_last_line {
                            break;
                        }
                    }

                    let was_last_para = linear.is_at_final_element(PageIteratorLevel::Block, PageIteratorLevel::Para);
                    if was_last_para {
                        break;
                    }
                    linear.next(PageIteratorLevel::Para);
                }
                writeln!(self.buffer, "</TextBlock>").ok();

                let was_last_block = linear.is_at_final_element(PageIteratorLevel::Block, PageIteratorLevel::Block);
                block_idx += 1;
                if was_last_block {
                    break;
                }
                linear.next(PageIteratorLevel::Block);
            }
        }

        writeln!(self.buffer, "</PrintSpace>\n</Page>").ok();
        Ok(())
    }

    fn on_end_document(&mut self) -> Result<()> {
        writeln!(self.buffer, "</Layout>\n</alto>").ok();
        Ok(())
    }
}
