//! Renderer chain (§4.4): each renderer consumes an initialized session to
//! produce output bytes, and renderers chain.
//!
//! Per the design notes' "multiple-inheritance renderers" guidance (§9),
//! this is split into a single [`RendererHandler`] trait carrying only the
//! three content handlers, plus [`RendererNode`], the chain-propagation
//! wrapper that every concrete renderer shares rather than re-implements:
//! `insert` appends to the tail, and `begin_document`/`add_image`/
//! `end_document` each invoke the local handler first and then propagate
//! to `next` regardless of whether the local handler failed, so a failure
//! in one renderer never stops its siblings from completing (§4.4, §7
//! Renderer error).

pub mod alto;
pub mod box_file;
pub mod hocr;
pub mod osd;
pub mod pdf;
pub mod plain_text;
pub mod tsv;
pub mod unlv;

use crate::error::Result;
use crate::iterator::CoordinateFrame;
use crate::page_result::PageResult;
use crate::unicharset::UnicharSet;

/// What a renderer needs from an initialized `Session` to produce output
/// (§4.4 "consumes an initialized Session"). Kept as a narrow trait rather
/// than a direct dependency on `crate::session::Session` so renderers can
/// be unit-tested against a fixture without constructing a full session.
pub trait RenderableSession {
    fn page_result(&self) -> &PageResult;
    fn unicharset(&self) -> &UnicharSet;
    fn coordinate_frame(&self) -> CoordinateFrame;
    fn preserve_interword_spaces(&self) -> bool;
    fn source_resolution(&self) -> u32;
    fn page_number(&self) -> i32;

    /// Orientation/script detection result, when the page went through an
    /// OSD sub-session (§4.1 "OSD coupling"); `None` outside PSM_OSD_ONLY
    /// / PSM_AUTO_OSD. Only [`osd::OsdRenderer`] consults this.
    fn osd_result(&self) -> Option<crate::collaborators::OsdResult> {
        None
    }
}

/// The three content-producing operations a concrete renderer implements
/// (§4.4). `on_begin_document`/`on_end_document` default to a no-op since
/// most formats (TSV rows, box-file lines) need no document wrapper.
pub trait RendererHandler {
    fn file_extension(&self) -> &'static str;

    fn on_begin_document(&mut self, _title: &str) -> Result<()> {
        Ok(())
    }

    fn on_add_image(&mut self, session: &dyn RenderableSession) -> Result<()>;

    fn on_end_document(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One link in the renderer chain (§3.1 "Renderer"): owns its handler and
/// optionally the rest of the chain. `image_index` and `happy` are the
/// per-renderer state named in §3.1; `happy` latches `false` on the first
/// failure and subsequent operations on *this* node short-circuit to
/// `Err` immediately without re-invoking the handler, while still walking
/// `next` (§7 Renderer error: "subsequent operations short-circuit but
/// chain propagation still attempts other renderers").
pub struct RendererNode {
    handler: Box<dyn RendererHandler>,
    image_index: i32,
    happy: bool,
    next: Option<Box<RendererNode>>,
}

impl RendererNode {
    pub fn new(handler: Box<dyn RendererHandler>) -> Self {
        RendererNode {
            handler,
            image_index: -1,
            happy: true,
            next: None,
        }
    }

    pub fn file_extension(&self) -> &'static str {
        self.handler.file_extension()
    }

    pub fn image_num(&self) -> i32 {
        self.image_index
    }

    pub fn happy(&self) -> bool {
        self.happy
    }

    /// Appends `node` to the end of the chain, transferring ownership
    /// (§4.4 `insert`).
    pub fn insert(&mut self, node: Box<RendererNode>) {
        match &mut self.next {
            Some(tail) => tail.insert(node),
            None => self.next = Some(node),
        }
    }

    pub fn begin_document(&mut self, title: &str) -> Result<()> {
        if !self.happy {
            return self.propagate(Err(crate::error::OcrError::renderer(self.file_extension(), "renderer is not happy")), |n| n.begin_document(title));
        }
        let local = self.handler.on_begin_document(title);
        if local.is_err() {
            self.happy = false;
        }
        self.propagate(local, |n| n.begin_document(title))
    }

    pub fn add_image(&mut self, session: &dyn RenderableSession) -> Result<()> {
        if !self.happy {
            return self.propagate(Err(crate::error::OcrError::renderer(self.file_extension(), "renderer is not happy")), |n| n.add_image(session));
        }
        let local = self.handler.on_add_image(session);
        if local.is_ok() {
            self.image_index += 1;
        } else {
            self.happy = false;
        }
        self.propagate(local, |n| n.add_image(session))
    }

    pub fn end_document(&mut self) -> Result<()> {
        if !self.happy {
            return self.propagate(Err(crate::error::OcrError::renderer(self.file_extension(), "renderer is not happy")), |n| n.end_document());
        }
        let local = self.handler.on_end_document();
        if local.is_err() {
            self.happy = false;
        }
        self.propagate(local, |n| n.end_document())
    }

    /// Runs `local`'s result against `next`, always invoking `step` on
    /// `next` regardless of whether `local` failed, and returning the
    /// first error encountered (local takes priority) so one document
    /// wide failure is surfaced even though every chain member still ran.
    fn propagate(&mut self, local: Result<()>, step: impl FnOnce(&mut RendererNode) -> Result<()>) -> Result<()> {
        match &mut self.next {
            Some(next) => {
                let downstream = step(next);
                local.and(downstream)
            }
            None => local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::CoordinateFrame;

    struct CountingHandler {
        ext: &'static str,
        begins: u32,
        images: u32,
        ends: u32,
        fail_add_image: bool,
    }

    impl RendererHandler for CountingHandler {
        fn file_extension(&self) -> &'static str {
            self.ext
        }
        fn on_begin_document(&mut self, _title: &str) -> Result<()> {
            self.begins += 1;
            Ok(())
        }
        fn on_add_image(&mut self, _session: &dyn RenderableSession) -> Result<()> {
            self.images += 1;
            if self.fail_add_image {
                Err(crate::error::OcrError::renderer(self.ext, "boom"))
            } else {
                Ok(())
            }
        }
        fn on_end_document(&mut self) -> Result<()> {
            self.ends += 1;
            Ok(())
        }
    }

    struct FixtureSession {
        page: PageResult,
        unicharset: UnicharSet,
    }

    impl RenderableSession for FixtureSession {
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
                rect_width: 100,
                rect_height: 100,
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

    fn fixture() -> FixtureSession {
        FixtureSession {
            page: PageResult::new(),
            unicharset: UnicharSet::new(),
        }
    }

    #[test]
    fn chain_propagates_to_every_member_p7() {
        let mut chain = RendererNode::new(Box::new(CountingHandler {
            ext: "txt",
            begins: 0,
            images: 0,
            ends: 0,
            fail_add_image: false,
        }));
        chain.insert(Box::new(RendererNode::new(Box::new(CountingHandler {
            ext: "hocr",
            begins: 0,
            images: 0,
            ends: 0,
            fail_add_image: false,
        }))));

        let session = fixture();
        chain.begin_document("title").unwrap();
        for _ in 0..3 {
            chain.add_image(&session).unwrap();
        }
        chain.end_document().unwrap();

        assert_eq!(chain.image_num(), 2); // P7: 3 add_image calls -> last index 2
        assert_eq!(chain.next.as_ref().unwrap().image_num(), 2);
    }

    #[test]
    fn failure_in_head_still_runs_tail() {
        let mut chain = RendererNode::new(Box::new(CountingHandler {
            ext: "txt",
            begins: 0,
            images: 0,
            ends: 0,
            fail_add_image: true,
        }));
        chain.insert(Box::new(RendererNode::new(Box::new(CountingHandler {
            ext: "hocr",
            begins: 0,
            images: 0,
            ends: 0,
            fail_add_image: false,
        }))));
        let session = fixture();
        let result = chain.add_image(&session);
        assert!(result.is_err());
        assert!(!chain.happy());
        assert!(chain.next.as_ref().unwrap().happy());
        assert_eq!(chain.next.as_ref().unwrap().image_num(), 0);
    }

    #[test]
    fn unhappy_node_short_circuits_without_reinvoking_handler() {
        let mut chain = RendererNode::new(Box::new(CountingHandler {
            ext: "txt",
            begins: 0,
            images: 0,
            ends: 0,
            fail_add_image: true,
        }));
        let session = fixture();
        assert!(chain.add_image(&session).is_err());
        assert!(!chain.happy());

        // Once unhappy, further calls must not re-invoke the handler: the
        // image counter stays put and the handler's own image tally stops
        // growing.
        assert!(chain.add_image(&session).is_err());
        assert_eq!(chain.image_num(), -1);
    }
}
