//! Named contracts for the external collaborators the core deliberately
//! does not implement (§1): the raster thresholder, the connected-component
//! and layout analyzer, the classifier, and the paragraph detector. The
//! core assumes the existence of a "recognize all words" primitive and a
//! "segment page" primitive; these traits are exactly that assumption made
//! explicit so [`crate::session::Session`] can be driven in tests and by a
//! real backend alike without the core depending on classifier internals.

use crate::config::ConfigStore;
use crate::error::Result;
use crate::page_result::PageResult;

/// A non-owning view over a raster page image. A real implementation wraps
/// whatever pixel buffer type the image-I/O layer (out of scope, §1)
/// produces; the core only ever needs its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageView {
    pub width: i32,
    pub height: i32,
}

/// Rectangle-of-interest within an image, in image coordinates (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn full_image(image: ImageView) -> Self {
        Rectangle {
            left: 0,
            top: 0,
            width: image.width,
            height: image.height,
        }
    }
}

/// A connected-component/layout block before recognition has assigned it
/// paragraphs, rows, or words: just enough for the recognizer to consume
/// (bounding box, rotation-to-upright vector, and a content-type guess).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBlock {
    pub bbox: crate::page_result::BBox,
    pub block_type: crate::enums::PolyBlockType,
    pub re_rotation: (f32, f32),
}

/// Thresholds a greyscale/color image into the binary image the layout
/// analyzer and classifier consume. Out of scope per §1; the core only
/// calls through this trait.
pub trait Thresholder {
    fn threshold(&mut self, image: ImageView, rect: Rectangle) -> Result<()>;
}

/// Produces a `BlockList` from a thresholded image (`segment_page`, §2's
/// dependency order). Out of scope per §1.
pub trait LayoutAnalyzer {
    fn segment_page(&mut self, image: ImageView, rect: Rectangle) -> Result<Vec<LayoutBlock>>;
}

/// The "recognize all words" primitive (§1): turns a block list into a
/// populated [`PageResult`]. Out of scope per §1; stands in for the
/// classifier, the LSTM/legacy recognition paths, and dictionary-backed
/// word permuters.
pub trait Classifier {
    fn recognize_all_words(
        &mut self,
        image: ImageView,
        blocks: &[LayoutBlock],
        config: &ConfigStore,
    ) -> Result<PageResult>;
}

/// Splits a block's rows into paragraphs and decides each paragraph's
/// writing direction input data (§4.2.1 consumes the result through
/// `ReadingOrderIterator`, not this trait directly). Out of scope per §1.
pub trait ParagraphDetector {
    fn detect_paragraphs(&mut self, page: &mut PageResult) -> Result<()>;
}

/// Orientation-and-script detection result (§6.1 `Orientation`, §6.3 OSD
/// output format).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OsdResult {
    pub orientation: crate::enums::Orientation,
    pub orientation_confidence: f32,
    pub script: crate::unicharset::Script,
    pub script_confidence: f32,
}

/// The OSD sub-session's recognition primitive (§4.1 "OSD coupling").
pub trait OrientationDetector {
    fn detect_orientation_script(&mut self, image: ImageView, rect: Rectangle) -> Result<OsdResult>;
}
