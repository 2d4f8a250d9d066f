//! Stable, integer-coded public enums (§6.1).
//!
//! Numeric values are part of the wire contract (config files and the CLI
//! accept/emit these as plain integers) so discriminants are pinned
//! explicitly rather than left to declaration order.

use serde::{Deserialize, Serialize};

/// Page Segmentation Mode: the per-page layout-analysis policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PageSegMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertText = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl Default for PageSegMode {
    fn default() -> Self {
        PageSegMode::SingleBlock
    }
}

impl PageSegMode {
    /// Whether this mode requires an OSD (orientation/script detection)
    /// pre-pass before the main segmentation.
    pub fn requires_osd(self) -> bool {
        matches!(self, PageSegMode::OsdOnly | PageSegMode::AutoOsd | PageSegMode::SparseTextOsd)
    }

    /// Whether this mode disables character recognition, i.e. only layout
    /// analysis runs (§4.1 `process_page`).
    pub fn layout_only(self) -> bool {
        matches!(self, PageSegMode::OsdOnly)
    }
}

/// OCR engine recognition backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OcrEngineMode {
    TesseractOnly = 0,
    LstmOnly = 1,
    TesseractLstmCombined = 2,
    Default = 3,
}

impl Default for OcrEngineMode {
    fn default() -> Self {
        OcrEngineMode::Default
    }
}

/// The hierarchical level an iterator operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PageIteratorLevel {
    Block = 0,
    Para = 1,
    Textline = 2,
    Word = 3,
    Symbol = 4,
}

/// Block content classification produced by layout analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PolyBlockType {
    #[default]
    Unknown,
    FlowingText,
    HeadingText,
    PulloutText,
    Equation,
    InlineEquation,
    Table,
    VerticalText,
    CaptionText,
    FlowingImage,
    HeadingImage,
    PulloutImage,
    HorzLine,
    VertLine,
    Noise,
}

impl PolyBlockType {
    /// Non-text blocks are treated by iterators as containing a single
    /// paragraph, with a single line, with a single imaginary word (per
    /// the original PageIterator contract).
    pub fn is_text(self) -> bool {
        !matches!(
            self,
            PolyBlockType::FlowingImage
                | PolyBlockType::HeadingImage
                | PolyBlockType::PulloutImage
                | PolyBlockType::HorzLine
                | PolyBlockType::VertLine
                | PolyBlockType::Noise
        )
    }
}

/// Page orientation detected by OSD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    PageUp,
    PageRight,
    PageDown,
    PageLeft,
}

impl Orientation {
    /// Degrees of clockwise rotation needed to reach upright, matching the
    /// OSD output-format contract of §6.3.
    pub fn degrees(self) -> u32 {
        match self {
            Orientation::PageUp => 0,
            Orientation::PageRight => 90,
            Orientation::PageDown => 180,
            Orientation::PageLeft => 270,
        }
    }
}

/// Word/line/paragraph writing direction classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WritingDirection {
    LeftToRight,
    RightToLeft,
    TopToBottom,
}

/// Direction in which textlines are laid out within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextlineOrder {
    LeftToRight,
    RightToLeft,
    TopToBottom,
}

/// Strong-script direction of a word or paragraph, used by the BiDi
/// reading-order logic (§4.2.1, §4.2.2). Distinct from `WritingDirection`:
/// this is the *input classification* the reordering algorithm consumes,
/// not the final per-word tag attached to `Word`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrongDirection {
    Neutral,
    Ltr,
    Rtl,
    /// A word containing both strong-LTR and strong-RTL runs internally.
    Mix,
}

/// Simplified Unicode Bidi character category used for the symbol-level
/// reordering of §4.2.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BidiClass {
    /// Strong left-to-right.
    L,
    /// Strong right-to-left.
    R,
    /// European number.
    En,
    /// European number separator.
    Es,
    /// European number terminator.
    Et,
    /// Common number separator.
    Cs,
    /// Other neutral.
    On,
}

/// Source that produced a word's best choice (§GLOSSARY "Permuter tag").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PermuterTag {
    #[default]
    None,
    System,
    Frequency,
    User,
    Number,
    Doc,
    TopChoice,
}
