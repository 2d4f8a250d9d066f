//! `UnicharSet`: fixed mapping between unicode-derived character ids and
//! UTF-8 strings, supplying per-id attributes.
//!
//! This is a leaf dependency (§2): every id-bearing structure downstream
//! (`PageResult`, the iterator's BiDi logic, the grapheme validator's OCR
//! normalization step) consults it rather than re-deriving script/category
//! facts from raw code points each time.

use crate::enums::BidiClass;
use std::collections::HashMap;

/// A single entry's per-id attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicharAttributes {
    pub is_alpha: bool,
    pub is_digit: bool,
    pub is_punctuation: bool,
    pub script: Script,
    pub bidi_class: BidiClass,
}

/// Script families relevant to grapheme validation (§4.3) and to script
/// detection. `Other` covers every script not named by the spec's grammar
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Latin,
    Common,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Oriya,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Sinhala,
    Khmer,
    Myanmar,
    Thai,
    Arabic,
    Other,
}

impl Script {
    /// Scripts with an inherent-vowel-suppressing virama, per §4.3.1
    /// Script detection.
    pub fn is_virama_bearing(self) -> bool {
        matches!(
            self,
            Script::Devanagari
                | Script::Bengali
                | Script::Gurmukhi
                | Script::Gujarati
                | Script::Oriya
                | Script::Tamil
                | Script::Telugu
                | Script::Kannada
                | Script::Malayalam
                | Script::Sinhala
                | Script::Khmer
                | Script::Myanmar
        )
    }
}

/// Fixed id <-> UTF-8 string mapping with per-id attributes.
///
/// A production engine builds this table from a language's `unicharset`
/// data file; the core here provides the data structure and the classifier
/// contract (`set`, `unichar_to_id`, `id_to_unichar`, attribute lookups)
/// independent of how the table is populated, per §1's decision to keep
/// model/data-file layout out of scope.
#[derive(Debug, Clone, Default)]
pub struct UnicharSet {
    strings: Vec<String>,
    ids: HashMap<String, u32>,
    attributes: Vec<UnicharAttributes>,
}

/// Sentinel id representing "no such unichar" (mirrors the source's
/// `INVALID_UNICHAR_ID`).
pub const INVALID_UNICHAR_ID: u32 = u32::MAX;

impl UnicharSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `text` with the given attributes, returning its id. Returns
    /// the existing id if `text` is already present (idempotent, matching
    /// the source's `unichar_insert`).
    pub fn insert(&mut self, text: &str, attrs: UnicharAttributes) -> u32 {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(text.to_string());
        self.attributes.push(attrs);
        self.ids.insert(text.to_string(), id);
        id
    }

    pub fn unichar_to_id(&self, text: &str) -> Option<u32> {
        self.ids.get(text).copied()
    }

    pub fn id_to_unichar(&self, id: u32) -> Option<&str> {
        self.strings.get(id as usize).map(String::as_str)
    }

    pub fn attributes(&self, id: u32) -> Option<&UnicharAttributes> {
        self.attributes.get(id as usize)
    }

    pub fn size(&self) -> usize {
        self.strings.len()
    }

    pub fn is_alpha(&self, id: u32) -> bool {
        self.attributes(id).is_some_and(|a| a.is_alpha)
    }

    pub fn is_digit(&self, id: u32) -> bool {
        self.attributes(id).is_some_and(|a| a.is_digit)
    }

    pub fn is_punctuation(&self, id: u32) -> bool {
        self.attributes(id).is_some_and(|a| a.is_punctuation)
    }

    pub fn script(&self, id: u32) -> Script {
        self.attributes(id).map(|a| a.script).unwrap_or(Script::Other)
    }

    pub fn bidi_class(&self, id: u32) -> BidiClass {
        self.attributes(id).map(|a| a.bidi_class).unwrap_or(BidiClass::On)
    }

    /// Classifies a single `char` without requiring it to have been
    /// inserted, using the same attribute rules an inserted entry would
    /// get. Used by the grapheme validator and the symbol-level BiDi
    /// reordering when operating on characters outside a fixed classifier
    /// vocabulary (e.g. raw textline input before recognition assigns ids).
    pub fn classify_char(ch: char) -> UnicharAttributes {
        UnicharAttributes {
            is_alpha: ch.is_alphabetic(),
            is_digit: ch.is_ascii_digit() || matches!(ch, '\u{0660}'..='\u{0669}' | '\u{06F0}'..='\u{06F9}'),
            is_punctuation: ch.is_ascii_punctuation() || is_general_punctuation(ch),
            script: script_of(ch),
            bidi_class: bidi_class_of(ch),
        }
    }
}

fn is_general_punctuation(ch: char) -> bool {
    matches!(ch as u32, 0x2000..=0x206F | 0x3000..=0x303F)
}

/// Coarse script classification by code point range, sufficient for the
/// script-detection needs of §4.3.1 (dominant virama-bearing script) and
/// the `Script` attribute on `UnicharSet` entries. This intentionally does
/// not implement the full Unicode Script property; it only distinguishes
/// the script families the spec's grammars name.
pub fn script_of(ch: char) -> Script {
    let c = ch as u32;
    match c {
        0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F => Script::Latin,
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF => Script::Arabic,
        0x0900..=0x097F => Script::Devanagari,
        0x0980..=0x09FF => Script::Bengali,
        0x0A00..=0x0A7F => Script::Gurmukhi,
        0x0A80..=0x0AFF => Script::Gujarati,
        0x0B00..=0x0B7F => Script::Oriya,
        0x0B80..=0x0BFF => Script::Tamil,
        0x0C00..=0x0C7F => Script::Telugu,
        0x0C80..=0x0CFF => Script::Kannada,
        0x0D00..=0x0D7F => Script::Malayalam,
        0x0D80..=0x0DFF => Script::Sinhala,
        0x0E00..=0x0E7F => Script::Thai,
        0x1780..=0x17FF => Script::Khmer,
        0x1000..=0x109F | 0xAA60..=0xAA7F => Script::Myanmar,
        0x0020..=0x002F | 0x003A..=0x0040 | 0x005B..=0x0060 | 0x007B..=0x007E | 0x2000..=0x206F => Script::Common,
        _ => Script::Other,
    }
}

/// Simplified Unicode Bidi class classification for the symbol-reordering
/// algorithm of §4.2.3. Only distinguishes the seven categories the spec
/// names; anything else collapses to `On` (other neutral), matching the
/// source's treatment of unclassified code points.
pub fn bidi_class_of(ch: char) -> BidiClass {
    let c = ch as u32;
    match c {
        0x0030..=0x0039 => BidiClass::En,
        0x0660..=0x0669 | 0x06F0..=0x06F9 => BidiClass::En,
        0x002B | 0x002D => BidiClass::Es,
        0x0023..=0x0025 | 0x00B0 | 0x2030 => BidiClass::Et,
        0x002C | 0x002E | 0x003A | 0x00A0 => BidiClass::Cs,
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF | 0x0590..=0x05FF => {
            BidiClass::R
        }
        0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F => BidiClass::L,
        _ if script_of(ch) != Script::Other && script_of(ch) != Script::Common => BidiClass::L,
        _ => BidiClass::On,
    }
}
