//! Arabic handling (§4.3.7): joiners are kept only between two Arabic-range
//! letters, and Arabic-Indic digits retain their digit semantics. Tatweel
//! stripping lives in [`super::normalize::ocr_normalize`], since it is
//! gated by the same `ocr_norm` flag that runs before segmentation.

use super::RawCluster;
use crate::error::Result;

const ZWJ: char = '\u{200D}';
const ZWNJ: char = '\u{200C}';

fn is_arabic_letter(ch: char) -> bool {
    matches!(ch as u32, 0x0621..=0x064A | 0x066E..=0x06D3 | 0x06D5 | 0xFB50..=0xFDFF | 0xFE70..=0xFEFC)
}

fn is_arabic_indic_digit(ch: char) -> bool {
    matches!(ch as u32, 0x0660..=0x0669 | 0x06F0..=0x06F9)
}

/// One code point per grapheme (Arabic has no multi-code-point grammar in
/// scope here); joiners are dropped unless both neighbours are Arabic
/// letters, never left dangling at a string boundary.
pub fn segment(text: &str, _report_errors: bool) -> Result<Vec<RawCluster>> {
    let chars: Vec<char> = text.chars().collect();
    let mut clusters = Vec::new();
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ZWJ || ch == ZWNJ {
            let prev_is_letter = i > 0 && is_arabic_letter(chars[i - 1]);
            let next_is_letter = i + 1 < chars.len() && is_arabic_letter(chars[i + 1]);
            if !(prev_is_letter && next_is_letter) {
                continue;
            }
        }
        clusters.push(RawCluster {
            codepoints: vec![ch],
            glyph_boundaries: vec![1],
        });
    }
    Ok(clusters)
}

pub fn is_digit(ch: char) -> bool {
    is_arabic_indic_digit(ch)
}
