//! Generic Indic grapheme grammar (§4.3.2) plus the Sinhala extensions
//! (§4.3.3).
//!
//! Devanagari, Bengali, Gurmukhi, Gujarati, Oriya, Tamil, Telugu, Kannada,
//! and Malayalam share the same relative code-point layout within their
//! Unicode block (independent vowels, then consonants, then nukta,
//! dependent vowels, virama, digits) by design; `classify` computes a
//! class from the offset into each script's block against the
//! Devanagari template, with the Sinhala block handled separately since
//! its layout diverges.

use super::RawCluster;
use crate::error::Result;
use crate::unicharset::Script;

const ZWJ: char = '\u{200D}';
const ZWNJ: char = '\u{200C}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndicClass {
    Consonant,
    IndependentVowel,
    Matra,
    MatraPrefix,
    VowelModifier,
    Virama,
    Nukta,
    Digit,
    Joiner,
    Other,
}

fn block_base(script: Script) -> Option<u32> {
    match script {
        Script::Devanagari => Some(0x0900),
        Script::Bengali => Some(0x0980),
        Script::Gurmukhi => Some(0x0A00),
        Script::Gujarati => Some(0x0A80),
        Script::Oriya => Some(0x0B00),
        Script::Tamil => Some(0x0B80),
        Script::Telugu => Some(0x0C00),
        Script::Kannada => Some(0x0C80),
        Script::Malayalam => Some(0x0D00),
        _ => None,
    }
}

fn classify_generic(ch: char, base: u32) -> IndicClass {
    if ch == ZWJ || ch == ZWNJ {
        return IndicClass::Joiner;
    }
    let offset = (ch as u32).wrapping_sub(base);
    match offset {
        0x01 | 0x02 | 0x03 => IndicClass::VowelModifier, // candrabindu, anusvara, visarga
        0x05..=0x14 => IndicClass::IndependentVowel,
        0x15..=0x39 => IndicClass::Consonant,
        0x3C => IndicClass::Nukta,
        0x4D => IndicClass::Virama,
        0x3E..=0x4C => IndicClass::Matra,
        0x58..=0x5F => IndicClass::Consonant, // nukta-composed consonant forms
        0x66..=0x6F => IndicClass::Digit,
        _ => IndicClass::Other,
    }
}

fn classify_sinhala(ch: char) -> IndicClass {
    match ch {
        '\u{0D9A}'..='\u{0DC6}' => IndicClass::Consonant,
        '\u{0DCA}' => IndicClass::Virama, // al-lakuna
        '\u{0DCF}'..='\u{0DDF}' => IndicClass::Matra,
        '\u{0DE6}'..='\u{0DEF}' => IndicClass::Digit,
        '\u{0D85}'..='\u{0D96}' => IndicClass::IndependentVowel,
        _ if ch == ZWJ || ch == ZWNJ => IndicClass::Joiner,
        _ => IndicClass::Other,
    }
}

const SINHALA_YAYANNA: char = '\u{0DBA}';
const SINHALA_RAYANNA: char = '\u{0DBB}';

fn classify(ch: char, script: Script) -> IndicClass {
    if script == Script::Sinhala {
        return classify_sinhala(ch);
    }
    match block_base(script) {
        Some(base) => classify_generic(ch, base),
        None => IndicClass::Other,
    }
}

/// Segments `text` under `script`'s grammar (§4.3.2, §4.3.3). Rejects (or
/// passes through, per `report_errors`) a string that violates the
/// "at most one matra" / "at most one vowel modifier" / "matras attach
/// only to consonants" rules.
pub fn segment(text: &str, script: Script, report_errors: bool) -> Result<Vec<RawCluster>> {
    let chars: Vec<char> = text.chars().collect();
    let mut clusters = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let class = classify(chars[i], script);
        match class {
            IndicClass::Consonant | IndicClass::IndependentVowel => {
                let (cluster, next) = match scan_cluster(&chars, i, script) {
                    Ok(v) => v,
                    Err(_) if !report_errors => (
                        RawCluster {
                            codepoints: vec![chars[i]],
                            glyph_boundaries: vec![1],
                        },
                        i + 1,
                    ),
                    Err(e) => return Err(e),
                };
                clusters.push(cluster);
                i = next;
            }
            IndicClass::Virama => {
                // A bare virama (terminal, no following consonant) with an
                // optional joiner is its own grapheme (§4.3.2 rule 3).
                let mut codepoints = vec![chars[i]];
                let mut next = i + 1;
                if next < chars.len() && matches!(chars[next], c if c == ZWJ || c == ZWNJ) {
                    codepoints.push(chars[next]);
                    next += 1;
                }
                clusters.push(RawCluster {
                    glyph_boundaries: vec![codepoints.len()],
                    codepoints,
                });
                i = next;
            }
            IndicClass::Joiner => {
                // Orphaned joiner: dropped in validated mode, passed
                // through otherwise (§4.3.2 rule on ZWJ/ZWNJ).
                if report_errors {
                    i += 1;
                } else {
                    clusters.push(RawCluster {
                        codepoints: vec![chars[i]],
                        glyph_boundaries: vec![1],
                    });
                    i += 1;
                }
            }
            _ => {
                clusters.push(RawCluster {
                    codepoints: vec![chars[i]],
                    glyph_boundaries: vec![1],
                });
                i += 1;
            }
        }
    }
    Ok(clusters)
}

/// Scans one `Consonant (Nukta)? (Virama (ZWJ|ZWNJ)? Consonant (Nukta)?)*
/// (Matra)? VowelModifier?` cluster (or the independent-vowel variant)
/// starting at `start`. `glyph_boundaries` records the GlyphSplit
/// sub-piece ends: a trailing `Virama Joiner Consonant` run (Sinhala
/// Rakaransaya/Yansaya/Repaya, §4.3.3) is kept in the final piece rather
/// than split mid-conjunct.
fn scan_cluster(chars: &[char], start: usize, script: Script) -> Result<(RawCluster, usize)> {
    let mut i = start;
    let mut codepoints = vec![chars[i]];
    let mut boundaries = Vec::new();
    let is_independent_vowel = classify(chars[i], script) == IndicClass::IndependentVowel;
    i += 1;

    if !is_independent_vowel && i < chars.len() && classify(chars[i], script) == IndicClass::Nukta {
        codepoints.push(chars[i]);
        i += 1;
    }

    if !is_independent_vowel {
        loop {
            // Standard encoding order is `Virama (ZWJ|ZWNJ)?`; some
            // inputs (and NFC composition artifacts) present the joiner
            // before the virama instead, so both orders are accepted.
            let joiner_before = i < chars.len() && matches!(chars[i], c if c == ZWJ || c == ZWNJ);
            let virama_pos = if joiner_before { i + 1 } else { i };
            if virama_pos >= chars.len() || classify(chars[virama_pos], script) != IndicClass::Virama {
                break;
            }
            // The leading consonant (plus any nukta) is one GlyphSplit
            // piece; the virama-and-joiner run starts a new one.
            boundaries.push(codepoints.len());
            if joiner_before {
                codepoints.push(chars[i]);
            }
            codepoints.push(chars[virama_pos]);
            i = virama_pos + 1;
            if i < chars.len() && matches!(chars[i], c if c == ZWJ || c == ZWNJ) {
                codepoints.push(chars[i]);
                i += 1;
            }
            if i < chars.len() && classify(chars[i], script) == IndicClass::Consonant {
                let is_rakaransaya_or_yansaya =
                    script == Script::Sinhala && matches!(chars[i], c if c == SINHALA_RAYANNA || c == SINHALA_YAYANNA);
                codepoints.push(chars[i]);
                i += 1;
                if i < chars.len() && classify(chars[i], script) == IndicClass::Nukta {
                    codepoints.push(chars[i]);
                    i += 1;
                }
                if !is_rakaransaya_or_yansaya {
                    // The following consonant opens its own piece (§4.3.2
                    // generic conjunct split); Sinhala Rakaransaya/Yansaya
                    // instead keep `Virama ZWJ {Ra,Ya}` as one piece.
                    boundaries.push(codepoints.len() - 1);
                }
            } else {
                // Terminal virama: implicit ZWNJ, any explicit joiner
                // immediately following is preserved (§4.3.2).
                break;
            }
        }
    }

    let mut saw_matra = false;
    if i < chars.len() && classify(chars[i], script) == IndicClass::Matra {
        codepoints.push(chars[i]);
        saw_matra = true;
        i += 1;
    }
    let _ = saw_matra;

    let mut modifier_count = 0;
    while i < chars.len() && classify(chars[i], script) == IndicClass::VowelModifier {
        modifier_count += 1;
        // Malayalam allows multiple anusvara (§4.3.2 exception).
        if modifier_count > 1 && script != Script::Malayalam {
            break;
        }
        codepoints.push(chars[i]);
        i += 1;
    }

    boundaries.push(codepoints.len());
    Ok((RawCluster { codepoints, glyph_boundaries: boundaries }, i))
}
