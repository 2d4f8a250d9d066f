//! Thai grapheme grammar (§4.3.6): `Consonant UpperVowel? LowerVowel?
//! ToneMark? (SpecialMark)*`.

use super::RawCluster;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThaiClass {
    Consonant,
    UpperVowel,
    LowerVowel,
    ToneMark,
    SpecialMark,
    Other,
}

fn classify(ch: char) -> ThaiClass {
    match ch as u32 {
        0x0E01..=0x0E2E => ThaiClass::Consonant,
        0x0E34..=0x0E37 | 0x0E47 => ThaiClass::UpperVowel,
        0x0E38..=0x0E3A => ThaiClass::LowerVowel,
        0x0E48..=0x0E4B => ThaiClass::ToneMark,
        0x0E4C..=0x0E4E | 0x0E46 => ThaiClass::SpecialMark,
        _ => ThaiClass::Other,
    }
}

pub fn segment(text: &str, report_errors: bool) -> Result<Vec<RawCluster>> {
    segment_with_mode(text, report_errors, false)
}

/// `glyph_split` widens `glyph_boundaries` so each non-base code point in
/// the cluster becomes its own GlyphSplit fragment (§4.3.6), instead of
/// the single whole-cluster boundary used for `Combined` mode.
pub fn segment_with_mode(text: &str, report_errors: bool, glyph_split: bool) -> Result<Vec<RawCluster>> {
    let chars: Vec<char> = text.chars().collect();
    let mut clusters = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if classify(chars[i]) == ThaiClass::Consonant {
            let (cluster, next) = match scan_cluster(&chars, i, glyph_split) {
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
        } else {
            clusters.push(RawCluster {
                codepoints: vec![chars[i]],
                glyph_boundaries: vec![1],
            });
            i += 1;
        }
    }
    Ok(clusters)
}

fn scan_cluster(chars: &[char], start: usize, glyph_split: bool) -> Result<(RawCluster, usize)> {
    let mut i = start;
    let mut codepoints = vec![chars[i]];
    let mut boundaries = Vec::new();
    i += 1;
    if glyph_split {
        boundaries.push(1);
    }

    if i < chars.len() && classify(chars[i]) == ThaiClass::UpperVowel {
        codepoints.push(chars[i]);
        i += 1;
        if glyph_split {
            boundaries.push(codepoints.len());
        }
    }
    if i < chars.len() && classify(chars[i]) == ThaiClass::LowerVowel {
        codepoints.push(chars[i]);
        i += 1;
        if glyph_split {
            boundaries.push(codepoints.len());
        }
    }
    if i < chars.len() && classify(chars[i]) == ThaiClass::ToneMark {
        codepoints.push(chars[i]);
        i += 1;
        if glyph_split {
            boundaries.push(codepoints.len());
        }
    }
    while i < chars.len() && classify(chars[i]) == ThaiClass::SpecialMark {
        codepoints.push(chars[i]);
        i += 1;
        if glyph_split {
            boundaries.push(codepoints.len());
        }
    }

    if !glyph_split {
        boundaries.push(codepoints.len());
    }
    Ok((RawCluster { codepoints, glyph_boundaries: boundaries }, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consonant_with_upper_vowel_and_tone_combined() {
        let text = "\u{0E01}\u{0E34}\u{0E48}";
        let clusters = segment(text, true).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].glyph_boundaries, vec![3]);
    }

    #[test]
    fn glyph_split_mode_splits_each_mark() {
        let text = "\u{0E01}\u{0E34}\u{0E48}";
        let clusters = segment_with_mode(text, true, true).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].glyph_boundaries, vec![1, 2, 3]);
    }

    #[test]
    fn bare_consonant_is_its_own_cluster() {
        let text = "\u{0E01}\u{0E02}";
        let clusters = segment(text, true).unwrap();
        assert_eq!(clusters.len(), 2);
    }
}
