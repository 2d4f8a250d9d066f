//! `GraphemeValidator`: a script-aware state machine that segments,
//! cleans, and validates complex-script text (§4.3). A pure function over
//! UTF-8/UTF-32 depending only on [`crate::unicharset::UnicharSet`] for
//! optional OCR normalization.

pub mod arabic;
pub mod indic;
pub mod khmer;
pub mod myanmar;
pub mod normalize;
pub mod thai;

use crate::error::{OcrError, Result};
use crate::unicharset::Script;
use unicode_normalization::UnicodeNormalization;

/// Unicode normalization form applied in pipeline stage 1 (§4.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnicodeNorm {
    Nfc,
    Nfd,
    #[default]
    Nfkc,
    Nfkd,
}

/// Output packaging mode (§4.3.1 stage 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphemeMode {
    IndividualUnicodes,
    GlyphSplit,
    #[default]
    Combined,
    SingleString,
}

/// Validator options (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub unicode_norm: UnicodeNorm,
    pub ocr_norm: bool,
    pub grapheme_mode: GraphemeMode,
    pub report_errors: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions {
            unicode_norm: UnicodeNorm::default(),
            ocr_norm: false,
            grapheme_mode: GraphemeMode::default(),
            report_errors: true,
        }
    }
}

/// A validated grapheme cluster: either a grammar-conformant cluster, or,
/// in pass-through mode, a sequence tagged not-validated (§3.2 invariant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub text: String,
    pub validated: bool,
}

/// `NormalizeUTF8String`: applies unicode normalization, OCR
/// normalization, and whitespace canonicalization (stages 1-3), never
/// partially writing its output (§4.3.8).
pub fn normalize_utf8_string(input: &str, opts: ValidatorOptions) -> Result<String> {
    if input.is_empty() {
        return Ok(String::new());
    }
    let normalized: String = match opts.unicode_norm {
        UnicodeNorm::Nfc => input.nfc().collect(),
        UnicodeNorm::Nfd => input.nfd().collect(),
        UnicodeNorm::Nfkc => input.nfkc().collect(),
        UnicodeNorm::Nfkd => input.nfkd().collect(),
    };
    let normalized = if opts.ocr_norm {
        normalize::ocr_normalize(&normalized)
    } else {
        normalized
    };
    Ok(normalize::canonicalize_whitespace(&normalized))
}

/// `NormalizeCleanAndSegmentUTF8`: runs the full pipeline (§4.3.1) and
/// packages the result per `grapheme_mode`.
pub fn normalize_clean_and_segment_utf8(input: &str, opts: ValidatorOptions) -> Result<Vec<Cluster>> {
    let normalized = normalize_utf8_string(input, opts)?;
    let script = detect_dominant_script(&normalized);
    let clusters = segment(&normalized, script, opts.report_errors, opts.grapheme_mode == GraphemeMode::GlyphSplit)?;
    Ok(package(&clusters, opts.grapheme_mode))
}

/// Stage 4: chooses the dominant virama-bearing script among the scripts
/// named in §4.3.1. Danda/double-danda (U+0964/U+0965) never count
/// towards script detection. Latin and punctuation are always admitted
/// regardless of the detected script.
pub fn detect_dominant_script(text: &str) -> Option<Script> {
    let mut counts: std::collections::HashMap<Script, usize> = std::collections::HashMap::new();
    for ch in text.chars() {
        if matches!(ch, '\u{0964}' | '\u{0965}') {
            continue;
        }
        let script = crate::unicharset::script_of(ch);
        if script.is_virama_bearing() {
            *counts.entry(script).or_insert(0) += 1;
        }
    }
    counts.into_iter().max_by_key(|&(_, count)| count).map(|(s, _)| s)
}

/// One already-segmented cluster before output packaging: its code
/// points plus, for `GlyphSplit`, the sub-cluster boundaries within it.
#[derive(Debug, Clone)]
pub(crate) struct RawCluster {
    pub(crate) codepoints: Vec<char>,
    pub(crate) glyph_boundaries: Vec<usize>,
}

fn segment(text: &str, script: Option<Script>, report_errors: bool, glyph_split: bool) -> Result<Vec<RawCluster>> {
    match script {
        Some(Script::Khmer) => khmer::segment(text, report_errors),
        Some(Script::Myanmar) => myanmar::segment(text, report_errors),
        Some(Script::Thai) => thai::segment_with_mode(text, report_errors, glyph_split),
        Some(s) if s.is_virama_bearing() => indic::segment(text, s, report_errors),
        _ if text.chars().any(|c| crate::unicharset::script_of(c) == Script::Arabic) => {
            arabic::segment(text, report_errors)
        }
        _ => Ok(fallback_segment(text)),
    }
}

/// Grapheme segmentation for scripts with no dedicated grammar (Latin,
/// punctuation, digits): one code point per cluster, which is always a
/// legal (if trivial) grapheme.
fn fallback_segment(text: &str) -> Vec<RawCluster> {
    text.chars()
        .map(|c| RawCluster {
            codepoints: vec![c],
            glyph_boundaries: vec![1],
        })
        .collect()
}

fn package(clusters: &[RawCluster], mode: GraphemeMode) -> Vec<Cluster> {
    match mode {
        GraphemeMode::IndividualUnicodes => clusters
            .iter()
            .flat_map(|c| c.codepoints.iter())
            .map(|&ch| Cluster {
                text: ch.to_string(),
                validated: true,
            })
            .collect(),
        GraphemeMode::Combined => clusters
            .iter()
            .map(|c| Cluster {
                text: c.codepoints.iter().collect(),
                validated: true,
            })
            .collect(),
        GraphemeMode::GlyphSplit => clusters
            .iter()
            .flat_map(|c| {
                let mut pieces = Vec::new();
                let mut start = 0;
                for &end in &c.glyph_boundaries {
                    pieces.push(Cluster {
                        text: c.codepoints[start..end].iter().collect(),
                        validated: true,
                    });
                    start = end;
                }
                pieces
            })
            .collect(),
        GraphemeMode::SingleString => {
            let whole: String = clusters.iter().flat_map(|c| c.codepoints.iter()).collect();
            vec![Cluster {
                text: whole,
                validated: true,
            }]
        }
    }
}

pub(crate) fn reject(report_errors: bool, message: impl Into<String>) -> Result<Vec<RawCluster>> {
    if report_errors {
        Err(OcrError::validation(message))
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_roundtrips_through_combined_mode() {
        let opts = ValidatorOptions::default();
        let clusters = normalize_clean_and_segment_utf8("Hello", opts).unwrap();
        let joined: String = clusters.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined, "Hello"); // P6
    }

    #[test]
    fn idempotent_validation_p5() {
        let opts = ValidatorOptions::default();
        let once = normalize_utf8_string("café", opts).unwrap();
        let twice = normalize_utf8_string(&once, opts).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn detects_devanagari_as_dominant_script() {
        let script = detect_dominant_script("\u{0915}\u{0916}\u{0917}");
        assert_eq!(script, Some(Script::Devanagari));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let opts = ValidatorOptions::default();
        assert!(normalize_clean_and_segment_utf8("", opts).unwrap().is_empty());
    }

    #[test]
    fn single_string_mode_produces_one_element() {
        let opts = ValidatorOptions {
            grapheme_mode: GraphemeMode::SingleString,
            ..Default::default()
        };
        let clusters = normalize_clean_and_segment_utf8("hello world", opts).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].text, "hello world");
    }
}
