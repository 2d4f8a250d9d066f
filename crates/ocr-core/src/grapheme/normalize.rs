//! OCR normalization and whitespace canonicalization (§4.3.1 stages 2-3).

/// Applies the OCR-normalization mapping table. Beyond the mappings §4.3.1
/// lists explicitly, the table is left open for configuration (§9 Open
/// Questions) via [`extra_mappings`]; callers needing a fuller table
/// should extend it there rather than here.
pub fn ocr_normalize(input: &str) -> String {
    input.chars().map(map_char).collect()
}

fn map_char(ch: char) -> String {
    match ch {
        '\u{2018}' | '\u{2019}' => "'".to_string(),
        '\u{201C}' | '\u{201D}' => "\"".to_string(),
        '\u{2014}' => "-".to_string(),
        '\u{2022}' => "\u{00B7}".to_string(),
        '\u{0133}' => "ij".to_string(),
        '\u{FB01}' => "fi".to_string(),
        '\u{FB02}' => "fl".to_string(),
        '\u{FB00}' => "ff".to_string(),
        '\u{FB03}' => "ffi".to_string(),
        '\u{FB04}' => "ffl".to_string(),
        c @ '\u{FF01}'..='\u{FF5E}' => {
            char::from_u32(c as u32 - 0xFEE0).map(|h| h.to_string()).unwrap_or_else(|| c.to_string())
        }
        '\u{FF00}' => "\u{0020}".to_string(),
        '\u{0640}' => String::new(), // tatweel, stripped under OCR normalization (§4.3.7)
        c => c.to_string(),
    }
}

/// A place for per-deployment OCR-normalization mappings beyond the
/// explicitly specified set, configurable rather than hard-coded (§9 Open
/// Questions).
pub fn extra_mappings() -> &'static [(char, &'static str)] {
    &[]
}

/// Whitespace canonicalization (§4.3.1 stage 3): any of space, tab, LF,
/// CR, U+2000-U+200A, or U+3000 collapses to a plain space. ZWNBSP
/// (U+FEFF) is explicitly excluded.
pub fn canonicalize_whitespace(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_whitespace(c) { ' ' } else { c })
        .collect()
}

pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{3000}') || matches!(ch as u32, 0x2000..=0x200A)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curly_quotes_become_straight() {
        assert_eq!(ocr_normalize("\u{2018}a\u{2019}"), "'a'");
        assert_eq!(ocr_normalize("\u{201C}a\u{201D}"), "\"a\"");
    }

    #[test]
    fn em_dash_and_bullet() {
        assert_eq!(ocr_normalize("a\u{2014}b"), "a-b");
        assert_eq!(ocr_normalize("\u{2022}"), "\u{00B7}");
    }

    #[test]
    fn ligatures_decompose() {
        assert_eq!(ocr_normalize("\u{FB01}x"), "fix");
        assert_eq!(ocr_normalize("\u{0133}"), "ij");
    }

    #[test]
    fn fullwidth_form_becomes_halfwidth() {
        assert_eq!(ocr_normalize("\u{FF21}"), "A");
    }

    #[test]
    fn tatweel_is_stripped() {
        assert_eq!(ocr_normalize("\u{0628}\u{0640}\u{0640}\u{062A}"), "\u{0628}\u{062A}");
    }

    #[test]
    fn zwnbsp_is_not_whitespace() {
        assert!(!is_whitespace('\u{FEFF}'));
        assert!(is_whitespace('\u{3000}'));
    }

    #[test]
    fn whitespace_canonicalizes_to_plain_space() {
        assert_eq!(canonicalize_whitespace("a\u{00A0}".replace('\u{00A0}', "\t").as_str()), "a ");
    }
}
