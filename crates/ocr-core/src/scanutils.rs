//! A `tfscanf`-style parser, bit-compatible with the C standard `fscanf`
//! for the conversion specifiers `%d %i %f %s %*` with an optional width
//! (§6.4), grounded in the original `unittest/scanutils_test.cc` behavior.
//! Used by the box-file reader and by [`crate::config::ConfigStore`]'s
//! file loader wherever a field needs strict positional scanning rather
//! than `split_once`.

/// One parsed conversion-specifier result.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// A compiled `tfscanf` format string: a sequence of literal-text and
/// conversion-specifier segments.
#[derive(Debug, Clone, PartialEq)]
enum FormatItem {
    /// Matches (and discards) exactly this literal text, skipping leading
    /// whitespace the way `fscanf` does before a non-`%c` conversion.
    Literal(String),
    /// `%d` / `%i`: an optionally-signed decimal integer, with an optional
    /// maximum field width.
    Int(Option<usize>),
    /// `%f`: a floating-point number, with an optional maximum width.
    Float(Option<usize>),
    /// `%s`: a maximal run of non-whitespace, with an optional maximum
    /// width.
    Str(Option<usize>),
    /// `%*...`: a suppressed conversion (parsed and discarded, not
    /// returned to the caller), any of the three kinds above.
    Suppressed(Box<FormatItem>),
}

fn parse_format(fmt: &str) -> Vec<FormatItem> {
    let mut items = Vec::new();
    let mut chars = fmt.chars().peekable();
    let mut literal = String::new();
    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        if !literal.is_empty() {
            items.push(FormatItem::Literal(std::mem::take(&mut literal)));
        }
        let suppressed = chars.peek() == Some(&'*');
        if suppressed {
            chars.next();
        }
        let mut width = String::new();
        while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
            width.push(chars.next().unwrap());
        }
        let width: Option<usize> = if width.is_empty() { None } else { width.parse().ok() };
        let Some(spec) = chars.next() else { break };
        let item = match spec {
            'd' | 'i' => FormatItem::Int(width),
            'f' => FormatItem::Float(width),
            's' => FormatItem::Str(width),
            '%' => {
                literal.push('%');
                continue;
            }
            _ => continue,
        };
        items.push(if suppressed { FormatItem::Suppressed(Box::new(item)) } else { item });
    }
    if !literal.is_empty() {
        items.push(FormatItem::Literal(literal));
    }
    items
}

/// Scans `input` against `fmt`, returning the values bound to each
/// non-suppressed conversion specifier, in order. Returns `None` if a
/// literal fails to match or a conversion finds no valid characters at its
/// position (matching `fscanf`'s "matching failure" early-return: the
/// values already converted in a longer call are discarded here too,
/// since the core's only two call sites re-scan a whole line at once
/// rather than streaming across an open file).
pub fn tfscanf(input: &str, fmt: &str) -> Option<Vec<ScanValue>> {
    let items = parse_format(fmt);
    let mut rest = input;
    let mut out = Vec::new();
    for item in &items {
        rest = skip_leading_whitespace(rest);
        match item {
            FormatItem::Literal(lit) => {
                let lit = lit.trim();
                if lit.is_empty() {
                    continue;
                }
                rest = rest.strip_prefix(lit)?;
            }
            FormatItem::Int(width) => {
                let (value, consumed) = scan_int(rest, *width)?;
                out.push(ScanValue::Int(value));
                rest = &rest[consumed..];
            }
            FormatItem::Float(width) => {
                let (value, consumed) = scan_float(rest, *width)?;
                out.push(ScanValue::Float(value));
                rest = &rest[consumed..];
            }
            FormatItem::Str(width) => {
                let (value, consumed) = scan_str(rest, *width);
                if consumed == 0 {
                    return None;
                }
                out.push(ScanValue::Str(value));
                rest = &rest[consumed..];
            }
            FormatItem::Suppressed(inner) => {
                let consumed = match inner.as_ref() {
                    FormatItem::Int(width) => scan_int(rest, *width)?.1,
                    FormatItem::Float(width) => scan_float(rest, *width)?.1,
                    FormatItem::Str(width) => {
                        let (_, c) = scan_str(rest, *width);
                        if c == 0 {
                            return None;
                        }
                        c
                    }
                    _ => 0,
                };
                rest = &rest[consumed..];
            }
        }
    }
    Some(out)
}

fn skip_leading_whitespace(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_whitespace())
}

fn scan_int(s: &str, width: Option<usize>) -> Option<(i64, usize)> {
    let limit = width.unwrap_or(usize::MAX);
    let mut end = 0;
    let bytes = s.as_bytes();
    if end < bytes.len() && end < limit && matches!(bytes[end], b'+' | b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && end < limit && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok().map(|v| (v, end))
}

fn scan_float(s: &str, width: Option<usize>) -> Option<(f64, usize)> {
    let limit = width.unwrap_or(usize::MAX);
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && end < limit && matches!(bytes[end], b'+' | b'-') {
        end += 1;
    }
    let mantissa_start = end;
    while end < bytes.len() && end < limit && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && end < limit && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && end < limit && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == mantissa_start || (end == mantissa_start + 1 && bytes[mantissa_start] == b'.') {
        return None;
    }
    if end < bytes.len() && end < limit && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && exp_end < limit && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && exp_end < limit && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok().map(|v| (v, end))
}

fn scan_str(s: &str, width: Option<usize>) -> (String, usize) {
    let limit = width.unwrap_or(usize::MAX);
    let mut end = 0;
    for c in s.chars() {
        if end >= limit || c.is_whitespace() {
            break;
        }
        end += c.len_utf8();
    }
    (s[..end].to_string(), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_plain_ints() {
        let out = tfscanf("12 -7", "%d %d").unwrap();
        assert_eq!(out, vec![ScanValue::Int(12), ScanValue::Int(-7)]);
    }

    #[test]
    fn scans_box_file_line_shape() {
        // "TEXT LEFT BOTTOM RIGHT TOP PAGE" (§6.3 box file format).
        let out = tfscanf("~ 10 20 30 40 0", "%s %d %d %d %d %d").unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], ScanValue::Str("~".to_string()));
        assert_eq!(out[5], ScanValue::Int(0));
    }

    #[test]
    fn suppressed_conversion_is_not_returned() {
        let out = tfscanf("eng 300", "%*s %d").unwrap();
        assert_eq!(out, vec![ScanValue::Int(300)]);
    }

    #[test]
    fn width_limits_the_conversion() {
        let out = tfscanf("12345", "%2d%d").unwrap();
        assert_eq!(out, vec![ScanValue::Int(12), ScanValue::Int(345)]);
    }

    #[test]
    fn scans_float_with_exponent() {
        let out = tfscanf("-0.125", "%f").unwrap();
        assert_eq!(out, vec![ScanValue::Float(-0.125)]);
    }

    #[test]
    fn literal_mismatch_fails() {
        assert!(tfscanf("x=5", "y=%d").is_none());
    }

    #[test]
    fn missing_digits_fails() {
        assert!(tfscanf("abc", "%d").is_none());
    }
}
