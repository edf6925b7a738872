use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Ellipsis string used for truncation
const ELLIPSIS: &str = "...";
/// Display width of the ellipsis (3 columns for ASCII "...")
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within a maximum display width.
///
/// Widths are Unicode-aware: CJK characters count as two columns. If
/// truncation is necessary, appends "..." to indicate text was cut off.
/// Widths too narrow for a character plus the ellipsis (0-3 columns) get as
/// many characters as fit, with no ellipsis.
///
/// Returns `Cow::Borrowed` when the string already fits.
///
/// # Examples
///
/// ```
/// use podshelf::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if max_width <= ELLIPSIS_WIDTH {
        let mut byte_end = 0;
        let mut current_width = 0;
        for (idx, c) in s.char_indices() {
            let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
            if current_width + char_width > max_width {
                break;
            }
            current_width += char_width;
            byte_end = idx + c.len_utf8();
        }
        if byte_end == s.len() {
            return Cow::Borrowed(s);
        }
        return Cow::Owned(s[..byte_end].to_string());
    }
    let target_width = max_width - ELLIPSIS_WIDTH;

    let mut current_width = 0;
    // Byte index where the text is cut if it turns out not to fit
    let mut cut_point = None;

    for (idx, c) in s.char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);

        if cut_point.is_none() && current_width + char_width > target_width {
            cut_point = Some(idx);
        }

        if current_width + char_width > max_width {
            let cut = cut_point.unwrap_or(idx);
            return Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS));
        }

        current_width += char_width;
    }

    Cow::Borrowed(s)
}

/// Strip terminal control characters and ANSI escape sequences from text.
///
/// Podcast names come straight from imported OPML files, so they are cleaned
/// before being printed to the terminal.
///
/// Strips:
/// - ASCII control chars: 0x00-0x08, 0x0B-0x0C, 0x0E-0x1F, 0x7F
/// - ANSI CSI sequences: `\x1b[` ... (terminal byte 0x40-0x7E)
/// - ANSI OSC sequences: `\x1b]` ... (until BEL 0x07 or ST `\x1b\\`)
/// - Bare ESC (0x1b) not followed by `[` or `]`
///
/// Preserves: tab (0x09), newline (0x0A), carriage return (0x0D).
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    fn is_control(b: u8) -> bool {
        b == 0x1b || b == 0x7f || (b < 0x20 && b != 0x09 && b != 0x0a && b != 0x0d)
    }

    let bytes = s.as_bytes();
    let len = bytes.len();

    if !bytes.iter().any(|&b| is_control(b)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let b = bytes[i];

        if b == 0x1b && i + 1 < len && bytes[i + 1] == b'[' {
            // CSI: parameter and intermediate bytes up to and including the final byte
            i += 2;
            while i < len {
                let c = bytes[i];
                i += 1;
                if (0x40..=0x7e).contains(&c) {
                    break;
                }
            }
        } else if b == 0x1b && i + 1 < len && bytes[i + 1] == b']' {
            // OSC: everything up to BEL or ST
            i += 2;
            while i < len {
                if bytes[i] == 0x07 {
                    i += 1;
                    break;
                }
                if bytes[i] == 0x1b && i + 1 < len && bytes[i + 1] == b'\\' {
                    i += 2;
                    break;
                }
                i += 1;
            }
        } else if is_control(b) {
            i += 1;
        } else {
            let start = i;
            i += 1;
            while i < len && !is_control(bytes[i]) {
                i += 1;
            }
            // Only ASCII control bytes end a run, and those never appear
            // mid-codepoint, so this slice is valid UTF-8.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}

/// Replace line breaks and tabs with spaces so a name prints on one line.
///
/// [`strip_control_chars`] keeps `\t`, `\n` and `\r`; a listing row needs
/// them gone too, or a name could fake extra rows.
pub fn to_single_line(s: &str) -> Cow<'_, str> {
    if !s.contains(['\t', '\n', '\r']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace(['\t', '\n', '\r'], " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
        assert_eq!(truncate_to_width("Short", 10), "Short");
    }

    #[test]
    fn test_cjk_truncation() {
        // 8 columns into 7: two characters plus the ellipsis
        assert_eq!(truncate_to_width("日本語版", 7), "日本...");
        assert_eq!(truncate_to_width("日本", 10), "日本");
    }

    #[test]
    fn test_exact_fit_is_borrowed() {
        let result = truncate_to_width("12345", 5);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "12345");
    }

    #[test]
    fn test_narrow_widths() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
        assert_eq!(truncate_to_width("Testing", 4), "T...");
        assert_eq!(truncate_to_width("日本", 1), "");
    }

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let input = "Clean podcast name";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_strip_control_chars_removes_controls() {
        assert_eq!(strip_control_chars("he\x00ll\x07o\x7f!"), "hello!");
    }

    #[test]
    fn test_strip_ansi_sequences() {
        assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(
            strip_control_chars("\x1b]0;evil title\x07safe"),
            "safe"
        );
        assert_eq!(
            strip_control_chars("\x1b]0;evil title\x1b\\safe"),
            "safe"
        );
        assert_eq!(strip_control_chars("before\x1bafter"), "beforeafter");
    }

    #[test]
    fn test_strip_preserves_unicode_and_whitespace() {
        assert_eq!(
            strip_control_chars("日本\t\x1b[1m語\x1b[0m\n"),
            "日本\t語\n"
        );
    }

    #[test]
    fn test_single_line_replaces_breaks() {
        assert_eq!(to_single_line("Line\r\n[9] \t Fake"), "Line  [9]   Fake");
        assert!(matches!(to_single_line("Plain"), Cow::Borrowed(_)));
    }
}
