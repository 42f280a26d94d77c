/// Check if content looks like binary data rather than source text
pub fn is_binary(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(8192)];
    if sample.is_empty() {
        return false;
    }

    // Source files never contain NUL bytes
    if sample.contains(&0) {
        return true;
    }

    let control = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\n' | b'\r' | b'\t' | 0x0c))
        .count();

    control > sample.len() / 8
}

/// Collapse all whitespace runs to single spaces and cap the length.
///
/// A leading space is kept (it separates the text from whatever precedes
/// it), trailing whitespace is dropped. Returns `None` for blank input or
/// when `max_len` is zero.
pub fn one_line(raw: &str, max_len: usize) -> Option<String> {
    if max_len == 0 {
        return None;
    }

    let body = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if body.is_empty() {
        return None;
    }

    let text = if raw.starts_with(char::is_whitespace) {
        format!(" {body}")
    } else {
        body
    };
    Some(truncate_chars(&text, max_len))
}

/// Truncate to at most `max_chars` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_binary() {
        assert!(!is_binary(b"export const a = 1;\n"));
        assert!(!is_binary(b""));
        assert!(is_binary(b"\x7fELF\x00\x00\x01"));
        assert!(is_binary(&[0x01, 0x02, 0x03, 0x04, b'a']));
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("(a,\n    b)", 80).as_deref(), Some("(a, b)"));
        assert_eq!(one_line(" extends  Base ", 80).as_deref(), Some(" extends Base"));
        assert_eq!(one_line("   \n ", 80), None);
        assert_eq!(one_line("(a)", 0), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ab cd", 3), "ab...");
        assert_eq!(truncate_chars("héllo", 2), "hé...");
    }
}
