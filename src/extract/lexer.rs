//! Comment- and string-aware masking of source text.
//!
//! The scanners never look at raw text. [`mask`] produces two copies of the
//! source with identical byte offsets:
//!
//! - `code`: comments *and* string contents replaced by spaces, used for
//!   pattern matching and bracket tracking;
//! - `display`: only comments replaced, used to slice signature text.
//!
//! Newlines are preserved in both, so line numbers and offsets line up with
//! the original. Masking also validates bracket balance; an unbalanced or
//! unterminated file is reported as an [`ExtractionWarning`].

use crate::error::ExtractionWarning;
use crate::utils::one_line;

/// A string delimiter
#[derive(Debug, Clone, Copy)]
pub(crate) struct Quote {
    pub delim: &'static str,
    pub multiline: bool,
    pub escapes: bool,
}

/// Lexical rules of one language family
#[derive(Debug, Clone, Copy)]
pub(crate) struct Syntax {
    pub line_comments: &'static [&'static str],
    pub block_comment: Option<(&'static str, &'static str)>,
    pub nested_comments: bool,
    /// Longer delimiters must come first (`"""` before `"`)
    pub quotes: &'static [Quote],
    /// `/re/` literals (JavaScript family)
    pub regex_literals: bool,
    /// Raw strings and char literals vs. lifetimes (Rust)
    pub rust_literals: bool,
}

/// Where a statement tail ends, at bracket depth zero
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Stops {
    pub brace: bool,
    pub semicolon: bool,
    pub equals: bool,
    pub colon: bool,
    pub newline: bool,
}

impl Stops {
    /// Declarations followed by a body: `fn f(a) -> T {`
    pub const BODY: Stops = Stops {
        brace: true,
        semicolon: true,
        equals: false,
        colon: false,
        newline: true,
    };

    /// Value bindings: only the type annotation before `=` is kept
    pub const VALUE: Stops = Stops {
        brace: false,
        semicolon: true,
        equals: true,
        colon: false,
        newline: true,
    };

    /// Type aliases: the `= ...` part is the signature
    pub const ALIAS: Stops = Stops {
        brace: false,
        semicolon: true,
        equals: false,
        colon: false,
        newline: true,
    };

    /// Python headers ending in `:`
    pub const HEADER: Stops = Stops {
        brace: false,
        semicolon: false,
        equals: false,
        colon: true,
        newline: true,
    };

    pub const SEMICOLON: Stops = Stops {
        brace: false,
        semicolon: true,
        equals: false,
        colon: false,
        newline: false,
    };
}

/// One masked line
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'m> {
    /// Byte offset of the line start
    pub start: usize,
    /// Open brackets at the start of the line
    pub depth: usize,
    pub code: &'m str,
}

#[derive(Debug)]
pub(crate) struct Masked {
    code: String,
    display: String,
    /// (line start offset, depth at line start)
    starts: Vec<(usize, usize)>,
}

impl Masked {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> {
        let len = self.code.len();
        self.starts.iter().enumerate().map(move |(i, &(start, depth))| {
            let end = self
                .starts
                .get(i + 1)
                .map(|&(next, _)| next - 1)
                .unwrap_or(len);
            Line {
                start,
                depth,
                code: &self.code[start..end],
            }
        })
    }

    /// Offset where the statement starting at `from` ends
    pub fn statement_end(&self, from: usize, stops: Stops) -> usize {
        let bytes = self.code.as_bytes();
        let mut depth = 0usize;
        let mut j = from;

        while j < bytes.len() {
            let b = bytes[j];
            match b {
                b'{' if depth == 0 && stops.brace => break,
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                b';' if depth == 0 && stops.semicolon => break,
                b'\n' if depth == 0 && stops.newline => break,
                b':' if depth == 0 && stops.colon => break,
                b'=' if depth == 0 && stops.equals => {
                    let next = bytes.get(j + 1).copied();
                    let prev = if j > 0 { bytes[j - 1] } else { b' ' };
                    let compound = matches!(next, Some(b'>') | Some(b'='))
                        || matches!(prev, b'=' | b'!' | b'<' | b'>');
                    if !compound {
                        break;
                    }
                }
                _ => {}
            }
            j += 1;
        }

        j
    }

    /// Offset just past the bracket matching the one at `open`
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        let bytes = self.code.as_bytes();
        let mut depth = 0usize;
        for (j, &b) in bytes.iter().enumerate().skip(open) {
            match b {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(j + 1);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Display text between two offsets, collapsed to one line
    pub fn text(&self, from: usize, to: usize, max_len: usize) -> Option<String> {
        one_line(self.display.get(from..to)?, max_len)
    }

    /// Signature text following a declaration name
    pub fn signature(&self, from: usize, stops: Stops, max_len: usize) -> Option<String> {
        let end = self.statement_end(from, stops);
        self.text(from, end, max_len)
    }
}

/// Mask comments and strings of `source`
pub(crate) fn mask(source: &str, syntax: &Syntax) -> Result<Masked, ExtractionWarning> {
    let lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        syntax,
        code: source.as_bytes().to_vec(),
        display: source.as_bytes().to_vec(),
        stack: Vec::new(),
        line: 1,
        starts: vec![(0, 0)],
        prev: None,
    };
    lexer.run()
}

struct Lexer<'s> {
    source: &'s str,
    bytes: &'s [u8],
    syntax: &'s Syntax,
    code: Vec<u8>,
    display: Vec<u8>,
    /// (open bracket, line)
    stack: Vec<(u8, usize)>,
    line: usize,
    starts: Vec<(usize, usize)>,
    /// Last significant code byte, for regex literal detection
    prev: Option<u8>,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Masked, ExtractionWarning> {
        let mut i = 0;

        while i < self.bytes.len() {
            let b = self.bytes[i];

            if b == b'\n' {
                self.newline(i);
                i += 1;
                continue;
            }
            if b.is_ascii_whitespace() {
                i += 1;
                continue;
            }
            if let Some(end) = self.line_comment(i) {
                self.mask_range(i, end, true);
                i = end;
                continue;
            }
            if let Some(end) = self.block_comment(i)? {
                self.mask_range(i, end, true);
                i = end;
                continue;
            }
            if let Some(end) = self.string(i)? {
                self.prev = Some(b'"');
                i = end;
                continue;
            }
            if self.syntax.rust_literals {
                if let Some(end) = self.rust_literal(i)? {
                    self.prev = Some(b'"');
                    i = end;
                    continue;
                }
            }
            if self.syntax.regex_literals && b == b'/' {
                if let Some(end) = self.regex_literal(i) {
                    self.prev = Some(b'"');
                    i = end;
                    continue;
                }
            }

            match b {
                b'(' | b'[' | b'{' => self.stack.push((b, self.line)),
                b')' | b']' | b'}' => {
                    let expected = match b {
                        b')' => b'(',
                        b']' => b'[',
                        _ => b'{',
                    };
                    match self.stack.pop() {
                        Some((open, _)) if open == expected => {}
                        _ => {
                            return Err(ExtractionWarning::UnbalancedBracket {
                                line: self.line,
                                found: b as char,
                            });
                        }
                    }
                }
                _ => {}
            }
            self.prev = Some(b);
            i += 1;
        }

        if let Some(&(open, line)) = self.stack.last() {
            return Err(ExtractionWarning::UnclosedBracket {
                line,
                open: open as char,
            });
        }

        let code = String::from_utf8(self.code).map_err(|_| ExtractionWarning::InvalidUtf8)?;
        let display =
            String::from_utf8(self.display).map_err(|_| ExtractionWarning::InvalidUtf8)?;

        Ok(Masked {
            code,
            display,
            starts: self.starts,
        })
    }

    fn newline(&mut self, at: usize) {
        self.line += 1;
        self.starts.push((at + 1, self.stack.len()));
    }

    /// Blank `from..to` in the code copy (and the display copy if asked),
    /// keeping newlines
    fn mask_range(&mut self, from: usize, to: usize, display_too: bool) {
        for k in from..to {
            if self.bytes[k] == b'\n' {
                self.newline(k);
                continue;
            }
            self.code[k] = b' ';
            if display_too {
                self.display[k] = b' ';
            }
        }
    }

    fn line_end(&self, from: usize) -> usize {
        self.bytes[from..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| from + p)
            .unwrap_or(self.bytes.len())
    }

    fn line_comment(&self, i: usize) -> Option<usize> {
        let rest = &self.bytes[i..];

        // Shebang, but not a Rust inner attribute `#![...]`
        if i == 0 && rest.starts_with(b"#!") && rest.get(2) != Some(&b'[') {
            return Some(self.line_end(i));
        }

        self.syntax
            .line_comments
            .iter()
            .any(|p| rest.starts_with(p.as_bytes()))
            .then(|| self.line_end(i))
    }

    fn block_comment(&self, i: usize) -> Result<Option<usize>, ExtractionWarning> {
        let Some((open, close)) = self.syntax.block_comment else {
            return Ok(None);
        };
        if !self.bytes[i..].starts_with(open.as_bytes()) {
            return Ok(None);
        }

        let mut depth = 1;
        let mut j = i + open.len();
        loop {
            if j >= self.bytes.len() {
                return Err(ExtractionWarning::UnterminatedComment { line: self.line });
            }
            let rest = &self.bytes[j..];
            if self.syntax.nested_comments && rest.starts_with(open.as_bytes()) {
                depth += 1;
                j += open.len();
            } else if rest.starts_with(close.as_bytes()) {
                depth -= 1;
                j += close.len();
                if depth == 0 {
                    return Ok(Some(j));
                }
            } else {
                j += 1;
            }
        }
    }

    fn string(&mut self, i: usize) -> Result<Option<usize>, ExtractionWarning> {
        let Some(quote) = self
            .syntax
            .quotes
            .iter()
            .find(|q| self.bytes[i..].starts_with(q.delim.as_bytes()))
            .copied()
        else {
            return Ok(None);
        };

        let open_line = self.line;
        let delim = quote.delim.as_bytes();
        let content_start = i + delim.len();
        let mut j = content_start;

        loop {
            if j >= self.bytes.len() {
                if quote.multiline {
                    return Err(ExtractionWarning::UnterminatedString { line: open_line });
                }
                // Single-line strings are closed leniently at end of input
                self.mask_range(content_start, self.bytes.len(), false);
                return Ok(Some(self.bytes.len()));
            }

            let b = self.bytes[j];
            if b == b'\\' && quote.escapes {
                j += 2;
            } else if b == b'\n' && !quote.multiline {
                // ...and at end of line, so stray apostrophes (JSX text) stay local
                self.mask_range(content_start, j, false);
                return Ok(Some(j));
            } else if self.bytes[j..].starts_with(delim) {
                self.mask_range(content_start, j, false);
                return Ok(Some(j + delim.len()));
            } else {
                j += 1;
            }
        }
    }

    fn rust_literal(&mut self, i: usize) -> Result<Option<usize>, ExtractionWarning> {
        let b = self.bytes[i];
        let after_ident = i > 0 && is_ident_byte(self.bytes[i - 1]);

        // r"..", r#".."#, br".."
        if !after_ident && (b == b'r' || (b == b'b' && self.bytes.get(i + 1) == Some(&b'r'))) {
            let mut j = if b == b'r' { i + 1 } else { i + 2 };
            let hashes_start = j;
            while self.bytes.get(j) == Some(&b'#') {
                j += 1;
            }
            let hashes = j - hashes_start;

            if self.bytes.get(j) == Some(&b'"') {
                let content_start = j + 1;
                let mut closing = vec![b'"'];
                closing.extend(std::iter::repeat_n(b'#', hashes));

                let mut k = content_start;
                while k < self.bytes.len() {
                    if self.bytes[k..].starts_with(&closing) {
                        self.mask_range(content_start, k, false);
                        return Ok(Some(k + closing.len()));
                    }
                    k += 1;
                }
                return Err(ExtractionWarning::UnterminatedString { line: self.line });
            }
            return Ok(None);
        }

        if b != b'\'' {
            return Ok(None);
        }

        // '\n', '\'', '\u{1F600}'
        if self.bytes.get(i + 1) == Some(&b'\\') {
            let mut j = i + 3;
            while j < self.bytes.len() && j < i + 14 {
                match self.bytes[j] {
                    b'\'' => {
                        self.mask_range(i + 1, j, false);
                        return Ok(Some(j + 1));
                    }
                    b'\n' => break,
                    _ => j += 1,
                }
            }
            return Ok(None);
        }

        // 'x' is a char literal, 'a without a closing quote is a lifetime
        if let Some(c) = self.source[i + 1..].chars().next() {
            let end = i + 1 + c.len_utf8();
            if c != '\'' && c != '\n' && self.bytes.get(end) == Some(&b'\'') {
                self.mask_range(i + 1, end, false);
                return Ok(Some(end + 1));
            }
        }

        Ok(None)
    }

    fn regex_literal(&mut self, i: usize) -> Option<usize> {
        if matches!(self.bytes.get(i + 1), Some(b'/') | Some(b'*')) {
            return None;
        }
        let starts_expression = match self.prev {
            None => true,
            Some(p) if is_ident_byte(p) => REGEX_KEYWORDS.contains(&self.preceding_word(i)),
            Some(p) => matches!(
                p,
                b'(' | b',' | b'=' | b':' | b'[' | b'!' | b'&' | b'|' | b'?' | b'{' | b'}'
                    | b';' | b'+' | b'-' | b'*' | b'%' | b'~' | b'^'
            ),
        };
        if !starts_expression {
            return None;
        }

        let mut in_class = false;
        let mut j = i + 1;
        while j < self.bytes.len() {
            match self.bytes[j] {
                b'\n' => return None,
                b'\\' => {
                    j += 2;
                    continue;
                }
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => {
                    self.mask_range(i + 1, j, false);
                    return Some(j + 1);
                }
                _ => {}
            }
            j += 1;
        }
        None
    }

    /// Identifier ending at the last code byte before `i`, empty after `.`
    fn preceding_word(&self, i: usize) -> &str {
        let code = &self.code[..i];
        let end = code
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |p| p + 1);
        let start = code[..end]
            .iter()
            .rposition(|&b| !is_ident_byte(b))
            .map_or(0, |p| p + 1);
        if start > 0 && code[start - 1] == b'.' {
            return "";
        }
        self.source.get(start..end).unwrap_or("")
    }
}

/// Keywords after which `/` opens a regex instead of dividing
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "yield", "await", "in", "of", "void", "delete", "instanceof",
    "new", "throw", "do", "else",
];

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    const C_LIKE: Syntax = Syntax {
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        nested_comments: false,
        quotes: &[
            Quote { delim: "\"", multiline: false, escapes: true },
            Quote { delim: "'", multiline: false, escapes: true },
            Quote { delim: "`", multiline: true, escapes: true },
        ],
        regex_literals: true,
        rust_literals: false,
    };

    const RUST_LIKE: Syntax = Syntax {
        line_comments: &["//"],
        block_comment: Some(("/*", "*/")),
        nested_comments: true,
        quotes: &[Quote { delim: "\"", multiline: true, escapes: true }],
        regex_literals: false,
        rust_literals: true,
    };

    #[test]
    fn test_masks_comments_in_both_copies() {
        let src = "a // hi {\nb /* { */ c";
        let m = mask(src, &C_LIKE).unwrap();
        assert_eq!(m.code().len(), src.len());
        assert!(!m.code().contains("hi"));
        assert!(!m.display().contains("hi"));
        assert!(m.code().contains('c'));
    }

    #[test]
    fn test_masks_string_contents_in_code_only() {
        let src = "f(\"a { b\")";
        let m = mask(src, &C_LIKE).unwrap();
        assert_eq!(m.code(), "f(\"     \")");
        assert_eq!(m.display(), src);
    }

    #[test]
    fn test_line_depths() {
        let src = "a {\n  b (\n  )\n}\nc";
        let m = mask(src, &C_LIKE).unwrap();
        let depths: Vec<_> = m.lines().map(|l| l.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1, 0]);
        let last = m.lines().last().unwrap();
        assert_eq!(last.code, "c");
    }

    #[test]
    fn test_template_literal_spans_lines() {
        let src = "x = `{\n}`;\ny";
        let m = mask(src, &C_LIKE).unwrap();
        let depths: Vec<_> = m.lines().map(|l| l.depth).collect();
        assert_eq!(depths, vec![0, 0, 0]);
    }

    #[test]
    fn test_unbalanced_brackets() {
        assert_eq!(
            mask("a(\n]", &C_LIKE).unwrap_err(),
            ExtractionWarning::UnbalancedBracket { line: 2, found: ']' }
        );
        assert_eq!(
            mask("fn x() {\n", &C_LIKE).unwrap_err(),
            ExtractionWarning::UnclosedBracket { line: 1, open: '{' }
        );
    }

    #[test]
    fn test_unterminated_comment_and_string() {
        assert_eq!(
            mask("a\n/* open", &C_LIKE).unwrap_err(),
            ExtractionWarning::UnterminatedComment { line: 2 }
        );
        assert_eq!(
            mask("x = `never", &C_LIKE).unwrap_err(),
            ExtractionWarning::UnterminatedString { line: 1 }
        );
    }

    #[test]
    fn test_apostrophe_is_line_local() {
        let src = "<p>Don't</p>\n<b>{x}</b>";
        assert!(mask(src, &C_LIKE).is_ok());
    }

    #[test]
    fn test_regex_literal_with_brackets() {
        let src = "const re = /[(]+/;\nf()";
        assert!(mask(src, &C_LIKE).is_ok());
    }

    #[test]
    fn test_division_is_not_regex() {
        let src = "a = (b) / 2; c = d / (e)";
        assert!(mask(src, &C_LIKE).is_ok());
    }

    #[test]
    fn test_regex_after_keyword() {
        let src = "function f(s) {\n  return /\\)$/.test(s);\n}\nconst t = typeof /x/;";
        let m = mask(src, &C_LIKE).unwrap();
        assert!(m.code().contains("return /   /.test"));
        assert_eq!(m.lines().last().map(|l| l.depth), Some(0));

        // a property named like a keyword still divides
        let m = mask("a = x.return / 2 / y;", &C_LIKE).unwrap();
        assert_eq!(m.code(), "a = x.return / 2 / y;");
    }

    #[test]
    fn test_rust_lifetimes_and_chars() {
        let src = "fn f<'a>(x: &'a str) -> char { '{' }";
        let m = mask(src, &RUST_LIKE).unwrap();
        assert!(m.code().contains("'a"));
        assert!(!m.code().contains("'{'"));
    }

    #[test]
    fn test_rust_raw_string_and_nested_comment() {
        let src = "let s = r#\"}\"#; /* a /* b */ } */ x";
        let m = mask(src, &RUST_LIKE).unwrap();
        assert!(m.code().ends_with('x'));
    }

    #[test]
    fn test_rust_inner_attribute_is_not_shebang() {
        let src = "#![allow(dead_code)]\npub fn f() {}";
        let m = mask(src, &RUST_LIKE).unwrap();
        assert!(m.code().starts_with("#![allow"));
    }

    #[test]
    fn test_statement_end_and_signature() {
        let src = "add(a, b: { x: number }) { return 1 }";
        let m = mask(src, &C_LIKE).unwrap();
        assert_eq!(m.signature(3, Stops::BODY, 100).as_deref(), Some("(a, b: { x: number })"));

        let src = "X: number = 5;";
        let m = mask(src, &C_LIKE).unwrap();
        assert_eq!(m.signature(1, Stops::VALUE, 100).as_deref(), Some(": number"));
    }

    #[test]
    fn test_statement_end_skips_arrows_and_comparisons() {
        let src = "f: (a: A) => B = g;";
        let m = mask(src, &C_LIKE).unwrap();
        assert_eq!(m.signature(1, Stops::VALUE, 100).as_deref(), Some(": (a: A) => B"));
    }

    #[test]
    fn test_matching_close() {
        let src = "{ a, { b } } c";
        let m = mask(src, &C_LIKE).unwrap();
        assert_eq!(m.matching_close(0), Some(12));
    }
}
