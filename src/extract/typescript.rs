//! TypeScript and JavaScript exports.
//!
//! Recognized at the top level only (bracket depth zero):
//!
//! - `export function|class|interface|type|enum|namespace|const|let|var`
//!   (with `async`, `abstract`, `declare` and `const enum` variants)
//! - `export default ...`
//! - `export { a, b as c }` and `export * [as ns] from '...'`
//! - `export const { a, b } = ...`
//! - CommonJS `exports.name = ...` and `module.exports = ...`

use super::lexer::{mask, Masked, Quote, Stops, Syntax};
use crate::error::ExtractionWarning;
use crate::index::types::{ExportedSymbol, SymbolKind};
use crate::utils::one_line;
use regex::Regex;
use std::sync::LazyLock;

const SYNTAX: Syntax = Syntax {
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

static EXPORT_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+(?:type\s+)?\{").expect("valid regex"));

static EXPORT_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+(?:type\s+)?\*(?:\s*as\s+([A-Za-z_$][\w$]*))?").expect("valid regex")
});

static EXPORT_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+default\b").expect("valid regex"));

static DEFAULT_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:abstract\s+)?class\b\s*([A-Za-z_$][\w$]*)?").expect("valid regex")
});

static DEFAULT_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:async\s+)?function\b\s*\*?\s*([A-Za-z_$][\w$]*)?").expect("valid regex")
});

static DEFAULT_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*interface\s+([A-Za-z_$][\w$]*)").expect("valid regex"));

static DESTRUCTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+(?:declare\s+)?(const|let|var)\s+[\{\[]").expect("valid regex")
});

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^export\s+(?:declare\s+)?(?P<kw>abstract\s+class|class|async\s+function|function|const\s+enum|enum|interface|type|namespace|module|const|let|var)\b\s*\*?\s*(?P<name>[A-Za-z_$][\w$]*)",
    )
    .expect("valid regex")
});

static EXPORT_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s*=[^=>]").expect("valid regex"));

static FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^export\s+(?:import\s+)?([A-Za-z_$][\w$]*)").expect("valid regex")
});

static COMMONJS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:module\.exports|exports)(?:\.([A-Za-z_$][\w$]*))?\s*=[^=>]")
        .expect("valid regex")
});

static ASYNC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^async\s+").expect("valid regex"));

static FUNCTION_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^function\b\s*\*?\s*(?:[A-Za-z_$][\w$]*)?\s*").expect("valid regex")
});

static CLASS_EXPR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^class\b").expect("valid regex"));

static SINGLE_PARAM_ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_$][\w$]*)\s*=>").expect("valid regex"));

static GENERICS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<[^()=;\n]*>\s*").expect("valid regex"));

/// `, name` continuing a `const`/`let`/`var` statement
static DECLARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][\w$]*)\s*(?:[=:,;\n]|$)").expect("valid regex")
});

static ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?::[^;\n]*?)?=>").expect("valid regex"));

pub(super) fn extract(
    source: &str,
    max_signature_len: usize,
) -> Result<Vec<ExportedSymbol>, ExtractionWarning> {
    let masked = mask(source, &SYNTAX)?;
    let mut scanner = Scanner {
        m: &masked,
        max_sig: max_signature_len,
        symbols: Vec::new(),
    };

    for line in masked.lines() {
        if line.depth != 0 {
            continue;
        }
        let trimmed = line.code.trim_start();
        let at = line.start + (line.code.len() - trimmed.len());

        if trimmed.starts_with("exports.") || trimmed.starts_with("module.exports") {
            scanner.commonjs(at);
        } else if trimmed
            .strip_prefix("export")
            .is_some_and(|after| !after.starts_with(super::is_ident_char))
        {
            scanner.export(at);
        }
    }

    Ok(scanner.symbols)
}

struct Scanner<'m> {
    m: &'m Masked,
    max_sig: usize,
    symbols: Vec<ExportedSymbol>,
}

impl Scanner<'_> {
    fn push(&mut self, name: &str, kind: SymbolKind, signature: Option<String>) {
        // Overload signatures followed by the implementation: keep the first
        if kind == SymbolKind::Function
            && self
                .symbols
                .last()
                .is_some_and(|s| s.name == name && s.kind == SymbolKind::Function)
        {
            return;
        }
        self.symbols
            .push(ExportedSymbol::new(name, kind).with_signature(signature));
    }

    fn export(&mut self, at: usize) {
        let m = self.m;
        let rest = &m.code()[at..];

        if let Some(found) = EXPORT_LIST.find(rest) {
            self.export_list(at + found.end() - 1);
        } else if let Some(c) = EXPORT_STAR.captures(rest) {
            let name = c.get(1).map_or("*", |m| m.as_str());
            let sig = self.m.signature(at + c[0].len(), Stops::ALIAS, self.max_sig);
            self.push(name, SymbolKind::Unknown, sig);
        } else if let Some(found) = EXPORT_DEFAULT.find(rest) {
            self.export_default(at + found.end());
        } else if let Some(c) = DESTRUCTURE.captures(rest) {
            let kind = if &c[1] == "const" {
                SymbolKind::Const
            } else {
                SymbolKind::Unknown
            };
            self.destructure(at + c[0].len() - 1, kind);
        } else if let Some(c) = DECLARATION.captures(rest) {
            self.declaration(at, &c);
        } else if EXPORT_ASSIGN.is_match(rest) {
            let eq = at + rest.find('=').unwrap_or_default();
            let (kind, sig) = self.value(eq, SymbolKind::Unknown);
            self.push("default", kind, sig);
        } else if let Some(c) = FALLBACK.captures(rest) {
            self.push(&c[1], SymbolKind::Unknown, None);
        }
    }

    fn declaration(&mut self, at: usize, c: &regex::Captures<'_>) {
        let kw = c["kw"].split_whitespace().last().unwrap_or_default();
        let Some(name) = c.name("name") else {
            return;
        };
        let name_end = at + name.end();
        let name = name.as_str();

        let (kind, sig) = match kw {
            "function" => (
                SymbolKind::Function,
                self.m.signature(name_end, Stops::BODY, self.max_sig),
            ),
            "class" => (
                SymbolKind::Class,
                self.m.signature(name_end, Stops::BODY, self.max_sig),
            ),
            "interface" | "enum" => (
                SymbolKind::Type,
                self.m.signature(name_end, Stops::BODY, self.max_sig),
            ),
            "type" => (
                SymbolKind::Type,
                self.m.signature(name_end, Stops::ALIAS, self.max_sig),
            ),
            "const" => self.value(name_end, SymbolKind::Const),
            "let" | "var" => self.value(name_end, SymbolKind::Unknown),
            // namespace, module
            _ => (SymbolKind::Unknown, None),
        };
        self.push(name, kind, sig);

        match kw {
            "const" => self.more_declarators(name_end, SymbolKind::Const),
            "let" | "var" => self.more_declarators(name_end, SymbolKind::Unknown),
            _ => {}
        }
    }

    /// `export const a = 1, b = 2;`: every declarator after the first
    fn more_declarators(&mut self, mut from: usize, plain: SymbolKind) {
        let m = self.m;
        while let Some((start, end)) = self.next_declarator(from) {
            let (kind, sig) = self.value(end, plain);
            self.push(&m.code()[start..end], kind, sig);
            from = end;
        }
    }

    /// Name span of the next declarator in the statement containing `from`.
    ///
    /// A comma only separates declarators at bracket depth zero, and only
    /// when an identifier followed by `=`, `:`, `,`, `;` or a line end comes
    /// next, which rules out `Map<K, V>` annotations.
    fn next_declarator(&self, from: usize) -> Option<(usize, usize)> {
        let code = self.m.code();
        let bytes = code.as_bytes();
        let mut depth = 0usize;
        let mut last = b' ';

        for (j, &b) in bytes.iter().enumerate().skip(from) {
            match b {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                }
                b';' if depth == 0 => return None,
                b'\n' if depth == 0 && last != b',' => return None,
                b',' if depth == 0 => {
                    if let Some(name) = DECLARATOR.captures(&code[j + 1..]).and_then(|c| c.get(1)) {
                        return Some((j + 1 + name.start(), j + 1 + name.end()));
                    }
                }
                _ => {}
            }
            if !b.is_ascii_whitespace() {
                last = b;
            }
        }
        None
    }

    fn export_default(&mut self, after: usize) {
        let m = self.m;
        let rest = &m.code()[after..];

        let (name, kind, sig) = if let Some(c) = DEFAULT_CLASS.captures(rest) {
            let (name, end) = default_name(&c, after);
            let sig = self.m.signature(end, Stops::BODY, self.max_sig);
            (name, SymbolKind::Class, sig)
        } else if let Some(c) = DEFAULT_FUNCTION.captures(rest) {
            let (name, end) = default_name(&c, after);
            let sig = self.m.signature(end, Stops::BODY, self.max_sig);
            (name, SymbolKind::Function, sig)
        } else if let Some(c) = DEFAULT_INTERFACE.captures(rest) {
            let sig = self.m.signature(after + c[0].len(), Stops::BODY, self.max_sig);
            (c[1].to_string(), SymbolKind::Type, sig)
        } else if let Some(sig) = self.function_value(after) {
            ("default".to_string(), SymbolKind::Function, sig)
        } else {
            let sig = self.m.signature(after, Stops::ALIAS, self.max_sig);
            ("default".to_string(), SymbolKind::Unknown, sig)
        };
        self.push(&name, kind, sig);
    }

    /// `export { a, type B, c as d } [from '...']`
    fn export_list(&mut self, open: usize) {
        let Some(close) = self.m.matching_close(open) else {
            return;
        };
        let m = self.m;
        let inner = &m.code()[open + 1..close - 1];

        for item in inner.split(',') {
            let words: Vec<&str> = item.split_whitespace().collect();
            let words = match words.as_slice() {
                ["type", rest @ ..] if !rest.is_empty() => rest,
                all => all,
            };
            let name = match words {
                [local] => *local,
                [_, "as", alias] => *alias,
                _ => continue,
            };
            if is_identifier(name) {
                self.push(name, SymbolKind::Unknown, None);
            }
        }
    }

    /// `export const { a, b: c, ...rest } = value`
    fn destructure(&mut self, open: usize, kind: SymbolKind) {
        let Some(close) = self.m.matching_close(open) else {
            return;
        };
        let m = self.m;
        let inner = &m.code()[open + 1..close - 1];

        for item in inner.split(',') {
            let binding = item.split('=').next().unwrap_or_default();
            let binding = binding.rsplit(':').next().unwrap_or_default();
            let name = binding.trim().trim_start_matches("...");
            if is_identifier(name) {
                self.push(name, kind, None);
            }
        }
    }

    fn commonjs(&mut self, at: usize) {
        let m = self.m;
        let rest = &m.code()[at..];
        let Some(c) = COMMONJS.captures(rest) else {
            return;
        };
        let name = c.get(1).map_or("default", |m| m.as_str());
        let lhs_end = at + c[0].len() - 2;
        let (kind, sig) = self.value(lhs_end, SymbolKind::Unknown);
        self.push(name, kind, sig);
    }

    /// Kind and signature of a value binding whose name ends at `name_end`
    fn value(&self, name_end: usize, plain: SymbolKind) -> (SymbolKind, Option<String>) {
        let code = self.m.code();
        let mut end = self.m.statement_end(name_end, Stops::VALUE);
        // `let a, b;` ends the first binding at the comma
        if let Some((next, _)) = self.next_declarator(name_end) {
            let comma = code[..next].rfind(',').unwrap_or(next);
            end = end.min(comma);
        }

        if code.as_bytes().get(end) == Some(&b'=') {
            if let Some(sig) = self.function_value(end + 1) {
                return (SymbolKind::Function, sig);
            }
            if CLASS_EXPR.is_match(code[end + 1..].trim_start()) {
                return (SymbolKind::Class, None);
            }
        }

        let annotation = self.m.text(name_end, end, self.max_sig);
        (plain, annotation)
    }

    /// Parameter list of a function-valued expression starting at `from`:
    /// `(a, b) => ...`, `async x => ...`, `function (a) {...}`
    fn function_value(&self, from: usize) -> Option<Option<String>> {
        let code = self.m.code();
        let rhs = &code[from..];
        let mut pos = from + (rhs.len() - rhs.trim_start().len());

        if let Some(found) = ASYNC.find(&code[pos..]) {
            pos += found.end();
        }
        let rest = &code[pos..];

        if let Some(found) = FUNCTION_EXPR.find(rest) {
            return Some(self.m.signature(pos + found.end(), Stops::BODY, self.max_sig));
        }
        if let Some(c) = SINGLE_PARAM_ARROW.captures(rest) {
            return Some(one_line(&format!("({})", &c[1]), self.max_sig));
        }

        let sig_start = pos;
        if let Some(found) = GENERICS.find(rest) {
            pos += found.end();
        }
        if !code[pos..].starts_with('(') {
            return None;
        }
        let close = self.m.matching_close(pos)?;
        let arrow = ARROW.find(&code[close..])?;
        let arrow_start = close + arrow.end() - 2;
        Some(self.m.text(sig_start, arrow_start, self.max_sig))
    }
}

/// Name of a default-exported class or function, or `default` when anonymous
fn default_name(c: &regex::Captures<'_>, offset: usize) -> (String, usize) {
    match c.get(1) {
        Some(name) if !matches!(name.as_str(), "extends" | "implements") => {
            (name.as_str().to_string(), offset + name.end())
        }
        Some(keyword) => ("default".to_string(), offset + keyword.start()),
        None => ("default".to_string(), offset + c[0].len()),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(super::is_ident_char)
}
