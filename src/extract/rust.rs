//! Rust exports: top-level items with a bare `pub`, plus `#[macro_export]`
//! macros. Restricted visibility (`pub(crate)`, `pub(super)`, `pub(in ..)`)
//! is not an export. Items nested in `impl` blocks or inline modules are not
//! top-level and are skipped.

use super::lexer::{mask, Masked, Quote, Stops, Syntax};
use crate::error::ExtractionWarning;
use crate::index::types::{ExportedSymbol, SymbolKind};
use regex::Regex;
use std::sync::LazyLock;

const SYNTAX: Syntax = Syntax {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_comments: true,
    quotes: &[Quote { delim: "\"", multiline: true, escapes: true }],
    regex_literals: false,
    rust_literals: true,
};

static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^pub\s+(?:(?:const|async|unsafe|default)\s+)*(?:extern\s+(?:"[^"\n]*"\s*)?)?fn\s+(?P<name>[A-Za-z_]\w*)"#,
    )
    .expect("valid regex")
});

static VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pub\s+(?:const|static)\s+(?:mut\s+)?(?P<name>[A-Za-z_]\w*)").expect("valid regex")
});

static TYPE_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pub\s+(?:unsafe\s+)?(?:auto\s+)?(?:struct|enum|union|trait)\s+(?P<name>[A-Za-z_]\w*)")
        .expect("valid regex")
});

static TYPE_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pub\s+type\s+(?P<name>[A-Za-z_]\w*)").expect("valid regex"));

static MODULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pub\s+mod\s+(?P<name>[A-Za-z_]\w*)").expect("valid regex"));

static USE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^pub\s+use\s+").expect("valid regex"));

static EXTERN_CRATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pub\s+extern\s+crate\s+(\w+)(?:\s+as\s+(\w+))?").expect("valid regex")
});

static MACRO_RULES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^macro_rules!\s*(?P<name>[A-Za-z_]\w*)").expect("valid regex"));

static PUB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^pub\s").expect("valid regex"));

const ITEM_KEYWORDS: &[&str] = &[
    "pub", "const", "async", "unsafe", "extern", "fn", "static", "mut", "struct", "enum", "union",
    "trait", "type", "mod", "use", "crate", "auto", "default", "impl", "macro",
];

pub(super) fn extract(
    source: &str,
    max_signature_len: usize,
) -> Result<Vec<ExportedSymbol>, ExtractionWarning> {
    let masked = mask(source, &SYNTAX)?;
    let code = masked.code();
    let mut symbols = Vec::new();
    let mut macro_export = false;

    for line in masked.lines() {
        if line.depth != 0 {
            continue;
        }
        let line_end = line.start + line.code.len();
        let mut at = line.start + (line.code.len() - line.code.trim_start().len());

        // Leading attributes, possibly several on one line
        while code[at..line_end].starts_with("#[") || code[at..line_end].starts_with("#![") {
            if code[at..].starts_with("#[macro_export") {
                macro_export = true;
            }
            let open = at + code[at..].find('[').unwrap_or_default();
            let Some(end) = masked.matching_close(open) else {
                break;
            };
            at = end;
            if at >= line_end {
                break;
            }
            at += code[at..line_end].len() - code[at..line_end].trim_start().len();
        }
        if at >= line_end || code[at..line_end].trim().is_empty() {
            continue;
        }

        let rest = &code[at..];
        item(&masked, at, rest, macro_export, max_signature_len, &mut symbols);
        macro_export = false;
    }

    Ok(symbols)
}

fn item(
    m: &Masked,
    at: usize,
    rest: &str,
    macro_export: bool,
    max_sig: usize,
    out: &mut Vec<ExportedSymbol>,
) {
    let mut push = |name: &str, kind, end: Option<(usize, Stops)>| {
        let sig = end.and_then(|(from, stops)| m.signature(from, stops, max_sig));
        out.push(ExportedSymbol::new(name, kind).with_signature(sig));
    };

    if let Some(c) = MACRO_RULES.captures(rest) {
        if macro_export {
            push(&format!("{}!", &c["name"]), SymbolKind::Unknown, None);
        }
        return;
    }
    if !PUB.is_match(rest) {
        return;
    }

    if let Some(c) = FUNCTION.captures(rest) {
        push(&c["name"], SymbolKind::Function, Some((at + c[0].len(), Stops::BODY)));
    } else if let Some(c) = VALUE.captures(rest) {
        if &c["name"] != "_" {
            push(&c["name"], SymbolKind::Const, Some((at + c[0].len(), Stops::VALUE)));
        }
    } else if let Some(c) = TYPE_DEF.captures(rest) {
        push(&c["name"], SymbolKind::Type, Some((at + c[0].len(), Stops::BODY)));
    } else if let Some(c) = TYPE_ALIAS.captures(rest) {
        push(&c["name"], SymbolKind::Type, Some((at + c[0].len(), Stops::ALIAS)));
    } else if let Some(c) = MODULE.captures(rest) {
        push(&c["name"], SymbolKind::Unknown, None);
    } else if let Some(found) = USE.find(rest) {
        let from = at + found.end();
        let to = m.statement_end(from, Stops::SEMICOLON);
        let tree = collapse(&m.code()[from..to]);
        let mut names = Vec::new();
        use_names(&tree, "", &mut names);
        for name in names {
            push(&name, SymbolKind::Unknown, None);
        }
    } else if let Some(c) = EXTERN_CRATE.captures(rest) {
        let name = c.get(2).or_else(|| c.get(1)).map_or("", |m| m.as_str());
        push(name, SymbolKind::Unknown, None);
    } else if let Some(name) = first_identifier(rest) {
        push(name, SymbolKind::Unknown, None);
    }
}

/// First non-keyword identifier of an unrecognized `pub` item
fn first_identifier(rest: &str) -> Option<&str> {
    let head = rest.split([';', '{', '(', '<', '=', ':', '\n']).next()?;
    head.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .find(|w| !ITEM_KEYWORDS.contains(w))
}

/// Whitespace-normalized use tree: `a :: { b , c }` -> `a::{b, c}`
fn collapse(tree: &str) -> String {
    tree.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" ::", "::")
        .replace(":: ", "::")
        .replace("{ ", "{")
        .replace(" }", "}")
}

/// Names a `pub use` tree brings into scope
fn use_names(tree: &str, prefix: &str, out: &mut Vec<String>) {
    let tree = tree.trim();
    if tree.is_empty() {
        return;
    }

    if let Some(open) = tree.find('{') {
        let close = tree
            .rfind('}')
            .filter(|&close| close > open)
            .unwrap_or(tree.len());
        let prefix = format!("{prefix}{}", &tree[..open]);
        for part in split_top_level(&tree[open + 1..close]) {
            use_names(part, &prefix, out);
        }
        return;
    }

    let path = format!("{prefix}{tree}");
    if tree.ends_with('*') {
        out.push(path);
        return;
    }
    if let Some((_, alias)) = tree.rsplit_once(" as ") {
        let alias = alias.trim();
        if alias != "_" {
            out.push(alias.to_string());
        }
        return;
    }

    let path = path.strip_suffix("::self").unwrap_or(&path);
    if let Some(last) = path.rsplit("::").next().filter(|s| !s.is_empty()) {
        out.push(last.to_string());
    }
}

fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}
