//! Python exports: module-level `def`, `class`, `type` aliases and
//! assignments, filtered by `__all__` when the module declares one and by
//! the leading-underscore convention otherwise.

use super::lexer::{mask, Quote, Stops, Syntax};
use crate::error::ExtractionWarning;
use crate::index::types::{ExportedSymbol, SymbolKind};
use regex::Regex;
use std::sync::LazyLock;

const SYNTAX: Syntax = Syntax {
    line_comments: &["#"],
    block_comment: None,
    nested_comments: false,
    quotes: &[
        Quote { delim: "\"\"\"", multiline: true, escapes: true },
        Quote { delim: "'''", multiline: true, escapes: true },
        Quote { delim: "\"", multiline: false, escapes: true },
        Quote { delim: "'", multiline: false, escapes: true },
    ],
    regex_literals: false,
    rust_literals: false,
};

static DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:async\s+)?def\s+(?P<name>[A-Za-z_]\w*)").expect("valid regex")
});

static CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^class\s+(?P<name>[A-Za-z_]\w*)").expect("valid regex"));

static TYPE_ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^type\s+(?P<name>[A-Za-z_]\w*)").expect("valid regex"));

static ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[A-Za-z_]\w*)\s*(?::[^=\n]*)?=[^=]").expect("valid regex")
});

static TUPLE_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<names>[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)+)\s*=[^=]").expect("valid regex")
});

static DUNDER_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^__all__\s*(?::[^=\n]*)?(?P<op>\+?=)\s*[\[\(]").expect("valid regex")
});

static STRING_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']([A-Za-z_]\w*)["']"#).expect("valid regex"));

/// Statement keywords that can open a line like `else: x = 1`
const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "try", "except", "finally", "for", "while", "with", "match", "case",
    "lambda", "return", "del", "global", "nonlocal", "assert", "raise", "import", "from", "pass",
];

pub(super) fn extract(
    source: &str,
    max_signature_len: usize,
) -> Result<Vec<ExportedSymbol>, ExtractionWarning> {
    let masked = mask(source, &SYNTAX)?;
    let code = masked.code();
    let mut symbols: Vec<ExportedSymbol> = Vec::new();
    let mut dunder_all: Option<Vec<String>> = None;

    for line in masked.lines() {
        // Module level means column zero outside any bracket
        if line.depth != 0 || !line.code.starts_with(|c: char| c.is_alphabetic() || c == '_') {
            continue;
        }
        let at = line.start;
        let rest = &code[at..];
        let sig = |from: usize, stops: Stops| masked.signature(at + from, stops, max_signature_len);

        if let Some(c) = DUNDER_ALL.captures(rest) {
            let open = at + c[0].len() - 1;
            let names = masked
                .matching_close(open)
                .map(|close| literal_names(&masked.display()[open..close]))
                .unwrap_or_default();
            match (&c["op"], dunder_all.as_mut()) {
                ("+=", Some(list)) => list.extend(names),
                _ => dunder_all = Some(names),
            }
            continue;
        }

        let mut found = Vec::new();
        if let Some(c) = DEF.captures(rest) {
            found.push((c["name"].to_string(), SymbolKind::Function, sig(c[0].len(), Stops::HEADER)));
        } else if let Some(c) = CLASS.captures(rest) {
            found.push((c["name"].to_string(), SymbolKind::Class, sig(c[0].len(), Stops::HEADER)));
        } else if let Some(c) = TYPE_ALIAS.captures(rest) {
            found.push((c["name"].to_string(), SymbolKind::Type, sig(c[0].len(), Stops::ALIAS)));
        } else if let Some(c) = ASSIGN.captures(rest).filter(|c| !KEYWORDS.contains(&&c["name"])) {
            let name = &c["name"];
            let kind = if is_constant_name(name) {
                SymbolKind::Const
            } else {
                SymbolKind::Unknown
            };
            let name_end = c.name("name").map_or(0, |m| m.end());
            found.push((name.to_string(), kind, sig(name_end, Stops::VALUE)));
        } else if let Some(c) = TUPLE_ASSIGN.captures(rest) {
            for name in c["names"].split(',') {
                let name = name.trim();
                let kind = if is_constant_name(name) {
                    SymbolKind::Const
                } else {
                    SymbolKind::Unknown
                };
                found.push((name.to_string(), kind, None));
            }
        }

        for (name, kind, signature) in found {
            // A later rebinding replaces the value, not the listing
            if !symbols.iter().any(|s| s.name == name) {
                symbols.push(ExportedSymbol::new(name, kind).with_signature(signature));
            }
        }
    }

    Ok(match dunder_all {
        Some(list) => restrict_to(symbols, &list),
        None => symbols
            .into_iter()
            .filter(|s| !s.name.starts_with('_'))
            .collect(),
    })
}

/// Keep the symbols named in `__all__`. Names defined elsewhere (imported
/// and re-exported) are appended as `unknown` in `__all__` order.
fn restrict_to(symbols: Vec<ExportedSymbol>, names: &[String]) -> Vec<ExportedSymbol> {
    let mut kept: Vec<ExportedSymbol> = symbols
        .into_iter()
        .filter(|s| names.contains(&s.name))
        .collect();

    for name in names {
        if !kept.iter().any(|s| &s.name == name) {
            kept.push(ExportedSymbol::new(name.clone(), SymbolKind::Unknown));
        }
    }
    kept
}

fn literal_names(list: &str) -> Vec<String> {
    STRING_NAME
        .captures_iter(list)
        .map(|c| c[1].to_string())
        .collect()
}

/// `MAX_RETRIES`, `API_V2`
fn is_constant_name(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase()) && !name.chars().any(char::is_lowercase)
}
