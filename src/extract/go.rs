//! Go exports: package-level `func`, `const`, `var` and `type` names that
//! start with an uppercase letter. Methods on exported types are listed as
//! `Receiver.Method`.

use super::lexer::{mask, Masked, Quote, Stops, Syntax};
use crate::error::ExtractionWarning;
use crate::index::types::{ExportedSymbol, SymbolKind};
use regex::Regex;
use std::sync::LazyLock;

const SYNTAX: Syntax = Syntax {
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    nested_comments: false,
    quotes: &[
        Quote { delim: "`", multiline: true, escapes: false },
        Quote { delim: "\"", multiline: false, escapes: true },
        Quote { delim: "'", multiline: false, escapes: true },
    ],
    regex_literals: false,
    rust_literals: false,
};

static FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^func\s+(?:\(\s*(?:[A-Za-z_]\w*\s+)?\*?\s*(?P<recv>[A-Za-z_]\w*)(?:\[[^\]]*\])?\s*\)\s*)?(?P<name>[A-Za-z_]\w*)",
    )
    .expect("valid regex")
});

static GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<kw>const|var|type)\s*\(").expect("valid regex"));

static DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<kw>const|var|type)\s+(?P<names>[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)")
        .expect("valid regex")
});

static GROUP_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<names>[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)").expect("valid regex")
});

/// Keyword of the `const (...)`, `var (...)` or `type (...)` block being read
struct Group<'k> {
    keyword: &'k str,
    close: usize,
}

pub(super) fn extract(
    source: &str,
    max_signature_len: usize,
) -> Result<Vec<ExportedSymbol>, ExtractionWarning> {
    let masked = mask(source, &SYNTAX)?;
    let code = masked.code();
    let mut symbols = Vec::new();
    let mut group: Option<Group<'_>> = None;

    for line in masked.lines() {
        let trimmed = line.code.trim_start();
        let at = line.start + (line.code.len() - trimmed.len());

        if let Some(g) = &group {
            if line.start >= g.close {
                group = None;
            } else {
                if line.depth == 1 {
                    if let Some(c) = GROUP_MEMBER.captures(&code[at..]) {
                        let names_end = at + c[0].len();
                        declared(&masked, g.keyword, &c["names"], names_end, max_signature_len, &mut symbols);
                    }
                }
                continue;
            }
        }

        if line.depth != 0 || at != line.start {
            continue;
        }
        let rest = &code[at..];

        if let Some(c) = FUNC.captures(rest) {
            let name = &c["name"];
            let name_end = at + c[0].len();
            let full = match c.name("recv") {
                Some(recv) if is_exported(recv.as_str()) => format!("{}.{name}", recv.as_str()),
                Some(_) => continue,
                None => name.to_string(),
            };
            if is_exported(name) {
                let sig = masked.signature(name_end, Stops::BODY, max_signature_len);
                symbols.push(ExportedSymbol::new(full, SymbolKind::Function).with_signature(sig));
            }
        } else if let Some(c) = GROUP.captures(rest) {
            let open = at + c[0].len() - 1;
            if let (Some(close), Some(kw)) = (masked.matching_close(open), c.name("kw")) {
                group = Some(Group {
                    keyword: kw.as_str(),
                    close,
                });
            }
        } else if let Some(c) = DECL.captures(rest) {
            let names_end = at + c[0].len();
            declared(&masked, &c["kw"], &c["names"], names_end, max_signature_len, &mut symbols);
        }
    }

    Ok(symbols)
}

/// One `const`/`var`/`type` declaration, possibly naming several identifiers
fn declared(
    masked: &Masked,
    keyword: &str,
    names: &str,
    names_end: usize,
    max_sig: usize,
    out: &mut Vec<ExportedSymbol>,
) {
    let names: Vec<&str> = names.split(',').map(str::trim).collect();
    let (kind, stops) = match keyword {
        "const" => (SymbolKind::Const, Stops::VALUE),
        "type" => (SymbolKind::Type, Stops::BODY),
        _ => (SymbolKind::Unknown, Stops::VALUE),
    };
    let sig = if names.len() == 1 {
        masked.signature(names_end, stops, max_sig)
    } else {
        None
    };

    for name in names.into_iter().filter(|n| is_exported(n)) {
        out.push(ExportedSymbol::new(name, kind).with_signature(sig.clone()));
    }
}

fn is_exported(name: &str) -> bool {
    name.starts_with(char::is_uppercase)
}
