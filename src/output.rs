//! Colored terminal listing of an index (`codemap show`)

use crate::index::types::{SourceFile, SymbolKind};
use crate::index::SymbolIndex;
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print every file and its symbols, grouped under a path heading
pub fn print_index(index: &SymbolIndex, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_index(&mut stdout, index)
}

pub fn write_index<W: WriteColor>(out: &mut W, index: &SymbolIndex) -> io::Result<()> {
    let mut first = true;
    for (path, file) in index.iter() {
        if !first {
            // Blank line between files
            writeln!(out)?;
        }
        first = false;

        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        writeln!(out, "{path}")?;
        out.reset()?;

        write_file(out, file)?;
    }
    Ok(())
}

fn write_file<W: WriteColor>(out: &mut W, file: &SourceFile) -> io::Result<()> {
    if let Some(warning) = &file.warning {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        writeln!(out, "  not indexed: {warning}")?;
        out.reset()?;
        return Ok(());
    }

    for symbol in &file.symbols {
        write!(out, "  ")?;
        out.set_color(ColorSpec::new().set_fg(Some(kind_color(symbol.kind))))?;
        write!(out, "{:<8}", symbol.kind.as_str())?;
        out.reset()?;

        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, " {}", symbol.name)?;
        out.reset()?;

        if let Some(signature) = &symbol.signature {
            out.set_color(ColorSpec::new().set_dimmed(true))?;
            write!(out, "{signature}")?;
            out.reset()?;
        }
        writeln!(out)?;
    }

    if file.omitted > 0 {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(out, "  ... {} more", file.omitted)?;
        out.reset()?;
    }
    Ok(())
}

fn kind_color(kind: SymbolKind) -> Color {
    match kind {
        SymbolKind::Function => Color::Blue,
        SymbolKind::Const => Color::Yellow,
        SymbolKind::Class => Color::Green,
        SymbolKind::Type => Color::Cyan,
        SymbolKind::Unknown => Color::White,
    }
}
