use crate::index::session::MapSession;
use crate::index::types::SymbolKind;
use crate::utils::StateStore;

/// Collisions listed before summarizing the rest
const COLLISIONS_SHOWN: usize = 10;

/// Display index statistics
pub fn show_stats(session: &MapSession) {
    let state = session.state();
    let index = session.index();
    let paths = session.paths();

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Root path:        {}", state.root_path.display());
    println!("Document:         {}", paths.output.display());
    println!("State file:       {}", paths.state_file.display());
    println!("State version:    {}", state.version);
    println!("Files:            {}", index.len());
    println!("Exported symbols: {}", index.symbol_count());
    println!("Warnings:         {}", index.warning_count());

    let counts = index.count_by_kind();
    println!();
    println!("Symbols by kind:");
    for kind in SymbolKind::ALL {
        let count = counts.get(&kind).copied().unwrap_or(0);
        if count > 0 {
            println!("  {:15} {}", kind.as_str(), count);
        }
    }

    let collisions = index.collisions();
    if !collisions.is_empty() {
        println!();
        println!("Names exported by several files: {}", collisions.len());
        for (name, files) in collisions.iter().take(COLLISIONS_SHOWN) {
            println!("  {:15} {}", name, files.join(", "));
        }
        if collisions.len() > COLLISIONS_SHOWN {
            println!("  ... and {} more", collisions.len() - COLLISIONS_SHOWN);
        }
    }

    if let Ok(meta) = std::fs::metadata(&paths.state_file) {
        println!();
        println!("State size:       {}", format_size(meta.len()));
    }
    if let Ok(meta) = std::fs::metadata(&paths.output) {
        println!("Document size:    {}", format_size(meta.len()));
    }

    println!();
    println!("Created:          {}", format_timestamp(state.created_at));
    println!("Updated:          {}", format_timestamp(state.updated_at));
}

/// List all indexed codebases
pub fn list_indexes(store: &StateStore) -> crate::error::MapResult<()> {
    let codebases = store.list()?;

    if codebases.is_empty() {
        println!("No indexed codebases found.");
        return Ok(());
    }

    println!("Indexed Codebases");
    println!("=================");
    println!();

    for codebase in codebases {
        let status = if codebase.root_path.exists() {
            ""
        } else {
            " [missing]"
        };
        println!("  {}{}", codebase.root_path.display(), status);
        println!("    State: {}", codebase.state_dir.display());
        println!();
    }

    Ok(())
}

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Seconds since the epoch as `YYYY-MM-DD HH:MM:SS UTC`
pub fn format_timestamp(ts: u64) -> String {
    let days = ts / 86_400;
    let secs = ts % 86_400;
    let (y, m, d) = civil_from_days(days as i64);
    format!(
        "{y:04}-{m:02}-{d:02} {:02}:{:02}:{:02} UTC",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Proleptic Gregorian date of a day count since 1970-01-01
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}
