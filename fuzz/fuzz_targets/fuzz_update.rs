#![no_main]

use arbitrary::Arbitrary;
use codemap::index::{ExportedSymbol, FileUpdate, SourceFile, SymbolIndex, SymbolKind};
use codemap::render::{render, SectionCache};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Write { path: u8, names: Vec<u8> },
    Delete { path: u8 },
}

fn update(op: &Op) -> FileUpdate {
    match op {
        Op::Write { path, names } => {
            let symbols = names
                .iter()
                .map(|n| ExportedSymbol::new(format!("s{n}"), SymbolKind::Function))
                .collect();
            FileUpdate::written(format!("f{}.ts", path % 8), SourceFile::new("x", symbols))
        }
        Op::Delete { path } => FileUpdate::deleted(format!("f{}.ts", path % 8)),
    }
}

fuzz_target!(|ops: Vec<Op>| {
    // Any sequence of updates keeps the section cache identical to a full
    // render, and replaying an update is a no-op
    let mut index = SymbolIndex::new();
    let mut cache = SectionCache::from_index(&index);
    for op in &ops {
        let update = update(op);
        index.apply(&update);
        cache.refresh(&index, &update.path);

        let again = index.clone().applied(&update);
        assert_eq!(again, index);
    }
    assert_eq!(cache.document(), render(&index));
});
