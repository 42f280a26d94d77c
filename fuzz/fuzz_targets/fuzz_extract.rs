#![no_main]

use codemap::extract::{extract_symbols, ExtractOptions};
use libfuzzer_sys::fuzz_target;

const PATHS: [&str; 5] = ["a.ts", "a.js", "a.rs", "a.py", "a.go"];

fuzz_target!(|data: &[u8]| {
    // Extraction never panics, whatever the bytes, and stays within its caps
    let options = ExtractOptions {
        max_file_size: 1 << 20,
        max_symbols: 16,
        max_signature_len: 40,
    };
    for path in PATHS {
        let extraction = extract_symbols(path, data, &options);
        assert!(extraction.symbols.len() <= options.max_symbols);
        if extraction.warning.is_some() {
            assert!(extraction.symbols.is_empty());
        }
        for symbol in &extraction.symbols {
            assert!(!symbol.name.is_empty());
            if let Some(sig) = &symbol.signature {
                // Truncated signatures end with "..."
                assert!(sig.chars().count() <= options.max_signature_len + 3);
                assert!(!sig.contains('\n'));
            }
        }
    }
});
