//! End-to-end properties of scanning, incremental updates and rendering,
//! run against a copy of `tests/fixtures/sample`.

use codemap::config::MapConfig;
use codemap::error::MapError;
use codemap::index::{MapSession, UpdateOutcome};
use codemap::render::render;
use codemap::utils::StateStore;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    root: PathBuf,
    store: StateStore,
}

impl Workspace {
    fn empty() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("repo");
        fs::create_dir_all(&root).unwrap();
        let store = StateStore::at(dir.path().join("state"));
        Self {
            _dir: dir,
            root,
            store,
        }
    }

    fn sample() -> Self {
        let ws = Self::empty();
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample");
        copy_dir(&fixture, &ws.root);
        ws
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn remove(&self, rel: &str) {
        fs::remove_file(self.root.join(rel)).unwrap();
    }

    fn scan(&self) -> MapSession {
        MapSession::scan(&self.root, MapConfig::default(), &self.store, true)
            .expect("scan")
            .0
    }

    fn update(&self, session: &mut MapSession, rel: &str) -> Option<UpdateOutcome> {
        let outcome = session.apply_path(&self.root.join(rel)).expect("update");
        session.persist().expect("persist");
        outcome
    }

    fn document(&self) -> String {
        fs::read_to_string(self.root.join("CODEBASE_MAP.md")).expect("document")
    }
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

const UTILS_TS: &str = "export function add(a, b) {\n  return a + b;\n}\n\nexport const VERSION = \"1.0.0\";\n";
const STORE_TS: &str = "export function useStore() {\n  return {};\n}\n";

#[test]
fn utils_and_store_scenario() {
    let ws = Workspace::empty();
    ws.write("utils.ts", UTILS_TS);
    ws.write("store.ts", STORE_TS);

    let mut session = ws.scan();
    assert_eq!(
        ws.document(),
        "# Codebase Map\n\
         \n\
         2 files, 3 exported symbols.\n\
         \n\
         ## store.ts\n\
         - function useStore()\n\
         \n\
         ## utils.ts\n\
         - function add(a, b)\n\
         - const VERSION\n"
    );

    // `add` is removed from utils.ts
    ws.write("utils.ts", "export const VERSION = \"1.0.1\";\n");
    assert_eq!(ws.update(&mut session, "utils.ts"), Some(UpdateOutcome::Replaced));
    assert_eq!(
        ws.document(),
        "# Codebase Map\n\
         \n\
         2 files, 2 exported symbols.\n\
         \n\
         ## store.ts\n\
         - function useStore()\n\
         \n\
         ## utils.ts\n\
         - const VERSION\n"
    );
}

#[test]
fn sample_tree_is_mapped() {
    let ws = Workspace::sample();
    let session = ws.scan();
    let doc = ws.document();

    let paths: Vec<_> = session.index().paths().collect();
    assert_eq!(
        paths,
        vec![
            "scripts/tools.py",
            "src/broken.ts",
            "src/lib.rs",
            "src/store.ts",
            "src/utils.ts"
        ]
    );

    assert!(doc.starts_with("# Codebase Map\n\n5 files, 7 exported symbols.\n"));
    assert!(doc.contains("## scripts/tools.py\n- const MAX_RETRIES\n- function run(cmd, retries=MAX_RETRIES)\n"));
    assert!(doc.contains("## src/lib.rs\n- type Config\n- function parse(input: &str) -> Config\n"));
    assert!(doc.contains("## src/broken.ts\n- (not indexed: "));
    assert!(!doc.contains("shouldNotAppear"));
    assert!(!doc.contains("README"));
    assert!(!doc.contains("_internal"));
    assert!(!doc.contains("private_helper"));
}

#[test]
fn rendering_is_deterministic() {
    let first = Workspace::sample();
    first.scan();

    // Same content, files created in a different order
    let second = Workspace::empty();
    for rel in ["src/utils.ts", "scripts/tools.py", "src/store.ts", "src/lib.rs", "src/broken.ts"] {
        let content = fs::read_to_string(first.root.join(rel)).unwrap();
        second.write(rel, &content);
    }
    second.scan();

    assert_eq!(first.document(), second.document());

    // Rescanning an unchanged tree rewrites identical bytes
    let before = first.document();
    first.scan();
    assert_eq!(first.document(), before);
}

#[test]
fn repeated_update_is_idempotent() {
    let ws = Workspace::sample();
    let mut session = ws.scan();

    ws.write("src/utils.ts", "export const VERSION = \"2.0.0\";\nexport function sub(a, b) {}\n");
    assert_eq!(ws.update(&mut session, "src/utils.ts"), Some(UpdateOutcome::Replaced));
    let once = ws.document();
    let index_once = session.index().clone();

    assert_eq!(ws.update(&mut session, "src/utils.ts"), Some(UpdateOutcome::Unchanged));
    assert_eq!(ws.document(), once);
    assert_eq!(session.index(), &index_once);
}

#[test]
fn update_touches_only_its_file() {
    let ws = Workspace::sample();
    let mut session = ws.scan();
    let before = session.index().clone();

    ws.write("src/store.ts", "export const store = createStore();\n");
    ws.update(&mut session, "src/store.ts");

    for (path, file) in before.iter() {
        if path != "src/store.ts" {
            assert_eq!(session.index().get(path), Some(file), "{path} changed");
        }
    }
    assert_ne!(session.index().get("src/store.ts"), before.get("src/store.ts"));
}

#[test]
fn malformed_and_binary_files_are_kept() {
    let ws = Workspace::sample();
    fs::write(ws.root.join("src/blob.ts"), b"\x00\x01\x02binary\x00").unwrap();
    let session = ws.scan();

    let blob = session.index().get("src/blob.ts").expect("binary file indexed");
    assert!(blob.symbols.is_empty());
    assert_eq!(blob.warning.as_deref(), Some("binary content"));

    let broken = session.index().get("src/broken.ts").expect("broken file indexed");
    assert!(broken.symbols.is_empty());
    assert!(broken.warning.is_some());

    // Neighbours are unaffected
    assert_eq!(session.index().get("src/utils.ts").unwrap().symbols.len(), 2);
}

#[test]
fn create_then_delete_restores_document() {
    let ws = Workspace::sample();
    let mut session = ws.scan();
    let index_before = session.index().clone();
    let doc_before = ws.document();

    ws.write("src/extra.ts", "export class Extra {}\n");
    assert_eq!(ws.update(&mut session, "src/extra.ts"), Some(UpdateOutcome::Inserted));
    assert!(ws.document().contains("## src/extra.ts\n- class Extra\n"));

    ws.remove("src/extra.ts");
    assert_eq!(ws.update(&mut session, "src/extra.ts"), Some(UpdateOutcome::Removed));
    assert_eq!(session.index(), &index_before);
    assert_eq!(ws.document(), doc_before);
}

#[test]
fn incremental_updates_match_full_scan() {
    let ws = Workspace::sample();
    let mut session = ws.scan();

    ws.write("src/new/api.ts", "export interface Api {}\nexport default function handler() {}\n");
    ws.write("src/lib.rs", "pub fn only() {}\n");
    ws.remove("src/store.ts");
    for rel in ["src/new/api.ts", "src/lib.rs", "src/store.ts"] {
        ws.update(&mut session, rel);
    }
    let incremental = ws.document();
    assert_eq!(incremental, render(session.index()));

    ws.scan();
    assert_eq!(ws.document(), incremental);
}

#[test]
fn updates_ignore_untracked_files() {
    let ws = Workspace::sample();
    let mut session = ws.scan();
    let doc_before = ws.document();

    ws.write("notes.txt", "export const nope = 1;\n");
    ws.write("node_modules/dep/more.js", "export const nope = 1;\n");
    assert_eq!(ws.update(&mut session, "notes.txt"), None);
    assert_eq!(ws.update(&mut session, "node_modules/dep/more.js"), None);
    assert_eq!(ws.document(), doc_before);
}

#[test]
fn failed_scan_keeps_previous_document() {
    let ws = Workspace::sample();
    ws.scan();
    let doc_before = ws.document();

    let mut config = MapConfig::default();
    config.exclude = vec!["src/[".to_string()];
    ws.write("src/late.ts", "export const LATE = 1;\n");

    let result = MapSession::scan(&ws.root, config, &ws.store, true);
    assert!(matches!(result, Err(MapError::Config(_))));
    assert_eq!(ws.document(), doc_before);
}

#[test]
fn state_survives_reopen() {
    let ws = Workspace::sample();
    let mut session = ws.scan();
    ws.write("src/utils.ts", "export const VERSION = \"3\";\n");
    ws.update(&mut session, "src/utils.ts");

    let reopened = MapSession::open(&ws.root, MapConfig::default(), &ws.store).unwrap();
    assert_eq!(reopened.index(), session.index());
    assert_eq!(reopened.document(), ws.document());
}
