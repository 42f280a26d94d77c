//! Integration tests for the `codemap` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A git-rooted project plus an isolated state directory
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::create_dir_all(dir.path().join("repo/.git")).unwrap();
        fs::create_dir_all(dir.path().join("repo/src")).unwrap();
        Self { dir }
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    fn write(&self, rel: &str, content: &str) {
        fs::write(self.root().join(rel), content).unwrap();
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_codemap"))
            .args(args)
            .arg("--state-dir")
            .arg(self.state_dir())
            .current_dir(self.root())
            .env_remove("RUST_LOG")
            .env_remove("CODEMAP_OUTPUT")
            .env_remove("CODEMAP_EXTENSIONS")
            .output()
            .expect("Failed to run codemap")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "codemap {args:?} failed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }
}

fn exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

#[test]
fn scan_writes_document() {
    let project = Project::new();
    project.write("src/utils.ts", "export function add(a, b) { return a + b; }\nexport const VERSION = 1;\n");
    project.write("src/store.ts", "export function useStore() {}\n");

    let stdout = project.run_ok(&["scan", "."]);
    assert!(stdout.contains("Mapped 2 files, 3 exported symbols"));

    let doc = project.read("CODEBASE_MAP.md");
    assert!(doc.contains("## src/store.ts\n- function useStore()\n"));
    assert!(doc.contains("## src/utils.ts\n- function add(a, b)\n- const VERSION\n"));
}

#[test]
fn update_round_trip() {
    let project = Project::new();
    project.write("src/utils.ts", "export function add(a, b) {}\nexport const VERSION = 1;\n");
    project.run_ok(&["scan", "--quiet"]);

    project.write("src/utils.ts", "export const VERSION = 2;\n");
    let stdout = project.run_ok(&["update", "src/utils.ts"]);
    assert!(stdout.contains("Updated 1 of 1 files"));
    assert!(!project.read("CODEBASE_MAP.md").contains("add"));

    // A missing file is removed from the map
    fs::remove_file(project.root().join("src/utils.ts")).unwrap();
    project.run_ok(&["update", "src/utils.ts"]);
    assert!(project.read("CODEBASE_MAP.md").contains("0 files, 0 exported symbols."));
}

#[test]
fn update_without_scan_fails() {
    let project = Project::new();
    project.write("src/a.ts", "export const A = 1;\n");

    let output = project.run(&["update", "src/a.ts"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no index found"));
    assert!(!exists(&project.root().join("CODEBASE_MAP.md")));
}

#[test]
fn scan_options() {
    let project = Project::new();
    project.write("src/a.ts", "export const A = 1;\n");
    project.write("src/b.rs", "pub fn b() {}\n");

    project.run_ok(&["scan", "-q", "--ext", "rs", "--output", "docs/MAP.md"]);
    let doc = project.read("docs/MAP.md");
    assert!(doc.contains("## src/b.rs"));
    assert!(!doc.contains("src/a.ts"));
}

#[test]
fn config_file_is_applied() {
    let project = Project::new();
    project.write("codemap.toml", "[map]\nexclude = [\"src/gen/**\"]\n");
    fs::create_dir_all(project.root().join("src/gen")).unwrap();
    project.write("src/gen/api.ts", "export const GENERATED = 1;\n");
    project.write("src/a.ts", "export const A = 1;\n");

    project.run_ok(&["scan", "-q"]);
    let doc = project.read("CODEBASE_MAP.md");
    assert!(doc.contains("## src/a.ts"));
    assert!(!doc.contains("GENERATED"));
}

#[test]
fn invalid_config_is_an_error() {
    let project = Project::new();
    project.write("codemap.toml", "[map]\nunknown_key = true\n");
    let output = project.run(&["scan", "-q"]);
    assert!(!output.status.success());
}

#[test]
fn show_stats_list_and_clean() {
    let project = Project::new();
    project.write("src/a.ts", "export function a() {}\n");
    project.run_ok(&["scan", "-q"]);

    let shown = project.run_ok(&["show", "--plain"]);
    assert!(shown.contains("src/a.ts\n  function a()"));

    let stats = project.run_ok(&["stats"]);
    assert!(stats.contains("Files:            1"));

    let listed = project.run_ok(&["list"]);
    assert!(listed.contains("repo"));

    let cleaned = project.run_ok(&["clean"]);
    assert!(cleaned.starts_with("Removed index for:"));
    assert!(project.run_ok(&["list"]).contains("No indexed codebases found."));
}
