use std::path::{Component, Path, PathBuf};

/// Render a relative path with `/` separators, dropping `.` components
pub fn normalize_rel_path(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            _ => {}
        }
    }
    parts.join("/")
}

/// Resolve `.` and `..` without touching the file system
pub fn lexical_absolute(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Repo-relative form of `path`, or `None` if it is not under `root`.
///
/// The parent directory is canonicalized when it exists so symlinked working
/// directories still resolve; the file itself may already be deleted.
pub fn relative_to(root: &Path, path: &Path, cwd: &Path) -> Option<String> {
    let absolute = lexical_absolute(path, cwd);

    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|p| p.join(name))
            .unwrap_or_else(|_| absolute.clone()),
        _ => absolute.clone(),
    };

    let rel = resolved
        .strip_prefix(root)
        .or_else(|_| absolute.strip_prefix(root))
        .ok()?;
    let normalized = normalize_rel_path(rel);
    (!normalized.is_empty()).then_some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rel_path() {
        assert_eq!(normalize_rel_path(Path::new("./src/utils.ts")), "src/utils.ts");
        assert_eq!(normalize_rel_path(Path::new("src/../lib.rs")), "lib.rs");
        assert_eq!(normalize_rel_path(Path::new("a/b/c.go")), "a/b/c.go");
    }

    #[test]
    fn test_lexical_absolute() {
        let cwd = Path::new("/repo/src");
        assert_eq!(
            lexical_absolute(Path::new("../lib/a.ts"), cwd),
            PathBuf::from("/repo/lib/a.ts")
        );
        assert_eq!(
            lexical_absolute(Path::new("/x/./y.ts"), cwd),
            PathBuf::from("/x/y.ts")
        );
    }

    #[test]
    fn test_relative_to() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();

        assert_eq!(
            relative_to(&root, Path::new("src/gone.ts"), &root).as_deref(),
            Some("src/gone.ts")
        );
        assert_eq!(relative_to(&root, Path::new("/elsewhere/a.ts"), &root), None);
        assert_eq!(relative_to(&root, Path::new("."), &root), None);
    }
}
