// src/watch/path_utils.rs

//! Path helpers for turning watcher paths into root-relative strings.

use std::path::Path;

/// Convert `path` into a string relative to `base`, with forward slashes.
///
/// Tries a plain `strip_prefix` first. Removed files cannot be
/// canonicalized, so the canonical fallback only helps for paths that still
/// exist but were reported through a different prefix (symlinks, macOS
/// `/private/var`).
///
/// Returns `None` if the path is not under `base`.
pub fn relative_str(base: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(base) {
        return Some(to_slash(rel));
    }

    let base_canon = base.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&base_canon).ok().map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_base_prefix() {
        let rel = relative_str(
            Path::new("/proj/builder"),
            Path::new("/proj/builder/3-testing/App.svelte"),
        );
        assert_eq!(rel.as_deref(), Some("3-testing/App.svelte"));
    }

    #[test]
    fn base_itself_is_empty() {
        let rel = relative_str(Path::new("/proj/builder"), Path::new("/proj/builder"));
        assert_eq!(rel.as_deref(), Some(""));
    }

    #[test]
    fn unrelated_path_is_none() {
        let rel = relative_str(
            Path::new("/proj/builder"),
            Path::new("/definitely/not/here/x.js"),
        );
        assert_eq!(rel, None);
    }
}
