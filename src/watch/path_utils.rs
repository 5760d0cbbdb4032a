// src/watch/path_utils.rs

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Falls back to comparing canonicalized paths, since some platforms report
/// events under a different absolute prefix than the one that was watched
/// (macOS `/private/var` vs `/var`). Returns `None` when the path does not
/// live under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

/// Join pattern fragments with `/`, skipping empty and `.` segments so that
/// a base of `"."` does not leak into the compiled glob.
pub fn join_pattern<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .flat_map(|part| part.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
