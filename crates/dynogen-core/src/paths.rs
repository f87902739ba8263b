//! Import path resolution between generated files.

use std::path::{Component, Path, PathBuf};

use crate::binding::is_relative_or_absolute_require;

/// Extensions the TypeScript module resolver infers on its own.
const INFERABLE_EXTENSIONS: [&str; 2] = ["js", "ts"];

/// Import path from the file at `from` to the module at `to`, both relative to
/// the process working directory.
///
/// Package names are returned unchanged.
pub fn resolve_path(from: &str, to: &str) -> String {
    let base = std::env::current_dir().unwrap_or_default();
    resolve_path_from(&base, from, to)
}

/// Same as [`resolve_path`] with an explicit base directory.
pub fn resolve_path_from(base: &Path, from: &str, to: &str) -> String {
    if !is_relative_or_absolute_require(to) {
        return to.to_string();
    }

    let from_path = normalize(&base.join(from));
    let from_dir = from_path.parent().unwrap_or(Path::new("/"));
    let to_path = normalize(&base.join(to));

    let relative = relative_path(from_dir, &to_path);
    let mut segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if let Some(last) = segments.last_mut() {
        if let Some((stem, ext)) = last.rsplit_once('.') {
            if !stem.is_empty() && INFERABLE_EXTENSIONS.contains(&ext) {
                *last = stem.to_string();
            }
        }
    }

    let joined = segments.join("/");
    if segments.len() > 1 {
        joined
    } else {
        format!("./{joined}")
    }
}

/// Lexically resolves `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();

    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..from.len() {
        relative.push("..");
    }
    for component in &to[shared..] {
        relative.push(component);
    }
    relative
}
