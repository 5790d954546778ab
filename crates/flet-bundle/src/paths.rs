//! Filesystem helpers: path normalization, containment checks and tree copies.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

/// Lexically normalize a path, folding `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` never climbs above the root
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Resolve `path` against `base` unless it is already absolute, then normalize.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Whether `target` is `directory` itself or lies somewhere below it.
///
/// Compares whole components, so `/app/dist2` is not within `/app/dist`.
pub fn is_within_directory(directory: &Path, target: &Path) -> bool {
    normalize(target).starts_with(normalize(directory))
}

/// Delete `dir` (ignoring failures) and create it again, empty.
pub fn recreate_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        if let Err(e) = fs::remove_dir_all(dir) {
            tracing::debug!("Ignoring cleanup failure for {}: {}", dir.display(), e);
        }
    }
    fs::create_dir_all(dir)
}

/// Recursively copy the contents of `src` into `dst`, overwriting existing files.
///
/// Symlinks are followed. When `dst` lies inside `src` it is skipped, so the
/// copy never walks into its own output. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<usize> {
    let mut copied = 0;

    fs::create_dir_all(dst)?;

    let walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_within_directory(dst, e.path()));

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}
