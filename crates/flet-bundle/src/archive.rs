//! App archive writer.
//!
//! Snapshots the app directory into a gzipped GNU tar, skipping build output,
//! dotfiles and caches, and appends the merged requirements manifest.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};
use walkdir::WalkDir;

use crate::paths::{is_within_directory, normalize};
use crate::requirements::{Requirements, REQUIREMENTS_FILE};

/// Archive file name in the output directory.
pub const ARCHIVE_FILE: &str = "app.tar.gz";

const CACHE_DIR_PREFIX: &str = "__pycache__";

/// Decides which entries under the app root go into the archive.
#[derive(Debug, Clone)]
pub struct ArchiveFilter {
    root: PathBuf,
    excluded_dirs: Vec<PathBuf>,
    excluded_files: Vec<PathBuf>,
}

impl ArchiveFilter {
    /// Create a filter for the tree rooted at `root` (an absolute path).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize(&root.into()),
            excluded_dirs: Vec::new(),
            excluded_files: Vec::new(),
        }
    }

    /// Skip `dir` and everything inside it.
    pub fn exclude_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.excluded_dirs.push(normalize(dir.as_ref()));
        self
    }

    /// Skip a single file.
    pub fn exclude_file(mut self, file: impl AsRef<Path>) -> Self {
        self.excluded_files.push(normalize(file.as_ref()));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the entry at `relative` (relative to the root) is archived.
    ///
    /// Rejecting a directory also rejects everything below it.
    pub fn includes(&self, relative: &Path) -> bool {
        for component in relative.components() {
            if let Component::Normal(name) = component {
                let name = name.to_string_lossy();
                if name.starts_with('.') || name.starts_with(CACHE_DIR_PREFIX) {
                    return false;
                }
            }
        }

        if relative == Path::new(REQUIREMENTS_FILE) {
            return false;
        }

        let full = normalize(&self.root.join(relative));

        if self
            .excluded_dirs
            .iter()
            .any(|dir| is_within_directory(dir, &full))
        {
            return false;
        }

        !self.excluded_files.iter().any(|file| *file == full)
    }
}

/// Result of writing an archive.
#[derive(Debug)]
pub struct ArchiveSummary {
    /// Archive names of the app entries, in the order they were written
    pub entries: Vec<String>,
}

/// Write `app.tar.gz` to `dest`: the filtered app tree followed by `manifest`
/// stored as `requirements.txt`.
pub fn write_app_archive(
    dest: &Path,
    filter: &ArchiveFilter,
    manifest: &Requirements,
) -> io::Result<ArchiveSummary> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::best());

    let mut tar = Builder::new(encoder);
    tar.follow_symlinks(false);

    let root = filter.root();
    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| filter.includes(e.path().strip_prefix(root).unwrap_or(e.path())));

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = archive_name(relative);

        tracing::info!("    Adding {}", name);
        tar.append_path_with_name(entry.path(), &name)?;
        entries.push(name);
    }

    tracing::info!("    Adding {}", REQUIREMENTS_FILE);
    append_manifest(&mut tar, manifest)?;

    let encoder = tar.into_inner()?;
    encoder.finish()?;

    Ok(ArchiveSummary { entries })
}

fn append_manifest<W: io::Write>(tar: &mut Builder<W>, manifest: &Requirements) -> io::Result<()> {
    let data = manifest.to_manifest().into_bytes();
    let mtime = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(mtime);

    tar.append_data(&mut header, REQUIREMENTS_FILE, data.as_slice())
}

/// POSIX-style archive name for a path relative to the app root.
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
