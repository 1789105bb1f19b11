//! Directory listing and file operations that keep the navigation state in step

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::error::{NavError, Result};
use super::navigation::{FileEntry, NavigationState};

/// Lines returned by [`content_preview`]
pub const PREVIEW_LINES: usize = 4;
/// Characters kept per preview line
pub const PREVIEW_LINE_CHARS: usize = 128;

/// Check if the file name ends in a markdown extension.
///
/// Compares the name itself so that `.md` counts too.
pub fn is_markdown(path: &Path) -> bool {
    path.file_name().is_some_and(|name| {
        let name = name.to_string_lossy().to_lowercase();
        name.ends_with(".md") || name.ends_with(".markdown")
    })
}

/// Outcome of a directory listing: entries that could be read, plus the
/// entries that were skipped and why
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<FileEntry>,
    pub skipped: Vec<(PathBuf, NavError)>,
}

impl Listing {
    /// Record one directory entry, keeping directories and markdown files
    fn push(&mut self, path: PathBuf, metadata: std::io::Result<fs::Metadata>) {
        let metadata = match metadata {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!("Failed to get info for {}: {}", path.display(), e);
                let err = NavError::from_io(&path, e);
                self.skipped.push((path, err));
                return;
            }
        };

        if metadata.is_dir() || is_markdown(&path) {
            self.entries.push(FileEntry::from_metadata(path, &metadata));
        }
    }

    /// Sort for display: directories first, then case-insensitive by name
    pub fn sorted(mut self) -> Self {
        self.entries.sort_by(|a, b| match (a.is_directory, b.is_directory) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        });
        self
    }
}

/// List the directories and markdown files directly inside `dir`.
///
/// Entries are in enumeration order. An entry that cannot be stat'ed is
/// logged and skipped.
pub fn list(dir: &Path) -> Result<Listing> {
    let read_dir = fs::read_dir(dir).map_err(|e| {
        if dir.is_file() {
            NavError::NotADirectory(dir.to_path_buf())
        } else {
            NavError::from_io(dir, e)
        }
    })?;

    let mut listing = Listing::default();
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry in {}: {}", dir.display(), e);
                listing.skipped.push((dir.to_path_buf(), NavError::from_io(dir, e)));
                continue;
            }
        };

        listing.push(entry.path(), entry.metadata());
    }

    Ok(listing)
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() {
        Err(NavError::InvalidArgument("name cannot be empty"))
    } else {
        Ok(())
    }
}

fn require_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        Err(NavError::InvalidArgument("path cannot be empty"))
    } else {
        Ok(())
    }
}

fn ensure_vacant(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(_) => Err(NavError::AlreadyExists(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(NavError::from_io(path, e)),
    }
}

/// Create an empty file `name` inside `dir`
pub fn create_file(name: &str, dir: &Path) -> Result<PathBuf> {
    require_name(name)?;
    require_path(dir)?;
    let path = dir.join(name);
    ensure_vacant(&path)?;

    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => NavError::AlreadyExists(path.clone()),
            _ => NavError::from_io(&path, e),
        })?;
    tracing::info!("Created file: {}", path.display());
    Ok(path)
}

/// Create a directory `name` inside `dir`
pub fn create_directory(name: &str, dir: &Path) -> Result<PathBuf> {
    require_name(name)?;
    require_path(dir)?;
    let path = dir.join(name);
    ensure_vacant(&path)?;

    fs::create_dir(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => NavError::AlreadyExists(path.clone()),
        _ => NavError::from_io(&path, e),
    })?;
    tracing::info!("Created directory: {}", path.display());
    Ok(path)
}

/// Rename `old_path` to `new_name` within the same directory
pub fn rename(state: &mut NavigationState, old_path: &Path, new_name: &str) -> Result<PathBuf> {
    require_path(old_path)?;
    require_name(new_name)?;
    fs::symlink_metadata(old_path).map_err(|e| NavError::from_io(old_path, e))?;

    let new_path = match old_path.parent() {
        Some(dir) => dir.join(new_name),
        None => PathBuf::from(new_name),
    };
    ensure_vacant(&new_path)?;

    fs::rename(old_path, &new_path).map_err(|e| NavError::Io {
        path: old_path.to_path_buf(),
        source: e,
    })?;
    state.on_renamed(old_path, &new_path);

    tracing::info!("Renamed {} to {}", old_path.display(), new_path.display());
    Ok(new_path)
}

/// Delete a file, or a directory with everything below it.
///
/// The navigation state forgets `path` before anything is removed, so a
/// failed removal leaves it cleared rather than pointing at a half-deleted
/// tree.
pub fn delete(state: &mut NavigationState, path: &Path) -> Result<()> {
    require_path(path)?;
    let metadata = fs::symlink_metadata(path).map_err(|e| NavError::from_io(path, e))?;

    state.on_deleted(path);

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| NavError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!("Deleted: {}", path.display());
    Ok(())
}

/// Overwrite an existing file with `content`
pub fn save(state: &mut NavigationState, path: &Path, content: &str) -> Result<()> {
    require_path(path)?;
    let metadata = fs::metadata(path).map_err(|e| NavError::from_io(path, e))?;
    if metadata.is_dir() {
        return Err(NavError::IsDirectory(path.to_path_buf()));
    }

    fs::write(path, content).map_err(|e| NavError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    state.on_saved(path, content);

    tracing::info!("Saved document: {}", path.display());
    Ok(())
}

fn require_file(path: &Path) -> Result<()> {
    require_path(path)?;
    let metadata = fs::metadata(path).map_err(|e| NavError::from_io(path, e))?;
    if metadata.is_dir() {
        return Err(NavError::IsDirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Read the whole file as text
pub fn read_content(path: &Path) -> Result<String> {
    require_file(path)?;
    fs::read_to_string(path).map_err(|e| NavError::from_io(path, e))
}

/// First few lines of a file, each cut to a fixed width
pub fn content_preview(path: &Path) -> Result<String> {
    require_file(path)?;
    let file = fs::File::open(path).map_err(|e| NavError::from_io(path, e))?;

    let mut lines = Vec::with_capacity(PREVIEW_LINES);
    for line in BufReader::new(file).lines().take(PREVIEW_LINES) {
        let line = line.map_err(|e| NavError::from_io(path, e))?;
        if line.chars().count() > PREVIEW_LINE_CHARS {
            let cut: String = line.chars().take(PREVIEW_LINE_CHARS).collect();
            lines.push(format!("{cut}..."));
        } else {
            lines.push(line);
        }
    }

    Ok(lines.join("\n"))
}
