//! Session navigation cursor: current directory, current file, cached content

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

use super::config::AppConfig;
use super::error::{NavError, Result};
use super::hasher;
use super::paths;

/// Title shown when no directory is open
pub const APP_TITLE: &str = "Markdowns";

/// A file or directory as seen by one stat call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl FileEntry {
    /// Build an entry from metadata already fetched for `path`
    pub fn from_metadata(path: PathBuf, metadata: &fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Self {
            name,
            path,
            is_directory: metadata.is_dir(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
        }
    }

    /// Stat `path` and build an entry for it
    pub fn stat(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| NavError::from_io(path, e))?;
        Ok(Self::from_metadata(path.to_path_buf(), &metadata))
    }
}

/// Snapshot of the navigation cursor, computed on demand
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentFilesState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_dir: Option<FileEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_file: Option<FileEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Where the user currently is.
///
/// `current_file` lives independently of `current_dir`; its parent may be
/// any directory.
#[derive(Debug, Default)]
pub struct NavigationState {
    current_dir: PathBuf,
    current_file: Option<PathBuf>,
    cached_content: Option<String>,
    title_refresh: bool,
}

impl NavigationState {
    /// Empty state, before the first navigation
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the persisted configuration.
    ///
    /// Stale entries are ignored; the directory falls back to `home`, then to
    /// the filesystem root.
    pub fn seeded(config: &AppConfig, home: Option<&Path>) -> Self {
        let last_dir = config
            .last_opened_directory
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty() && dir.exists());

        let current_dir = match last_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                if config.last_opened_directory.is_some() {
                    tracing::warn!("Last opened directory is gone, falling back to home");
                }
                home.map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("/"))
            }
        };

        let current_file = config
            .last_opened_file
            .as_deref()
            .filter(|file| !file.as_os_str().is_empty() && file.exists())
            .map(Path::to_path_buf);

        tracing::info!("Starting in {}", current_dir.display());
        Self {
            current_dir,
            current_file,
            title_refresh: true,
            ..Self::new()
        }
    }

    pub fn current_dir(&self) -> Option<&Path> {
        if self.current_dir.as_os_str().is_empty() {
            None
        } else {
            Some(&self.current_dir)
        }
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Content last saved through this state for the current file
    #[allow(dead_code)]
    pub fn cached_content(&self) -> Option<&str> {
        self.cached_content.as_deref()
    }

    /// Directory that relative references resolve against
    pub fn base_dir(&self) -> Option<PathBuf> {
        paths::base_dir(self.current_file(), &self.current_dir)
    }

    /// Window title for the current directory
    pub fn window_title(&self) -> String {
        match self.current_dir() {
            Some(dir) => format!("{} - {}", APP_TITLE, dir.display()),
            None => APP_TITLE.to_string(),
        }
    }

    /// Title to apply if the current directory changed since the last call
    pub fn take_title_refresh(&mut self) -> Option<String> {
        if std::mem::take(&mut self.title_refresh) {
            Some(self.window_title())
        } else {
            None
        }
    }

    fn set_current_dir(&mut self, dir: PathBuf) {
        if dir != self.current_dir {
            self.current_dir = dir;
            self.title_refresh = true;
        }
    }

    fn set_current_file(&mut self, file: Option<PathBuf>) {
        if file != self.current_file {
            self.cached_content = None;
        }
        self.current_file = file;
    }

    /// Navigate to `path`: directories become the current directory, files
    /// the current file.
    pub fn open(&mut self, path: &Path) -> Result<CurrentFilesState> {
        if path.as_os_str().is_empty() {
            return Err(NavError::InvalidArgument("path cannot be empty"));
        }
        let metadata = fs::metadata(path).map_err(|e| NavError::from_io(path, e))?;

        if metadata.is_dir() {
            self.set_current_dir(path.to_path_buf());
            tracing::info!("Opened directory: {}", path.display());
        } else {
            self.set_current_file(Some(path.to_path_buf()));
            tracing::info!("Opened file: {}", path.display());
        }

        Ok(self.snapshot())
    }

    /// Move the current directory one level up.
    ///
    /// A current file that vanished from disk is dropped instead of failing.
    pub fn go_up(&mut self) -> Result<CurrentFilesState> {
        let current = self.current_dir().ok_or(NavError::NoCurrentDirectory)?;
        let parent = match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && parent != current => {
                parent.to_path_buf()
            }
            _ => return Err(NavError::AtRoot),
        };

        let entry = FileEntry::stat(&parent)?;
        self.set_current_dir(parent);

        if let Some(file) = self.current_file.as_deref() {
            if !file.exists() {
                tracing::debug!("Dropping vanished current file {}", file.display());
                self.set_current_file(None);
            }
        }

        let mut state = self.snapshot();
        state.current_dir = Some(entry);
        Ok(state)
    }

    /// Re-stat the cursor. Paths that no longer exist are left out.
    pub fn snapshot(&self) -> CurrentFilesState {
        let current_dir = self
            .current_dir()
            .and_then(|dir| FileEntry::stat(dir).ok());

        let mut state = CurrentFilesState {
            current_dir,
            ..Default::default()
        };

        if let Some(file) = self.current_file() {
            if let Ok(entry) = FileEntry::stat(file) {
                state.content_hash = fs::read(file).ok().map(|bytes| hasher::hash(&bytes));
                state.current_file = Some(entry);
            }
        }

        state
    }

    /// Record new content written to `path`
    pub fn on_saved(&mut self, path: &Path, content: &str) {
        if self.current_file() == Some(path) {
            self.cached_content = Some(content.to_string());
        }
    }

    /// Forget `path` (and anything below it) before it is removed.
    ///
    /// A deleted current directory is replaced by its parent.
    pub fn on_deleted(&mut self, path: &Path) {
        if self
            .current_file()
            .is_some_and(|file| file.starts_with(path))
        {
            tracing::debug!("Clearing current file under {}", path.display());
            self.set_current_file(None);
        }

        if self.current_dir().is_some_and(|dir| dir.starts_with(path)) {
            let parent = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| path.to_path_buf());
            self.set_current_dir(parent);
        }
    }

    /// Follow a rename of `old` to `new`, including paths below `old`
    pub fn on_renamed(&mut self, old: &Path, new: &Path) {
        if let Some(dir) = self.current_dir() {
            if let Ok(rest) = dir.strip_prefix(old) {
                let moved = join_rest(new, rest);
                self.set_current_dir(moved);
            }
        }

        if let Some(file) = self.current_file.as_deref() {
            if let Ok(rest) = file.strip_prefix(old) {
                self.current_file = Some(join_rest(new, rest));
            }
        }
    }
}

fn join_rest(base: &Path, rest: &Path) -> PathBuf {
    if rest.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(rest)
    }
}
