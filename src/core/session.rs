//! The running session: navigation state behind a single mutex
//!
//! The shell and the preview's asset loader share one `Arc<Session>`; every
//! read or mutation of the navigation state goes through [`Session::lock`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::asset::{self, AssetResponse};
use super::config::AppConfig;
use super::error::{NavError, Result};
use super::file_system::{self, Listing};
use super::navigation::{CurrentFilesState, NavigationState};
use super::paths;

/// Image extensions offered by the image picker
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<NavigationState>,
}

impl Session {
    pub fn new(state: NavigationState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Session seeded from the persisted configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        Self::new(NavigationState::seeded(config, home.as_deref()))
    }

    /// Exclusive access to the navigation state
    pub fn lock(&self) -> MutexGuard<'_, NavigationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_dir(&self) -> Option<PathBuf> {
        self.lock().current_dir().map(Path::to_path_buf)
    }

    pub fn current_file(&self) -> Option<PathBuf> {
        self.lock().current_file().map(Path::to_path_buf)
    }

    pub fn take_title_refresh(&self) -> Option<String> {
        self.lock().take_title_refresh()
    }

    pub fn open(&self, path: &Path) -> Result<CurrentFilesState> {
        self.lock().open(path)
    }

    pub fn go_up(&self) -> Result<CurrentFilesState> {
        self.lock().go_up()
    }

    pub fn snapshot(&self) -> CurrentFilesState {
        self.lock().snapshot()
    }

    /// List `path`, or the current directory when `path` is empty
    pub fn list(&self, path: &Path) -> Result<Listing> {
        if path.as_os_str().is_empty() {
            let dir = self.current_dir().ok_or(NavError::NoCurrentDirectory)?;
            file_system::list(&dir)
        } else {
            file_system::list(path)
        }
    }

    fn target_dir(&self, dir: Option<&Path>) -> Result<PathBuf> {
        match dir {
            Some(dir) => Ok(dir.to_path_buf()),
            None => self.current_dir().ok_or(NavError::NoCurrentDirectory),
        }
    }

    /// Create an empty file in `dir`, or in the current directory
    pub fn create_file(&self, name: &str, dir: Option<&Path>) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(NavError::InvalidArgument("name cannot be empty"));
        }
        file_system::create_file(name, &self.target_dir(dir)?)
    }

    /// Create a directory in `dir`, or in the current directory
    pub fn create_directory(&self, name: &str, dir: Option<&Path>) -> Result<PathBuf> {
        if name.is_empty() {
            return Err(NavError::InvalidArgument("name cannot be empty"));
        }
        file_system::create_directory(name, &self.target_dir(dir)?)
    }

    pub fn rename(&self, old_path: &Path, new_name: &str) -> Result<PathBuf> {
        file_system::rename(&mut self.lock(), old_path, new_name)
    }

    pub fn delete(&self, path: &Path) -> Result<()> {
        file_system::delete(&mut self.lock(), path)
    }

    pub fn save(&self, path: &Path, content: &str) -> Result<()> {
        file_system::save(&mut self.lock(), path, content)
    }

    /// Resolve an image reference against the base directory; it must exist
    pub fn resolve_image_path(&self, reference: &str) -> Result<PathBuf> {
        let base = self.lock().base_dir().unwrap_or_default();
        paths::resolve_relative(reference, &base)
    }

    /// Encoded reference to `selection`, relative to the base directory when
    /// possible
    pub fn image_reference(&self, selection: &Path) -> String {
        let relative = match self.lock().base_dir() {
            Some(base) => paths::relative_to(selection, &base),
            None => selection.to_path_buf(),
        };
        paths::encode_for_embedding(&relative)
    }

    /// Serve an HTTP-style asset request.
    ///
    /// Only resolution happens under the lock; the file is read after it is
    /// released.
    pub fn serve_asset(&self, request_path: &str) -> AssetResponse {
        let resolved = asset::resolve_request(&self.lock(), request_path);
        asset::load(&resolved)
    }
}
