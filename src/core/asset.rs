//! Serving local files referenced from markdown to the preview
//!
//! References resolve against the session's base directory. No traversal
//! restriction applies: any path the process can read is served. The
//! handler only ever talks to the local preview of the same user, so the OS
//! permissions are the boundary.

use std::fs;
use std::path::{Path, PathBuf};

use super::navigation::NavigationState;
use super::paths;

/// Status of an asset response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Ok,
    NotFound,
}

impl AssetStatus {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
        }
    }
}

/// Bytes of the requested file, or a plain-text diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: AssetStatus,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn is_ok(&self) -> bool {
        self.status == AssetStatus::Ok
    }
}

/// Resolve a reference to a filesystem path without requiring it to exist
pub fn resolve(state: &NavigationState, reference: &str) -> PathBuf {
    let decoded = match paths::decode_reference(reference) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!("Using undecoded asset path: {}", e);
            reference.to_string()
        }
    };
    paths::join_reference(&decoded, state.base_dir().as_deref())
}

/// Resolve an HTTP-style request path (one leading `/` is dropped)
pub fn resolve_request(state: &NavigationState, request_path: &str) -> PathBuf {
    tracing::debug!("Requesting file: {}", request_path);
    let reference = request_path.strip_prefix('/').unwrap_or(request_path);
    resolve(state, reference)
}

/// Read an already resolved path into a response
pub fn load(resolved: &Path) -> AssetResponse {
    match fs::read(resolved) {
        Ok(body) => AssetResponse {
            status: AssetStatus::Ok,
            body,
        },
        Err(e) => {
            tracing::debug!("Error reading file {}: {}", resolved.display(), e);
            AssetResponse {
                status: AssetStatus::NotFound,
                body: format!("Could not load file {}: {}", resolved.display(), e).into_bytes(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_serves_relative_to_current_file() {
        let tmp = TempDir::new().unwrap();
        let notes = tmp.path().join("notes");
        fs::create_dir_all(notes.join("img")).unwrap();
        fs::write(notes.join("img").join("cat pic.png"), b"\x89PNG").unwrap();
        fs::write(notes.join("a.md"), "![](img/cat%20pic.png)").unwrap();

        let mut state = NavigationState::new();
        state.open(tmp.path()).unwrap();
        state.open(&notes.join("a.md")).unwrap();

        let response = load(&resolve_request(&state, "/img/cat%20pic.png"));
        assert!(response.is_ok());
        assert_eq!(response.body, b"\x89PNG");
    }

    #[test]
    fn test_serves_relative_to_current_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("logo.svg"), "<svg/>").unwrap();
        let mut state = NavigationState::new();
        state.open(tmp.path()).unwrap();

        assert_eq!(load(&resolve(&state, "logo.svg")).body, b"<svg/>");
        assert_eq!(load(&resolve(&state, "./sub/../logo.svg")).body, b"<svg/>");
    }

    #[test]
    fn test_missing_file_is_404_with_diagnostic() {
        let tmp = TempDir::new().unwrap();
        let mut state = NavigationState::new();
        state.open(tmp.path()).unwrap();

        let response = load(&resolve_request(&state, "/missing.png"));
        assert_eq!(response.status, AssetStatus::NotFound);
        assert_eq!(response.status.code(), 404);
        let body = String::from_utf8(response.body).unwrap();
        let expected = format!("Could not load file {}:", tmp.path().join("missing.png").display());
        assert!(body.starts_with(&expected), "{body}");
    }

    #[test]
    fn test_resolution_does_not_require_existence() {
        let state = NavigationState::new();
        assert_eq!(resolve(&state, "a/../b.png"), Path::new("b.png"));
        assert_eq!(resolve(&state, "bad%zz.png"), Path::new("bad%zz.png"));
        assert_eq!(resolve_request(&state, "//abs/x.png"), Path::new("/abs/x.png"));
        assert_eq!(resolve_request(&state, "rel.png"), Path::new("rel.png"));
    }

    #[test]
    fn test_absolute_and_parent_references_are_served() {
        let tmp = TempDir::new().unwrap();
        let inner = tmp.path().join("inner");
        fs::create_dir(&inner).unwrap();
        let outside = tmp.path().join("outside.png");
        fs::write(&outside, b"o").unwrap();

        let mut state = NavigationState::new();
        state.open(&inner).unwrap();
        assert!(load(&resolve(&state, "../outside.png")).is_ok());
        assert!(load(&resolve(&state, &paths::encode_for_embedding(&outside))).is_ok());
    }

    #[test]
    fn test_load_needs_no_navigation_state() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("pic.png");
        fs::write(&file, b"px").unwrap();

        let resolved = {
            let mut state = NavigationState::new();
            state.open(tmp.path()).unwrap();
            resolve_request(&state, "/pic.png")
        };
        assert_eq!(resolved, file);
        assert_eq!(load(&resolved).body, b"px");
    }
}
