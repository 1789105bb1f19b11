//! Error taxonomy for navigation, path resolution and file operations

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used across the core
pub type Result<T> = std::result::Result<T, NavError>;

/// Failures surfaced by the navigation core
#[derive(Debug, Error)]
pub enum NavError {
    #[error("{} not found", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("path {} is a directory, not a file", .0.display())]
    IsDirectory(PathBuf),

    #[error("path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("already at root directory")]
    AtRoot,

    #[error("no current directory set")]
    NoCurrentDirectory,

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode path {0:?}")]
    Decode(String),
}

impl NavError {
    /// Classify an I/O failure against `path`
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
                source: Some(source),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_is_classified() {
        let err = NavError::from_io(
            Path::new("/missing"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "/missing not found");
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err = NavError::from_io(
            Path::new("/locked"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, NavError::Io { .. }));
        assert!(err.to_string().contains("denied"));
    }
}
