//! Editor buffer for the current markdown file

use std::path::{Path, PathBuf};

use super::error::Result;
use super::file_system;
use super::hasher;
use super::session::Session;

/// Outcome of comparing the buffer against a fresh content hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskSync {
    Unchanged,
    /// The buffer was clean and has been reloaded
    Reloaded,
    /// The file changed on disk while the buffer has unsaved edits
    Conflict,
}

/// A markdown document being edited
#[derive(Debug, Clone)]
pub struct Document {
    /// File path
    pub path: PathBuf,
    /// Document content
    pub content: String,
    /// Whether the document has unsaved changes
    pub modified: bool,
    /// Hash of the content last read from or written to disk
    pub disk_hash: String,
}

impl Document {
    /// Open a document from a file
    pub fn open(path: &Path) -> Result<Self> {
        let content = file_system::read_content(path)?;
        let disk_hash = hasher::hash_str(&content);

        Ok(Self {
            path: path.to_path_buf(),
            content,
            modified: false,
            disk_hash,
        })
    }

    /// Save through the session so its cached content follows
    pub fn save(&mut self, session: &Session) -> Result<()> {
        session.save(&self.path, &self.content)?;
        self.modified = false;
        self.disk_hash = hasher::hash_str(&self.content);
        Ok(())
    }

    /// Get the document title (filename without extension)
    pub fn title(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Update content and mark as modified
    pub fn set_content(&mut self, content: String) {
        if self.content != content {
            self.content = content;
            self.modified = true;
        }
    }

    /// Point the buffer at the new location when `old` (the file itself or
    /// one of its ancestors) was renamed to `new`. Edits are kept.
    pub fn follow_rename(&mut self, old: &Path, new: &Path) -> bool {
        let Ok(rest) = self.path.strip_prefix(old) else {
            return false;
        };
        self.path = if rest.as_os_str().is_empty() {
            new.to_path_buf()
        } else {
            new.join(rest)
        };
        true
    }

    /// React to the content hash reported for this file by a snapshot
    pub fn sync_with_disk(&mut self, content_hash: &str) -> Result<DiskSync> {
        if content_hash == self.disk_hash {
            return Ok(DiskSync::Unchanged);
        }
        if self.modified {
            return Ok(DiskSync::Conflict);
        }

        *self = Self::open(&self.path)?;
        tracing::info!("Reloaded {} after external change", self.path.display());
        Ok(DiskSync::Reloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_save_updates_hash_and_session_cache() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Daily Note.md");
        fs::write(&path, "old").unwrap();
        let session = Session::default();
        session.open(&path).unwrap();

        let mut doc = Document::open(&path).unwrap();
        assert_eq!(doc.title(), "Daily Note");
        doc.set_content("new".to_string());
        assert!(doc.modified);

        doc.save(&session).unwrap();
        assert!(!doc.modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(Some(doc.disk_hash.clone()), session.snapshot().content_hash);
        assert_eq!(session.lock().cached_content(), Some("new"));
    }

    #[test]
    fn test_sync_with_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        fs::write(&path, "one").unwrap();
        let mut doc = Document::open(&path).unwrap();

        assert_eq!(doc.sync_with_disk(&hasher::hash_str("one")).unwrap(), DiskSync::Unchanged);

        fs::write(&path, "two").unwrap();
        assert_eq!(doc.sync_with_disk(&hasher::hash_str("two")).unwrap(), DiskSync::Reloaded);
        assert_eq!(doc.content, "two");

        doc.set_content("local edit".to_string());
        fs::write(&path, "three").unwrap();
        assert_eq!(doc.sync_with_disk(&hasher::hash_str("three")).unwrap(), DiskSync::Conflict);
        assert_eq!(doc.content, "local edit");
    }

    #[test]
    fn test_follow_rename_keeps_unsaved_edits() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("drafts");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("a.md");
        fs::write(&path, "on disk").unwrap();
        let session = Session::default();
        session.open(&path).unwrap();

        let mut doc = Document::open(&path).unwrap();
        doc.set_content("typed".to_string());

        fs::write(tmp.path().join("other.md"), "").unwrap();
        let other = session.rename(&tmp.path().join("other.md"), "else.md").unwrap();
        assert!(!doc.follow_rename(&tmp.path().join("other.md"), &other));
        assert_eq!(doc.path, path);

        let moved = session.rename(&dir, "published").unwrap();
        assert!(doc.follow_rename(&dir, &moved));
        assert_eq!(doc.path, moved.join("a.md"));
        assert_eq!(Some(doc.path.clone()), session.current_file());
        assert_eq!(doc.content, "typed");
        assert!(doc.modified);

        doc.save(&session).unwrap();
        assert_eq!(fs::read_to_string(moved.join("a.md")).unwrap(), "typed");
    }
}
