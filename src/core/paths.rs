//! Path resolution for references found in markdown documents
//!
//! References arrive percent-encoded (they are embedded in markdown image
//! syntax and in asset URIs) and are resolved against a base directory. The
//! base directory always follows the same rule, see [`base_dir`]: the parent
//! of the current file when there is one, the current directory otherwise.

use std::borrow::Cow;
use std::fs;
use std::path::{Component, Path, PathBuf};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::error::{NavError, Result};

/// Bytes left unescaped inside a single URL path segment.
///
/// `/` is escaped too, so a relative reference survives as one segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Base directory for relative references
pub fn base_dir(current_file: Option<&Path>, current_dir: &Path) -> Option<PathBuf> {
    match current_file {
        Some(file) => file.parent().map(Path::to_path_buf),
        None if current_dir.as_os_str().is_empty() => None,
        None => Some(current_dir.to_path_buf()),
    }
}

/// Percent-encode a path for embedding in a URL or a markdown reference
pub fn encode_for_embedding(path: &Path) -> String {
    utf8_percent_encode(&path.to_string_lossy(), PATH_SEGMENT).to_string()
}

/// Undo [`encode_for_embedding`].
///
/// Fails on a `%` not followed by two hex digits, or when the decoded bytes
/// are not UTF-8.
pub fn decode_reference(reference: &str) -> Result<String> {
    let bytes = reference.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !well_formed {
                return Err(NavError::Decode(reference.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(reference)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| NavError::Decode(reference.to_string()))
}

/// Lexically normalize a path: drop `.`, fold `..` into its parent.
///
/// Never touches the filesystem. `..` above the root of an absolute path is
/// dropped; leading `..` of a relative path are kept.
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Join an already-decoded reference onto `base` without checking existence.
///
/// Absolute references are returned cleaned; with no base a relative
/// reference is only cleaned.
pub fn join_reference(decoded: &str, base: Option<&Path>) -> PathBuf {
    let reference = Path::new(decoded);
    if reference.is_absolute() {
        return clean(reference);
    }
    match base {
        Some(base) => clean(&base.join(reference)),
        None => clean(reference),
    }
}

/// Resolve a percent-encoded reference against `base_dir`.
///
/// Absolute references come back decoded but otherwise unchanged. The result
/// must exist on disk.
pub fn resolve_relative(reference: &str, base_dir: &Path) -> Result<PathBuf> {
    let decoded = decode_reference(reference)?;
    let resolved = if Path::new(&decoded).is_absolute() {
        PathBuf::from(decoded)
    } else {
        clean(&base_dir.join(&decoded))
    };

    fs::metadata(&resolved).map_err(|e| NavError::from_io(&resolved, e))?;
    tracing::debug!("Resolved {} to {}", reference, resolved.display());
    Ok(resolved)
}

/// Shortest relative path leading from `base_dir` to `path`.
///
/// When no relative path exists (different roots or drives, or a relative
/// base climbing above its own start) `path` is returned unchanged.
pub fn relative_to(path: &Path, base_dir: &Path) -> PathBuf {
    let target = clean(path);
    let base = clean(base_dir);
    if target.is_absolute() != base.is_absolute() {
        return path.to_path_buf();
    }

    let target_parts: Vec<Component> = target.components().filter(|c| *c != Component::CurDir).collect();
    let base_parts: Vec<Component> = base.components().filter(|c| *c != Component::CurDir).collect();

    let prefix_of = |parts: &[Component]| match parts.first() {
        Some(Component::Prefix(p)) => Some(p.as_os_str().to_os_string()),
        _ => None,
    };
    if prefix_of(&target_parts) != prefix_of(&base_parts) {
        return path.to_path_buf();
    }

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let remaining_base = &base_parts[common..];
    if remaining_base.iter().any(|c| *c == Component::ParentDir) {
        return path.to_path_buf();
    }

    let mut relative = PathBuf::new();
    for _ in remaining_base {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        relative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(clean(Path::new("a/b/../../..")), PathBuf::from(".."));
        assert_eq!(clean(Path::new("./")), PathBuf::from("."));
        assert_eq!(clean(Path::new("/notes//img/")), PathBuf::from("/notes/img"));
    }

    #[test]
    fn test_base_dir_prefers_current_file() {
        let dir = Path::new("/home/u");
        let file = Path::new("/srv/notes/todo.md");
        assert_eq!(base_dir(Some(file), dir), Some(PathBuf::from("/srv/notes")));
        assert_eq!(base_dir(None, dir), Some(PathBuf::from("/home/u")));
        assert_eq!(base_dir(None, Path::new("")), None);
    }

    #[test]
    fn test_encode_escapes_spaces_unicode_and_reserved() {
        let encoded = encode_for_embedding(Path::new("img/my photo ü?#.png"));
        assert_eq!(encoded, "img%2Fmy%20photo%20%C3%BC%3F%23.png");
    }

    #[test]
    fn test_encode_then_decode_is_identity() {
        for name in [
            "plain.png",
            "with space.png",
            "日本語/画像.jpg",
            "a?b#c%d[e]&f=g+h;i,j.gif",
            "../up/one level.svg",
        ] {
            let encoded = encode_for_embedding(Path::new(name));
            assert_eq!(decode_reference(&encoded).unwrap(), name);
        }
    }

    #[test]
    fn test_decode_rejects_malformed_escapes() {
        assert!(matches!(decode_reference("bad%zzname"), Err(NavError::Decode(_))));
        assert!(matches!(decode_reference("trailing%4"), Err(NavError::Decode(_))));
        assert!(matches!(decode_reference("%ff%fe"), Err(NavError::Decode(_))));
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/a/b/img/x.png"), Path::new("/a/b")),
            PathBuf::from("img/x.png")
        );
        assert_eq!(
            relative_to(Path::new("/a/img/x.png"), Path::new("/a/b/c")),
            PathBuf::from("../../img/x.png")
        );
        assert_eq!(relative_to(Path::new("/a/b"), Path::new("/a/b")), PathBuf::from("."));
    }

    #[test]
    fn test_relative_to_falls_back_to_absolute() {
        assert_eq!(
            relative_to(Path::new("/a/x.png"), Path::new("notes")),
            PathBuf::from("/a/x.png")
        );
        assert_eq!(
            relative_to(Path::new("x.png"), Path::new("../elsewhere")),
            PathBuf::from("x.png")
        );
    }

    #[test]
    fn test_resolve_relative_requires_existence() {
        let tmp = TempDir::new().unwrap();
        let img_dir = tmp.path().join("my images");
        fs::create_dir(&img_dir).unwrap();
        fs::write(img_dir.join("a b.png"), b"png").unwrap();

        let resolved = resolve_relative("my%20images/./a%20b.png", tmp.path()).unwrap();
        assert_eq!(resolved, img_dir.join("a b.png"));

        let missing = resolve_relative("nope.png", tmp.path());
        assert!(matches!(missing, Err(NavError::NotFound { .. })));
    }

    #[test]
    fn test_resolve_relative_keeps_absolute_reference() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("abs.png");
        fs::write(&file, b"png").unwrap();
        let reference = encode_for_embedding(&file);
        assert_eq!(resolve_relative(&reference, Path::new("/elsewhere")).unwrap(), file);
    }

    #[test]
    fn test_round_trip_through_relative_path() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("notes").join("daily");
        let sibling = tmp.path().join("notes").join("assets");
        fs::create_dir_all(&base).unwrap();
        fs::create_dir_all(&sibling).unwrap();
        let targets = [
            base.join("here.png"),
            sibling.join("over there.png"),
            tmp.path().join("top.png"),
        ];
        for target in &targets {
            fs::write(target, b"x").unwrap();
            let rel = relative_to(target, &base);
            assert!(rel.is_relative());
            let reference = encode_for_embedding(&rel);
            assert_eq!(&resolve_relative(&reference, &base).unwrap(), target);
        }
    }

    #[test]
    fn test_join_reference_without_base() {
        assert_eq!(join_reference("a/../b.png", None), PathBuf::from("b.png"));
        assert_eq!(
            join_reference("../x.png", Some(Path::new("/n/d"))),
            PathBuf::from("/n/x.png")
        );
        assert_eq!(join_reference("/abs/./y.png", Some(Path::new("/n"))), PathBuf::from("/abs/y.png"));
    }
}
