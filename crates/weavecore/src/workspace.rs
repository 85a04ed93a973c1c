//! Path sandbox for handlers that touch the file system.
//!
//! Every caller-supplied path is resolved against a fixed root and rejected
//! when the result would land outside of it.

use crate::NodeError;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open (creating if needed) the workspace rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        std::fs::create_dir_all(root.as_ref())?;
        Self::at(root)
    }

    /// Workspace at `root` without creating anything on disk.
    ///
    /// A missing root is made absolute against the current directory. Handlers
    /// built on it can be listed, but resolving only works once the root exists.
    pub fn at(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        let root = if root.exists() {
            root.canonicalize()?
        } else {
            normalize(&std::env::current_dir()?.join(root))
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a workspace-relative path.
    ///
    /// Leading separators are stripped, so `/notes/a.txt` means
    /// `<root>/notes/a.txt`. `..` segments and symlinks are followed and the
    /// final location must stay under the root.
    pub fn resolve(&self, user_rel: &str) -> Result<PathBuf, NodeError> {
        let trimmed = user_rel.trim().trim_start_matches(['/', '\\']);
        let normalized = normalize(&self.root.join(trimmed));
        if !normalized.starts_with(&self.root) {
            return Err(NodeError::PathEscapesWorkspace(user_rel.to_string()));
        }

        let resolved = canonicalize_existing(&normalized)?;
        if !resolved.starts_with(&self.root) {
            return Err(NodeError::PathEscapesWorkspace(user_rel.to_string()));
        }
        Ok(resolved)
    }

    /// Render a resolved path relative to the root with `/` separators.
    pub fn relative(&self, path: &Path) -> Result<String, NodeError> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| NodeError::PathEscapesWorkspace(path.display().to_string()))?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }
}

/// Lexically fold `.` and `..` without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Symlink hops followed by hand before giving up
const MAX_LINK_HOPS: usize = 40;

/// Canonicalize the deepest existing ancestor and re-append the rest.
///
/// A dangling symlink on the way up is followed to its target, so a link to
/// a not-yet-created file resolves to where a write would actually land.
fn canonicalize_existing(path: &Path) -> Result<PathBuf, NodeError> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_HOPS {
        let mut existing = current.clone();
        let mut rest = Vec::new();
        let mut dangling = false;
        while !existing.exists() {
            if existing.symlink_metadata().is_ok() {
                dangling = true;
                break;
            }
            match (existing.file_name(), existing.parent()) {
                (Some(name), Some(parent)) => {
                    rest.push(name.to_os_string());
                    existing = parent.to_path_buf();
                }
                _ => break,
            }
        }

        let mut resolved = if dangling {
            let target = std::fs::read_link(&existing)?;
            let parent = match existing.parent() {
                Some(parent) => parent.canonicalize()?,
                None => PathBuf::new(),
            };
            normalize(&parent.join(target))
        } else {
            existing.canonicalize()?
        };
        for name in rest.into_iter().rev() {
            resolved.push(name);
        }

        if !dangling {
            return Ok(resolved);
        }
        current = resolved;
    }

    Err(NodeError::Io(format!(
        "Too many levels of symbolic links: {}",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(dir.path().join("WORKSPACE")).unwrap();
        (dir, ws)
    }

    #[test]
    fn relative_paths_land_under_root() {
        let (_dir, ws) = workspace();
        let p = ws.resolve("notes/out.txt").unwrap();
        assert!(p.starts_with(ws.root()));
        assert_eq!(ws.relative(&p).unwrap(), "notes/out.txt");
    }

    #[test]
    fn leading_separators_are_stripped() {
        let (_dir, ws) = workspace();
        let p = ws.resolve("  /etc/passwd").unwrap();
        assert_eq!(p, ws.root().join("etc").join("passwd"));
    }

    #[test]
    fn parent_segments_cannot_escape() {
        let (_dir, ws) = workspace();
        assert!(matches!(
            ws.resolve("../secret.txt"),
            Err(NodeError::PathEscapesWorkspace(_))
        ));
        assert!(ws.resolve("a/../../b").is_err());
        assert!(ws.resolve("a/../b").is_ok());
    }

    #[test]
    fn sibling_with_common_prefix_is_rejected() {
        let (dir, ws) = workspace();
        std::fs::create_dir_all(dir.path().join("WORKSPACE2")).unwrap();
        assert!(ws.resolve("../WORKSPACE2/x").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_out_of_the_root_are_rejected() {
        let (dir, ws) = workspace();
        let outside = dir.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, ws.root().join("link")).unwrap();
        assert!(ws.resolve("link/file.txt").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlinks_are_followed() {
        let (dir, ws) = workspace();
        let target = dir.path().join("outside").join("pwned.txt");
        std::os::unix::fs::symlink(&target, ws.root().join("link")).unwrap();
        assert!(matches!(
            ws.resolve("link"),
            Err(NodeError::PathEscapesWorkspace(_))
        ));
        assert!(ws.resolve("link/deeper.txt").is_err());

        std::os::unix::fs::symlink("later.txt", ws.root().join("inner")).unwrap();
        assert_eq!(ws.resolve("inner").unwrap(), ws.root().join("later.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loops_are_an_error() {
        let (_dir, ws) = workspace();
        std::os::unix::fs::symlink("b", ws.root().join("a")).unwrap();
        std::os::unix::fs::symlink("a", ws.root().join("b")).unwrap();
        assert!(ws.resolve("a").is_err());
    }

    #[test]
    fn at_leaves_a_missing_root_uncreated() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("not-yet");
        let ws = Workspace::at(&root).unwrap();
        assert!(ws.root().is_absolute());
        assert!(ws.root().ends_with("not-yet"));
        assert!(!root.exists());
    }

    #[test]
    fn root_itself_renders_as_empty() {
        let (_dir, ws) = workspace();
        let p = ws.resolve(".").unwrap();
        assert_eq!(ws.relative(&p).unwrap(), "");
    }
}
