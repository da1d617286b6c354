use std::path::{Component, Path, PathBuf};

/// Errors that can occur during path validation
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Path '{path}' is outside allowed root directory '{root}'")]
    OutsideRootDirectory { path: PathBuf, root: PathBuf },

    #[error("Symlink '{path}' points outside allowed root directory")]
    SymlinkOutsideRoot { path: PathBuf },
}

/// Resolves `relative` against the directory containing `document`.
///
/// Absolute `relative` values replace the base entirely. The result is
/// normalized lexically, without touching the filesystem, so it is a
/// stable cache key for the same inputs.
///
/// # Examples
///
/// ```rust
/// use std::path::Path;
/// use upward_server::core::security::resolve_against;
///
/// let dir = resolve_against(Path::new("/srv/app/upward.yml"), "../public/assets");
/// assert_eq!(dir, Path::new("/srv/public/assets"));
/// ```
pub fn resolve_against(document: &Path, relative: &str) -> PathBuf {
    let base = document.parent().unwrap_or_else(|| Path::new("/"));
    normalize(&base.join(relative))
}

/// Lexically normalizes a path: drops `.` components and folds `..` into
/// the preceding component. `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !path.is_absolute() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Validates that `path` lies within `root`.
///
/// With no root configured every path is accepted. Both sides are first
/// compared in normalized form, so `..` segments cannot climb out of the
/// root. The existing part of each path is then canonicalized, so a symlink
/// inside the root cannot point outside it.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The normalized path
/// * `Err(PathSecurityError)` - If the path escapes the root
pub fn ensure_within_root(path: &Path, root: Option<&Path>) -> Result<PathBuf, PathSecurityError> {
    let path = normalize(path);

    let Some(root) = root else {
        return Ok(path);
    };

    let root = normalize(root);
    if !path.starts_with(&root) {
        return Err(PathSecurityError::OutsideRootDirectory { path, root });
    }

    // Symlinks are followed on both sides
    if let (Some(canonical_path), Some(canonical_root)) =
        (canonicalize_existing(&path), canonicalize_existing(&root))
    {
        if !canonical_path.starts_with(&canonical_root) {
            return Err(PathSecurityError::SymlinkOutsideRoot { path });
        }
    }

    Ok(path)
}

/// Canonicalizes the deepest existing ancestor of `path` and re-appends the
/// components that do not exist yet.
fn canonicalize_existing(path: &Path) -> Option<PathBuf> {
    path.ancestors().find_map(|ancestor| {
        let canonical = ancestor.canonicalize().ok()?;
        let rest = path.strip_prefix(ancestor).ok()?;
        Some(canonical.join(rest))
    })
}
