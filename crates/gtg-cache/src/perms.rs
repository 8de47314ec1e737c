//! Restrictive on-disk permissions for cache and state files
//!
//! New files are born `0600` inside a `0700` parent. A pre-existing file or
//! directory with looser bits is tightened and a warning is logged; when
//! tightening fails the open is refused.
//!
//! On non-unix platforms the mode handling is a no-op; the OS ACL model
//! differs and the stores still work.

use crate::cache::CacheError;
use std::path::Path;

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

fn permission_error(path: &Path, detail: impl std::fmt::Display) -> CacheError {
    CacheError::Permission {
        path: path.display().to_string(),
        detail: detail.to_string(),
    }
}

/// Create `dir` if needed and enforce mode `0700` on it
///
/// A freshly created directory is fixed up silently; only a pre-existing
/// loose one draws a warning.
pub fn secure_dir(dir: &Path) -> Result<(), CacheError> {
    let existed = dir.exists();
    std::fs::create_dir_all(dir).map_err(|e| permission_error(dir, e))?;
    enforce_mode(dir, true, existed)
}

/// Create `file` empty with mode `0600` if absent; verify and tighten if
/// present
pub fn secure_file(file: &Path) -> Result<(), CacheError> {
    if file.exists() {
        return enforce_mode(file, false, true);
    }
    create_private(file)
}

#[cfg(unix)]
fn create_private(file: &Path) -> Result<(), CacheError> {
    use std::os::unix::fs::OpenOptionsExt;

    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(FILE_MODE)
        .open(file)
        .map(|_| ())
        .map_err(|e| permission_error(file, e))
}

#[cfg(not(unix))]
fn create_private(file: &Path) -> Result<(), CacheError> {
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(file)
        .map(|_| ())
        .map_err(|e| permission_error(file, e))
}

#[cfg(unix)]
fn enforce_mode(path: &Path, is_dir: bool, warn_on_tighten: bool) -> Result<(), CacheError> {
    use std::os::unix::fs::PermissionsExt;

    let wanted = if is_dir { DIR_MODE } else { FILE_MODE };
    let metadata = std::fs::metadata(path).map_err(|e| permission_error(path, e))?;

    let current = metadata.permissions().mode() & 0o777;
    if current & !wanted != 0 {
        if warn_on_tighten {
            log::warn!(
                "{} had permissions {:o}, tightening to {:o}",
                path.display(),
                current,
                wanted
            );
        }
        let mut perms = metadata.permissions();
        perms.set_mode(wanted);
        std::fs::set_permissions(path, perms).map_err(|e| {
            permission_error(
                path,
                format!("could not tighten {:o} to {:o}: {}", current, wanted, e),
            )
        })?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn enforce_mode(_path: &Path, _is_dir: bool, _warn_on_tighten: bool) -> Result<(), CacheError> {
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_secure_dir_creates_0700() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".goodtogo");
        secure_dir(&dir).unwrap();
        let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn test_secure_file_creates_0600() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("cache.db");
        secure_file(&file).unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_secure_file_tightens_world_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("cache.db");
        std::fs::write(&file, b"x").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o644)).unwrap();

        secure_file(&file).unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
