//! Utility functions for path handling.
//!
//! This module provides helpers used to locate resources shipped next to the
//! buzzer executable.

use std::{
    env,
    path::{Path, PathBuf},
};

/// Resolves `file` against the directory containing the running executable.
///
/// Absolute paths are returned unchanged. If the executable location cannot be
/// determined, the path is returned as given and will be resolved against the
/// working directory.
///
/// # Examples
///
/// ```ignore
/// // With the binary installed at /opt/buzzer/buzzer
/// let path = resolve_beside_executable("alarm.wav");
/// assert_eq!(path, PathBuf::from("/opt/buzzer/alarm.wav"));
/// ```
pub fn resolve_beside_executable(file: &str) -> PathBuf {
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    resolve_in(exe_dir.as_deref(), file)
}

/// Joins `file` onto `base` unless `file` is absolute or `base` is unknown.
fn resolve_in(base: Option<&Path>, file: &str) -> PathBuf {
    let path = Path::new(file);
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_in_relative_file() {
        let path = resolve_in(Some(Path::new("/opt/buzzer")), "alarm.wav");
        #[cfg(unix)]
        assert_eq!(path, PathBuf::from("/opt/buzzer/alarm.wav"));
    }

    #[test]
    fn test_resolve_in_nested_relative_file() {
        let path = resolve_in(Some(Path::new("/opt/buzzer")), "sounds/alarm.wav");
        #[cfg(unix)]
        assert_eq!(path, PathBuf::from("/opt/buzzer/sounds/alarm.wav"));
    }

    #[test]
    #[cfg(unix)]
    fn test_resolve_in_absolute_file() {
        let path = resolve_in(Some(Path::new("/opt/buzzer")), "/usr/share/sounds/alarm.wav");
        assert_eq!(path, PathBuf::from("/usr/share/sounds/alarm.wav"));
    }

    #[test]
    fn test_resolve_in_without_base() {
        let path = resolve_in(None, "alarm.wav");
        assert_eq!(path, PathBuf::from("alarm.wav"));
    }

    #[test]
    fn test_resolve_beside_executable_uses_exe_dir() {
        let exe_dir = env::current_exe().unwrap().parent().unwrap().to_path_buf();
        let path = resolve_beside_executable("alarm.wav");

        assert_eq!(path, exe_dir.join("alarm.wav"));
    }
}
