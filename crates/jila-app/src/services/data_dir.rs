// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::ffi::OsString;
use std::path::PathBuf;

use jila_core::config::CONFIG_FILE;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "JILA_CONFIG";

/// Return the application data directory, creating it if needed.
///
/// On desktop this uses a conventional location. On Android the process
/// inherits `HOME` pointing into the app's private files directory.
pub fn data_dir() -> PathBuf {
    let dir = base_dir().join("jila");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %e, "cannot create data directory");
    }
    dir
}

/// Path of the config file: `$JILA_CONFIG` when set, otherwise
/// `config.json` inside the data directory.
pub fn config_path() -> PathBuf {
    resolve_config_path(std::env::var_os(CONFIG_ENV), data_dir)
}

/// An empty override counts as unset.
fn resolve_config_path(
    explicit: Option<OsString>,
    data_dir: impl FnOnce() -> PathBuf,
) -> PathBuf {
    match explicit {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => data_dir().join(CONFIG_FILE),
    }
}

fn base_dir() -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jila_core::AppConfig;

    #[test]
    fn explicit_config_file_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let explicit = dir.path().join("custom.json");
        let mut config = AppConfig::default();
        config.notification_id = 42;
        config.save(&explicit).expect("save");

        let path = resolve_config_path(Some(explicit.clone().into_os_string()), || {
            dir.path().join("unused")
        });
        assert_eq!(path, explicit);
        assert_eq!(AppConfig::load_or_default(&path).notification_id, 42);
    }

    #[test]
    fn empty_or_missing_override_uses_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let expected = dir.path().join(CONFIG_FILE);

        let empty = resolve_config_path(Some(OsString::new()), || dir.path().to_path_buf());
        assert_eq!(empty, expected);

        let unset = resolve_config_path(None, || dir.path().to_path_buf());
        assert_eq!(unset, expected);
    }
}
