// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

/// Environment variable naming the data directory.
pub const ENV_DATA_DIR: &str = "URKUNDE_DATA_DIR";

/// Return the data directory: `explicit`, then `$URKUNDE_DATA_DIR`, then
/// `$XDG_DATA_HOME/urkunde`, then `~/.local/share/urkunde`.
///
/// The directory is created if missing.
pub fn data_dir(explicit: Option<&Path>) -> std::io::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => match std::env::var_os(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs_fallback().join("urkunde"),
        },
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Resolve a configured path against the data directory. Absolute paths
/// are kept as they are.
pub fn resolve(data_dir: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        data_dir.join(configured)
    }
}

fn dirs_fallback() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from("/tmp")
}
