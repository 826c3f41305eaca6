// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendered artifact storage (PDFs and QR images).
//
// Artifacts are written to a temporary file in the target directory and
// renamed into place, so readers never observe a half-written file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};
use urkunde_core::config::EngineConfig;
use urkunde_core::error::{GenerationError, Result};

/// Storage for rendered artifacts, addressed by file name.
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `name` and return the public URL.
    ///
    /// An existing artifact is never replaced; storing under a taken name
    /// is a `PersistenceFailure`.
    fn put(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Read an artifact back. Missing artifacts are `NotFound`.
    fn get(&self, name: &str) -> Result<Vec<u8>>;

    /// Remove an artifact. Removing a missing artifact is not an error.
    fn discard(&self, name: &str) -> Result<()>;
}

/// Reduce `name` to `[A-Za-z0-9._-]`, replacing anything else with `_`.
///
/// Empty names and names starting with `.` are rejected so nothing can
/// escape the storage directory or hide in it.
pub fn sanitize_name(name: &str) -> Result<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.starts_with('.') {
        return Err(GenerationError::PersistenceFailure(format!(
            "invalid artifact name '{name}'"
        )));
    }
    Ok(cleaned)
}

/// Artifact store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
    base_url: String,
}

impl FsArtifactStore {
    /// Use `root` for storage (created if missing); URLs are
    /// `<base_url>/documents/<name>`.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>, base_url: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("artifact store ready");
        Ok(Self {
            root,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::open(&config.documents_dir, &config.app_base_url)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path an artifact is (or would be) stored at.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(sanitize_name(name)?))
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/documents/{name}", self.base_url)
    }
}

impl ArtifactStore for FsArtifactStore {
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    fn put(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let name = sanitize_name(name)?;
        let target = self.root.join(&name);

        let mut staging = NamedTempFile::new_in(&self.root)?;
        staging.write_all(bytes)?;
        staging.as_file().sync_all()?;
        staging.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                GenerationError::PersistenceFailure(format!("artifact {name} already exists"))
            } else {
                GenerationError::Io(e.error)
            }
        })?;

        debug!(path = %target.display(), "artifact written");
        Ok(self.url_for(&name))
    }

    fn get(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GenerationError::NotFound(format!("artifact {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn discard(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "artifact discarded");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not discard artifact");
                Err(e.into())
            }
        }
    }
}
