// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration, passed explicitly into the engine at construction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

/// Environment variable overriding [`EngineConfig::signing_key`].
pub const ENV_SIGNING_KEY: &str = "URKUNDE_SIGNING_KEY";
/// Environment variable overriding [`EngineConfig::app_base_url`].
pub const ENV_APP_BASE_URL: &str = "URKUNDE_APP_BASE_URL";
/// Environment variable overriding [`EngineConfig::documents_dir`].
pub const ENV_DOCUMENTS_DIR: &str = "URKUNDE_DOCUMENTS_DIR";

/// Settings for one engine instance.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory the filesystem artifact store writes rendered documents into.
    pub documents_dir: PathBuf,
    /// Directory holding optional per-type template overrides (`<type>.json`).
    pub templates_dir: PathBuf,
    /// HMAC key for document signatures. Never written back to disk.
    #[serde(skip_serializing)]
    pub signing_key: String,
    /// Public base URL; verification links are `<base>/verify/<code>`.
    pub app_base_url: String,
    /// Produce a QR artifact for each issued document.
    pub qr_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("documents"),
            templates_dir: PathBuf::from("templates"),
            signing_key: String::new(),
            app_base_url: "http://localhost:5000".into(),
            qr_enabled: true,
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("documents_dir", &self.documents_dir)
            .field("templates_dir", &self.templates_dir)
            .field("signing_key", &"<redacted>")
            .field("app_base_url", &self.app_base_url)
            .field("qr_enabled", &self.qr_enabled)
            .finish()
    }
}

impl EngineConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Write the config as pretty JSON (the signing key is omitted).
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Apply `URKUNDE_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (environment, secrets file, ...).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_SIGNING_KEY) {
            self.signing_key = key;
        }
        if let Some(url) = lookup(ENV_APP_BASE_URL) {
            self.app_base_url = url;
        }
        if let Some(dir) = lookup(ENV_DOCUMENTS_DIR) {
            self.documents_dir = PathBuf::from(dir);
        }
    }

    /// Reject configurations the engine cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.signing_key.trim().is_empty() {
            return Err(GenerationError::SignatureComputationFailure(
                "signing key is not configured".into(),
            ));
        }
        if !(self.app_base_url.starts_with("http://") || self.app_base_url.starts_with("https://"))
        {
            return Err(GenerationError::Config(format!(
                "app_base_url must be an http(s) URL, got '{}'",
                self.app_base_url
            )));
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        self.app_base_url.trim_end_matches('/')
    }

    /// Public verification URL for a code.
    pub fn verification_url(&self, code: &str) -> String {
        format!("{}/verify/{}", self.base_url(), code)
    }
}
