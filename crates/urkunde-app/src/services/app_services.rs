// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wires the engine to on-disk storage under the data directory:
//
//   <data_dir>/config.json    optional engine config
//   <data_dir>/documents.db   document records
//   <data_dir>/audit.db       audit trail
//   <data_dir>/documents/     rendered PDFs and QR images (by default)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use urkunde_core::config::EngineConfig;
use urkunde_core::error::Result;
use urkunde_engine::Engine;
use urkunde_store::{AuditEntry, AuditLog, FsArtifactStore, SqliteDocumentStore};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";
const DOCUMENTS_DB: &str = "documents.db";
const AUDIT_DB: &str = "audit.db";

/// Everything a CLI command needs.
pub struct AppServices {
    pub engine: Engine,
    audit_log: Arc<AuditLog>,
    data_dir: PathBuf,
}

impl AppServices {
    /// Open storage and build the engine.
    ///
    /// Config comes from `config_path`, else `<data_dir>/config.json`, else
    /// defaults; `URKUNDE_*` environment variables override any of them.
    pub fn init(explicit_dir: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let dir = data_dir::data_dir(explicit_dir)?;
        info!(path = %dir.display(), "initialising services");

        let mut config = load_config(&dir, config_path)?;
        config.apply_env_overrides();
        config.documents_dir = data_dir::resolve(&dir, &config.documents_dir);
        config.templates_dir = data_dir::resolve(&dir, &config.templates_dir);
        debug!(?config, "configuration resolved");

        let store = SqliteDocumentStore::open(dir.join(DOCUMENTS_DB))?;
        let artifacts = FsArtifactStore::from_config(&config)?;
        let audit_log = Arc::new(AuditLog::open(dir.join(AUDIT_DB))?);

        let engine = Engine::new(config, Arc::new(store), Arc::new(artifacts))?
            .with_audit(Arc::clone(&audit_log));

        Ok(Self {
            engine,
            audit_log,
            data_dir: dir,
        })
    }

    pub fn recent_audit_entries(&self, limit: u32) -> Result<Vec<AuditEntry>> {
        self.audit_log.recent_entries(limit)
    }

    pub fn audit_entries_for_subject(&self, subject: &str) -> Result<Vec<AuditEntry>> {
        self.audit_log.entries_for_subject(subject)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn load_config(data_dir: &Path, explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = explicit {
        return EngineConfig::load(path);
    }
    let path = data_dir.join(CONFIG_FILE);
    if path.exists() {
        EngineConfig::load(path)
    } else {
        Ok(EngineConfig::default())
    }
}
