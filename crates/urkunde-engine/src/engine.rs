// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The engine — owns the stores, renderer, signer and QR encoder an issuance
// or verification needs.
//
// All methods take `&self`; the stores carry their own locking, so one
// engine can serve concurrent requests.

use std::sync::Arc;

use tracing::{error, info, instrument};
use urkunde_core::config::EngineConfig;
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::types::{DocumentId, DocumentRecord, DocumentStatus};
use urkunde_document::{DocumentRenderer, PdfInspector, QrEncoder};
use urkunde_security::{DocumentSigner, verify_hash};
use urkunde_store::{ArtifactStore, AuditLog, DocumentStore};

/// Issues, revokes and verifies documents.
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) artifacts: Arc<dyn ArtifactStore>,
    pub(crate) renderer: DocumentRenderer,
    pub(crate) signer: DocumentSigner,
    pub(crate) qr: QrEncoder,
    audit: Option<Arc<AuditLog>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("audit", &self.audit.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build an engine from validated configuration.
    ///
    /// Fails with `SignatureComputationFailure` when no signing key is
    /// configured and with `Config` for a bad base URL or a malformed
    /// template override.
    #[instrument(skip_all, fields(base_url = %config.app_base_url))]
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn DocumentStore>,
        artifacts: Arc<dyn ArtifactStore>,
    ) -> Result<Self> {
        config.validate()?;
        let signer = DocumentSigner::new(&config.signing_key)?;
        let renderer = DocumentRenderer::from_config(&config)?;

        info!(qr_enabled = config.qr_enabled, "engine ready");
        Ok(Self {
            config,
            store,
            artifacts,
            renderer,
            signer,
            qr: QrEncoder::default(),
            audit: None,
        })
    }

    /// Replace the renderer (custom templates, or a reduced registry).
    pub fn with_renderer(mut self, renderer: DocumentRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Record issue, verify and revoke events in `log`.
    pub fn with_audit(mut self, log: Arc<AuditLog>) -> Self {
        self.audit = Some(log);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fetch a record by id; unknown ids are `NotFound`.
    pub fn document(&self, id: &DocumentId) -> Result<DocumentRecord> {
        self.store
            .get_by_id(id)?
            .ok_or_else(|| GenerationError::NotFound(id.to_string()))
    }

    /// Revoke a document. Revoking an already revoked document returns it
    /// unchanged.
    #[instrument(skip(self, reason), fields(document_id = %id))]
    pub fn revoke(&self, id: &DocumentId, reason: Option<&str>) -> Result<DocumentRecord> {
        let subject = id.to_string();
        match self.store.set_status(id, DocumentStatus::Revoked, reason) {
            Ok(record) => {
                info!(identifier = %record.identifier, "document revoked");
                self.audit("revoke", &subject, true, reason);
                Ok(record)
            }
            Err(e) => {
                self.audit("revoke", &subject, false, Some(e.code()));
                Err(e)
            }
        }
    }

    /// Check that `bytes` are the PDF issued as document `id`.
    ///
    /// The SHA-256 must match the stored `document_hash` and the bytes must
    /// parse as a PDF.
    #[instrument(skip(self, bytes), fields(document_id = %id, bytes_len = bytes.len()))]
    pub fn verify_artifact(&self, id: &DocumentId, bytes: &[u8]) -> Result<DocumentRecord> {
        let record = self.document(id)?;
        let subject = id.to_string();

        let checked = verify_hash(bytes, &record.document_hash)
            .and_then(|()| PdfInspector::from_bytes(bytes).map(|_| ()));
        match checked {
            Ok(()) => {
                info!("artifact matches issued document");
                self.audit("check", &subject, true, None);
                Ok(record)
            }
            Err(e) => {
                self.audit("check", &subject, false, Some(e.code()));
                Err(e)
            }
        }
    }

    /// Record an audit entry. Audit failures are logged, never propagated.
    pub(crate) fn audit(&self, action: &str, subject: &str, success: bool, details: Option<&str>) {
        if let Some(log) = &self.audit
            && let Err(e) = log.record(action, subject, success, details)
        {
            error!(error = %e, "failed to record audit entry");
        }
    }
}
