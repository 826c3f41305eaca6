// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Issuance pipeline.
//
//   Pending -> IdentifiersAssigned -> Rendered -> Signed -> Persisted
//
// Any step may move the run to Failed. Artifacts are written before the
// record exists, so a failed run discards what it wrote, newest first.
// `DocumentStore::create` is the only commit point.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::types::{DocumentRecord, DocumentType, IssueRequest, NewDocument};
use urkunde_document::RenderContext;
use urkunde_security::identifiers;
use urkunde_security::{CanonicalFields, FeatureGenerator, hash_bytes};

use crate::engine::Engine;

/// Attempts made to find an unused identifier or verification code.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 5;

/// Where an issuance run got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceStage {
    Pending,
    IdentifiersAssigned,
    Rendered,
    Signed,
    Persisted,
    Failed,
}

impl IssuanceStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::IdentifiersAssigned => "identifiers_assigned",
            Self::Rendered => "rendered",
            Self::Signed => "signed",
            Self::Persisted => "persisted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for IssuanceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully issued document.
#[derive(Debug, Clone)]
pub struct IssuedDocument {
    pub record: DocumentRecord,
    /// The rendered PDF, identical to the stored artifact.
    pub pdf: Vec<u8>,
    pub verification_url: String,
}

impl Engine {
    /// Issue one document.
    ///
    /// Either the record is persisted with its artifacts in place, or an
    /// error is returned and nothing the run wrote remains.
    #[instrument(skip_all, fields(document_type = %request.document_type))]
    pub fn issue(&self, request: IssueRequest) -> Result<IssuedDocument> {
        let doc_type = request.document_type;
        let mut run = Issuance::new(self);

        match run.execute(request) {
            Ok(issued) => {
                info!(
                    document_id = %issued.record.id,
                    identifier = %issued.record.identifier,
                    "document issued"
                );
                self.audit("issue", &issued.record.id.to_string(), true, Some(doc_type.tag()));
                Ok(issued)
            }
            Err(e) => {
                run.fail(&e);
                self.audit("issue", doc_type.tag(), false, Some(e.code()));
                Err(e)
            }
        }
    }
}

/// State of a single issuance run.
struct Issuance<'e> {
    engine: &'e Engine,
    stage: IssuanceStage,
    /// Artifact names written so far, in write order.
    written: Vec<String>,
}

impl<'e> Issuance<'e> {
    fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            stage: IssuanceStage::Pending,
            written: Vec::new(),
        }
    }

    fn advance(&mut self, stage: IssuanceStage) {
        debug!(from = %self.stage, to = %stage, "issuance stage");
        self.stage = stage;
    }

    fn execute(&mut self, request: IssueRequest) -> Result<IssuedDocument> {
        let engine = self.engine;
        let doc_type = request.document_type;

        if !engine.renderer.supports(doc_type) {
            return Err(GenerationError::UnsupportedDocumentType(doc_type.tag().to_owned()));
        }

        // Stored timestamps keep millisecond precision; signing the same
        // precision keeps re-derived signatures stable.
        let issued_at = Utc::now().trunc_subsecs(3);

        let identifier = self.allocate_identifier(doc_type, issued_at)?;
        let secondary_identifiers = identifiers::secondary_identifiers(doc_type, issued_at)?;
        let security_features =
            FeatureGenerator::new(doc_type, &identifier, &request.payload).generate_at(issued_at)?;
        let verification_code = self.allocate_verification_code()?;
        let expires_at = request
            .expires_at
            .map(|at| at.trunc_subsecs(3))
            .or_else(|| doc_type.default_validity().map(|validity| issued_at + validity));
        self.advance(IssuanceStage::IdentifiersAssigned);

        let verification_url = engine.config.verification_url(&verification_code);
        let ctx = RenderContext {
            document_type: doc_type,
            identifier: &identifier,
            secondary_identifiers: &secondary_identifiers,
            verification_code: &verification_code,
            verification_url: &verification_url,
            payload: &request.payload,
            features: &security_features,
            issued_at,
            expires_at,
        };
        let pdf = engine.renderer.render(&ctx).map_err(render_failure)?;
        let document_url = self
            .put(format!("{identifier}.pdf"), &pdf)
            .map_err(render_failure)?;

        let qr_code_url = if engine.config.qr_enabled {
            let png = engine.qr.encode_png(&verification_url).map_err(qr_failure)?;
            Some(
                self.put(format!("{identifier}-qr.png"), &png)
                    .map_err(qr_failure)?,
            )
        } else {
            None
        };
        self.advance(IssuanceStage::Rendered);

        let display_name = doc_type.display_name(&request.payload).unwrap_or_default();
        let digital_signature = engine.signer.sign(&CanonicalFields::new(
            &verification_code,
            &request.user_id,
            issued_at,
            &identifier,
            display_name,
        ))?;
        self.advance(IssuanceStage::Signed);

        let document = NewDocument {
            document_type: doc_type,
            identifier,
            secondary_identifiers,
            verification_code,
            user_id: request.user_id,
            payload: request.payload,
            security_features,
            digital_signature,
            document_hash: hash_bytes(&pdf),
            document_url: Some(document_url),
            qr_code_url,
            issued_at,
            expires_at,
        };
        let record = engine.store.create(document).map_err(persistence_failure)?;
        self.advance(IssuanceStage::Persisted);

        Ok(IssuedDocument {
            record,
            pdf,
            verification_url,
        })
    }

    fn allocate_identifier(&self, doc_type: DocumentType, now: DateTime<Utc>) -> Result<String> {
        allocate(
            "identifier",
            || identifiers::generate_at(doc_type, now),
            |candidate| self.engine.store.identifier_exists(doc_type, candidate),
        )
    }

    fn allocate_verification_code(&self) -> Result<String> {
        allocate("verification code", identifiers::verification_code, |candidate| {
            self.engine.store.verification_code_exists(candidate)
        })
    }

    fn put(&mut self, name: String, bytes: &[u8]) -> Result<String> {
        let url = self.engine.artifacts.put(&name, bytes)?;
        self.written.push(name);
        Ok(url)
    }

    /// Mark the run failed and discard its artifacts.
    fn fail(&mut self, err: &GenerationError) {
        let reached = self.stage;
        self.stage = IssuanceStage::Failed;
        error!(stage = %reached, code = err.code(), error = %err, "issuance failed");

        while let Some(name) = self.written.pop() {
            match self.engine.artifacts.discard(&name) {
                Ok(()) => debug!(artifact = %name, "artifact discarded"),
                Err(e) => warn!(artifact = %name, error = %e, "could not discard artifact"),
            }
        }
    }
}

/// Draw candidates until one is unused.
fn allocate(
    kind: &'static str,
    mut generate: impl FnMut() -> Result<String>,
    taken: impl Fn(&str) -> Result<bool>,
) -> Result<String> {
    for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
        let candidate = generate()?;
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        warn!(kind, attempt, "allocation collision, retrying");
    }
    Err(GenerationError::IdentifierCollision {
        kind,
        attempts: MAX_ALLOCATION_ATTEMPTS,
    })
}

fn render_failure(err: GenerationError) -> GenerationError {
    match err {
        GenerationError::RenderFailure(_) | GenerationError::UnsupportedDocumentType(_) => err,
        other => GenerationError::RenderFailure(other.to_string()),
    }
}

fn qr_failure(err: GenerationError) -> GenerationError {
    match err {
        GenerationError::QrGenerationFailure(_) => err,
        other => GenerationError::QrGenerationFailure(other.to_string()),
    }
}

fn persistence_failure(err: GenerationError) -> GenerationError {
    match err {
        GenerationError::PersistenceFailure(_) => err,
        other => GenerationError::PersistenceFailure(other.to_string()),
    }
}
