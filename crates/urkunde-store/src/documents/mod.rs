// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document record storage.
//
// Records are partitioned by document type (one SQLite table per type).
// `create` is the single commit point of an issuance; nothing else in the
// engine writes records.

mod memory;
mod sqlite;

use chrono::{DateTime, Utc};
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::types::{DocumentId, DocumentRecord, DocumentStatus, DocumentType, NewDocument};

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// Storage backend for issued documents.
pub trait DocumentStore: Send + Sync {
    /// Persist a new document with `status = active` and a fresh id.
    fn create(&self, doc: NewDocument) -> Result<DocumentRecord>;

    fn get_by_id(&self, id: &DocumentId) -> Result<Option<DocumentRecord>>;

    /// Exact match on the verification code within one type's partition.
    fn get_by_verification_code(
        &self,
        doc_type: DocumentType,
        code: &str,
    ) -> Result<Option<DocumentRecord>>;

    /// Change a record's status and return the updated record.
    ///
    /// Setting the status a record already has is a no-op. `Revoked` is
    /// terminal.
    fn set_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
        reason: Option<&str>,
    ) -> Result<DocumentRecord>;

    /// Whether `identifier` is taken in `doc_type`'s partition or in any
    /// partition sharing its identifier scheme (the civil registrations).
    fn identifier_exists(&self, doc_type: DocumentType, identifier: &str) -> Result<bool>;

    /// Whether any partition already holds `code`.
    fn verification_code_exists(&self, code: &str) -> Result<bool>;
}

/// Apply a status change to an in-memory copy of a record.
///
/// Returns `Ok(false)` when the record already has `status`.
pub(crate) fn apply_status(
    record: &mut DocumentRecord,
    status: DocumentStatus,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<bool> {
    if record.status == status {
        return Ok(false);
    }
    if !record.status.can_transition_to(status) {
        return Err(GenerationError::InvalidStatusTransition {
            from: record.status,
            to: status,
        });
    }

    record.status = status;
    if status == DocumentStatus::Revoked {
        record.revoked_at = Some(now);
        record.revocation_reason = reason.map(str::to_owned);
    }
    Ok(true)
}
