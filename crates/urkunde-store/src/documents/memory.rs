// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory document store for tests and ephemeral deployments.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, instrument};
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::types::{DocumentId, DocumentRecord, DocumentStatus, DocumentType, NewDocument};

use super::{DocumentStore, apply_status};

/// Document store holding every record in a `HashMap`.
#[derive(Default)]
pub struct MemoryDocumentStore {
    records: RwLock<HashMap<DocumentId, DocumentRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<DocumentId, DocumentRecord>>> {
        self.records
            .read()
            .map_err(|_| GenerationError::PersistenceFailure("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<DocumentId, DocumentRecord>>> {
        self.records
            .write()
            .map_err(|_| GenerationError::PersistenceFailure("store lock poisoned".into()))
    }
}

impl DocumentStore for MemoryDocumentStore {
    #[instrument(skip_all, fields(document_type = %doc.document_type, identifier = %doc.identifier))]
    fn create(&self, doc: NewDocument) -> Result<DocumentRecord> {
        let mut records = self.write()?;

        let clash = records.values().any(|r| {
            r.verification_code == doc.verification_code
                || (r.identifier == doc.identifier
                    && doc.document_type.identifier_peers().any(|t| t == r.document_type))
        });
        if clash {
            return Err(GenerationError::PersistenceFailure(
                "identifier or verification code already in use".into(),
            ));
        }

        let record = DocumentRecord::from_new(DocumentId::new(), doc);
        records.insert(record.id, record.clone());
        debug!(document_id = %record.id, "document stored in memory");
        Ok(record)
    }

    fn get_by_id(&self, id: &DocumentId) -> Result<Option<DocumentRecord>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn get_by_verification_code(
        &self,
        doc_type: DocumentType,
        code: &str,
    ) -> Result<Option<DocumentRecord>> {
        Ok(self
            .read()?
            .values()
            .find(|r| r.document_type == doc_type && r.verification_code == code)
            .cloned())
    }

    fn set_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
        reason: Option<&str>,
    ) -> Result<DocumentRecord> {
        let mut records = self.write()?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| GenerationError::NotFound(id.to_string()))?;
        apply_status(record, status, reason, Utc::now())?;
        Ok(record.clone())
    }

    fn identifier_exists(&self, doc_type: DocumentType, identifier: &str) -> Result<bool> {
        Ok(self
            .read()?
            .values()
            .any(|r| {
                r.identifier == identifier
                    && doc_type.identifier_peers().any(|t| t == r.document_type)
            }))
    }

    fn verification_code_exists(&self, code: &str) -> Result<bool> {
        Ok(self.read()?.values().any(|r| r.verification_code == code))
    }
}
