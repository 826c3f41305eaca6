// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for the engine integration tests: a temp-dir backed
// engine plus store wrappers that fail or misbehave on demand.

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use urkunde_core::config::EngineConfig;
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::types::{
    DocumentId, DocumentRecord, DocumentStatus, DocumentType, IssueRequest, NewDocument,
};
use urkunde_engine::Engine;
use urkunde_store::{ArtifactStore, DocumentStore, FsArtifactStore, MemoryDocumentStore};

pub const SIGNING_KEY: &str = "integration-test-signing-key";
pub const BASE_URL: &str = "https://docs.example.gov";

pub fn config(dir: &Path) -> EngineConfig {
    EngineConfig {
        documents_dir: dir.join("documents"),
        templates_dir: dir.join("templates"),
        signing_key: SIGNING_KEY.into(),
        app_base_url: BASE_URL.into(),
        qr_enabled: true,
    }
}

/// An engine over an in-memory record store and a temp-dir artifact store.
pub struct Harness {
    pub dir: TempDir,
    pub store: Arc<MemoryDocumentStore>,
    pub artifacts: Arc<FsArtifactStore>,
    pub engine: Engine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut EngineConfig)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cfg = config(dir.path());
        adjust(&mut cfg);

        let store = Arc::new(MemoryDocumentStore::new());
        let artifacts = Arc::new(FsArtifactStore::from_config(&cfg).expect("artifact store"));
        let engine = Engine::new(cfg, store.clone(), artifacts.clone()).expect("engine");
        Self {
            dir,
            store,
            artifacts,
            engine,
        }
    }

    /// Names of every file in the artifact directory, sorted.
    pub fn artifact_names(&self) -> Vec<String> {
        artifact_names(self.artifacts.root())
    }
}

pub fn artifact_names(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .expect("read artifact dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .into_string()
                .expect("utf-8 name")
        })
        .collect();
    names.sort();
    names
}

pub fn birth_request() -> IssueRequest {
    IssueRequest::new(DocumentType::BirthCertificate, "applicant-42")
        .field("childFullName", "Lerato Dlamini")
        .field("sex", "Female")
        .field("dateOfBirth", "2026-04-30")
        .field("placeOfBirth", "Soweto")
        .field("motherFullName", "Naledi Dlamini")
        .field("fatherFullName", "Sipho Dlamini")
        .field("registrarName", "P. Naidoo")
}

pub fn work_permit_request() -> IssueRequest {
    IssueRequest::new(DocumentType::WorkPermit, "applicant-77")
        .field("fullName", "Thandi Mokoena")
        .field("nationality", "ZAF")
        .field("employer", "Acme Mining")
        .field("jobTitle", "Geologist")
}

pub fn passport_request() -> IssueRequest {
    IssueRequest::new(DocumentType::Passport, "applicant-9")
        .field("fullName", "John Smith")
        .field("nationality", "ZAF")
        .field("dateOfBirth", "1990-01-01")
        .field("sex", "M")
}

// ---------------------------------------------------------------------------
// Misbehaving artifact store
// ---------------------------------------------------------------------------

/// Filesystem artifact store that refuses names ending in `fail_suffix`
/// and remembers every discard.
pub struct FlakyArtifacts {
    pub inner: FsArtifactStore,
    pub fail_suffix: Option<&'static str>,
    pub discarded: Mutex<Vec<String>>,
}

impl FlakyArtifacts {
    pub fn new(root: &Path, fail_suffix: Option<&'static str>) -> Self {
        Self {
            inner: FsArtifactStore::open(root, BASE_URL).expect("artifact store"),
            fail_suffix,
            discarded: Mutex::new(Vec::new()),
        }
    }

    pub fn discarded(&self) -> Vec<String> {
        self.discarded.lock().expect("discard log").clone()
    }
}

impl ArtifactStore for FlakyArtifacts {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<String> {
        if let Some(suffix) = self.fail_suffix
            && name.ends_with(suffix)
        {
            return Err(GenerationError::Io(std::io::Error::other("disk full")));
        }
        self.inner.put(name, bytes)
    }

    fn get(&self, name: &str) -> Result<Vec<u8>> {
        self.inner.get(name)
    }

    fn discard(&self, name: &str) -> Result<()> {
        self.discarded
            .lock()
            .expect("discard log")
            .push(name.to_owned());
        self.inner.discard(name)
    }
}

// ---------------------------------------------------------------------------
// Misbehaving record stores
// ---------------------------------------------------------------------------

/// How a [`RiggedStore`] deviates from the in-memory store it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rig {
    /// Behaves exactly like the wrapped store.
    Honest,
    /// `create` always fails.
    FailCreate,
    /// Every identifier is reported as taken.
    IdentifiersTaken,
    /// Every verification code is reported as taken.
    CodesTaken,
    /// Lookups by code return the record with `user_id` altered.
    TamperUserId,
    /// Lookups by code return the record with a non-signed payload field
    /// altered.
    TamperPayload,
}

pub struct RiggedStore {
    pub inner: MemoryDocumentStore,
    pub rig: Rig,
}

impl RiggedStore {
    pub fn new(rig: Rig) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            rig,
        }
    }
}

impl DocumentStore for RiggedStore {
    fn create(&self, doc: NewDocument) -> Result<DocumentRecord> {
        if self.rig == Rig::FailCreate {
            return Err(GenerationError::PersistenceFailure("database is locked".into()));
        }
        self.inner.create(doc)
    }

    fn get_by_id(&self, id: &DocumentId) -> Result<Option<DocumentRecord>> {
        self.inner.get_by_id(id)
    }

    fn get_by_verification_code(
        &self,
        doc_type: DocumentType,
        code: &str,
    ) -> Result<Option<DocumentRecord>> {
        let found = self.inner.get_by_verification_code(doc_type, code)?;
        Ok(found.map(|mut record| {
            match self.rig {
                Rig::TamperUserId => record.user_id = "forged-owner".into(),
                Rig::TamperPayload => {
                    record
                        .payload
                        .insert("employer".into(), serde_json::json!("Forged Ltd"));
                }
                _ => {}
            }
            record
        }))
    }

    fn set_status(
        &self,
        id: &DocumentId,
        status: DocumentStatus,
        reason: Option<&str>,
    ) -> Result<DocumentRecord> {
        self.inner.set_status(id, status, reason)
    }

    fn identifier_exists(&self, doc_type: DocumentType, identifier: &str) -> Result<bool> {
        if self.rig == Rig::IdentifiersTaken {
            return Ok(true);
        }
        self.inner.identifier_exists(doc_type, identifier)
    }

    fn verification_code_exists(&self, code: &str) -> Result<bool> {
        if self.rig == Rig::CodesTaken {
            return Ok(true);
        }
        self.inner.verification_code_exists(code)
    }
}

/// Engine over a rigged record store and a flaky artifact store.
pub fn rigged_engine(
    dir: &Path,
    rig: Rig,
    fail_suffix: Option<&'static str>,
) -> (Engine, Arc<RiggedStore>, Arc<FlakyArtifacts>) {
    let cfg = config(dir);
    let store = Arc::new(RiggedStore::new(rig));
    let artifacts = Arc::new(FlakyArtifacts::new(&cfg.documents_dir, fail_suffix));
    let engine = Engine::new(cfg, store.clone(), artifacts.clone()).expect("engine");
    (engine, store, artifacts)
}
