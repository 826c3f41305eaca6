// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Issuance pipeline: what a successful run leaves behind, and that failed
// runs leave nothing.

mod common;

use std::sync::Arc;

use chrono::{Duration, SubsecRound, Utc};
use common::{Harness, Rig, artifact_names, birth_request, passport_request, rigged_engine};
use urkunde_core::error::GenerationError;
use urkunde_core::types::{DocumentStatus, DocumentType, IssueRequest};
use urkunde_document::{DocumentRenderer, PdfInspector};
use urkunde_engine::Engine;
use urkunde_engine::issuance::MAX_ALLOCATION_ATTEMPTS;
use urkunde_security::identifiers::LICENCE_NUMBER_KEY;
use urkunde_security::{DocumentSigner, hash_bytes, is_valid_identifier, is_verification_code};
use urkunde_store::{ArtifactStore, DocumentStore, FsArtifactStore, SqliteDocumentStore};

#[test]
fn birth_certificate_is_issued_with_artifacts() {
    let h = Harness::new();
    let issued = h.engine.issue(birth_request()).unwrap();
    let record = &issued.record;

    assert_eq!(record.status, DocumentStatus::Active);
    assert!(is_valid_identifier(DocumentType::BirthCertificate, &record.identifier));
    assert!(is_verification_code(&record.verification_code));
    assert_eq!(record.user_id, "applicant-42");
    assert_eq!(record.expires_at, None);
    assert_eq!(
        issued.verification_url,
        format!("https://docs.example.gov/verify/{}", record.verification_code)
    );

    let pdf_name = format!("{}.pdf", record.identifier);
    let qr_name = format!("{}-qr.png", record.identifier);
    assert_eq!(
        record.document_url.as_deref(),
        Some(format!("https://docs.example.gov/documents/{pdf_name}").as_str())
    );
    assert_eq!(
        record.qr_code_url.as_deref(),
        Some(format!("https://docs.example.gov/documents/{qr_name}").as_str())
    );

    let mut expected = vec![pdf_name.clone(), qr_name.clone()];
    expected.sort();
    assert_eq!(h.artifact_names(), expected);

    let stored_pdf = h.artifacts.get(&pdf_name).unwrap();
    assert_eq!(stored_pdf, issued.pdf);
    assert_eq!(record.document_hash, hash_bytes(&stored_pdf));
    assert!(PdfInspector::from_bytes(&stored_pdf).unwrap().page_count() >= 1);

    let qr = h.artifacts.get(&qr_name).unwrap();
    assert!(qr.starts_with(b"\x89PNG"));

    assert_eq!(h.store.get_by_id(&record.id).unwrap().as_ref(), Some(record));
}

#[test]
fn signature_covers_the_persisted_record() {
    let h = Harness::new();
    let issued = h.engine.issue(birth_request()).unwrap();
    let signer = DocumentSigner::new(common::SIGNING_KEY).unwrap();
    assert!(signer.verify(&issued.record));

    let other = DocumentSigner::new("some-other-key").unwrap();
    assert!(!other.verify(&issued.record));
}

#[test]
fn passport_gets_mrz_and_default_validity() {
    let h = Harness::new();
    let issued = h.engine.issue(passport_request()).unwrap();
    let record = &issued.record;

    assert!(is_valid_identifier(DocumentType::Passport, &record.identifier));
    let mrz = record.security_features.mrz.as_ref().unwrap();
    assert!(mrz.line1.starts_with("P<ZAFSMITH<<JOHN"));
    assert_eq!(mrz.line1.len(), 44);
    assert_eq!(
        record.expires_at,
        Some(record.issued_at + Duration::days(3652))
    );

    let (w, h_pt) = PdfInspector::from_bytes(&issued.pdf)
        .unwrap()
        .page_size(1)
        .unwrap();
    assert!((w - 243.0).abs() < 1.0 && (h_pt - 153.0).abs() < 1.0, "{w}x{h_pt}");
}

#[test]
fn marriage_certificate_carries_licence_number() {
    let h = Harness::new();
    let request = IssueRequest::new(DocumentType::MarriageCertificate, "applicant-3")
        .field("partner1FullName", "Ayesha Patel")
        .field("partner2FullName", "Daniel Okafor")
        .field("marriageDate", "2026-09-12");
    let record = h.engine.issue(request).unwrap().record;

    let licence = record.secondary_identifiers.get(LICENCE_NUMBER_KEY).unwrap();
    assert!(licence.starts_with("LIC-"));
}

#[test]
fn explicit_expiry_is_kept_at_stored_precision() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = common::config(dir.path());
    let engine = Engine::new(
        cfg.clone(),
        Arc::new(SqliteDocumentStore::open(dir.path().join("documents.db")).unwrap()),
        Arc::new(FsArtifactStore::from_config(&cfg).unwrap()),
    )
    .unwrap();

    let expires =
        Utc::now().trunc_subsecs(3) + Duration::days(90) + Duration::nanoseconds(123_456);
    let record = engine
        .issue(common::work_permit_request().expires_at(expires))
        .unwrap()
        .record;

    assert_eq!(record.expires_at, Some(expires.trunc_subsecs(3)));
    assert_eq!(engine.document(&record.id).unwrap(), record);
}

#[test]
fn every_type_can_be_issued() {
    let h = Harness::new();
    for doc_type in DocumentType::ALL {
        let request = IssueRequest::new(doc_type, "applicant-all")
            .field("fullName", "Jane Doe")
            .field("title", "Test Document");
        let record = h.engine.issue(request).unwrap().record;
        assert!(is_valid_identifier(doc_type, &record.identifier), "{doc_type}");
    }
    assert_eq!(h.store.len(), DocumentType::ALL.len());
}

#[test]
fn qr_can_be_disabled() {
    let h = Harness::with_config(|cfg| cfg.qr_enabled = false);
    let issued = h.engine.issue(birth_request()).unwrap();
    assert_eq!(issued.record.qr_code_url, None);
    assert_eq!(
        h.artifact_names(),
        vec![format!("{}.pdf", issued.record.identifier)]
    );
}

#[test]
fn unsupported_type_fails_before_anything_is_written() {
    let mut renderer = DocumentRenderer::default();
    renderer.registry_mut().unregister(DocumentType::Permit);

    let Harness {
        dir: _dir,
        store,
        artifacts,
        engine,
    } = Harness::new();
    let engine = engine.with_renderer(renderer);

    let err = engine
        .issue(IssueRequest::new(DocumentType::Permit, "applicant-1").field("title", "Fishing"))
        .unwrap_err();
    assert!(matches!(err, GenerationError::UnsupportedDocumentType(ref t) if t == "permit"));
    assert!(store.is_empty());
    assert!(artifact_names(artifacts.root()).is_empty());
}

// ---------------------------------------------------------------------------
// Failure atomicity
// ---------------------------------------------------------------------------

#[test]
fn qr_write_failure_discards_the_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, store, artifacts) = rigged_engine(dir.path(), Rig::Honest, Some("-qr.png"));

    let err = engine.issue(birth_request()).unwrap_err();
    assert!(matches!(err, GenerationError::QrGenerationFailure(_)), "{err:?}");

    assert!(store.inner.is_empty());
    let discarded = artifacts.discarded();
    assert_eq!(discarded.len(), 1);
    assert!(discarded[0].ends_with(".pdf"));
    assert!(artifact_names(artifacts.inner.root()).is_empty());
}

#[test]
fn pdf_write_failure_is_a_render_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, store, artifacts) = rigged_engine(dir.path(), Rig::Honest, Some(".pdf"));

    let err = engine.issue(birth_request()).unwrap_err();
    assert!(matches!(err, GenerationError::RenderFailure(_)), "{err:?}");
    assert!(store.inner.is_empty());
    assert!(artifacts.discarded().is_empty());
    assert!(artifact_names(artifacts.inner.root()).is_empty());
}

#[test]
fn persistence_failure_discards_both_artifacts_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, store, artifacts) = rigged_engine(dir.path(), Rig::FailCreate, None);

    let err = engine.issue(birth_request()).unwrap_err();
    assert!(matches!(err, GenerationError::PersistenceFailure(_)), "{err:?}");
    assert!(store.inner.is_empty());

    let discarded = artifacts.discarded();
    assert_eq!(discarded.len(), 2);
    assert!(discarded[0].ends_with("-qr.png"));
    assert!(discarded[1].ends_with(".pdf"));
    assert!(artifact_names(artifacts.inner.root()).is_empty());
}

#[test]
fn identifier_collisions_give_up() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, store, artifacts) = rigged_engine(dir.path(), Rig::IdentifiersTaken, None);

    let err = engine.issue(birth_request()).unwrap_err();
    assert!(matches!(
        err,
        GenerationError::IdentifierCollision {
            kind: "identifier",
            attempts: MAX_ALLOCATION_ATTEMPTS
        }
    ));
    assert!(store.inner.is_empty());
    assert!(artifacts.discarded().is_empty());
}

#[test]
fn verification_code_collisions_give_up() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, _store, _artifacts) = rigged_engine(dir.path(), Rig::CodesTaken, None);

    let err = engine.issue(birth_request()).unwrap_err();
    assert!(matches!(
        err,
        GenerationError::IdentifierCollision {
            kind: "verification code",
            ..
        }
    ));
}
