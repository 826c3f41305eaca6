// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document signatures — HMAC-SHA256 over a record's canonical fields.
//
// Canonical fields, in order: verificationCode, userId, issuedAt (RFC 3339,
// millisecond precision, `Z`), primaryIdentifier, displayName. They are
// serialised with serde_json (struct order is stable) and MAC'd with a
// server-held key. Free-form payload fields outside this set are NOT
// covered; editing them does not invalidate the signature.

use chrono::{DateTime, SecondsFormat, Utc};
use ring::hmac;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use urkunde_core::error::{GenerationError, Result};
use urkunde_core::types::DocumentRecord;

/// The fixed, ordered subset of a record that is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalFields<'a> {
    pub verification_code: &'a str,
    pub user_id: &'a str,
    pub issued_at: String,
    pub primary_identifier: &'a str,
    pub display_name: String,
}

impl<'a> CanonicalFields<'a> {
    pub fn new(
        verification_code: &'a str,
        user_id: &'a str,
        issued_at: DateTime<Utc>,
        primary_identifier: &'a str,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            verification_code,
            user_id,
            issued_at: canonical_timestamp(issued_at),
            primary_identifier,
            display_name: display_name.into(),
        }
    }

    /// Re-derive the canonical fields from a stored record.
    pub fn from_record(record: &'a DocumentRecord) -> Self {
        Self::new(
            &record.verification_code,
            &record.user_id,
            record.issued_at,
            &record.identifier,
            record.display_name(),
        )
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| GenerationError::SignatureComputationFailure(e.to_string()))
    }
}

/// Timestamp form used inside the signed message.
pub fn canonical_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Computes and checks document signatures with one HMAC key.
pub struct DocumentSigner {
    key: hmac::Key,
}

impl std::fmt::Debug for DocumentSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSigner").finish_non_exhaustive()
    }
}

impl DocumentSigner {
    /// Build a signer. An empty key is a configuration error, reported at
    /// construction rather than per request.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(GenerationError::SignatureComputationFailure(
                "signing key is empty".into(),
            ));
        }
        Ok(Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
        })
    }

    /// Sign canonical fields; returns the lowercase hex digest.
    #[instrument(skip_all, fields(identifier = %fields.primary_identifier))]
    pub fn sign(&self, fields: &CanonicalFields<'_>) -> Result<String> {
        let message = fields.to_bytes()?;
        let tag = hmac::sign(&self.key, &message);
        debug!("document signed");
        Ok(hex::encode(tag.as_ref()))
    }

    /// Check a hex signature against canonical fields in constant time.
    pub fn verify_fields(&self, fields: &CanonicalFields<'_>, signature_hex: &str) -> bool {
        let Ok(signature) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(message) = fields.to_bytes() else {
            return false;
        };
        hmac::verify(&self.key, &message, &signature).is_ok()
    }

    /// Re-derive the digest of a stored record and compare it with the
    /// stored signature.
    pub fn verify(&self, record: &DocumentRecord) -> bool {
        let intact =
            self.verify_fields(&CanonicalFields::from_record(record), &record.digital_signature);
        if !intact {
            warn!(document_id = %record.id, "signature mismatch");
        }
        intact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use std::collections::BTreeMap;
    use urkunde_core::types::{DocumentId, DocumentStatus, DocumentType, Payload, SecurityFeatures};

    fn signed_record(signer: &DocumentSigner) -> DocumentRecord {
        let issued_at = Utc.with_ymd_and_hms(2026, 5, 4, 10, 30, 0).unwrap();
        let mut payload = Payload::new();
        payload.insert("fullName".into(), json!("Thandi Mokoena"));
        payload.insert("employer".into(), json!("Acme Mining"));
        let mut record = DocumentRecord {
            id: DocumentId::new(),
            document_type: DocumentType::WorkPermit,
            identifier: "WP-mabc123-0A0B0C".into(),
            secondary_identifiers: BTreeMap::new(),
            verification_code: "00112233445566778899AABBCCDDEEFF".into(),
            user_id: "applicant-7".into(),
            payload,
            security_features: SecurityFeatures {
                watermark_type: "immigration-seal".into(),
                security_thread: "0011223344556677".into(),
                microtext: "OFFICIAL-WORK_PERMIT".into(),
                holographic_elements: vec![],
                background_pattern: "fine-line-guilloche".into(),
                color_changing_ink: true,
                uv_reactive_ink: true,
                generated_at: issued_at,
                rfid_chip_data: None,
                fingerprint_data: None,
                mrz: None,
            },
            digital_signature: String::new(),
            document_hash: String::new(),
            document_url: None,
            qr_code_url: None,
            status: DocumentStatus::Active,
            issued_at,
            expires_at: None,
            revoked_at: None,
            revocation_reason: None,
        };
        record.digital_signature = signer
            .sign(&CanonicalFields::from_record(&record))
            .unwrap();
        record
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            DocumentSigner::new("  "),
            Err(GenerationError::SignatureComputationFailure(_))
        ));
    }

    #[test]
    fn signature_is_hex_sha256() {
        let signer = DocumentSigner::new("k").unwrap();
        let record = signed_record(&signer);
        assert_eq!(record.digital_signature.len(), 64);
        assert!(signer.verify(&record));
    }

    #[test]
    fn signing_is_deterministic() {
        let signer = DocumentSigner::new("k").unwrap();
        let record = signed_record(&signer);
        let again = signer.sign(&CanonicalFields::from_record(&record)).unwrap();
        assert_eq!(again, record.digital_signature);
    }

    #[test]
    fn canonical_field_mutations_break_the_signature() {
        let signer = DocumentSigner::new("k").unwrap();
        let original = signed_record(&signer);

        let mutations: Vec<Box<dyn Fn(&mut DocumentRecord)>> = vec![
            Box::new(|r: &mut DocumentRecord| r.verification_code = "FFEEDDCCBBAA99887766554433221100".into()),
            Box::new(|r: &mut DocumentRecord| r.user_id = "applicant-8".into()),
            Box::new(|r: &mut DocumentRecord| r.issued_at += Duration::milliseconds(1)),
            Box::new(|r: &mut DocumentRecord| r.identifier = "WP-mabc123-0A0B0D".into()),
            Box::new(|r: &mut DocumentRecord| {
                r.payload.insert("fullName".into(), json!("Someone Else"));
            }),
        ];

        for (i, mutate) in mutations.iter().enumerate() {
            let mut record = original.clone();
            mutate(&mut record);
            assert!(!signer.verify(&record), "mutation {i} went undetected");
        }
    }

    #[test]
    fn non_canonical_mutations_keep_the_signature() {
        let signer = DocumentSigner::new("k").unwrap();
        let mut record = signed_record(&signer);

        record.payload.insert("employer".into(), json!("Other Corp"));
        record.status = DocumentStatus::Revoked;
        record.expires_at = Some(record.issued_at + Duration::days(30));
        record.document_url = Some("https://example.org/x.pdf".into());
        record.security_features.microtext = "ALTERED".into();

        assert!(signer.verify(&record));
    }

    #[test]
    fn different_key_fails_verification() {
        let record = signed_record(&DocumentSigner::new("key-a").unwrap());
        assert!(!DocumentSigner::new("key-b").unwrap().verify(&record));
    }

    #[test]
    fn garbage_signature_fails_verification() {
        let signer = DocumentSigner::new("k").unwrap();
        let mut record = signed_record(&signer);
        record.digital_signature = "not-hex".into();
        assert!(!signer.verify(&record));
    }

    #[test]
    fn canonical_json_field_order() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let fields = CanonicalFields::new("CODE", "u1", at, "CERT-x-00", "Name");
        let json = String::from_utf8(fields.to_bytes().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"verificationCode":"CODE","userId":"u1","issuedAt":"2026-01-02T03:04:05.000Z","primaryIdentifier":"CERT-x-00","displayName":"Name"}"#
        );
    }
}
