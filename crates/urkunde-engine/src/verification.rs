// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Public verification by code.
//
// Read-only: a lookup never changes a record, so repeated calls with the
// same code and clock return the same result. Results carry only the masked
// `PublicDocumentView`, never payload, signature or owner.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use urkunde_core::error::Result;
use urkunde_core::types::{
    DocumentRecord, DocumentType, InvalidReason, PublicDocumentView, VerificationResult,
    mask_identifier,
};
use urkunde_security::{DocumentSigner, is_verification_code};

use crate::engine::Engine;

/// Trim and upper-case `code`; `None` if it is not 32 hex characters.
pub fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_uppercase();
    is_verification_code(&code).then_some(code)
}

impl Engine {
    /// Verify a code against the current time.
    pub fn verify(&self, code: &str) -> Result<VerificationResult> {
        self.verify_at(code, Utc::now())
    }

    /// Verify a code with an explicit clock.
    #[instrument(skip_all)]
    pub fn verify_at(&self, code: &str, now: DateTime<Utc>) -> Result<VerificationResult> {
        let Some(code) = normalize_code(code) else {
            debug!("malformed verification code");
            self.audit("verify", "malformed", false, Some("not_found"));
            return Ok(VerificationResult::not_found());
        };

        let (subject, result) = match self.find_by_code(&code)? {
            Some(record) => (record.id.to_string(), evaluate(&self.signer, &record, now)),
            None => (mask_identifier(&code), VerificationResult::not_found()),
        };

        let outcome = result.reason.map_or("valid", reason_str);
        info!(valid = result.valid, outcome, "verification lookup");
        self.audit("verify", &subject, result.valid, Some(outcome));
        Ok(result)
    }

    /// Search every type's partition in a fixed order.
    fn find_by_code(&self, code: &str) -> Result<Option<DocumentRecord>> {
        for doc_type in DocumentType::ALL {
            if let Some(record) = self.store.get_by_verification_code(doc_type, code)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

/// Judge a stored record at `now`.
///
/// A record whose signature no longer matches is reported as tampered with
/// no document attached. Otherwise revocation outranks expiry.
pub fn evaluate(
    signer: &DocumentSigner,
    record: &DocumentRecord,
    now: DateTime<Utc>,
) -> VerificationResult {
    if !signer.verify(record) {
        return VerificationResult {
            valid: false,
            reason: Some(InvalidReason::Tampered),
            document: None,
        };
    }

    let document = Some(PublicDocumentView::from(record));
    match record.validity_at(now) {
        Ok(()) => VerificationResult {
            valid: true,
            reason: None,
            document,
        },
        Err(reason) => VerificationResult {
            valid: false,
            reason: Some(reason),
            document,
        },
    }
}

fn reason_str(reason: InvalidReason) -> &'static str {
    match reason {
        InvalidReason::NotFound => "not_found",
        InvalidReason::Revoked => "revoked",
        InvalidReason::Expired => "expired",
        InvalidReason::Tampered => "tampered",
    }
}
