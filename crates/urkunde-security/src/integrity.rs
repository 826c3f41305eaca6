// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact integrity — SHA-256 fingerprints of rendered documents.

use sha2::{Digest, Sha256};
use urkunde_core::error::GenerationError;

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// Stored on each record as `document_hash` so a PDF presented later can be
/// matched against what was issued.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Verify that `data` matches the expected SHA-256 hex digest.
///
/// Returns `Err(GenerationError::IntegrityMismatch)` with both digests when
/// it does not. Comparison is case-insensitive.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<(), GenerationError> {
    let actual = hash_bytes(data);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(GenerationError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
