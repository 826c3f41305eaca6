// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// urkunde-security — the tamper-evidence side of document issuance.
//
// Generates per-type document numbers and verification codes from the OS
// CSPRNG, produces the descriptive anti-fraud metadata printed on each
// document (including the passport MRZ), computes and re-derives the HMAC
// signature over a record's canonical fields, and fingerprints rendered
// artifacts with SHA-256.

pub mod features;
pub mod identifiers;
pub mod integrity;
pub mod random;
pub mod signature;

// PUBLIC API: Re-export the primitives the engine composes.
pub use features::{FeatureGenerator, build_mrz};
pub use identifiers::{is_valid_identifier, is_verification_code, verification_code};
pub use integrity::{hash_bytes, verify_hash};
pub use signature::{CanonicalFields, DocumentSigner};
