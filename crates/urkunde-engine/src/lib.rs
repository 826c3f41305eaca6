// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// urkunde-engine — Issues and verifies official documents.
//
// `Engine::issue` runs the issuance pipeline (identifiers, security
// features, rendering, QR, signing, persistence) with persistence as the
// single commit point. `Engine::verify` answers public verification
// lookups by code with a narrow, masked view of the record.

pub mod engine;
pub mod issuance;
pub mod verification;

pub use engine::Engine;
pub use issuance::{IssuanceStage, IssuedDocument};
pub use verification::{evaluate, normalize_code};
