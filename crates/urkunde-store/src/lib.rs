// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// urkunde-store — Persistence for the Urkunde document engine.
//
// Document records (SQLite or in-memory), rendered artifacts on the
// filesystem, and the append-only audit trail.

pub mod artifacts;
pub mod audit;
pub mod documents;

pub use artifacts::{ArtifactStore, FsArtifactStore};
pub use audit::{AuditEntry, AuditLog};
pub use documents::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
