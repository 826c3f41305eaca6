// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caller-facing failure messages.
//
// Internal errors carry paths, SQL and key material context that must not
// leak to applicants. Every error is reduced to a generic message, a stable
// code and a retry hint.

use serde::Serialize;

use crate::error::GenerationError;

/// What a failed request reports to the outside world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicFailure {
    /// Generic, non-identifying summary.
    pub message: String,
    /// Stable internal code (see [`GenerationError::code`]).
    pub code: &'static str,
    /// Whether re-submitting the whole request may succeed.
    pub retriable: bool,
}

/// Reduce an error to its public form.
pub fn public_failure(err: &GenerationError) -> PublicFailure {
    let (message, retriable) = match err {
        GenerationError::UnsupportedDocumentType(_) => {
            ("This document type cannot be issued.", false)
        }
        GenerationError::NotFound(_) => ("The requested document does not exist.", false),
        GenerationError::InvalidStatusTransition { .. } => {
            ("The document's status cannot be changed that way.", false)
        }
        GenerationError::IntegrityMismatch { .. } => {
            ("This file does not match the issued document.", false)
        }
        GenerationError::RenderFailure(_)
        | GenerationError::QrGenerationFailure(_)
        | GenerationError::IdentifierCollision { .. }
        | GenerationError::Entropy
        | GenerationError::Io(_) => (
            "The document could not be generated. Please try again.",
            true,
        ),
        GenerationError::PersistenceFailure(_) => (
            "The document could not be saved. Please try again.",
            true,
        ),
        GenerationError::SignatureComputationFailure(_)
        | GenerationError::Config(_)
        | GenerationError::Serialization(_) => (
            "The document service is misconfigured. Please contact support.",
            false,
        ),
    };

    PublicFailure {
        message: message.to_owned(),
        code: err.code(),
        retriable,
    }
}
