// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Urkunde.

use thiserror::Error;

use crate::types::DocumentStatus;

/// Top-level error type for all issuance, verification and storage operations.
#[derive(Debug, Error)]
pub enum GenerationError {
    // -- Caller errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    // -- Issuance pipeline --
    #[error("document rendering failed: {0}")]
    RenderFailure(String),

    #[error("QR code generation failed: {0}")]
    QrGenerationFailure(String),

    #[error("could not allocate a unique {kind} after {attempts} attempts")]
    IdentifierCollision { kind: &'static str, attempts: u32 },

    #[error("system randomness unavailable")]
    Entropy,

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    // -- Signing / configuration --
    #[error("signature computation failed: {0}")]
    SignatureComputationFailure(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("persistence failed: {0}")]
    PersistenceFailure(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GenerationError {
    /// Stable internal error code, safe to hand to callers alongside a
    /// generic message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedDocumentType(_) => "E_UNSUPPORTED_TYPE",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::InvalidStatusTransition { .. } => "E_STATUS_TRANSITION",
            Self::RenderFailure(_) => "E_RENDER",
            Self::QrGenerationFailure(_) => "E_QR",
            Self::IdentifierCollision { .. } => "E_ID_COLLISION",
            Self::Entropy => "E_ENTROPY",
            Self::IntegrityMismatch { .. } => "E_INTEGRITY",
            Self::SignatureComputationFailure(_) => "E_SIGNATURE",
            Self::Config(_) => "E_CONFIG",
            Self::PersistenceFailure(_) => "E_PERSISTENCE",
            Self::Io(_) => "E_IO",
            Self::Serialization(_) => "E_SERIALIZATION",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GenerationError>;
