// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Urkunde document engine.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GenerationError;

/// Storage-assigned identifier of a persisted document record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated UUID form. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of documents the engine can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Certificate,
    Permit,
    BirthCertificate,
    MarriageCertificate,
    DeathCertificate,
    Passport,
    WorkPermit,
    PermanentVisa,
    IdCard,
}

impl DocumentType {
    /// Every document type, in the order verification searches collections.
    pub const ALL: [DocumentType; 9] = [
        Self::Certificate,
        Self::Permit,
        Self::BirthCertificate,
        Self::MarriageCertificate,
        Self::DeathCertificate,
        Self::Passport,
        Self::WorkPermit,
        Self::PermanentVisa,
        Self::IdCard,
    ];

    /// Wire tag (`birth_certificate`, `id_card`, ...).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Certificate => "certificate",
            Self::Permit => "permit",
            Self::BirthCertificate => "birth_certificate",
            Self::MarriageCertificate => "marriage_certificate",
            Self::DeathCertificate => "death_certificate",
            Self::Passport => "passport",
            Self::WorkPermit => "work_permit",
            Self::PermanentVisa => "permanent_visa",
            Self::IdCard => "id_card",
        }
    }

    /// Human-readable document title printed in the header band.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Certificate => "Certificate",
            Self::Permit => "Permit",
            Self::BirthCertificate => "Birth Certificate",
            Self::MarriageCertificate => "Marriage Certificate",
            Self::DeathCertificate => "Death Certificate",
            Self::Passport => "Passport",
            Self::WorkPermit => "Work Permit",
            Self::PermanentVisa => "Permanent Residence Visa",
            Self::IdCard => "Identity Card",
        }
    }

    /// Birth, marriage and death records share the `REG-` registration scheme.
    pub fn is_civil_registration(&self) -> bool {
        matches!(
            self,
            Self::BirthCertificate | Self::MarriageCertificate | Self::DeathCertificate
        )
    }

    /// Types whose identifiers can collide with this type's.
    ///
    /// Civil registrations share the `REG-` space; every other type has a
    /// prefix or format of its own.
    pub fn identifier_peers(&self) -> impl Iterator<Item = DocumentType> + '_ {
        Self::ALL.into_iter().filter(move |other| {
            other == self || (self.is_civil_registration() && other.is_civil_registration())
        })
    }

    /// Payload keys that name the document's subject, most specific first.
    ///
    /// The first populated key becomes the signed display name.
    pub fn display_name_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Certificate => &["title", "recipientName", "fullName"],
            Self::Permit => &["title", "fullName", "holderName"],
            Self::BirthCertificate => &["childFullName", "fullName"],
            Self::MarriageCertificate => &["partner1FullName", "fullName"],
            Self::DeathCertificate => &["deceasedFullName", "fullName"],
            Self::Passport | Self::WorkPermit | Self::PermanentVisa | Self::IdCard => {
                &["fullName", "title"]
            }
        }
    }

    /// First populated display-name field of `payload`, if any.
    pub fn display_name(&self, payload: &Payload) -> Option<String> {
        self.display_name_keys()
            .iter()
            .find_map(|key| payload_text(payload, key))
    }

    /// Validity applied when the request does not set an explicit expiry.
    pub fn default_validity(&self) -> Option<Duration> {
        match self {
            Self::Passport => Some(Duration::days(3652)),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DocumentType {
    type Err = GenerationError;

    /// Accepts the snake_case tag; hyphens and case are normalised.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.tag() == normalised)
            .ok_or_else(|| GenerationError::UnsupportedDocumentType(s.to_owned()))
    }
}

/// Type-specific document fields. Keys are unique; order carries no meaning.
pub type Payload = BTreeMap<String, serde_json::Value>;

/// Render a payload value as display text.
///
/// Empty strings, nulls and objects yield `None` so callers can treat them
/// as missing optional fields.
pub fn payload_text(payload: &Payload, key: &str) -> Option<String> {
    value_text(payload.get(key)?)
}

fn value_text(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_owned()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Administrative status of an issued document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Active,
    Revoked,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }

    /// Revocation is one-way: nothing leaves `Revoked`.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        !matches!((self, next), (Self::Revoked, Self::Active))
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            other => Err(GenerationError::PersistenceFailure(format!(
                "unknown document status '{other}'"
            ))),
        }
    }
}

/// Passport machine-readable zone, two fixed-width lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineReadableZone {
    pub line1: String,
    pub line2: String,
}

/// Descriptive anti-fraud metadata rendered onto a document.
///
/// None of this is cryptographically bound to the record; it exists for
/// the printed artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFeatures {
    pub watermark_type: String,
    /// 8 random bytes, hex.
    pub security_thread: String,
    pub microtext: String,
    pub holographic_elements: Vec<String>,
    pub background_pattern: String,
    pub color_changing_ink: bool,
    pub uv_reactive_ink: bool,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rfid_chip_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrz: Option<MachineReadableZone>,
}

/// A caller's request to issue one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    pub document_type: DocumentType,
    /// Owner reference of the applicant the document is issued to.
    pub user_id: String,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl IssueRequest {
    pub fn new(document_type: DocumentType, user_id: impl Into<String>) -> Self {
        Self {
            document_type,
            user_id: user_id.into(),
            payload: Payload::new(),
            expires_at: None,
        }
    }

    /// Set one payload field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// A fully assembled, signed record that has not yet been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub document_type: DocumentType,
    pub identifier: String,
    #[serde(default)]
    pub secondary_identifiers: BTreeMap<String, String>,
    pub verification_code: String,
    pub user_id: String,
    pub payload: Payload,
    pub security_features: SecurityFeatures,
    pub digital_signature: String,
    /// SHA-256 of the rendered PDF bytes.
    pub document_hash: String,
    pub document_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A persisted document as held by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub document_type: DocumentType,
    pub identifier: String,
    #[serde(default)]
    pub secondary_identifiers: BTreeMap<String, String>,
    pub verification_code: String,
    pub user_id: String,
    pub payload: Payload,
    pub security_features: SecurityFeatures,
    pub digital_signature: String,
    pub document_hash: String,
    pub document_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub status: DocumentStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revocation_reason: Option<String>,
}

impl DocumentRecord {
    /// Materialise a stored record from a new document and its assigned id.
    pub fn from_new(id: DocumentId, doc: NewDocument) -> Self {
        Self {
            id,
            document_type: doc.document_type,
            identifier: doc.identifier,
            secondary_identifiers: doc.secondary_identifiers,
            verification_code: doc.verification_code,
            user_id: doc.user_id,
            payload: doc.payload,
            security_features: doc.security_features,
            digital_signature: doc.digital_signature,
            document_hash: doc.document_hash,
            document_url: doc.document_url,
            qr_code_url: doc.qr_code_url,
            status: DocumentStatus::Active,
            issued_at: doc.issued_at,
            expires_at: doc.expires_at,
            revoked_at: None,
            revocation_reason: None,
        }
    }

    /// Signed display name (empty when the payload names nobody).
    pub fn display_name(&self) -> String {
        self.document_type
            .display_name(&self.payload)
            .unwrap_or_default()
    }

    /// Evaluate status and expiry at `now`. Revocation wins over expiry.
    pub fn validity_at(&self, now: DateTime<Utc>) -> Result<(), InvalidReason> {
        if self.status == DocumentStatus::Revoked {
            return Err(InvalidReason::Revoked);
        }
        match self.expires_at {
            Some(expires_at) if expires_at <= now => Err(InvalidReason::Expired),
            _ => Ok(()),
        }
    }
}

/// Why a verification lookup did not come back valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    NotFound,
    Revoked,
    Expired,
    /// The stored fields no longer match their signature.
    Tampered,
}

/// The narrow, public projection of a record returned by verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDocumentView {
    pub document_type: DocumentType,
    pub title: String,
    pub status: DocumentStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Identifier with all but the last four characters masked.
    pub identifier_hint: String,
    /// Holder name reduced to initials, e.g. `J*** D**`.
    pub holder: Option<String>,
}

impl From<&DocumentRecord> for PublicDocumentView {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            document_type: record.document_type,
            title: record.document_type.title().to_owned(),
            status: record.status,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            identifier_hint: mask_identifier(&record.identifier),
            holder: record
                .document_type
                .display_name(&record.payload)
                .map(|name| mask_name(&name)),
        }
    }
}

/// Outcome of a public verification lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<PublicDocumentView>,
}

impl VerificationResult {
    pub fn not_found() -> Self {
        Self {
            valid: false,
            reason: Some(InvalidReason::NotFound),
            document: None,
        }
    }
}

/// Mask every alphanumeric character except the last four.
pub fn mask_identifier(identifier: &str) -> String {
    let total = identifier.chars().filter(|c| c.is_alphanumeric()).count();
    let keep_from = total.saturating_sub(4);
    let mut seen = 0;
    identifier
        .chars()
        .map(|c| {
            if !c.is_alphanumeric() {
                return c;
            }
            seen += 1;
            if seen > keep_from { c } else { '*' }
        })
        .collect()
}

/// Keep the first letter of each name part, star the rest.
pub fn mask_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    let mut masked = String::new();
                    masked.push(first);
                    masked.extend(chars.map(|_| '*'));
                    masked
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
