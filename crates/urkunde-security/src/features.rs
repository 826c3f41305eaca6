// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Anti-fraud feature metadata and the passport machine-readable zone.
//
// Everything here is descriptive: the values are printed onto the rendered
// document (thread token, microtext, MRZ) but nothing is bound to the HMAC
// signature and no ICAO check digits are computed.

use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, instrument};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use urkunde_core::error::Result;
use urkunde_core::types::{
    DocumentType, MachineReadableZone, Payload, SecurityFeatures, payload_text,
};

use crate::random::{random_below, random_hex};

/// Width of each MRZ line.
pub const MRZ_LINE_LEN: usize = 44;

/// Nationality printed when the payload does not state one.
pub const DEFAULT_NATIONALITY: &str = "ZAF";

const HOLOGRAPHIC_ELEMENTS: [&str; 4] = [
    "coat-of-arms",
    "national-flag",
    "issuing-authority-seal",
    "kinegram-border",
];

/// Produces the [`SecurityFeatures`] block for one document.
#[derive(Debug, Clone, Copy)]
pub struct FeatureGenerator<'a> {
    document_type: DocumentType,
    identifier: &'a str,
    payload: &'a Payload,
}

impl<'a> FeatureGenerator<'a> {
    pub fn new(document_type: DocumentType, identifier: &'a str, payload: &'a Payload) -> Self {
        Self {
            document_type,
            identifier,
            payload,
        }
    }

    /// Generate features stamped with the current time.
    pub fn generate(&self) -> Result<SecurityFeatures> {
        self.generate_at(Utc::now())
    }

    #[instrument(skip_all, fields(document_type = %self.document_type))]
    pub fn generate_at(&self, now: DateTime<Utc>) -> Result<SecurityFeatures> {
        let doc_type = self.document_type;

        let rfid_chip_data = match doc_type {
            DocumentType::Passport | DocumentType::IdCard | DocumentType::PermanentVisa => {
                Some(random_hex(32)?)
            }
            _ => None,
        };

        let fingerprint_data = match doc_type {
            DocumentType::Passport | DocumentType::IdCard => Some(random_hex(64)?),
            _ => None,
        };

        let mrz = if doc_type == DocumentType::Passport {
            let full_name = payload_text(self.payload, "fullName").unwrap_or_default();
            let nationality = payload_text(self.payload, "nationality")
                .unwrap_or_else(|| DEFAULT_NATIONALITY.to_owned());
            let sequence = random_below(100)?;
            Some(build_mrz(
                &full_name,
                &nationality,
                self.identifier,
                now.year().rem_euclid(100) as u32,
                sequence,
            ))
        } else {
            None
        };

        let features = SecurityFeatures {
            watermark_type: watermark_type(doc_type).to_owned(),
            security_thread: random_hex(8)?,
            microtext: format!("OFFICIAL-{}", doc_type.tag().to_ascii_uppercase()),
            holographic_elements: HOLOGRAPHIC_ELEMENTS.iter().map(|s| (*s).to_owned()).collect(),
            background_pattern: background_pattern(doc_type).to_owned(),
            color_changing_ink: true,
            uv_reactive_ink: true,
            generated_at: now,
            rfid_chip_data,
            fingerprint_data,
            mrz,
        };

        debug!(
            watermark = %features.watermark_type,
            has_mrz = features.mrz.is_some(),
            "security features generated"
        );
        Ok(features)
    }
}

fn watermark_type(doc_type: DocumentType) -> &'static str {
    match doc_type {
        DocumentType::Certificate | DocumentType::Permit => "government-crest",
        DocumentType::BirthCertificate
        | DocumentType::MarriageCertificate
        | DocumentType::DeathCertificate => "civil-registry-seal",
        DocumentType::Passport => "passport-coat-of-arms",
        DocumentType::WorkPermit | DocumentType::PermanentVisa => "immigration-seal",
        DocumentType::IdCard => "identity-guilloche",
    }
}

fn background_pattern(doc_type: DocumentType) -> &'static str {
    match doc_type {
        DocumentType::Passport | DocumentType::IdCard => "rainbow-rosette",
        _ => "fine-line-guilloche",
    }
}

/// Build both MRZ lines.
///
/// Line 1: `P<` + nationality + SURNAME + `<<` + GIVEN<NAMES.
/// Line 2: document number + nationality + 2-digit year + 2-digit sequence.
/// Both are upper-cased, filler-mapped and padded or cut to 44 characters.
pub fn build_mrz(
    full_name: &str,
    nationality: &str,
    document_number: &str,
    year: u32,
    sequence: u32,
) -> MachineReadableZone {
    let nationality = mrz_nationality(nationality);

    let mut parts: Vec<&str> = full_name.split_whitespace().collect();
    let surname = parts.pop().unwrap_or_default();
    let given = parts.join(" ");

    let line1 = format!(
        "P<{nationality}{}<<{}",
        mrz_field(surname),
        mrz_field(&given)
    );
    let line2 = format!(
        "{}{nationality}{:02}{:02}",
        mrz_field(document_number),
        year % 100,
        sequence % 100
    );

    MachineReadableZone {
        line1: pad_mrz(line1),
        line2: pad_mrz(line2),
    }
}

/// Upper-case and replace anything outside `A-Z0-9` with the `<` filler.
///
/// Latin letters are folded first: accents are stripped (`Ñ` -> `N`) and
/// ligatures spelled out (`ß` -> `SS`). Other scripts still become filler.
fn mrz_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ß' => out.push_str("SS"),
            'æ' | 'Æ' => out.push_str("AE"),
            'œ' | 'Œ' => out.push_str("OE"),
            'þ' | 'Þ' => out.push_str("TH"),
            'ø' | 'Ø' => out.push('O'),
            'đ' | 'Đ' => out.push('D'),
            'ł' | 'Ł' => out.push('L'),
            c if c.is_ascii_alphanumeric() => out.push(c.to_ascii_uppercase()),
            _ => out.push('<'),
        }
    }
    out
}

fn mrz_nationality(value: &str) -> String {
    let mut code: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .take(3)
        .collect();
    while code.len() < 3 {
        code.push('<');
    }
    code
}

fn pad_mrz(mut line: String) -> String {
    line.truncate(MRZ_LINE_LEN);
    while line.len() < MRZ_LINE_LEN {
        line.push('<');
    }
    line
}
