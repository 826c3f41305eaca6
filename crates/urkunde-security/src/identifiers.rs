// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document numbers and verification codes.
//
// Formats (ts36 = lowercase base-36 Unix milliseconds, hex upper-case):
//
//   certificate        CERT-<ts36>-<8 hex>
//   permit             PERMIT-<ts36>-<8 hex>
//   birth/marriage/death  REG-<yyyy>-<8 hex>
//   marriage licence   LIC-<ts36>-<6 hex>
//   work permit        WP-<ts36>-<6 hex>
//   permanent visa     VISA-<ts36>-<8 hex>
//   passport           AA1234567
//   national id        <9-digit base><base mod 10>
//
// Uniqueness rests on timestamp + randomness. The generator consults no
// external state; the engine checks storage before commit.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use tracing::debug;
use urkunde_core::error::Result;
use urkunde_core::types::DocumentType;

use crate::random::{random_below, random_bytes, random_vec};

/// Payload key under which the marriage licence number is stored.
pub const LICENCE_NUMBER_KEY: &str = "licenseNumber";

/// Length of a verification code in hex characters.
pub const VERIFICATION_CODE_LEN: usize = 32;

/// Generate the primary identifier for `doc_type` at the current time.
pub fn generate(doc_type: DocumentType) -> Result<String> {
    generate_at(doc_type, Utc::now())
}

/// Generate the primary identifier for `doc_type` with an explicit clock.
pub fn generate_at(doc_type: DocumentType, now: DateTime<Utc>) -> Result<String> {
    let identifier = match doc_type {
        DocumentType::Certificate => prefixed("CERT", now, 4)?,
        DocumentType::Permit => prefixed("PERMIT", now, 4)?,
        DocumentType::BirthCertificate
        | DocumentType::MarriageCertificate
        | DocumentType::DeathCertificate => registration_number(now)?,
        DocumentType::WorkPermit => prefixed("WP", now, 3)?,
        DocumentType::PermanentVisa => prefixed("VISA", now, 4)?,
        DocumentType::Passport => passport_number()?,
        DocumentType::IdCard => id_number()?,
    };
    debug!(document_type = %doc_type, %identifier, "identifier generated");
    Ok(identifier)
}

/// Extra numbers a document carries beside its primary identifier.
pub fn secondary_identifiers(
    doc_type: DocumentType,
    now: DateTime<Utc>,
) -> Result<BTreeMap<String, String>> {
    let mut extra = BTreeMap::new();
    if doc_type == DocumentType::MarriageCertificate {
        extra.insert(LICENCE_NUMBER_KEY.to_owned(), licence_number(now)?);
    }
    Ok(extra)
}

/// Marriage licence number, `LIC-<ts36>-<6 hex>`.
pub fn licence_number(now: DateTime<Utc>) -> Result<String> {
    prefixed("LIC", now, 3)
}

/// 16 random bytes as 32 upper-case hex characters.
pub fn verification_code() -> Result<String> {
    Ok(hex::encode_upper(random_bytes::<16>()?))
}

/// Whether `code` has the shape of a verification code.
pub fn is_verification_code(code: &str) -> bool {
    code.len() == VERIFICATION_CODE_LEN && code.chars().all(is_upper_hex)
}

/// The simplified national-ID checksum: the base modulo 10.
pub fn id_check_digit(base: u32) -> u32 {
    base % 10
}

/// Check `identifier` against the format of `doc_type`.
pub fn is_valid_identifier(doc_type: DocumentType, identifier: &str) -> bool {
    match doc_type {
        DocumentType::Certificate => matches_prefixed(identifier, "CERT", 4),
        DocumentType::Permit => matches_prefixed(identifier, "PERMIT", 4),
        DocumentType::BirthCertificate
        | DocumentType::MarriageCertificate
        | DocumentType::DeathCertificate => matches_registration(identifier),
        DocumentType::WorkPermit => matches_prefixed(identifier, "WP", 3),
        DocumentType::PermanentVisa => matches_prefixed(identifier, "VISA", 4),
        DocumentType::Passport => matches_passport(identifier),
        DocumentType::IdCard => matches_id_number(identifier),
    }
}

/// Whether `identifier` is a well-formed marriage licence number.
pub fn is_valid_licence_number(identifier: &str) -> bool {
    matches_prefixed(identifier, "LIC", 3)
}

// -- Generators ---------------------------------------------------------------

fn prefixed(prefix: &str, now: DateTime<Utc>, random_len: usize) -> Result<String> {
    let millis = now.timestamp_millis().max(0) as u64;
    let suffix = hex::encode_upper(random_vec(random_len)?);
    Ok(format!("{prefix}-{}-{suffix}", to_base36(millis)))
}

fn registration_number(now: DateTime<Utc>) -> Result<String> {
    let suffix = hex::encode_upper(random_bytes::<4>()?);
    Ok(format!("REG-{}-{suffix}", now.year()))
}

fn passport_number() -> Result<String> {
    let mut letters = String::with_capacity(2);
    for _ in 0..2 {
        // < 26, so the cast is lossless.
        letters.push(char::from(b'A' + random_below(26)? as u8));
    }
    let digits = random_below(10_000_000)?;
    Ok(format!("{letters}{digits:07}"))
}

fn id_number() -> Result<String> {
    let base = 100_000_000 + random_below(900_000_000)?;
    Ok(format!("{base}{}", id_check_digit(base)))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

// -- Matchers -----------------------------------------------------------------

fn is_upper_hex(c: char) -> bool {
    c.is_ascii_digit() || ('A'..='F').contains(&c)
}

fn is_base36(c: char) -> bool {
    c.is_ascii_digit() || c.is_ascii_lowercase()
}

fn matches_prefixed(identifier: &str, prefix: &str, random_len: usize) -> bool {
    let parts: Vec<&str> = identifier.split('-').collect();
    match parts.as_slice() {
        [p, ts, suffix] => {
            *p == prefix
                && !ts.is_empty()
                && ts.chars().all(is_base36)
                && suffix.len() == random_len * 2
                && suffix.chars().all(is_upper_hex)
        }
        _ => false,
    }
}

fn matches_registration(identifier: &str) -> bool {
    let parts: Vec<&str> = identifier.split('-').collect();
    match parts.as_slice() {
        ["REG", year, suffix] => {
            year.len() == 4
                && year.chars().all(|c| c.is_ascii_digit())
                && suffix.len() == 8
                && suffix.chars().all(is_upper_hex)
        }
        _ => false,
    }
}

fn matches_passport(identifier: &str) -> bool {
    let bytes = identifier.as_bytes();
    bytes.len() == 9
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..].iter().all(u8::is_ascii_digit)
}

fn matches_id_number(identifier: &str) -> bool {
    if identifier.len() != 10 || !identifier.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let (base, check) = identifier.split_at(9);
    match (base.parse::<u32>(), check.parse::<u32>()) {
        (Ok(base), Ok(check)) => base >= 100_000_000 && id_check_digit(base) == check,
        _ => false,
    }
}
