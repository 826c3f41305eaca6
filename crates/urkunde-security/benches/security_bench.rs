// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for identifier generation, HMAC signing and artifact
// hashing in the urkunde-security crate.

use chrono::Utc;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use urkunde_core::types::DocumentType;
use urkunde_security::identifiers::generate;
use urkunde_security::{CanonicalFields, DocumentSigner, hash_bytes, verification_code};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark primary identifier generation for every document type.
fn bench_identifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("identifier_generate");
    for doc_type in DocumentType::ALL {
        group.bench_function(doc_type.tag(), |b| {
            b.iter(|| black_box(generate(black_box(doc_type)).expect("generate failed")));
        });
    }
    group.finish();

    c.bench_function("verification_code", |b| {
        b.iter(|| black_box(verification_code().expect("code failed")));
    });
}

/// Benchmark signing and verifying the canonical field set.
fn bench_sign(c: &mut Criterion) {
    let signer = DocumentSigner::new("bench-signing-key").expect("signer");
    let now = Utc::now();
    let fields = CanonicalFields::new(
        "00112233445566778899AABBCCDDEEFF",
        "applicant-1",
        now,
        "REG-2026-0A1B2C3D",
        "Jane Doe",
    );
    let signature = signer.sign(&fields).expect("sign failed");

    c.bench_function("hmac_sign", |b| {
        b.iter(|| black_box(signer.sign(black_box(&fields)).expect("sign failed")));
    });
    c.bench_function("hmac_verify", |b| {
        b.iter(|| black_box(signer.verify_fields(black_box(&fields), &signature)));
    });
}

/// Benchmark SHA-256 artifact hashing at typical rendered-PDF sizes.
fn bench_integrity_hash(c: &mut Criterion) {
    let sizes: &[(&str, usize)] = &[("8 KiB", 8 * 1024), ("64 KiB", 64 * 1024)];

    let mut group = c.benchmark_group("integrity_hash_sha256");
    for &(label, size) in sizes {
        let data = vec![0xABu8; size];
        group.bench_function(label, |b| {
            b.iter(|| black_box(hash_bytes(black_box(&data))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_identifiers, bench_sign, bench_integrity_hash);
criterion_main!(benches);
