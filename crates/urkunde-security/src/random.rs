// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CSPRNG helpers over `ring::rand::SystemRandom`.

use ring::rand::{SecureRandom, SystemRandom};
use urkunde_core::error::{GenerationError, Result};

/// Fill a fixed-size array from the OS CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| GenerationError::Entropy)?;
    Ok(buf)
}

/// `len` random bytes.
pub fn random_vec(len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| GenerationError::Entropy)?;
    Ok(buf)
}

/// Uniform integer in `0..bound` (rejection sampling, no modulo bias).
pub fn random_below(bound: u32) -> Result<u32> {
    assert!(bound > 0, "bound must be positive");
    let zone = (u32::MAX / bound) * bound;
    loop {
        let value = u32::from_be_bytes(random_bytes::<4>()?);
        if value < zone {
            return Ok(value % bound);
        }
    }
}

/// `len` random bytes, lowercase hex.
pub fn random_hex(len: usize) -> Result<String> {
    Ok(hex::encode(random_vec(len)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_below_stays_in_range() {
        for _ in 0..1000 {
            assert!(random_below(7).unwrap() < 7);
        }
        assert_eq!(random_below(1).unwrap(), 0);
    }

    #[test]
    fn random_hex_has_expected_length() {
        let hex = random_hex(8).unwrap();
        assert_eq!(hex.len(), 16);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn consecutive_draws_differ() {
        assert_ne!(random_bytes::<16>().unwrap(), random_bytes::<16>().unwrap());
    }
}
