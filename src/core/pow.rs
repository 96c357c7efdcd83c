// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/pow.rs
// Version: 1.0.0
//
// This file defines the boundary to the proof-of-work hash primitive used by
// the worker pool and ships the default triple SHA3-256 implementation.
//
// Tree Location:
// - src/core/pow.rs (hash primitive boundary)
// - Depends on: sha3 crate

use crate::core::difficulty::HASH_SIZE;
use sha3::{Digest, Sha3_256};

/// A deterministic, CPU-bound hash over the full work buffer.
///
/// Workers call this from dedicated OS threads, so implementations must be
/// shareable across threads and free of interior locking on the hot path.
pub trait PowHasher: Send + Sync {
    fn hash(&self, work: &[u8]) -> [u8; HASH_SIZE];
}

/// SHA3-256 applied three times over the work buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct TripleSha3;

impl PowHasher for TripleSha3 {
    fn hash(&self, work: &[u8]) -> [u8; HASH_SIZE] {
        let hash1 = Sha3_256::digest(work);
        let hash2 = Sha3_256::digest(hash1);
        let hash3 = Sha3_256::digest(hash2);
        hash3.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_sha3_matches_manual_chain() {
        let work = [7u8; 48];
        let expected = Sha3_256::digest(Sha3_256::digest(Sha3_256::digest(work)));
        assert_eq!(TripleSha3.hash(&work).to_vec(), expected.to_vec());
    }

    #[test]
    fn test_hash_is_deterministic_and_input_sensitive() {
        let mut work = [0u8; 48];
        let first = TripleSha3.hash(&work);
        assert_eq!(first, TripleSha3.hash(&work));
        work[47] = 1;
        assert_ne!(first, TripleSha3.hash(&work));
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Replaced the nonce-batched SHA3x helpers.
//   - Hashing now runs over the caller's full work buffer; the nonce lives
//     inside the buffer instead of being prepended.
//   - Added the PowHasher trait so the worker pool does not depend on one
//     concrete primitive.
