// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/difficulty.rs
// Version: 1.0.0
//
// This file contains the conversions between the pool's compact 8-byte target,
// the u64 difficulty derived from it, and the 256-bit threshold a proof-of-work
// hash is compared against, located in the core subdirectory of the source tree.

use log::{debug, warn};
use thiserror::Error;
use uint::construct_uint;

const LOG_TARGET: &str = "stratum_miner::difficulty";

construct_uint! {
    /// Wide enough to hold `2^256` exactly, which is the threshold for difficulty 1.
    pub struct U512(8);
}

/// Length in bytes of the little-endian target sent by the pool
pub const TARGET_SIZE: usize = 8;

/// Length in bytes of a proof-of-work hash
pub const HASH_SIZE: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("failed to decode target: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid target length: expected 8 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid target: zero value")]
    Zero,
}

/// Parse the pool's hex target into its little-endian u64 value.
pub fn parse_target(target_hex: &str) -> Result<u64, TargetError> {
    let target_bytes = hex::decode(target_hex)?;
    let bytes: [u8; TARGET_SIZE] = target_bytes
        .as_slice()
        .try_into()
        .map_err(|_| TargetError::InvalidLength(target_bytes.len()))?;

    match u64::from_le_bytes(bytes) {
        0 => {
            warn!(target: LOG_TARGET, "Rejecting target {}: zero value", target_hex);
            Err(TargetError::Zero)
        }
        target => Ok(target),
    }
}

/// Difficulty for a non-zero target, `(2^64 - 1) / target` in integer arithmetic.
pub fn target_to_difficulty(target: u64) -> Result<u64, TargetError> {
    if target == 0 {
        return Err(TargetError::Zero);
    }
    Ok(u64::MAX / target)
}

/// Parse a hex target straight into a difficulty.
pub fn parse_target_difficulty(target_hex: &str) -> Result<u64, TargetError> {
    let target = parse_target(target_hex)?;
    let difficulty = target_to_difficulty(target)?;
    debug!(target: LOG_TARGET,
        "Parsed target {} ({}), difficulty: {}",
        target_hex, target, difficulty
    );
    Ok(difficulty)
}

/// Threshold `floor(2^256 / difficulty)`; `None` for a zero difficulty.
pub fn difficulty_threshold(difficulty: u64) -> Option<U512> {
    if difficulty == 0 {
        return None;
    }
    Some((U512::one() << 256) / U512::from(difficulty))
}

/// Interpret a little-endian hash as an unsigned 256-bit integer.
pub fn hash_to_uint(hash: &[u8; HASH_SIZE]) -> U512 {
    // Reading little-endian is the same as reversing to big-endian first.
    U512::from_little_endian(hash)
}

/// Check whether a hash meets a precomputed difficulty threshold
pub fn check_pow_hash(hash: &[u8; HASH_SIZE], threshold: &U512) -> bool {
    hash_to_uint(hash) <= *threshold
}

/// Check a hash directly against a difficulty. A zero difficulty never passes.
pub fn hash_meets_difficulty(hash: &[u8; HASH_SIZE], difficulty: u64) -> bool {
    match difficulty_threshold(difficulty) {
        Some(threshold) => check_pow_hash(hash, &threshold),
        None => {
            warn!(target: LOG_TARGET, "Refusing to check hash against zero difficulty");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_two() {
        let difficulty = parse_target_difficulty("0200000000000000").unwrap();
        assert_eq!(difficulty, 9223372036854775807);
    }

    #[test]
    fn test_parse_target_one_is_max_difficulty() {
        let difficulty = parse_target_difficulty("0100000000000000").unwrap();
        assert_eq!(difficulty, u64::MAX);
    }

    #[test]
    fn test_parse_target_max_is_difficulty_one() {
        let difficulty = parse_target_difficulty("ffffffffffffffff").unwrap();
        assert_eq!(difficulty, 1);
    }

    #[test]
    fn test_parse_target_is_little_endian() {
        // 0x0000_0000_0001_0000 read little-endian
        let target = parse_target("0000010000000000").unwrap();
        assert_eq!(target, 0x10000);
        assert_eq!(target_to_difficulty(target).unwrap(), u64::MAX / 0x10000);
    }

    #[test]
    fn test_zero_target_rejected() {
        assert_eq!(parse_target("0000000000000000"), Err(TargetError::Zero));
        assert_eq!(target_to_difficulty(0), Err(TargetError::Zero));
    }

    #[test]
    fn test_bad_targets_rejected() {
        assert!(matches!(parse_target("zz00000000000000"), Err(TargetError::InvalidHex(_))));
        assert_eq!(
            parse_target("zz00000000000000"),
            Err(TargetError::InvalidHex(hex::FromHexError::InvalidHexCharacter { c: 'z', index: 0 }))
        );
        assert_eq!(parse_target("01000000"), Err(TargetError::InvalidLength(4)));
        assert_eq!(parse_target("010000000000000000"), Err(TargetError::InvalidLength(9)));
    }

    #[test]
    fn test_difficulty_matches_integer_division() {
        for target in [1u64, 2, 3, 7, 1000, 0xdead_beef, u64::MAX / 3, u64::MAX] {
            let hex = hex::encode(target.to_le_bytes());
            assert_eq!(parse_target_difficulty(&hex).unwrap(), u64::MAX / target);
        }
    }

    #[test]
    fn test_threshold_for_difficulty_one_is_two_pow_256() {
        let threshold = difficulty_threshold(1).unwrap();
        assert_eq!(threshold, U512::one() << 256);
        assert!(check_pow_hash(&[0xff; HASH_SIZE], &threshold));
    }

    #[test]
    fn test_zero_difficulty_has_no_threshold() {
        assert!(difficulty_threshold(0).is_none());
        assert!(!hash_meets_difficulty(&[0u8; HASH_SIZE], 0));
    }

    #[test]
    fn test_hash_is_read_reversed() {
        // Only the last byte set: as big-endian this is 0x01 << 248.
        let mut hash = [0u8; HASH_SIZE];
        hash[31] = 0x01;
        assert_eq!(hash_to_uint(&hash), U512::one() << 248);

        // Difficulty 256 gives a threshold of exactly 2^248.
        assert!(hash_meets_difficulty(&hash, 256));
        hash[0] = 0x01;
        assert!(!hash_meets_difficulty(&hash, 256));
    }

    #[test]
    fn test_boundary_comparison_is_inclusive() {
        let difficulty = 3u64;
        let threshold = difficulty_threshold(difficulty).unwrap();

        let mut at = [0u8; HASH_SIZE];
        let mut above = [0u8; HASH_SIZE];
        let limbs = threshold.0;
        for (i, limb) in limbs[..4].iter().enumerate() {
            at[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
        }
        let over = threshold + U512::one();
        for (i, limb) in over.0[..4].iter().enumerate() {
            above[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
        }

        assert!(check_pow_hash(&at, &threshold));
        assert!(!check_pow_hash(&above, &threshold));
    }

    #[test]
    fn test_harder_difficulty_never_accepts_more() {
        let hash = {
            let mut h = [0u8; HASH_SIZE];
            h[30] = 0x40;
            h
        };
        let mut last = true;
        for difficulty in [1u64, 2, 16, 256, 1 << 10, 1 << 20, u64::MAX] {
            let passes = hash_meets_difficulty(&hash, difficulty);
            assert!(last || !passes, "difficulty {} accepted after a lower one rejected", difficulty);
            last = passes;
        }
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Reworked for the stratum miner.
//   - parse_target now fails closed on bad hex, wrong length and zero targets
//     instead of falling back to difficulty 1.
//   - Replaced the per-algorithm U256 helpers with a U512 threshold so that
//     difficulty 1 (threshold 2^256) is represented exactly.
//   - Hash comparison reads the hash little-endian.
