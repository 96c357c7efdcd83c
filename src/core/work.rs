// Stratum Miner - Free and Open Source Software Statement
//
// This project, stratum-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/work.rs
// Version: 1.0.0
//
// This file describes the binary layout of the work buffer decoded from a job
// blob and the mutations a worker applies to it before every hash attempt.
//
// Layout of the 48-byte buffer:
//
//   byte  0        low nibble carries the work version
//   bytes 36..48   per-worker salt (12 bytes), partly overwritten below
//   bytes 43..47   search nonce, big-endian u32
//   byte  47       worker id
//
// The nonce reported to the pool is the hex of bytes 36..48, so it carries the
// salt, nonce and worker id together.

use thiserror::Error;

/// Decoded length of a job blob
pub const MINIBLOCK_SIZE: usize = 48;

/// Size of the per-worker random salt
pub const SALT_SIZE: usize = 12;

/// Offset of the per-worker salt
pub const SALT_OFFSET: usize = MINIBLOCK_SIZE - SALT_SIZE;

/// Offset of the big-endian u32 search nonce
pub const NONCE_OFFSET: usize = MINIBLOCK_SIZE - 5;

/// Offset of the worker id byte
pub const WORKER_ID_OFFSET: usize = MINIBLOCK_SIZE - 1;

/// Start of the bytes reported as the share nonce
pub const SHARE_NONCE_OFFSET: usize = SALT_OFFSET;

/// Mask applied to byte 0 to extract the work version
pub const VERSION_MASK: u8 = 0x0f;

/// The only work version this miner knows how to search
pub const SUPPORTED_VERSION: u8 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum WorkError {
    #[error("blob could not be decoded: {0}")]
    InvalidBlob(#[from] hex::FromHexError),

    #[error("unknown work version {0}, update required")]
    UnsupportedVersion(u8),
}

/// Mutable copy of a job blob owned by a single worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkBuffer([u8; MINIBLOCK_SIZE]);

impl Default for WorkBuffer {
    fn default() -> Self {
        Self([0u8; MINIBLOCK_SIZE])
    }
}

impl WorkBuffer {
    /// Decode a hex blob that must be exactly `MINIBLOCK_SIZE` bytes long.
    pub fn from_blob(blob: &str) -> Result<Self, WorkError> {
        let mut work = Self::default();
        work.load(blob)?;
        Ok(work)
    }

    /// Overwrite the buffer with a new blob, leaving it untouched on error.
    pub fn load(&mut self, blob: &str) -> Result<(), WorkError> {
        let mut decoded = [0u8; MINIBLOCK_SIZE];
        hex::decode_to_slice(blob, &mut decoded)?;
        self.0 = decoded;
        Ok(())
    }

    pub fn version(&self) -> u8 {
        self.0[0] & VERSION_MASK
    }

    pub fn check_version(&self) -> Result<(), WorkError> {
        match self.version() {
            SUPPORTED_VERSION => Ok(()),
            other => Err(WorkError::UnsupportedVersion(other)),
        }
    }

    /// Stamp the worker's salt and id. The worker id wins over the last salt byte.
    pub fn stamp(&mut self, worker_id: u8, salt: &[u8; SALT_SIZE]) {
        self.0[SALT_OFFSET..SALT_OFFSET + SALT_SIZE].copy_from_slice(salt);
        self.0[WORKER_ID_OFFSET] = worker_id;
    }

    pub fn set_nonce(&mut self, nonce: u32) {
        self.0[NONCE_OFFSET..NONCE_OFFSET + 4].copy_from_slice(&nonce.to_be_bytes());
    }

    /// Hex nonce as submitted to the pool
    pub fn share_nonce(&self) -> String {
        hex::encode(&self.0[SHARE_NONCE_OFFSET..])
    }

    pub fn as_bytes(&self) -> &[u8; MINIBLOCK_SIZE] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_with_version(version: u8) -> String {
        let mut raw = [0u8; MINIBLOCK_SIZE];
        raw[0] = 0x30 | version;
        hex::encode(raw)
    }

    #[test]
    fn test_layout_offsets() {
        assert_eq!(SALT_OFFSET, 36);
        assert_eq!(NONCE_OFFSET, 43);
        assert_eq!(WORKER_ID_OFFSET, 47);
        assert!(NONCE_OFFSET + 4 <= WORKER_ID_OFFSET);
    }

    #[test]
    fn test_blob_must_have_exact_length() {
        let short = hex::encode([1u8; MINIBLOCK_SIZE - 1]);
        let long = hex::encode([1u8; MINIBLOCK_SIZE + 1]);
        assert!(matches!(WorkBuffer::from_blob(&short), Err(WorkError::InvalidBlob(_))));
        assert!(matches!(WorkBuffer::from_blob(&long), Err(WorkError::InvalidBlob(_))));
        assert!(matches!(WorkBuffer::from_blob("not hex"), Err(WorkError::InvalidBlob(_))));
        assert_eq!(
            WorkBuffer::from_blob("not hex"),
            Err(WorkError::InvalidBlob(hex::FromHexError::OddLength))
        );
    }

    #[test]
    fn test_failed_load_keeps_previous_work() {
        let mut work = WorkBuffer::from_blob(&blob_with_version(1)).unwrap();
        let before = work.clone();
        assert!(work.load("00").is_err());
        assert_eq!(work, before);
    }

    #[test]
    fn test_version_nibble() {
        let work = WorkBuffer::from_blob(&blob_with_version(1)).unwrap();
        assert_eq!(work.version(), 1);
        assert!(work.check_version().is_ok());

        let work = WorkBuffer::from_blob(&blob_with_version(2)).unwrap();
        assert_eq!(work.check_version(), Err(WorkError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_stamp_and_nonce_positions() {
        let mut work = WorkBuffer::from_blob(&blob_with_version(1)).unwrap();
        let salt = [0xaa; SALT_SIZE];
        work.stamp(7, &salt);
        work.set_nonce(0x0102_0304);

        let bytes = work.as_bytes();
        assert_eq!(&bytes[36..43], &[0xaa; 7]);
        assert_eq!(&bytes[43..47], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(bytes[47], 7);
        assert_eq!(work.share_nonce(), "aaaaaaaaaaaaaa0102030407");
    }

    #[test]
    fn test_nonce_does_not_touch_template() {
        let mut work = WorkBuffer::from_blob(&blob_with_version(1)).unwrap();
        let before = work.as_bytes()[..SALT_OFFSET].to_vec();
        work.stamp(3, &[0x55; SALT_SIZE]);
        work.set_nonce(u32::MAX);
        assert_eq!(&work.as_bytes()[..SALT_OFFSET], before.as_slice());
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Initial work buffer layout.
//   - Named the salt, nonce, worker id and version offsets of the 48-byte
//     miniblock instead of indexing raw bytes in the worker loop.
