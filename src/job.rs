//! Mining jobs handed over by the pool layer
//!
//! A job is a 180-byte header plus a 256-bit big-endian target, encoded
//! as hex in JSON:
//!
//! ```json
//! { "header": "<360 hex chars>", "target": "<64 hex chars>", "nonce_start": 0, "nonce_end": 4294967295 }
//! ```
//!
//! `target` may be omitted, in which case it is expanded from the compact
//! `bits` field of the header.

use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

use crate::engine::{header_bits, target_from_compact, BlockHeader, HASH_SIZE, HEADER_SIZE};

#[derive(Error, Debug)]
pub enum JobError {
    #[error("Invalid hex in {field}: {source}")]
    Hex {
        field: &'static str,
        source: hex::FromHexError,
    },

    #[error("Header must be {HEADER_SIZE} bytes, got {0}")]
    HeaderLength(usize),

    #[error("{field} must be {HASH_SIZE} bytes, got {len}")]
    HashLength { field: &'static str, len: usize },

    #[error("Header bits {0:#010x} do not encode a valid target")]
    InvalidBits(u32),

    #[error("Empty nonce range {start}..={end}")]
    EmptyRange { start: u32, end: u32 },

    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Invalid job file: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk job format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JobFile {
    header: String,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    nonce_start: Option<u32>,
    #[serde(default)]
    nonce_end: Option<u32>,
}

/// A validated mining job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub header: BlockHeader,
    pub target: [u8; HASH_SIZE],
    pub nonce_start: u32,
    pub nonce_end: u32,
}

impl Job {
    /// Job over the full nonce space
    pub fn new(header: BlockHeader, target: [u8; HASH_SIZE]) -> Self {
        Self {
            header,
            target,
            nonce_start: 0,
            nonce_end: u32::MAX,
        }
    }

    /// Build a job from hex strings; without a target the header bits are used
    pub fn from_hex(header_hex: &str, target_hex: Option<&str>) -> Result<Self, JobError> {
        let header = parse_header(header_hex)?;
        let target = match target_hex {
            Some(hex) => parse_hash("target", hex)?,
            None => {
                let bits = header_bits(&header);
                target_from_compact(bits).ok_or(JobError::InvalidBits(bits))?
            }
        };
        Ok(Self::new(header, target))
    }

    pub fn from_json(json: &str) -> Result<Self, JobError> {
        let file: JobFile = serde_json::from_str(json)?;
        let job = Self::from_hex(&file.header, file.target.as_deref())?;
        job.with_range(
            file.nonce_start.unwrap_or(0),
            file.nonce_end.unwrap_or(u32::MAX),
        )
    }

    /// Load a job from a JSON file
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Restrict the job to `start..=end`
    pub fn with_range(mut self, start: u32, end: u32) -> Result<Self, JobError> {
        if start > end {
            return Err(JobError::EmptyRange { start, end });
        }
        self.nonce_start = start;
        self.nonce_end = end;
        Ok(self)
    }

    pub fn nonce_range(&self) -> RangeInclusive<u32> {
        self.nonce_start..=self.nonce_end
    }

    /// Number of nonces in the job
    pub fn range_len(&self) -> u64 {
        (self.nonce_end - self.nonce_start) as u64 + 1
    }
}

fn decode_hex(field: &'static str, input: &str) -> Result<Vec<u8>, JobError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(trimmed).map_err(|source| JobError::Hex { field, source })
}

/// Parse a 180-byte header from hex
pub fn parse_header(input: &str) -> Result<BlockHeader, JobError> {
    let bytes = decode_hex("header", input)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| JobError::HeaderLength(bytes.len()))
}

/// Parse a 32-byte hash, target or key from hex
pub fn parse_hash(field: &'static str, input: &str) -> Result<[u8; HASH_SIZE], JobError> {
    let bytes = decode_hex(field, input)?;
    bytes.as_slice().try_into().map_err(|_| JobError::HashLength {
        field,
        len: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{target_from_zero_bits, BITS_OFFSET};

    fn header_hex_with_bits(bits: u32) -> String {
        let mut header = [0x11u8; HEADER_SIZE];
        header[BITS_OFFSET..BITS_OFFSET + 4].copy_from_slice(&bits.to_le_bytes());
        hex::encode(header)
    }

    #[test]
    fn test_job_from_json_with_target() {
        let target = target_from_zero_bits(16);
        let json = format!(
            r#"{{"header": "{}", "target": "0x{}", "nonce_start": 10, "nonce_end": 20}}"#,
            hex::encode([0u8; HEADER_SIZE]),
            hex::encode(target)
        );

        let job = Job::from_json(&json).unwrap();
        assert_eq!(job.header, [0u8; HEADER_SIZE]);
        assert_eq!(job.target, target);
        assert_eq!(job.nonce_range(), 10..=20);
        assert_eq!(job.range_len(), 11);
    }

    #[test]
    fn test_job_target_from_header_bits() {
        let json = format!(r#"{{"header": "{}"}}"#, header_hex_with_bits(0x1d00ffff));
        let job = Job::from_json(&json).unwrap();

        assert_eq!(job.target, target_from_compact(0x1d00ffff).unwrap());
        assert_eq!(job.nonce_range(), 0..=u32::MAX);
        assert_eq!(job.range_len(), 1u64 << 32);
    }

    #[test]
    fn test_job_rejects_bad_input() {
        assert!(matches!(
            Job::from_hex("abcd", None),
            Err(JobError::HeaderLength(2))
        ));
        assert!(matches!(
            Job::from_hex("zz", None),
            Err(JobError::Hex { field: "header", .. })
        ));
        assert!(matches!(
            Job::from_hex(&hex::encode([0u8; HEADER_SIZE]), Some("00ff")),
            Err(JobError::HashLength { field: "target", len: 2 })
        ));
        assert!(matches!(
            Job::from_hex(&header_hex_with_bits(0x04923456), None),
            Err(JobError::InvalidBits(0x04923456))
        ));
        assert!(matches!(
            Job::new([0u8; HEADER_SIZE], [0u8; HASH_SIZE]).with_range(5, 4),
            Err(JobError::EmptyRange { start: 5, end: 4 })
        ));
        assert!(matches!(Job::from_json("{"), Err(JobError::Json(_))));
    }

    #[test]
    fn test_job_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        let json = format!(
            r#"{{"header": "{}", "target": "{}"}}"#,
            hex::encode([7u8; HEADER_SIZE]),
            hex::encode([0xffu8; HASH_SIZE])
        );
        fs::write(&path, json).unwrap();

        let job = Job::load(&path).unwrap();
        assert_eq!(job.header, [7u8; HEADER_SIZE]);
        assert!(matches!(
            Job::load(&dir.path().join("missing.json")),
            Err(JobError::FileError(_))
        ));
    }
}
