//! BLAKE3 Decred Miner Library
//!
//! Proof-of-work search over 180-byte Decred-style block headers.
//!
//! # Overview
//!
//! A job (header + target) arrives from the pool layer, worker threads
//! scan disjoint nonce batches with the BLAKE3 engine from
//! [`blake3dcr_core`], and the first hash at or below the target wins.
//!
//! # Example
//!
//! ```rust
//! use blake3dcr::engine::{calculate, check_difficulty, target_from_zero_bits};
//!
//! let header = [0u8; 180];
//! let target = target_from_zero_bits(4);
//!
//! let found = (0u32..).find(|nonce| check_difficulty(&calculate(&header, *nonce), &target));
//! assert!(found.is_some());
//! ```

// Re-export the core engine
pub use blake3dcr_core as engine;

pub mod config;
pub mod job;
pub mod miner;

// Convenience re-exports
pub use config::MinerConfig;
pub use engine::{calculate, check_difficulty, Blake3Dcr, Solution};
pub use job::Job;
pub use miner::{Miner, MiningOutcome};
