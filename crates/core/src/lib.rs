//! # BLAKE3 Decred Core
//!
//! A self-contained BLAKE3 implementation and the proof-of-work adapter
//! built on it: nonce injection into a 180-byte block header and
//! big-endian target comparison.
//!
//! ## Features
//!
//! - **Streaming**: `update` any number of times; results never depend on how
//!   the input was split
//! - **Modes**: default hashing, keyed hashing, key derivation
//! - **XOF**: output of any length, readable from any offset
//! - **Allocation-free**: fixed-size stack state, `no_std` compatible
//!
//! ## Input Format (mining)
//!
//! ```text
//! header = 180 bytes
//! nonce  = header[140..144]   (little-endian u32)
//! accept = BLAKE3(header) <= target   (both big-endian)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use blake3dcr_core::{Hasher, hash, calculate, check_difficulty, target_from_zero_bits};
//!
//! // Single-shot hashing
//! let digest = hash(b"input data");
//!
//! // Streaming gives the same digest
//! let mut hasher = Hasher::new();
//! hasher.update(b"input ").update(b"data");
//! assert_eq!(hasher.finalize(), digest);
//!
//! // Mining: try a nonce against a target
//! let header = [0u8; 180];
//! let result = calculate(&header, 42);
//! if check_difficulty(&result, &target_from_zero_bits(8)) {
//!     println!("Found share!");
//! }
//! ```
//!
//! ## no_std Support
//!
//! ```toml
//! [dependencies]
//! blake3dcr-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod chunk;
mod compress;
mod dcr;
mod hasher;
mod output;
mod params;

#[cfg(feature = "std")]
mod ffi;

pub use dcr::{
    BlockHeader, Blake3Dcr, Solution, calculate, check_difficulty, hash_header, header_bits,
    read_nonce, target_from_compact, target_from_zero_bits,
};
#[cfg(feature = "parallel")]
pub use dcr::par_scan;
pub use hasher::{Hasher, derive_key, hash, keyed_hash};
pub use output::OutputReader;
pub use params::*;

#[cfg(all(test, feature = "std"))]
mod tests;
