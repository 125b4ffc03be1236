//! BLAKE3 proof-of-work over 180-byte Decred block headers
//!
//! The miner varies a little-endian u32 nonce at bytes 140..144 of the
//! header, hashes the whole header with default-mode BLAKE3 and accepts
//! the result when it is at or below a 256-bit big-endian target.
//!
//! ```text
//! header = version(4) prev_block(32) merkle_root(32) stake_root(32)
//!          vote_bits(2) final_state(6) voters(2) fresh_stake(1)
//!          revocations(1) pool_size(4) bits(4) sbits(8) height(4)
//!          size(4) timestamp(4) nonce(4) extra_data(32) stake_version(4)
//! ```

use core::ops::RangeInclusive;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::hasher::{Hasher, hash};
use crate::params::{BITS_OFFSET, BLOCK_LEN, HASH_SIZE, HEADER_SIZE, NONCE_OFFSET};

/// Fixed-size block header buffer
pub type BlockHeader = [u8; HEADER_SIZE];

/// Header bytes before the block that holds the nonce. They are the same
/// for every nonce, so their compression is done once per header.
const MIDSTATE_LEN: usize = (NONCE_OFFSET / BLOCK_LEN) * BLOCK_LEN;

/// A nonce whose hash met the target
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Solution {
    pub nonce: u32,
    pub hash: [u8; HASH_SIZE],
}

/// Reusable per-worker mining context.
///
/// Owns a private copy of the header, so the caller's buffer is never
/// written. Give each thread its own context and a disjoint nonce range.
#[derive(Clone, Debug)]
pub struct Blake3Dcr {
    work: BlockHeader,
    midstate: Hasher,
}

impl Blake3Dcr {
    pub fn new(header: &BlockHeader) -> Self {
        let mut midstate = Hasher::new();
        midstate.update(&header[..MIDSTATE_LEN]);
        Self {
            work: *header,
            midstate,
        }
    }

    /// The working copy, including the last nonce written
    pub fn work(&self) -> &BlockHeader {
        &self.work
    }

    pub fn set_nonce(&mut self, nonce: u32) {
        write_nonce(&mut self.work, nonce);
    }

    /// Write `nonce` into the working copy and hash it
    #[inline]
    pub fn hash_nonce(&mut self, nonce: u32) -> [u8; HASH_SIZE] {
        self.set_nonce(nonce);
        let mut hasher = self.midstate.clone();
        hasher.update(&self.work[MIDSTATE_LEN..]);
        hasher.finalize()
    }

    /// Try every nonce in `range` in increasing order and return the first
    /// one that meets `target`.
    pub fn scan(
        &mut self,
        range: RangeInclusive<u32>,
        target: &[u8; HASH_SIZE],
    ) -> Option<Solution> {
        for nonce in range {
            let hash = self.hash_nonce(nonce);
            if check_difficulty(&hash, target) {
                return Some(Solution { nonce, hash });
            }
        }
        None
    }
}

/// Hash a header (or any byte string) with default-mode BLAKE3
pub fn hash_header(header: &[u8]) -> [u8; HASH_SIZE] {
    hash(header)
}

/// Hash `header` with `nonce` written at offset 140.
///
/// ```rust
/// use blake3dcr_core::{calculate, HEADER_SIZE};
///
/// let header = [0u8; HEADER_SIZE];
/// let a = calculate(&header, 1);
/// let b = calculate(&header, 2);
/// assert_ne!(a, b);
/// assert_eq!(header, [0u8; HEADER_SIZE]);
/// ```
pub fn calculate(header: &BlockHeader, nonce: u32) -> [u8; HASH_SIZE] {
    let mut work = *header;
    write_nonce(&mut work, nonce);
    hash(&work)
}

/// Check a hash against a target, both big-endian 256-bit integers.
///
/// Passes when `hash <= target`.
///
/// # Example
///
/// ```rust
/// use blake3dcr_core::check_difficulty;
///
/// let mut target = [0u8; 32];
/// target[31] = 0x01;
///
/// assert!(check_difficulty(&[0u8; 32], &target)); // below
/// assert!(check_difficulty(&target, &target));      // equal
///
/// let mut hash = target;
/// hash[31] = 0x02;
/// assert!(!check_difficulty(&hash, &target));       // above
/// ```
#[inline(always)]
pub fn check_difficulty(hash: &[u8; HASH_SIZE], target: &[u8; HASH_SIZE]) -> bool {
    for (h, t) in hash.iter().zip(target.iter()) {
        if h < t {
            return true;
        }
        if h > t {
            return false;
        }
    }
    true
}

#[inline(always)]
fn write_nonce(work: &mut BlockHeader, nonce: u32) {
    work[NONCE_OFFSET..NONCE_OFFSET + 4].copy_from_slice(&nonce.to_le_bytes());
}

/// Nonce currently stored in a header
pub fn read_nonce(header: &BlockHeader) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&header[NONCE_OFFSET..NONCE_OFFSET + 4]);
    u32::from_le_bytes(bytes)
}

/// Compact difficulty (`bits`) stored in a header
pub fn header_bits(header: &BlockHeader) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&header[BITS_OFFSET..BITS_OFFSET + 4]);
    u32::from_le_bytes(bytes)
}

/// Expand a compact `bits` value into a big-endian 256-bit target.
///
/// The top byte is a base-256 exponent and the low 23 bits the mantissa.
/// Negative values and values that do not fit in 256 bits give `None`.
pub fn target_from_compact(bits: u32) -> Option<[u8; HASH_SIZE]> {
    let exponent = (bits >> 24) as usize;
    let mut mantissa = bits & 0x007f_ffff;
    if bits & 0x0080_0000 != 0 && mantissa != 0 {
        return None;
    }

    let mut target = [0u8; HASH_SIZE];
    if exponent <= 3 {
        mantissa >>= 8 * (3 - exponent);
        target[HASH_SIZE - 3..].copy_from_slice(&mantissa.to_be_bytes()[1..]);
        return Some(target);
    }

    // index of the mantissa's least significant byte
    let lsb = (HASH_SIZE + 2) as isize - exponent as isize;
    for (i, byte) in mantissa.to_be_bytes()[1..].iter().enumerate() {
        let idx = lsb - (2 - i as isize);
        if idx < 0 {
            if *byte != 0 {
                return None;
            }
            continue;
        }
        target[idx as usize] = *byte;
    }
    Some(target)
}

/// Target that accepts hashes with at least `zero_bits` leading zero bits
pub fn target_from_zero_bits(zero_bits: u32) -> [u8; HASH_SIZE] {
    let zero_bits = zero_bits.min(8 * HASH_SIZE as u32) as usize;
    let mut target = [0xffu8; HASH_SIZE];
    let full = zero_bits / 8;
    target[..full].fill(0);
    if full < HASH_SIZE {
        target[full] = 0xff >> (zero_bits % 8);
    }
    target
}

/// Search `range` on all rayon threads.
///
/// Each worker builds its own [`Blake3Dcr`]. Returns the lowest nonce in
/// the range that meets `target`.
#[cfg(feature = "parallel")]
pub fn par_scan(
    header: &BlockHeader,
    target: &[u8; HASH_SIZE],
    range: RangeInclusive<u32>,
) -> Option<Solution> {
    range
        .into_par_iter()
        .map_init(
            || Blake3Dcr::new(header),
            |ctx, nonce| Solution {
                nonce,
                hash: ctx.hash_nonce(nonce),
            },
        )
        .find_first(|solution| check_difficulty(&solution.hash, target))
}
