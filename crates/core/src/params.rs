//! BLAKE3 and Decred header parameters
//!
//! Sizes, domain separation flags and the fixed constants shared by the
//! compression function, the tree hasher and the mining adapter.

/// Digest size in bytes
pub const OUT_LEN: usize = 32;

/// Key size in bytes (keyed mode)
pub const KEY_LEN: usize = 32;

/// Compression block size in bytes
pub const BLOCK_LEN: usize = 64;

/// Leaf chunk size in bytes (16 blocks)
pub const CHUNK_LEN: usize = 1024;

/// Maximum tree depth for inputs up to 2^64 bytes
pub const MAX_DEPTH: usize = 54;

/// Capacity of the chaining value stack
pub const CV_STACK_LEN: usize = MAX_DEPTH + 1;

/// Number of compression rounds
pub const ROUNDS: usize = 7;

/// Decred block header size in bytes
pub const HEADER_SIZE: usize = 180;

/// Offset of the little-endian u32 nonce inside the header
pub const NONCE_OFFSET: usize = 140;

/// Offset of the little-endian compact difficulty (`bits`) field
pub const BITS_OFFSET: usize = 116;

/// Mining hash size in bytes
pub const HASH_SIZE: usize = OUT_LEN;

pub const CHUNK_START: u8 = 1 << 0;
pub const CHUNK_END: u8 = 1 << 1;
pub const PARENT: u8 = 1 << 2;
pub const ROOT: u8 = 1 << 3;
pub const KEYED_HASH: u8 = 1 << 4;
pub const DERIVE_KEY_CONTEXT: u8 = 1 << 5;
pub const DERIVE_KEY_MATERIAL: u8 = 1 << 6;

/// Initial vector, shared with BLAKE2s / SHA-256
pub(crate) const IV: [u32; 8] = [
    0x6A09E667, 0xBB67AE85, 0x3C6EF372, 0xA54FF53A, 0x510E527F, 0x9B05688C, 0x1F83D9AB,
    0x5BE0CD19,
];

/// Message word order for each of the seven rounds
pub(crate) const MSG_SCHEDULE: [[usize; 16]; ROUNDS] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [2, 6, 3, 10, 7, 0, 4, 13, 1, 11, 12, 5, 9, 14, 15, 8],
    [3, 4, 10, 12, 13, 2, 7, 14, 6, 5, 9, 0, 11, 15, 8, 1],
    [10, 7, 12, 9, 14, 3, 13, 15, 4, 0, 11, 2, 5, 8, 1, 6],
    [12, 13, 9, 11, 15, 10, 14, 8, 7, 2, 5, 3, 0, 1, 6, 4],
    [9, 14, 11, 5, 8, 12, 15, 1, 13, 3, 0, 10, 2, 6, 4, 7],
    [11, 15, 5, 0, 1, 9, 8, 6, 14, 10, 2, 12, 3, 4, 7, 13],
];
