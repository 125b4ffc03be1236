//! The BLAKE3 compression function
//!
//! One call mixes a 64-byte block into a chaining value over 7 rounds of
//! add-rotate-xor quarter rounds. Portable scalar code only.

use crate::params::{BLOCK_LEN, IV, MSG_SCHEDULE, OUT_LEN, ROUNDS};

/// Quarter round on four state words with two message words
#[inline(always)]
fn g(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize, x: u32, y: u32) {
    state[a] = state[a].wrapping_add(state[b]).wrapping_add(x);
    state[d] = (state[d] ^ state[a]).rotate_right(16);
    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_right(12);
    state[a] = state[a].wrapping_add(state[b]).wrapping_add(y);
    state[d] = (state[d] ^ state[a]).rotate_right(8);
    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_right(7);
}

/// Columns first, then diagonals
#[inline(always)]
fn round(state: &mut [u32; 16], msg: &[u32; 16], schedule: &[usize; 16]) {
    g(state, 0, 4, 8, 12, msg[schedule[0]], msg[schedule[1]]);
    g(state, 1, 5, 9, 13, msg[schedule[2]], msg[schedule[3]]);
    g(state, 2, 6, 10, 14, msg[schedule[4]], msg[schedule[5]]);
    g(state, 3, 7, 11, 15, msg[schedule[6]], msg[schedule[7]]);
    g(state, 0, 5, 10, 15, msg[schedule[8]], msg[schedule[9]]);
    g(state, 1, 6, 11, 12, msg[schedule[10]], msg[schedule[11]]);
    g(state, 2, 7, 8, 13, msg[schedule[12]], msg[schedule[13]]);
    g(state, 3, 4, 9, 14, msg[schedule[14]], msg[schedule[15]]);
}

#[inline(always)]
fn compress_pre(
    cv: &[u32; 8],
    block: &[u8; BLOCK_LEN],
    block_len: u8,
    counter: u64,
    flags: u8,
) -> [u32; 16] {
    let msg: [u32; 16] = words_from_le_bytes(block);

    let mut state = [
        cv[0],
        cv[1],
        cv[2],
        cv[3],
        cv[4],
        cv[5],
        cv[6],
        cv[7],
        IV[0],
        IV[1],
        IV[2],
        IV[3],
        counter as u32,
        (counter >> 32) as u32,
        block_len as u32,
        flags as u32,
    ];

    for schedule in MSG_SCHEDULE.iter().take(ROUNDS) {
        round(&mut state, &msg, schedule);
    }

    state
}

/// Compress `block` into `cv`, leaving the new chaining value in place.
///
/// Bytes of `block` past `block_len` must be zero.
#[inline]
pub(crate) fn compress_in_place(
    cv: &mut [u32; 8],
    block: &[u8; BLOCK_LEN],
    block_len: u8,
    counter: u64,
    flags: u8,
) {
    let state = compress_pre(cv, block, block_len, counter, flags);
    for i in 0..8 {
        cv[i] = state[i] ^ state[i + 8];
    }
}

/// Wide compression: all 16 output words, serialized little-endian.
///
/// The first 32 bytes equal the in-place chaining value; the last 32 are
/// `state[8..16] ^ cv`. Used for root output blocks.
#[inline]
pub(crate) fn compress_xof(
    cv: &[u32; 8],
    block: &[u8; BLOCK_LEN],
    block_len: u8,
    counter: u64,
    flags: u8,
) -> [u8; BLOCK_LEN] {
    let mut state = compress_pre(cv, block, block_len, counter, flags);
    for i in 0..8 {
        state[i] ^= state[i + 8];
        state[i + 8] ^= cv[i];
    }

    let mut out = [0u8; BLOCK_LEN];
    for (dst, word) in out.chunks_exact_mut(4).zip(state.iter()) {
        dst.copy_from_slice(&word.to_le_bytes());
    }
    out
}

#[inline]
pub(crate) fn words_from_le_bytes<const W: usize, const B: usize>(bytes: &[u8; B]) -> [u32; W] {
    debug_assert_eq!(W * 4, B);
    let mut words = [0u32; W];
    for (word, src) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([src[0], src[1], src[2], src[3]]);
    }
    words
}

#[inline]
pub(crate) fn cv_to_bytes(cv: &[u32; 8]) -> [u8; OUT_LEN] {
    let mut bytes = [0u8; OUT_LEN];
    for (dst, word) in bytes.chunks_exact_mut(4).zip(cv.iter()) {
        dst.copy_from_slice(&word.to_le_bytes());
    }
    bytes
}
