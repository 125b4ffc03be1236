//! Incremental BLAKE3 hasher
//!
//! Input is split into 1024-byte chunks. Each completed chunk's chaining
//! value is pushed onto a fixed-size stack that is merged like a binary
//! counter, so the tree shape only depends on the total input length and
//! never on how the input was split across `update` calls.

use crate::chunk::ChunkState;
use crate::compress::words_from_le_bytes;
use crate::output::{Output, OutputReader};
use crate::params::*;

/// Streaming BLAKE3 state.
///
/// A plain value owned by its caller; no heap allocation. `finalize*`
/// methods take `&self` and may be called any number of times.
#[derive(Clone)]
pub struct Hasher {
    key: [u32; 8],
    chunk: ChunkState,
    cv_stack: [[u32; 8]; CV_STACK_LEN],
    cv_stack_len: u8,
}

impl Hasher {
    fn new_internal(key: &[u32; 8], flags: u8) -> Self {
        Self {
            key: *key,
            chunk: ChunkState::new(key, 0, flags),
            cv_stack: [[0u32; 8]; CV_STACK_LEN],
            cv_stack_len: 0,
        }
    }

    /// Default hash mode
    pub fn new() -> Self {
        Self::new_internal(&IV, 0)
    }

    /// Keyed hash mode (MAC / PRF)
    pub fn new_keyed(key: &[u8; KEY_LEN]) -> Self {
        let key_words: [u32; 8] = words_from_le_bytes(key);
        Self::new_internal(&key_words, KEYED_HASH)
    }

    /// Key derivation mode with a string context
    ///
    /// The context should be hardcoded, globally unique and application
    /// specific, e.g. `"example.com 2025-01-01 session tokens v1"`.
    pub fn new_derive_key(context: &str) -> Self {
        Self::new_derive_key_raw(context.as_bytes())
    }

    /// Key derivation mode with an arbitrary byte context
    pub fn new_derive_key_raw(context: &[u8]) -> Self {
        let mut context_hasher = Self::new_internal(&IV, DERIVE_KEY_CONTEXT);
        context_hasher.update(context);
        let context_key = context_hasher.finalize();
        let context_key_words: [u32; 8] = words_from_le_bytes(&context_key);
        Self::new_internal(&context_key_words, DERIVE_KEY_MATERIAL)
    }

    /// Mode flags carried into every compression
    fn mode_flags(&self) -> u8 {
        self.chunk.flags()
    }

    /// Push a completed chunk's CV, then merge until the stack holds
    /// exactly `popcount(total_chunks)` subtrees.
    pub(crate) fn push_cv(&mut self, new_cv: &[u32; 8], total_chunks: u64) {
        self.cv_stack[self.cv_stack_len as usize] = *new_cv;
        self.cv_stack_len += 1;

        let post_merge_len = total_chunks.count_ones() as u8;
        while self.cv_stack_len > post_merge_len {
            let right = self.cv_stack[self.cv_stack_len as usize - 1];
            let left = self.cv_stack[self.cv_stack_len as usize - 2];
            let parent = Output::parent(&left, &right, &self.key, self.mode_flags());
            self.cv_stack_len -= 1;
            self.cv_stack[self.cv_stack_len as usize - 1] = parent.chaining_value();
        }
    }

    /// Absorb more input. Any split of the same bytes gives the same result.
    pub fn update(&mut self, mut input: &[u8]) -> &mut Self {
        while !input.is_empty() {
            if self.chunk.len() == CHUNK_LEN {
                let chunk_cv = self.chunk.output().chaining_value();
                let total_chunks = self.chunk.chunk_counter() + 1;
                self.push_cv(&chunk_cv, total_chunks);
                self.chunk = ChunkState::new(&self.key, total_chunks, self.mode_flags());
            }

            let take = (CHUNK_LEN - self.chunk.len()).min(input.len());
            self.chunk.update(&input[..take]);
            input = &input[take..];
        }
        self
    }

    /// The root node: the active chunk folded through the stack, newest
    /// subtree first.
    fn final_output(&self) -> Output {
        let mut output = self.chunk.output();
        for left in self.cv_stack[..self.cv_stack_len as usize].iter().rev() {
            output = Output::parent(left, &output.chaining_value(), &self.key, self.mode_flags());
        }
        output
    }

    /// 32-byte digest
    pub fn finalize(&self) -> [u8; OUT_LEN] {
        self.final_output().root_hash()
    }

    /// Fill `out` with output bytes starting at offset 0
    pub fn finalize_into(&self, out: &mut [u8]) {
        self.finalize_seek(0, out);
    }

    /// Fill `out` with output bytes `[seek, seek + out.len())`.
    ///
    /// An empty `out` does nothing.
    pub fn finalize_seek(&self, seek: u64, out: &mut [u8]) {
        if out.is_empty() {
            return;
        }
        self.final_output().root_output_bytes(seek, out);
    }

    /// Reader over the unbounded output stream
    pub fn finalize_xof(&self) -> OutputReader {
        OutputReader::new(self.final_output())
    }

    /// Forget all input, keeping the key and the hashing mode
    pub fn reset(&mut self) -> &mut Self {
        let flags = self.mode_flags() & (KEYED_HASH | DERIVE_KEY_MATERIAL);
        self.chunk = ChunkState::new(&self.key, 0, flags);
        self.cv_stack_len = 0;
        self
    }

    /// Total bytes absorbed since construction or the last reset
    pub fn count(&self) -> u64 {
        self.chunk.chunk_counter() * CHUNK_LEN as u64 + self.chunk.len() as u64
    }

    #[cfg(test)]
    pub(crate) fn cv_stack_len(&self) -> usize {
        self.cv_stack_len as usize
    }
}

/// Prints the mode and byte count only; key words never appear.
impl core::fmt::Debug for Hasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hasher")
            .field("flags", &self.mode_flags())
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// One-shot default-mode hash
pub fn hash(input: &[u8]) -> [u8; OUT_LEN] {
    let mut hasher = Hasher::new();
    hasher.update(input);
    hasher.finalize()
}

/// One-shot keyed hash
pub fn keyed_hash(key: &[u8; KEY_LEN], input: &[u8]) -> [u8; OUT_LEN] {
    let mut hasher = Hasher::new_keyed(key);
    hasher.update(input);
    hasher.finalize()
}

/// One-shot key derivation producing a 32-byte key
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; KEY_LEN] {
    let mut hasher = Hasher::new_derive_key(context);
    hasher.update(key_material);
    hasher.finalize()
}
