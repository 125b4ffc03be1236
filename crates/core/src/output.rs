//! Tree nodes awaiting compression and the extendable output reader

use crate::compress::{compress_in_place, compress_xof, cv_to_bytes};
use crate::params::{BLOCK_LEN, OUT_LEN, PARENT, ROOT};

/// A node whose final compression has not been performed yet.
///
/// Holding the inputs rather than the result lets the same node become
/// either an interior chaining value or, with ROOT set, the root output
/// stream at any block counter.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Output {
    input_cv: [u32; 8],
    block: [u8; BLOCK_LEN],
    block_len: u8,
    counter: u64,
    flags: u8,
}

impl Output {
    pub(crate) fn new(
        input_cv: [u32; 8],
        block: [u8; BLOCK_LEN],
        block_len: u8,
        counter: u64,
        flags: u8,
    ) -> Self {
        Self {
            input_cv,
            block,
            block_len,
            counter,
            flags,
        }
    }

    /// Parent node over two child chaining values (always counter 0).
    pub(crate) fn parent(left: &[u32; 8], right: &[u32; 8], key: &[u32; 8], flags: u8) -> Self {
        let mut block = [0u8; BLOCK_LEN];
        block[..OUT_LEN].copy_from_slice(&cv_to_bytes(left));
        block[OUT_LEN..].copy_from_slice(&cv_to_bytes(right));
        Self::new(*key, block, BLOCK_LEN as u8, 0, flags | PARENT)
    }

    pub(crate) fn chaining_value(&self) -> [u32; 8] {
        let mut cv = self.input_cv;
        compress_in_place(
            &mut cv,
            &self.block,
            self.block_len,
            self.counter,
            self.flags,
        );
        cv
    }

    /// First 32 bytes of the root output stream
    pub(crate) fn root_hash(&self) -> [u8; OUT_LEN] {
        let mut cv = self.input_cv;
        compress_in_place(&mut cv, &self.block, self.block_len, 0, self.flags | ROOT);
        cv_to_bytes(&cv)
    }

    /// One 64-byte block of root output; `block_counter` replaces the node counter.
    pub(crate) fn root_output_block(&self, block_counter: u64) -> [u8; BLOCK_LEN] {
        compress_xof(
            &self.input_cv,
            &self.block,
            self.block_len,
            block_counter,
            self.flags | ROOT,
        )
    }

    /// Write root output bytes `[seek, seek + out.len())` into `out`.
    pub(crate) fn root_output_bytes(&self, seek: u64, out: &mut [u8]) {
        let mut block_counter = seek / BLOCK_LEN as u64;
        let mut offset = (seek % BLOCK_LEN as u64) as usize;
        let mut written = 0;

        while written < out.len() {
            let block = self.root_output_block(block_counter);
            let take = (BLOCK_LEN - offset).min(out.len() - written);
            out[written..written + take].copy_from_slice(&block[offset..offset + take]);
            written += take;
            offset = 0;
            block_counter += 1;
        }
    }
}

/// Reader over the unbounded root output stream (XOF).
///
/// Produced by [`Hasher::finalize_xof`](crate::Hasher::finalize_xof). The
/// reader keeps a position that can be moved freely; reading never fails.
#[derive(Clone)]
pub struct OutputReader {
    inner: Output,
    position: u64,
}

impl OutputReader {
    pub(crate) fn new(inner: Output) -> Self {
        Self { inner, position: 0 }
    }

    /// Fill `buf` with the next output bytes and advance the position.
    pub fn fill(&mut self, buf: &mut [u8]) {
        self.inner.root_output_bytes(self.position, buf);
        self.position += buf.len() as u64;
    }

    /// Current byte offset into the output stream
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move to an absolute byte offset
    pub fn set_position(&mut self, position: u64) {
        self.position = position;
    }
}

impl core::fmt::Debug for OutputReader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutputReader")
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "std")]
impl std::io::Read for OutputReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.fill(buf);
        Ok(buf.len())
    }
}

#[cfg(feature = "std")]
impl std::io::Seek for OutputReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        use std::io::{Error, ErrorKind, SeekFrom};

        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
            SeekFrom::End(_) => {
                return Err(Error::new(
                    ErrorKind::Unsupported,
                    "output stream has no end",
                ));
            }
        };

        match target {
            Some(position) => {
                self.position = position;
                Ok(position)
            }
            None => Err(Error::new(
                ErrorKind::InvalidInput,
                "seek outside the output stream",
            )),
        }
    }
}
