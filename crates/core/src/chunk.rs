//! Per-chunk state: up to 1024 bytes compressed block by block

use crate::compress::compress_in_place;
use crate::output::Output;
use crate::params::{BLOCK_LEN, CHUNK_END, CHUNK_START};

#[derive(Clone, Debug)]
pub(crate) struct ChunkState {
    cv: [u32; 8],
    chunk_counter: u64,
    buf: [u8; BLOCK_LEN],
    buf_len: u8,
    blocks_compressed: u8,
    flags: u8,
}

impl ChunkState {
    pub(crate) fn new(key: &[u32; 8], chunk_counter: u64, flags: u8) -> Self {
        Self {
            cv: *key,
            chunk_counter,
            buf: [0u8; BLOCK_LEN],
            buf_len: 0,
            blocks_compressed: 0,
            flags,
        }
    }

    /// Bytes absorbed by this chunk so far
    pub(crate) fn len(&self) -> usize {
        BLOCK_LEN * self.blocks_compressed as usize + self.buf_len as usize
    }

    pub(crate) fn chunk_counter(&self) -> u64 {
        self.chunk_counter
    }

    pub(crate) fn flags(&self) -> u8 {
        self.flags
    }

    fn start_flag(&self) -> u8 {
        if self.blocks_compressed == 0 {
            CHUNK_START
        } else {
            0
        }
    }

    fn fill_buf(&mut self, input: &[u8]) -> usize {
        let start = self.buf_len as usize;
        let take = (BLOCK_LEN - start).min(input.len());
        self.buf[start..start + take].copy_from_slice(&input[..take]);
        self.buf_len += take as u8;
        take
    }

    fn compress_block(&mut self, block: &[u8; BLOCK_LEN]) {
        let flags = self.flags | self.start_flag();
        compress_in_place(
            &mut self.cv,
            block,
            BLOCK_LEN as u8,
            self.chunk_counter,
            flags,
        );
        self.blocks_compressed += 1;
    }

    /// Absorb `input`. The caller keeps the chunk at or under 1024 bytes.
    ///
    /// A full block is only compressed once more input follows it, so the
    /// final block always reaches [`output`](Self::output) uncompressed.
    pub(crate) fn update(&mut self, mut input: &[u8]) {
        if self.buf_len > 0 {
            let take = self.fill_buf(input);
            input = &input[take..];
            if !input.is_empty() {
                let block = self.buf;
                self.compress_block(&block);
                self.buf = [0u8; BLOCK_LEN];
                self.buf_len = 0;
            }
        }

        while input.len() > BLOCK_LEN {
            let (block, rest) = input.split_at(BLOCK_LEN);
            let mut window = [0u8; BLOCK_LEN];
            window.copy_from_slice(block);
            self.compress_block(&window);
            input = rest;
        }

        self.fill_buf(input);
        debug_assert!(self.blocks_compressed < 16);
    }

    /// The chunk's last block as a pending node
    pub(crate) fn output(&self) -> Output {
        Output::new(
            self.cv,
            self.buf,
            self.buf_len,
            self.chunk_counter,
            self.flags | self.start_flag() | CHUNK_END,
        )
    }
}
