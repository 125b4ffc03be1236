//! C FFI bindings for native miner hosts
//!
//! Mirrors the engine and header-mining entry points with raw pointers.
//! Null pointers make every call a no-op (or `false`).

use crate::{Hasher, calculate, check_difficulty, hash};
use crate::params::{HASH_SIZE, HEADER_SIZE, KEY_LEN};
use core::slice;

/// Opaque hasher handle for FFI
pub struct B3Hasher {
    inner: Hasher,
}

/// Create a default-mode hasher
/// Returns a pointer to the hasher (caller must free with blake3dcr_hasher_free)
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_hasher_new() -> *mut B3Hasher {
    Box::into_raw(Box::new(B3Hasher {
        inner: Hasher::new(),
    }))
}

/// Create a keyed hasher from a 32-byte key
/// Returns null if `key` is null
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_hasher_new_keyed(key: *const u8) -> *mut B3Hasher {
    if key.is_null() {
        return core::ptr::null_mut();
    }

    let key = unsafe { &*(key as *const [u8; KEY_LEN]) };
    Box::into_raw(Box::new(B3Hasher {
        inner: Hasher::new_keyed(key),
    }))
}

/// Create a key-derivation hasher from a `context_len`-byte context
/// Returns null if `context` is null and `context_len` is non-zero
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_hasher_new_derive_key(
    context: *const u8,
    context_len: usize,
) -> *mut B3Hasher {
    if context.is_null() && context_len > 0 {
        return core::ptr::null_mut();
    }

    let context = if context_len == 0 {
        &[][..]
    } else {
        unsafe { slice::from_raw_parts(context, context_len) }
    };
    Box::into_raw(Box::new(B3Hasher {
        inner: Hasher::new_derive_key_raw(context),
    }))
}

/// Free a hasher instance
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_hasher_free(hasher: *mut B3Hasher) {
    if !hasher.is_null() {
        unsafe {
            let _ = Box::from_raw(hasher);
        }
    }
}

/// Absorb `input_len` bytes
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_hasher_update(
    hasher: *mut B3Hasher,
    input: *const u8,
    input_len: usize,
) {
    if hasher.is_null() || (input.is_null() && input_len > 0) {
        return;
    }

    unsafe {
        let hasher = &mut *hasher;
        if input_len > 0 {
            hasher.inner.update(slice::from_raw_parts(input, input_len));
        }
    }
}

/// Write output bytes `[seek, seek + out_len)` to `out`
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_hasher_finalize_seek(
    hasher: *const B3Hasher,
    seek: u64,
    out: *mut u8,
    out_len: usize,
) {
    if hasher.is_null() || out.is_null() || out_len == 0 {
        return;
    }

    unsafe {
        let hasher = &*hasher;
        let out = slice::from_raw_parts_mut(out, out_len);
        hasher.inner.finalize_seek(seek, out);
    }
}

/// Forget all input, keeping key and mode
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_hasher_reset(hasher: *mut B3Hasher) {
    if !hasher.is_null() {
        unsafe {
            (*hasher).inner.reset();
        }
    }
}

/// One-shot hash of `input_len` bytes into a 32-byte `output`
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_hash(input: *const u8, input_len: usize, output: *mut u8) {
    if output.is_null() || (input.is_null() && input_len > 0) {
        return;
    }

    unsafe {
        let input = if input_len == 0 {
            &[][..]
        } else {
            slice::from_raw_parts(input, input_len)
        };
        let result = hash(input);
        slice::from_raw_parts_mut(output, HASH_SIZE).copy_from_slice(&result);
    }
}

/// Hash a 180-byte header with `nonce` at offset 140
/// - header: pointer to 180 bytes (not modified)
/// - output: pointer to 32-byte buffer for result
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_calculate(header: *const u8, nonce: u32, output: *mut u8) {
    if header.is_null() || output.is_null() {
        return;
    }

    unsafe {
        let header = &*(header as *const [u8; HEADER_SIZE]);
        let result = calculate(header, nonce);
        slice::from_raw_parts_mut(output, HASH_SIZE).copy_from_slice(&result);
    }
}

/// Returns true when the 32-byte big-endian `hash` is <= `target`
#[unsafe(no_mangle)]
pub extern "C" fn blake3dcr_check_difficulty(hash: *const u8, target: *const u8) -> bool {
    if hash.is_null() || target.is_null() {
        return false;
    }

    unsafe {
        let hash = &*(hash as *const [u8; HASH_SIZE]);
        let target = &*(target as *const [u8; HASH_SIZE]);
        check_difficulty(hash, target)
    }
}
