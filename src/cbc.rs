// SPDX-FileCopyrightText: 2024 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Raw CBC mode over block-aligned data. No padding is added or removed.

use std::{
    iter,
    panic::{self, AssertUnwindSafe},
};

use tracing::{debug, trace, warn};

use crate::{
    error::{Error, Result},
    primitive::{Aes, BlockCipher},
};

/// Run a closure that calls into the block cipher, converting a panic into
/// [`Error::UnexpectedFault`].
fn trap<T>(op: &str, f: impl FnOnce() -> T) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown fault".to_owned());

        warn!("Block cipher faulted during {op}: {message}");

        Error::UnexpectedFault(message)
    })
}

/// Query the cipher's block size, rejecting a size that no block-aligned
/// buffer could satisfy.
pub(crate) fn block_size_of<C: BlockCipher + ?Sized>(cipher: &C) -> Result<usize> {
    match trap("block size query", || cipher.block_size())? {
        0 => Err(Error::UnexpectedFault(
            "block cipher reported a block size of 0".to_owned(),
        )),
        n => Ok(n),
    }
}

fn check_lengths(data: &[u8], iv: &[u8], block_size: usize) -> Result<()> {
    if iv.len() != block_size {
        debug!("IV is {} bytes, but block size is {block_size}", iv.len());
        return Err(Error::InvalidIvLength {
            len: iv.len(),
            expected: block_size,
        });
    }

    if data.len() % block_size != 0 {
        debug!("Data is {} bytes, but block size is {block_size}", data.len());
        return Err(Error::MisalignedData {
            len: data.len(),
            block_len: block_size,
        });
    }

    Ok(())
}

fn xor_in_place(block: &mut [u8], other: &[u8]) {
    for (b, o) in block.iter_mut().zip(other) {
        *b ^= o;
    }
}

/// Encrypt block-aligned `plaintext` with any [`BlockCipher`]. The output has
/// the same length as the input.
pub fn encrypt_with<C: BlockCipher + ?Sized>(
    cipher: &C,
    plaintext: &[u8],
    iv: &[u8],
) -> Result<Vec<u8>> {
    let block_size = block_size_of(cipher)?;
    check_lengths(plaintext, iv, block_size)?;

    trace!("Encrypting {} blocks", plaintext.len() / block_size);

    let mut data = plaintext.to_vec();

    trap("encryption", || {
        for offset in (0..data.len()).step_by(block_size) {
            let (done, rest) = data.split_at_mut(offset);
            let prev = if offset == 0 {
                iv
            } else {
                &done[offset - block_size..]
            };
            let block = &mut rest[..block_size];

            xor_in_place(block, prev);
            cipher.encrypt_block(block);
        }
    })?;

    Ok(data)
}

/// Decrypt block-aligned `ciphertext` with any [`BlockCipher`]. The output has
/// the same length as the input.
pub fn decrypt_with<C: BlockCipher + ?Sized>(
    cipher: &C,
    ciphertext: &[u8],
    iv: &[u8],
) -> Result<Vec<u8>> {
    let block_size = block_size_of(cipher)?;
    check_lengths(ciphertext, iv, block_size)?;

    trace!("Decrypting {} blocks", ciphertext.len() / block_size);

    let mut data = ciphertext.to_vec();

    trap("decryption", || {
        let prevs = iter::once(iv).chain(ciphertext.chunks_exact(block_size));

        for (block, prev) in data.chunks_exact_mut(block_size).zip(prevs) {
            cipher.decrypt_block(block);
            xor_in_place(block, prev);
        }
    })?;

    Ok(data)
}

/// Encrypt block-aligned `plaintext` with AES. The AES variant is selected by
/// the key length.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes::new(key)?;
    encrypt_with(&cipher, plaintext, iv)
}

/// Decrypt block-aligned `ciphertext` with AES. The AES variant is selected by
/// the key length.
pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes::new(key)?;
    decrypt_with(&cipher, ciphertext, iv)
}
