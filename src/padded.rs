// SPDX-FileCopyrightText: 2024 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! CBC mode combined with PKCS#7 padding.
//!
//! There is no integrity check. A wrong key and corrupted ciphertext both
//! surface as a padding error (or, rarely, as garbage plaintext).

use crate::{
    cbc,
    error::{Result, Stage},
    padding,
    primitive::{Aes, BlockCipher},
};

/// Pad `plaintext` to the cipher's block size and encrypt it.
pub fn encrypt_padded_with<C: BlockCipher + ?Sized>(
    cipher: &C,
    plaintext: &[u8],
    iv: &[u8],
) -> Result<Vec<u8>> {
    let block_size = cbc::block_size_of(cipher).map_err(|e| e.in_stage(Stage::Pad))?;
    let padded =
        padding::pkcs7_pad(plaintext, block_size).map_err(|e| e.in_stage(Stage::Pad))?;

    cbc::encrypt_with(cipher, &padded, iv).map_err(|e| e.in_stage(Stage::Encrypt))
}

/// Decrypt `ciphertext` and strip the PKCS#7 padding.
pub fn decrypt_padded_with<C: BlockCipher + ?Sized>(
    cipher: &C,
    ciphertext: &[u8],
    iv: &[u8],
) -> Result<Vec<u8>> {
    let mut data =
        cbc::decrypt_with(cipher, ciphertext, iv).map_err(|e| e.in_stage(Stage::Decrypt))?;
    let block_size = cbc::block_size_of(cipher).map_err(|e| e.in_stage(Stage::Unpad))?;
    let len = padding::pkcs7_unpad(&data, block_size)
        .map_err(|e| e.in_stage(Stage::Unpad))?
        .len();

    data.truncate(len);

    Ok(data)
}

/// Pad `plaintext` and encrypt it with AES. The AES variant is selected by the
/// key length.
pub fn encrypt_padded(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes::new(key).map_err(|e| e.in_stage(Stage::Encrypt))?;
    encrypt_padded_with(&cipher, plaintext, iv)
}

/// Decrypt `ciphertext` with AES and strip the padding. The AES variant is
/// selected by the key length.
pub fn decrypt_padded(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes::new(key).map_err(|e| e.in_stage(Stage::Decrypt))?;
    decrypt_padded_with(&cipher, ciphertext, iv)
}
