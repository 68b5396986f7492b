// SPDX-FileCopyrightText: 2024 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! AES-CBC encryption and decryption with PKCS#7 padding.
//!
//! All operations are stateless functions over byte slices. Failures are
//! reported as [`Error`]s and never as panics, including faults raised inside
//! the block cipher itself. Nothing here provides integrity protection.

pub mod cbc;
pub mod error;
pub mod padded;
pub mod padding;
pub mod primitive;

pub use crate::{
    cbc::{decrypt, decrypt_with, encrypt, encrypt_with},
    error::{Error, ErrorKind, Result, Stage},
    padded::{decrypt_padded, decrypt_padded_with, encrypt_padded, encrypt_padded_with},
    padding::{MAX_BLOCK_LEN, pkcs7_pad, pkcs7_unpad},
    primitive::{AES_BLOCK_SIZE, AES_KEY_SIZES, Aes, BlockCipher},
};
