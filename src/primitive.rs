// SPDX-FileCopyrightText: 2024 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use cipher::{BlockDecrypt, BlockEncrypt, KeyInit, generic_array::GenericArray};
use tracing::debug;

use crate::error::{Error, Result};

pub const AES_BLOCK_SIZE: usize = 16;
pub const AES_KEY_SIZES: [usize; 3] = [16, 24, 32];

/// A keyed, invertible transform over fixed-size blocks.
///
/// The slices passed to [`Self::encrypt_block`] and [`Self::decrypt_block`]
/// are always exactly [`Self::block_size`] bytes long. Implementations may
/// panic if an internal invariant is violated. Callers in this crate trap
/// those panics and report them as [`Error::UnexpectedFault`].
pub trait BlockCipher {
    fn block_size(&self) -> usize;

    fn encrypt_block(&self, block: &mut [u8]);

    fn decrypt_block(&self, block: &mut [u8]);
}

/// AES with the variant selected by key length.
#[derive(Clone)]
pub enum Aes {
    Aes128(aes::Aes128),
    Aes192(aes::Aes192),
    Aes256(aes::Aes256),
}

impl Aes {
    /// The key length is checked before the key schedule is computed.
    pub fn new(key: &[u8]) -> Result<Self> {
        let cipher = match key.len() {
            16 => aes::Aes128::new_from_slice(key).map(Self::Aes128),
            24 => aes::Aes192::new_from_slice(key).map(Self::Aes192),
            32 => aes::Aes256::new_from_slice(key).map(Self::Aes256),
            n => {
                debug!("Unsupported AES key length: {n} bytes");
                return Err(Error::InvalidKeyLength(n));
            }
        };

        cipher.map_err(|_| Error::InvalidKeyLength(key.len()))
    }

    pub fn key_size(&self) -> usize {
        match self {
            Self::Aes128(_) => 16,
            Self::Aes192(_) => 24,
            Self::Aes256(_) => 32,
        }
    }
}

impl fmt::Debug for Aes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aes")
            .field("key_size", &self.key_size())
            .finish_non_exhaustive()
    }
}

impl BlockCipher for Aes {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        let block = GenericArray::from_mut_slice(block);

        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes192(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        let block = GenericArray::from_mut_slice(block);

        match self {
            Self::Aes128(c) => c.decrypt_block(block),
            Self::Aes192(c) => c.decrypt_block(block),
            Self::Aes256(c) => c.decrypt_block(block),
        }
    }
}
