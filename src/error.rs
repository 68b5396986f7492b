// SPDX-FileCopyrightText: 2024 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The arguments were malformed: bad block length, misaligned buffer, bad
    /// key or IV size, or corrupt padding.
    InvalidInput,
    /// The block cipher primitive faulted while processing a valid request.
    UnexpectedFault,
}

/// Step of a padded operation that produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Pad,
    Encrypt,
    Decrypt,
    Unpad,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pad => "pad",
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::Unpad => "unpad",
        })
    }
}

/// Messages only ever contain lengths and padding values. Key, IV, and data
/// bytes are never included.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid block length: {0} is not in [1, 255]")]
    InvalidBlockLength(usize),
    #[error("Data is empty")]
    EmptyData,
    #[error("Data length {len} is not a multiple of block length {block_len}")]
    MisalignedData { len: usize, block_len: usize },
    #[error("Invalid padding for {len} bytes: length {pad_len} is 0 or exceeds block length {block_len}")]
    InvalidPaddingLength {
        len: usize,
        pad_len: u8,
        block_len: usize,
    },
    #[error("Invalid padding for {len} bytes: last {pad_len} bytes are not all {pad_len}")]
    InconsistentPadding { len: usize, pad_len: u8 },
    #[error("Invalid key length: {0} bytes")]
    InvalidKeyLength(usize),
    #[error("Invalid IV length: {len} bytes, expected {expected}")]
    InvalidIvLength { len: usize, expected: usize },
    #[error("Recovered from block cipher fault: {0}")]
    UnexpectedFault(String),
    #[error("Failed to {stage} data")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedFault(_) => ErrorKind::UnexpectedFault,
            Self::Stage { source, .. } => source.kind(),
            _ => ErrorKind::InvalidInput,
        }
    }

    /// Wrap this error with the step of a padded operation that produced it.
    pub(crate) fn in_stage(self, stage: Stage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
