// SPDX-FileCopyrightText: 2024 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// The padding length is stored in a single byte.
pub const MAX_BLOCK_LEN: usize = u8::MAX as usize;

fn check_block_len(block_len: usize) -> Result<u8> {
    match u8::try_from(block_len) {
        Ok(n) if n != 0 => Ok(n),
        _ => Err(Error::InvalidBlockLength(block_len)),
    }
}

/// Append PKCS#7 padding to `data` so that its length becomes a multiple of
/// `block_len`. Padding is always added. Data that is already aligned gets a
/// full block of padding.
pub fn pkcs7_pad(data: &[u8], block_len: usize) -> Result<Vec<u8>> {
    let block_len = check_block_len(block_len)?;
    let pad_len = block_len - (data.len() % usize::from(block_len)) as u8;

    trace!("Padding {} bytes with {pad_len} bytes", data.len());

    let mut padded = Vec::with_capacity(data.len() + usize::from(pad_len));
    padded.extend_from_slice(data);
    padded.resize(data.len() + usize::from(pad_len), pad_len);

    Ok(padded)
}

/// Strip PKCS#7 padding from `data`, returning the unpadded prefix. Every byte
/// of the claimed padding region is checked.
pub fn pkcs7_unpad(data: &[u8], block_len: usize) -> Result<&[u8]> {
    unpad_len(data, block_len)
        .map(|n| &data[..data.len() - n])
        .inspect_err(|e| debug!("Rejected PKCS#7 padding: {e}"))
}

fn unpad_len(data: &[u8], block_len: usize) -> Result<usize> {
    let block_len = usize::from(check_block_len(block_len)?);

    // Must come before looking at the last byte.
    let Some(&pad_len) = data.last() else {
        return Err(Error::EmptyData);
    };
    if data.len() % block_len != 0 {
        return Err(Error::MisalignedData {
            len: data.len(),
            block_len,
        });
    }

    if pad_len == 0 || usize::from(pad_len) > block_len {
        return Err(Error::InvalidPaddingLength {
            len: data.len(),
            pad_len,
            block_len,
        });
    }

    let padding = &data[data.len() - usize::from(pad_len)..];
    if padding.iter().any(|&b| b != pad_len) {
        return Err(Error::InconsistentPadding {
            len: data.len(),
            pad_len,
        });
    }

    Ok(usize::from(pad_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_empty() {
        let padded = pkcs7_pad(b"", 16).unwrap();
        assert_eq!(padded, [16u8; 16]);
        assert_eq!(pkcs7_unpad(&padded, 16).unwrap(), b"");
    }

    #[test]
    fn test_pad() {
        assert_eq!(
            pkcs7_pad(b"Hello, world!", 16).unwrap(),
            b"Hello, world!\x03\x03\x03",
        );
        assert_eq!(
            pkcs7_pad(b"YELLOW SUBMARINE", 20).unwrap(),
            b"YELLOW SUBMARINE\x04\x04\x04\x04",
        );

        // Aligned data gets a full extra block.
        assert_eq!(pkcs7_pad(b"abcd", 4).unwrap(), b"abcd\x04\x04\x04\x04");
        assert_eq!(pkcs7_pad(b"abc", 1).unwrap(), b"abc\x01");
        assert_eq!(
            pkcs7_pad(&[7u8; 255], 255).unwrap(),
            [[7u8; 255], [255u8; 255]].concat(),
        );
    }

    #[test]
    fn test_pad_invalid_block_len() {
        assert_eq!(
            pkcs7_pad(b"abc", 0).unwrap_err(),
            Error::InvalidBlockLength(0),
        );
        assert_eq!(
            pkcs7_pad(b"abc", 256).unwrap_err(),
            Error::InvalidBlockLength(256),
        );
        assert_eq!(
            pkcs7_pad(b"abc", usize::MAX).unwrap_err(),
            Error::InvalidBlockLength(usize::MAX),
        );
    }

    #[test]
    fn test_round_trip_all_block_lengths() {
        for block_len in 1..=MAX_BLOCK_LEN {
            for len in [0, 1, block_len - 1, block_len, block_len + 1, 2 * block_len] {
                let data = (0..len).map(|i| i as u8).collect::<Vec<_>>();
                let padded = pkcs7_pad(&data, block_len).unwrap();

                assert!(padded.len() > data.len());
                assert_eq!(padded.len() % block_len, 0);
                assert!(padded.len() - data.len() <= block_len);
                assert_eq!(pkcs7_unpad(&padded, block_len).unwrap(), data);
            }
        }
    }

    #[test]
    fn test_unpad_invalid_block_len() {
        // Checked before anything about the data.
        assert_eq!(
            pkcs7_unpad(b"", 0).unwrap_err(),
            Error::InvalidBlockLength(0),
        );
        assert_eq!(
            pkcs7_unpad(&[1u8; 256], 256).unwrap_err(),
            Error::InvalidBlockLength(256),
        );
    }

    #[test]
    fn test_unpad_bad_length() {
        assert_eq!(pkcs7_unpad(b"", 16).unwrap_err(), Error::EmptyData);
        assert_eq!(
            pkcs7_unpad(&[1u8; 15], 16).unwrap_err(),
            Error::MisalignedData {
                len: 15,
                block_len: 16,
            },
        );
        assert_eq!(
            pkcs7_unpad(&[1u8; 17], 16).unwrap_err(),
            Error::MisalignedData {
                len: 17,
                block_len: 16,
            },
        );
    }

    #[test]
    fn test_unpad_zero_pad_len() {
        assert_eq!(
            pkcs7_unpad(&[0u8; 16], 16).unwrap_err(),
            Error::InvalidPaddingLength {
                len: 16,
                pad_len: 0,
                block_len: 16,
            },
        );

        let mut data = [16u8; 32];
        data[31] = 0;
        assert!(matches!(
            pkcs7_unpad(&data, 16).unwrap_err(),
            Error::InvalidPaddingLength { pad_len: 0, .. },
        ));
    }

    #[test]
    fn test_unpad_pad_len_exceeds_block() {
        assert_eq!(
            pkcs7_unpad(&[17u8; 32], 16).unwrap_err(),
            Error::InvalidPaddingLength {
                len: 32,
                pad_len: 17,
                block_len: 16,
            },
        );
    }

    #[test]
    fn test_unpad_inconsistent() {
        let data = pkcs7_pad(b"0123456789", 16).unwrap();
        let pad_len = data.len() - 10;

        // Flipping any byte of the padding other than the last one must be
        // detected. The last byte changes the claimed length instead.
        for i in data.len() - pad_len..data.len() - 1 {
            let mut corrupt = data.clone();
            corrupt[i] ^= 0x40;

            assert_eq!(
                pkcs7_unpad(&corrupt, 16).unwrap_err(),
                Error::InconsistentPadding {
                    len: 16,
                    pad_len: pad_len as u8,
                },
            );
        }

        let mut corrupt = data.clone();
        corrupt[15] = 5;
        assert!(pkcs7_unpad(&corrupt, 16).is_err());
    }

    #[test]
    fn test_unpad_flip_any_padding_byte() {
        for block_len in [1, 2, 8, 16, 32, 255] {
            for len in 0..block_len {
                let data = vec![0xa5u8; len];
                let padded = pkcs7_pad(&data, block_len).unwrap();

                // A flip in the last byte may legitimately turn it into 1.
                for i in len..padded.len() - 1 {
                    for bit in 0..8 {
                        let mut corrupt = padded.clone();
                        corrupt[i] ^= 1 << bit;

                        assert!(
                            pkcs7_unpad(&corrupt, block_len).is_err(),
                            "block_len={block_len} len={len} i={i} bit={bit}",
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_unpad_full_block() {
        assert_eq!(pkcs7_unpad(&[4u8; 4], 4).unwrap(), b"");
        assert_eq!(pkcs7_unpad(b"abc\x01", 4).unwrap(), b"abc");
        assert_eq!(pkcs7_unpad(b"abcd\x01", 1).unwrap(), b"abcd");
    }
}
