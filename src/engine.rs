//! String-keyed entry points
//!
//! These take algorithm identifiers as text, resolve them once into
//! [`DigestAlgorithm`] or [`CipherMethod`], and hand back either raw bytes or
//! lowercase hex. They are the surface an embedding host binds to.

use crate::cipher::{CipherMethod, CipherOptions};
use crate::digest::DigestAlgorithm;
use crate::encoding::OutputEncoding;
use crate::error::Result;

/// Digest `data` with `algorithm` (`md5`, `sha1`, `sha256` or `sha512`).
pub fn digest(algorithm: &str, data: &[u8], raw: bool) -> Result<Vec<u8>> {
    let algorithm: DigestAlgorithm = algorithm.parse()?;
    Ok(OutputEncoding::from_raw_flag(raw).encode(algorithm.digest(data)))
}

/// HMAC of `data` under `key`, with `algorithm` as the hash.
pub fn hmac(algorithm: &str, data: &[u8], key: &[u8], raw: bool) -> Result<Vec<u8>> {
    let algorithm: DigestAlgorithm = algorithm.parse()?;
    let mac = algorithm.hmac(key, data)?;
    Ok(OutputEncoding::from_raw_flag(raw).encode(mac))
}

/// CRC32 (IEEE) of `data`, big-endian.
pub fn checksum(data: &[u8], raw: bool) -> Result<Vec<u8>> {
    Ok(OutputEncoding::from_raw_flag(raw).encode(crate::digest::checksum(data).to_vec()))
}

/// Encrypt with PKCS#7 padding; the ciphertext is hex unless `raw_output` is set.
pub fn encrypt(
    data: &[u8],
    method: &str,
    key: &[u8],
    iv: &[u8],
    raw_output: bool,
) -> Result<Vec<u8>> {
    let options = CipherOptions {
        raw_data: raw_output,
        ..Default::default()
    };
    encrypt_with_options(data, method, key, iv, &options)
}

/// Decrypt PKCS#7-padded ciphertext given as hex, or as raw bytes if `raw_input` is set.
pub fn decrypt(
    data: &[u8],
    method: &str,
    key: &[u8],
    iv: &[u8],
    raw_input: bool,
) -> Result<Vec<u8>> {
    let options = CipherOptions {
        raw_data: raw_input,
        ..Default::default()
    };
    decrypt_with_options(data, method, key, iv, &options)
}

pub fn encrypt_with_options(
    data: &[u8],
    method: &str,
    key: &[u8],
    iv: &[u8],
    options: &CipherOptions,
) -> Result<Vec<u8>> {
    let method: CipherMethod = method.parse()?;
    crate::cipher::encrypt(data, method, key, iv, options)
}

pub fn decrypt_with_options(
    data: &[u8],
    method: &str,
    key: &[u8],
    iv: &[u8],
    options: &CipherOptions,
) -> Result<Vec<u8>> {
    let method: CipherMethod = method.parse()?;
    crate::cipher::decrypt(data, method, key, iv, options)
}
