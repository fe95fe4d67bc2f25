//! File encryption/decryption and file digests
//!
//! High-level operations used by the command-line tool. Output files are
//! written through a temporary file in the destination directory and renamed
//! into place, so a failed run never leaves a partial file behind.

use crate::cipher::{self, CipherMethod, CipherOptions};
use crate::digest::{self, DigestAlgorithm};
use crate::encoding::{self, OutputEncoding};
use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};
use crate::key::KeySource;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path;

/// Encrypt a file
///
/// Reads plaintext from `input_path`, encrypts it with the key from
/// `key_source`, and writes the ciphertext (hex unless `options.raw_data`)
/// to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    method: CipherMethod,
    iv: &[u8],
    options: &CipherOptions,
    key_source: &mut dyn KeySource,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let key = key_source.fetch_key()?;
    log::debug!(
        "encrypting {} ({} bytes) with {}",
        input_path.display(),
        plaintext.len(),
        method
    );
    let ciphertext = cipher::encrypt(&plaintext, method, &key, iv, options)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, &ciphertext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Decrypt a file
///
/// Reads ciphertext (hex unless `options.raw_data`) from `input_path`,
/// decrypts it with the key from `key_source`, and writes the plaintext to
/// `output_path`. Surrounding ASCII whitespace in hex input is ignored.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    method: CipherMethod,
    iv: &[u8],
    options: &CipherOptions,
    key_source: &mut dyn KeySource,
) -> Result<()> {
    let data = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let data = match options.encoding() {
        OutputEncoding::Hex => data.trim_ascii(),
        OutputEncoding::Raw => &data[..],
    };
    let key = key_source.fetch_key()?;
    log::debug!(
        "decrypting {} ({} bytes) with {}",
        input_path.display(),
        data.len(),
        method
    );
    let plaintext = cipher::decrypt(data, method, &key, iv, options)
        .map_err(|e| e.with_context("failed to decrypt"))?;
    write_file_secure(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Digest a file without loading it into memory.
pub fn digest_file(path: &Path, algorithm: DigestAlgorithm) -> Result<Vec<u8>> {
    log::debug!("{} of {}", algorithm, path.display());
    let file = open_input(path)?;
    algorithm
        .digest_reader(BufReader::new(file))
        .map_err(|e| e.with_context(format!("failed to digest {}", path.display())))
}

/// HMAC of a file without loading it into memory.
pub fn hmac_file(
    path: &Path,
    algorithm: DigestAlgorithm,
    key_source: &mut dyn KeySource,
) -> Result<Vec<u8>> {
    let key = key_source.fetch_key()?;
    log::debug!("HMAC-{} of {}", algorithm, path.display());
    let file = open_input(path)?;
    algorithm
        .hmac_reader(&key, BufReader::new(file))
        .map_err(|e| e.with_context(format!("failed to authenticate {}", path.display())))
}

/// CRC32 of a file without loading it into memory.
pub fn checksum_file(path: &Path) -> Result<[u8; 4]> {
    log::debug!("crc32 of {}", path.display());
    let file = open_input(path)?;
    digest::checksum_reader(BufReader::new(file))
        .map_err(|e| e.with_context(format!("failed to checksum {}", path.display())))
}

/// Base64-encode a file.
pub fn base64_encode_file(input_path: &Path, output_path: &Path) -> Result<()> {
    let data = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let encoded = encoding::base64_encode(&data);
    write_file_secure(output_path, encoded.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))
}

/// Base64-decode a file. Surrounding ASCII whitespace is ignored.
pub fn base64_decode_file(input_path: &Path, output_path: &Path) -> Result<()> {
    let data = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let decoded = encoding::base64_decode(data.trim_ascii())
        .map_err(|e| e.with_context(format!("failed to decode {}", input_path.display())))?;
    write_file_secure(output_path, &decoded)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| read_error(path, e))
}

/// Write file atomically with secure permissions (0o600 on Unix)
///
/// The contents go to a tempfile next to `path`, which is flushed, synced
/// and then renamed over `path`.
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        Some(_) => Path::new("."),
        None => {
            return Err(CipherboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::Io,
                "output path has no parent directory",
            ));
        }
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    temp_file.write_all(contents).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file.flush().map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    // NamedTempFile is already created 0o600 on Unix; make it explicit.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                CipherboxError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file.persist(path).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> CipherboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    CipherboxError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
