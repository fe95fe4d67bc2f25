//! Text encodings for binary data
//!
//! Engine results are either handed back as raw bytes or as lowercase
//! hexadecimal text. Base64 uses the standard alphabet with padding.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};

/// How a result (or a ciphertext input) is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputEncoding {
    /// Lowercase hexadecimal text.
    #[default]
    Hex,
    /// The bytes themselves, no transcoding.
    Raw,
}

impl OutputEncoding {
    /// Maps a "raw" flag to an encoding: `true` is `Raw`, `false` is `Hex`.
    pub fn from_raw_flag(raw: bool) -> Self {
        if raw { Self::Raw } else { Self::Hex }
    }

    /// Represent `bytes` in this encoding.
    pub fn encode(self, bytes: Vec<u8>) -> Vec<u8> {
        match self {
            Self::Hex => hex_encode(&bytes).into_bytes(),
            Self::Raw => bytes,
        }
    }

    /// Turn data represented in this encoding back into bytes.
    pub fn decode(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Hex => hex_decode(data),
            Self::Raw => Ok(data.to_vec()),
        }
    }
}

/// Lowercase hexadecimal encoding.
pub fn hex_encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hexadecimal text (either case).
pub fn hex_decode(text: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    hex::decode(text).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Decode,
            "hex decoding failed",
            e,
        )
    })
}

/// Standard-alphabet base64 with padding.
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard-alphabet base64.
pub fn base64_decode(text: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    STANDARD.decode(text).map_err(|e| {
        CipherboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Decode,
            "base64 decoding failed",
            e,
        )
    })
}
