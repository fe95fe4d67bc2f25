//! Cipherbox - digests, HMACs, checksums and DES/AES block encryption
//!
//! Every operation is a stateless function of its inputs: algorithm
//! identifiers and raw key/IV bytes in, raw bytes or lowercase hex out.

#![forbid(unsafe_code)]

pub mod cipher;
pub mod digest;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod file_ops;
pub mod key;

pub use crate::cipher::{BlockMode, CipherFamily, CipherMethod, CipherOptions, Padding};
pub use crate::digest::DigestAlgorithm;
pub use crate::encoding::{OutputEncoding, base64_decode, base64_encode, hex_decode, hex_encode};
pub use crate::engine::{
    checksum, decrypt, decrypt_with_options, digest, encrypt, encrypt_with_options, hmac,
};
pub use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
