//! Where cipher and HMAC keys come from
//!
//! Keys are raw bytes sized for the chosen primitive. Every source hands them
//! back as a [`Key`], which wipes its buffer when dropped.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::encoding::hex_decode;
use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};

/// Key bytes, zeroed on drop.
pub type Key = Zeroizing<Vec<u8>>;

/// Something a key can be fetched from.
pub trait KeySource {
    fn fetch_key(&mut self) -> Result<Key>;
}

impl<S: KeySource + ?Sized> KeySource for Box<S> {
    fn fetch_key(&mut self) -> Result<Key> {
        (**self).fetch_key()
    }
}

/// A key held in memory and handed out unchanged on every fetch.
pub struct FixedKey(Key);

impl FixedKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }
}

impl KeySource for FixedKey {
    fn fetch_key(&mut self) -> Result<Key> {
        Ok(self.0.clone())
    }
}

/// Everything a reader yields up to end of input, taken verbatim.
///
/// Nothing is trimmed, so `echo key | cipherbox --key-stdin ...` uses a key
/// that ends in a newline.
pub struct StreamKey<R> {
    input: R,
}

impl<R: Read> StreamKey<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: Read> KeySource for StreamKey<R> {
    fn fetch_key(&mut self) -> Result<Key> {
        let mut key = Zeroizing::new(Vec::new());
        match self.input.read_to_end(&mut key) {
            Ok(_) => Ok(key),
            Err(e) => Err(io_failure(ErrorKind::Io, "could not read key input", e)),
        }
    }
}

/// Asks for the key on the controlling terminal with echo turned off.
///
/// Typed keys are limited to UTF-8 text. Binary keys go through `--key-hex`
/// or `--key-stdin`.
pub struct PromptKey {
    prompt: String,
}

impl PromptKey {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for PromptKey {
    fn default() -> Self {
        Self::new("Key (cipherbox): ")
    }
}

impl KeySource for PromptKey {
    fn fetch_key(&mut self) -> Result<Key> {
        if !io::stdin().is_terminal() {
            return Err(CipherboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::KeyUnavailable,
                "cannot prompt for a key: stdin is not a terminal",
            ));
        }

        match rpassword::prompt_password(&self.prompt) {
            Ok(typed) => Ok(Zeroizing::new(typed.into_bytes())),
            Err(e) => Err(io_failure(
                ErrorKind::KeyUnavailable,
                "could not read key from terminal",
                e,
            )),
        }
    }
}

/// Hex-decodes the text fetched from an inner source.
///
/// ASCII whitespace around the digits is dropped first.
pub struct HexKey<S> {
    inner: S,
}

impl<S: KeySource> HexKey<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: KeySource> KeySource for HexKey<S> {
    fn fetch_key(&mut self) -> Result<Key> {
        let text = self.inner.fetch_key()?;
        hex_decode(text.trim_ascii())
            .map(Zeroizing::new)
            .map_err(|e| e.with_context("invalid hex key"))
    }
}

fn io_failure(kind: ErrorKind, message: &str, source: io::Error) -> CipherboxError {
    CipherboxError::with_kind_and_source(ErrorCategory::Internal, kind, message, source)
}
