//! DES and AES block encryption in ECB and CBC mode
//!
//! Supported methods:
//! - `des-ecb`: DES, 8-byte key, no IV
//! - `des-cbc`: DES, 8-byte key, 8-byte IV
//! - `aes-cbc`: AES-128/192/256 picked by key length (16/24/32 bytes), 16-byte IV
//!
//! Plaintext is padded to the block size before encryption (PKCS#7 unless
//! zero padding is asked for). On decryption the padding is validated before
//! it is stripped; a ciphertext whose padding does not check out is rejected
//! with [`ErrorKind::InvalidPadding`] and no plaintext is returned.

use std::fmt;
use std::str::FromStr;

use aes::{Aes128, Aes192, Aes256};
use cipher::block_padding::{Pkcs7, ZeroPadding};
use cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, InnerIvInit, KeyInit};
use des::Des;

use crate::encoding::OutputEncoding;
use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};

const DES_BLOCK_LEN: usize = 8;
const AES_BLOCK_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherFamily {
    Des,
    Aes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockMode {
    /// Every block on its own, no chaining.
    Ecb,
    /// Each block XORed with the previous ciphertext block (the IV for the
    /// first) before encryption.
    Cbc,
}

/// How plaintext is brought to a whole number of blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Padding {
    /// Append `n` bytes of value `n`; block-aligned input gets a full block.
    #[default]
    Pkcs7,
    /// Append zero bytes up to the block boundary, nothing if already aligned.
    ///
    /// Removal strips every trailing zero byte, so plaintext that itself ends
    /// in zero bytes does not survive a round trip.
    Zero,
}

/// The closed set of block cipher configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMethod {
    DesEcb,
    DesCbc,
    AesCbc,
}

impl CipherMethod {
    pub const ALL: [CipherMethod; 3] = [Self::DesEcb, Self::DesCbc, Self::AesCbc];

    /// The identifier this method is selected by.
    pub fn name(self) -> &'static str {
        match self {
            Self::DesEcb => "des-ecb",
            Self::DesCbc => "des-cbc",
            Self::AesCbc => "aes-cbc",
        }
    }

    pub fn family(self) -> CipherFamily {
        match self {
            Self::DesEcb | Self::DesCbc => CipherFamily::Des,
            Self::AesCbc => CipherFamily::Aes,
        }
    }

    pub fn mode(self) -> BlockMode {
        match self {
            Self::DesEcb => BlockMode::Ecb,
            Self::DesCbc | Self::AesCbc => BlockMode::Cbc,
        }
    }

    /// Block size in bytes; also the required IV length for CBC.
    pub fn block_size(self) -> usize {
        match self.family() {
            CipherFamily::Des => DES_BLOCK_LEN,
            CipherFamily::Aes => AES_BLOCK_LEN,
        }
    }

    pub fn requires_iv(self) -> bool {
        self.mode() == BlockMode::Cbc
    }

    /// Encrypt `plaintext`, returning raw ciphertext. `iv` is ignored in ECB mode.
    pub fn encrypt(
        self,
        plaintext: &[u8],
        key: &[u8],
        iv: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        match self {
            Self::DesEcb => ecb_encrypt::<Des>(self, key, plaintext, padding),
            Self::DesCbc => cbc_encrypt::<Des>(self, key, iv, plaintext, padding),
            Self::AesCbc => match key.len() {
                16 => cbc_encrypt::<Aes128>(self, key, iv, plaintext, padding),
                24 => cbc_encrypt::<Aes192>(self, key, iv, plaintext, padding),
                32 => cbc_encrypt::<Aes256>(self, key, iv, plaintext, padding),
                n => Err(invalid_key_length(self, n)),
            },
        }
    }

    /// Decrypt raw `ciphertext` and strip its padding. `iv` is ignored in ECB mode.
    pub fn decrypt(
        self,
        ciphertext: &[u8],
        key: &[u8],
        iv: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        match self {
            Self::DesEcb => ecb_decrypt::<Des>(self, key, ciphertext, padding),
            Self::DesCbc => cbc_decrypt::<Des>(self, key, iv, ciphertext, padding),
            Self::AesCbc => match key.len() {
                16 => cbc_decrypt::<Aes128>(self, key, iv, ciphertext, padding),
                24 => cbc_decrypt::<Aes192>(self, key, iv, ciphertext, padding),
                32 => cbc_decrypt::<Aes256>(self, key, iv, ciphertext, padding),
                n => Err(invalid_key_length(self, n)),
            },
        }
    }
}

impl fmt::Display for CipherMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherMethod {
    type Err = CipherboxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| {
                CipherboxError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::UnsupportedAlgorithm,
                    format!("unsupported encrypt method: {:?}", s),
                )
            })
    }
}

/// Caller-facing switches for [`encrypt`] and [`decrypt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CipherOptions {
    /// Exchange ciphertext as raw bytes instead of hexadecimal text.
    pub raw_data: bool,
    /// Use zero padding instead of PKCS#7.
    pub zero_padding: bool,
}

impl CipherOptions {
    /// Bit for [`CipherOptions::raw_data`] in the legacy options bitmask.
    pub const RAW_DATA: u32 = 1;
    /// Bit for [`CipherOptions::zero_padding`] in the legacy options bitmask.
    pub const ZERO_PADDING: u32 = 2;

    /// Read the legacy bitmask form. Unknown bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            raw_data: bits & Self::RAW_DATA != 0,
            zero_padding: bits & Self::ZERO_PADDING != 0,
        }
    }

    pub fn padding(&self) -> Padding {
        if self.zero_padding {
            Padding::Zero
        } else {
            Padding::Pkcs7
        }
    }

    pub fn encoding(&self) -> OutputEncoding {
        OutputEncoding::from_raw_flag(self.raw_data)
    }
}

/// Encrypt `plaintext` and encode the ciphertext as `options` ask (hex by default).
pub fn encrypt(
    plaintext: &[u8],
    method: CipherMethod,
    key: &[u8],
    iv: &[u8],
    options: &CipherOptions,
) -> Result<Vec<u8>> {
    let ciphertext = method.encrypt(plaintext, key, iv, options.padding())?;
    Ok(options.encoding().encode(ciphertext))
}

/// Decode `data` as `options` ask (hex by default) and decrypt it.
pub fn decrypt(
    data: &[u8],
    method: CipherMethod,
    key: &[u8],
    iv: &[u8],
    options: &CipherOptions,
) -> Result<Vec<u8>> {
    let ciphertext = options.encoding().decode(data)?;
    method.decrypt(&ciphertext, key, iv, options.padding())
}

fn new_block_cipher<C: KeyInit>(method: CipherMethod, key: &[u8]) -> Result<C> {
    C::new_from_slice(key).map_err(|_| invalid_key_length(method, key.len()))
}

fn ecb_encrypt<C>(
    method: CipherMethod,
    key: &[u8],
    plaintext: &[u8],
    padding: Padding,
) -> Result<Vec<u8>>
where
    C: KeyInit + BlockEncryptMut + BlockCipher,
{
    let cipher = new_block_cipher::<C>(method, key)?;
    Ok(pad_encrypt(cipher, plaintext, padding))
}

fn ecb_decrypt<C>(
    method: CipherMethod,
    key: &[u8],
    ciphertext: &[u8],
    padding: Padding,
) -> Result<Vec<u8>>
where
    C: KeyInit + BlockDecryptMut + BlockCipher,
{
    let cipher = new_block_cipher::<C>(method, key)?;
    unpad_decrypt(method, cipher, ciphertext, padding)
}

fn cbc_encrypt<C>(
    method: CipherMethod,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    padding: Padding,
) -> Result<Vec<u8>>
where
    C: KeyInit + BlockEncryptMut + BlockCipher,
{
    let cipher = new_block_cipher::<C>(method, key)?;
    let chain = cbc::Encryptor::<C>::inner_iv_slice_init(cipher, iv)
        .map_err(|_| invalid_iv_length(method, iv.len()))?;
    Ok(pad_encrypt(chain, plaintext, padding))
}

fn cbc_decrypt<C>(
    method: CipherMethod,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    padding: Padding,
) -> Result<Vec<u8>>
where
    C: KeyInit + BlockDecryptMut + BlockCipher,
{
    let cipher = new_block_cipher::<C>(method, key)?;
    let chain = cbc::Decryptor::<C>::inner_iv_slice_init(cipher, iv)
        .map_err(|_| invalid_iv_length(method, iv.len()))?;
    unpad_decrypt(method, chain, ciphertext, padding)
}

/// Pad and encrypt block by block; chaining, if any, is up to `encryptor`.
fn pad_encrypt<E: BlockEncryptMut>(encryptor: E, plaintext: &[u8], padding: Padding) -> Vec<u8> {
    match padding {
        Padding::Pkcs7 => encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        Padding::Zero => encryptor.encrypt_padded_vec_mut::<ZeroPadding>(plaintext),
    }
}

/// Decrypt block by block and remove validated padding; chaining, if any, is
/// up to `decryptor`.
fn unpad_decrypt<D: BlockDecryptMut>(
    method: CipherMethod,
    decryptor: D,
    ciphertext: &[u8],
    padding: Padding,
) -> Result<Vec<u8>> {
    let block_size = method.block_size();
    if ciphertext.len() % block_size != 0 {
        return Err(CipherboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedInputLength,
            format!(
                "ciphertext is not a multiple of the block size ({} bytes, block size {})",
                ciphertext.len(),
                block_size
            ),
        ));
    }
    // Zero blocks carry no padding to remove.
    if ciphertext.is_empty() {
        return Ok(Vec::new());
    }

    let plaintext = match padding {
        Padding::Pkcs7 => decryptor.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        Padding::Zero => decryptor.decrypt_padded_vec_mut::<ZeroPadding>(ciphertext),
    };
    plaintext.map_err(|_| {
        CipherboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidPadding,
            "invalid padding; wrong key or IV, or corrupt input",
        )
    })
}

fn invalid_key_length(method: CipherMethod, len: usize) -> CipherboxError {
    let expected = match method.family() {
        CipherFamily::Des => "8",
        CipherFamily::Aes => "16, 24 or 32",
    };
    CipherboxError::with_kind(
        ErrorCategory::User,
        ErrorKind::InvalidKeyLength,
        format!(
            "invalid key length {} for {}; expected {} bytes",
            len, method, expected
        ),
    )
}

fn invalid_iv_length(method: CipherMethod, len: usize) -> CipherboxError {
    CipherboxError::with_kind(
        ErrorCategory::User,
        ErrorKind::InvalidIvLength,
        format!(
            "invalid IV length {} for {}; expected {} bytes",
            len,
            method,
            method.block_size()
        ),
    )
}
