//! Digests, HMACs and CRC32 checksums
//!
//! Every call builds a fresh hasher, so nothing is shared between calls.
//! The streaming variants read a source to the end in fixed-size chunks.

use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::error::{CipherboxError, ErrorCategory, ErrorKind, Result};

/// Chunk size used when digesting a reader.
const READ_CHUNK_LEN: usize = 64 * 1024;

/// Unkeyed digest algorithms, also usable as the hash inside an HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// The identifier this algorithm is selected by.
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => Md5::digest(data).to_vec(),
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Digest everything `reader` yields.
    pub fn digest_reader<R: Read>(self, reader: R) -> Result<Vec<u8>> {
        match self {
            Self::Md5 => stream_digest::<Md5, R>(reader),
            Self::Sha1 => stream_digest::<Sha1, R>(reader),
            Self::Sha256 => stream_digest::<Sha256, R>(reader),
            Self::Sha512 => stream_digest::<Sha512, R>(reader),
        }
    }

    /// HMAC of `data` under `key`. Keys of any length are accepted; the HMAC
    /// construction hashes or zero-extends them itself.
    pub fn hmac(self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.hmac_reader(key, data)
    }

    /// HMAC of everything `reader` yields.
    pub fn hmac_reader<R: Read>(self, key: &[u8], reader: R) -> Result<Vec<u8>> {
        match self {
            Self::Md5 => stream_mac::<Hmac<Md5>, R>(self, key, reader),
            Self::Sha1 => stream_mac::<Hmac<Sha1>, R>(self, key, reader),
            Self::Sha256 => stream_mac::<Hmac<Sha256>, R>(self, key, reader),
            Self::Sha512 => stream_mac::<Hmac<Sha512>, R>(self, key, reader),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CipherboxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| {
                CipherboxError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::UnsupportedAlgorithm,
                    format!("unsupported algorithm: {:?}", s),
                )
            })
    }
}

/// CRC32 (IEEE polynomial) of `data`, most significant byte first.
pub fn checksum(data: &[u8]) -> [u8; 4] {
    crc32fast::hash(data).to_be_bytes()
}

/// CRC32 (IEEE polynomial) of everything `reader` yields.
pub fn checksum_reader<R: Read>(reader: R) -> Result<[u8; 4]> {
    let mut hasher = crc32fast::Hasher::new();
    read_chunks(reader, |chunk| hasher.update(chunk))?;
    Ok(hasher.finalize().to_be_bytes())
}

fn stream_digest<D: Digest, R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut hasher = D::new();
    read_chunks(reader, |chunk| hasher.update(chunk))?;
    Ok(hasher.finalize().to_vec())
}

fn stream_mac<M: Mac + KeyInit, R: Read>(
    algorithm: DigestAlgorithm,
    key: &[u8],
    reader: R,
) -> Result<Vec<u8>> {
    // HMAC accepts every key length, so this only fires if that ever changes.
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| {
        CipherboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidKeyLength,
            format!("invalid HMAC-{} key length {}", algorithm, key.len()),
        )
    })?;
    read_chunks(reader, |chunk| mac.update(chunk))?;
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Feed `reader` to `sink` until EOF.
fn read_chunks<R: Read>(mut reader: R, mut sink: impl FnMut(&[u8])) -> Result<()> {
    let mut buf = vec![0u8; READ_CHUNK_LEN];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => sink(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(CipherboxError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "error reading input",
                    e,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::hex_encode;

    const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog";

    fn hex_digest(alg: DigestAlgorithm, data: &[u8]) -> String {
        hex_encode(&alg.digest(data))
    }

    fn hex_hmac(alg: DigestAlgorithm, key: &[u8], data: &[u8]) -> String {
        hex_encode(&alg.hmac(key, data).unwrap())
    }

    /// Reader that fails after yielding a few bytes.
    struct BrokenReader {
        served: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::other("simulated read failure"));
            }
            self.served = true;
            buf[..3].copy_from_slice(b"abc");
            Ok(3)
        }
    }

    /// Reader that is interrupted once before each chunk.
    struct InterruptingReader<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for InterruptingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            let n = self.data.len().min(buf.len()).min(5);
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_md5() {
        assert_eq!(
            hex_digest(DigestAlgorithm::Md5, b""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            hex_digest(DigestAlgorithm::Md5, b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn test_sha1() {
        assert_eq!(
            hex_digest(DigestAlgorithm::Sha1, b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_sha256() {
        assert_eq!(
            hex_digest(DigestAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha512() {
        assert_eq!(
            hex_digest(DigestAlgorithm::Sha512, b"abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn test_output_len_matches_digest() {
        for alg in DigestAlgorithm::ALL {
            assert_eq!(alg.digest(b"x").len(), alg.output_len(), "{}", alg);
            assert_eq!(
                alg.hmac(b"k", b"x").unwrap().len(),
                alg.output_len(),
                "{}",
                alg
            );
        }
    }

    #[test]
    fn test_hmac_vectors() {
        assert_eq!(
            hex_hmac(DigestAlgorithm::Sha1, b"key", b"msg"),
            "102900b72b7bf1031eec76b4804b66052376896b"
        );
        assert_eq!(
            hex_hmac(DigestAlgorithm::Md5, b"key", FOX),
            "80070713463e7749b90c2dc24911e275"
        );
        assert_eq!(
            hex_hmac(DigestAlgorithm::Sha256, b"key", FOX),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
        assert_eq!(
            hex_hmac(DigestAlgorithm::Sha512, b"key", FOX),
            "b42af09057bac1e2d41708e48a902e09b5ff7f12ab428a4fe86653c73dd248fb82f948a549f7b791a5b41915ee4d1ec3935357e4e2317250d0372afa2ebeeb3a"
        );
    }

    #[test]
    fn test_hmac_empty_key_and_message() {
        assert_eq!(
            hex_hmac(DigestAlgorithm::Sha256, b"", b""),
            "b613679a0814d9ec772f95d778c35fc5ff1697c493715653c6c712144292c5ad"
        );
    }

    #[test]
    fn test_hmac_key_longer_than_block() {
        let key = vec![b'k'; 200];
        assert_eq!(
            hex_hmac(DigestAlgorithm::Sha1, &key, b"long key"),
            "8859a34f4b78a657ea933bb40edf63050bb8d298"
        );
        assert_eq!(
            hex_hmac(DigestAlgorithm::Sha256, &key, b"long key"),
            "0b10c8c6ad1000acb54ef1bc8eebb614fd3bd38ab9b3873365b91f33c612a6b3"
        );
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum(b"123456789"), [0xcb, 0xf4, 0x39, 0x26]);
        assert_eq!(checksum(b""), [0, 0, 0, 0]);
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data: Vec<u8> = (0..READ_CHUNK_LEN * 2 + 17).map(|i| i as u8).collect();
        for alg in DigestAlgorithm::ALL {
            assert_eq!(alg.digest_reader(&data[..]).unwrap(), alg.digest(&data));
            assert_eq!(
                alg.hmac_reader(b"secret", &data[..]).unwrap(),
                alg.hmac(b"secret", &data).unwrap()
            );
        }
        assert_eq!(checksum_reader(&data[..]).unwrap(), checksum(&data));
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let reader = InterruptingReader {
            data: FOX,
            interrupt: false,
        };
        assert_eq!(
            DigestAlgorithm::Sha1.digest_reader(reader).unwrap(),
            DigestAlgorithm::Sha1.digest(FOX)
        );
    }

    #[test]
    fn test_read_failure_is_io_error() {
        let err = DigestAlgorithm::Sha256
            .digest_reader(BrokenReader { served: false })
            .expect_err("expected read failure");
        assert_eq!(err.kind, Some(ErrorKind::Io));

        let err = DigestAlgorithm::Md5
            .hmac_reader(b"key", BrokenReader { served: false })
            .expect_err("expected read failure");
        assert_eq!(err.kind, Some(ErrorKind::Io));

        let err =
            checksum_reader(BrokenReader { served: false }).expect_err("expected read failure");
        assert_eq!(err.kind, Some(ErrorKind::Io));
    }

    #[test]
    fn test_parse() {
        for alg in DigestAlgorithm::ALL {
            assert_eq!(alg.name().parse::<DigestAlgorithm>().unwrap(), alg);
            assert_eq!(alg.to_string(), alg.name());
        }
    }

    #[test]
    fn test_parse_unsupported() {
        for name in ["", "md4", "SHA256", "sha-256", "crc32", " sha1"] {
            let err = name
                .parse::<DigestAlgorithm>()
                .expect_err("expected unsupported algorithm");
            assert_eq!(
                err.kind,
                Some(ErrorKind::UnsupportedAlgorithm),
                "{:?}",
                name
            );
        }
    }
}
