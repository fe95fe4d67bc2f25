//! Cipherbox CLI - digests, HMACs, checksums and DES/AES encryption of files

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use cipherbox::error::{CipherboxError, ErrorCategory, ErrorKind, Result};
use cipherbox::file_ops;
use cipherbox::key::{HexKey, KeySource, PromptKey, StreamKey};
use cipherbox::{CipherMethod, CipherOptions, DigestAlgorithm, OutputEncoding};

#[derive(Parser)]
#[command(name = "cipherbox")]
#[command(version)]
#[command(about = "Digests, HMACs, checksums and DES/AES block encryption.", long_about = None)]
struct Cli {
    /// Read the key from stdin instead of from the terminal
    #[arg(long, global = true)]
    key_stdin: bool,

    /// Interpret the key as hexadecimal
    #[arg(long, global = true)]
    key_hex: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the digest of a file
    Digest {
        /// md5, sha1, sha256 or sha512
        #[arg(short, long, value_name = "ALGORITHM")]
        algorithm: DigestAlgorithm,

        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Write raw bytes instead of hexadecimal
        #[arg(long)]
        raw: bool,
    },

    /// Print the HMAC of a file
    Hmac {
        /// md5, sha1, sha256 or sha512
        #[arg(short, long, value_name = "ALGORITHM")]
        algorithm: DigestAlgorithm,

        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Write raw bytes instead of hexadecimal
        #[arg(long)]
        raw: bool,
    },

    /// Print the CRC32 (IEEE) checksum of a file
    Checksum {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Write raw bytes instead of hexadecimal
        #[arg(long)]
        raw: bool,
    },

    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        #[command(flatten)]
        cipher: CipherArgs,

        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the ciphertext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        #[command(flatten)]
        cipher: CipherArgs,

        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the plaintext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Base64-encode a file (standard alphabet)
    Base64Encode {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Base64-decode a file (standard alphabet)
    Base64Decode {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

#[derive(clap::Args)]
struct CipherArgs {
    /// des-ecb, des-cbc or aes-cbc
    #[arg(short, long, value_name = "METHOD")]
    method: CipherMethod,

    /// Initialization vector as hexadecimal (CBC methods only)
    #[arg(long, value_name = "HEX", default_value = "")]
    iv: String,

    /// Ciphertext is raw bytes instead of hexadecimal
    #[arg(long)]
    raw: bool,

    /// Pad with zero bytes instead of PKCS#7
    #[arg(long)]
    zero_padding: bool,
}

impl CipherArgs {
    fn options(&self) -> CipherOptions {
        CipherOptions {
            raw_data: self.raw,
            zero_padding: self.zero_padding,
        }
    }

    fn iv(&self) -> Result<Vec<u8>> {
        if !self.method.requires_iv() {
            if !self.iv.is_empty() {
                log::warn!("{} does not use an IV; ignoring --iv", self.method);
            }
            return Ok(Vec::new());
        }
        cipherbox::hex_decode(&self.iv).map_err(|e| e.with_context("invalid --iv"))
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = run(&cli);

    if let Err(e) = result {
        eprintln!("Error: {}", e.chain_message());
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Digest {
            algorithm,
            input,
            raw,
        } => {
            let digest = file_ops::digest_file(input, *algorithm)?;
            print_result(digest, *raw)
        }
        Commands::Hmac {
            algorithm,
            input,
            raw,
        } => {
            let mut key_source = get_key_source(cli);
            let mac = file_ops::hmac_file(input, *algorithm, &mut *key_source)?;
            print_result(mac, *raw)
        }
        Commands::Checksum { input, raw } => {
            let sum = file_ops::checksum_file(input)?;
            print_result(sum.to_vec(), *raw)
        }
        Commands::Encrypt {
            cipher,
            input,
            output,
        } => {
            let iv = cipher.iv()?;
            let mut key_source = get_key_source(cli);
            file_ops::encrypt_file(
                input,
                output,
                cipher.method,
                &iv,
                &cipher.options(),
                &mut *key_source,
            )
        }
        Commands::Decrypt {
            cipher,
            input,
            output,
        } => {
            let iv = cipher.iv()?;
            let mut key_source = get_key_source(cli);
            file_ops::decrypt_file(
                input,
                output,
                cipher.method,
                &iv,
                &cipher.options(),
                &mut *key_source,
            )
        }
        Commands::Base64Encode { input, output } => file_ops::base64_encode_file(input, output),
        Commands::Base64Decode { input, output } => file_ops::base64_decode_file(input, output),
    }
}

/// Writes a result to stdout: hex followed by a newline, or the bare bytes.
fn print_result(bytes: Vec<u8>, raw: bool) -> Result<()> {
    let encoding = OutputEncoding::from_raw_flag(raw);
    let mut out = encoding.encode(bytes);
    if encoding == OutputEncoding::Hex {
        out.push(b'\n');
    }
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&out)
        .and_then(|()| stdout.flush())
        .map_err(|e| {
            CipherboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to write to stdout",
                e,
            )
        })
}

fn get_key_source(cli: &Cli) -> Box<dyn KeySource> {
    let source: Box<dyn KeySource> = if cli.key_stdin {
        Box::new(StreamKey::new(io::stdin()))
    } else {
        Box::new(PromptKey::default())
    };
    if cli.key_hex {
        Box::new(HexKey::new(source))
    } else {
        source
    }
}
