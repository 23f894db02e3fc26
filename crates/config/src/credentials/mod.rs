//! Encrypted credentials.
//!
//! Responsibilities:
//! - Locate key material from ordered candidates (`key`).
//! - Parse the `--` separated envelope (`envelope`).
//! - Authenticated AES-128-GCM decryption (`cipher`).
//! - Decode the length-prefixed string framing of the plaintext (`framing`).
//! - Orchestrate all of the above into a raw record (`decoder`).
//!
//! Does NOT handle:
//! - Deciding which credentials files to load (see `ConfigBuilder`).
//! - Parsing YAML itself (see `loader::parse`).

mod cipher;
mod decoder;
mod envelope;
mod framing;
mod key;

pub use cipher::{DecryptError, decrypt, encrypt, generate_key};
pub use decoder::{
    CredentialsDecoder, decrypt_document, encrypt_credentials, write_credentials, write_key_file,
};
pub use envelope::Envelope;
pub use framing::{decode_framed_string, encode_framed_string};
pub use key::{KeyCandidate, KeyResolver, ResolvedKey, secret_key_env_name};
