//! Assembly identity and friend-assembly matching.
//!
//! This module provides the [`Identity`] enum for representing public-key and
//! token-based assembly identities, the [`AssemblyIdentity`] descriptor attached
//! to every declared or referenced assembly, and [`FriendAssembly`] for parsed
//! `InternalsVisibleTo` grants. Hashing follows the ECMA-335 rule: the public-key
//! token is derived from the tail of the hash of the full public key, with MD5
//! and SHA-1 supported.
//!
//! # Key Types
//! - [`Identity`] - Either a full public key or an 8-byte token
//! - [`AssemblyIdentity`] - Name, version, and optional identity of an assembly
//! - [`FriendAssembly`] - A parsed `InternalsVisibleTo` entry
//!
//! # Example
//! ```rust
//! use cilforge::metadata::identity::{AssemblyIdentity, FriendAssembly};
//!
//! let friend = FriendAssembly::parse("Tests, PublicKey=0024000004800000")?;
//! let candidate = AssemblyIdentity::new("Tests");
//! // no key on the candidate: only a keyless grant would match
//! assert!(!friend.grants(&candidate));
//! # Ok::<(), cilforge::Error>(())
//! ```

use std::fmt;

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::Result;

/// Hash algorithm identifiers for assembly identity computation (ECMA-335 II.23.1.1)
#[allow(non_snake_case)]
pub mod AssemblyHashAlgorithm {
    /// No hash algorithm
    pub const NONE: u32 = 0x0000;
    /// MD5, legacy assemblies only
    pub const MD5: u32 = 0x8003;
    /// SHA-1, the standard algorithm for public-key tokens
    pub const SHA1: u32 = 0x8004;
}

fn read_le_u64(data: &[u8]) -> Result<u64> {
    let Some(bytes) = data.get(..8) else {
        return Err(malformed_error!(
            "Identity token requires 8 bytes, got {}",
            data.len()
        ));
    };
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

/// An identifier for an assembly: either the full public key or its derived token.
///
/// The token value is kept in the little-endian reading of the hash tail, so its
/// big-endian byte order is the canonical display order used in
/// `PublicKeyToken=...` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// The full RSA public key blob
    PubKey(Vec<u8>),
    /// 8-byte tail of the hash of the public key
    Token(u64),
}

impl Identity {
    /// Get the token for this identity under the given hash algorithm.
    ///
    /// For a full public key the token is the last 8 bytes of the key's hash;
    /// for a token identity the stored value is returned unchanged.
    ///
    /// # Arguments
    /// * `algo` - An [`AssemblyHashAlgorithm`] value
    ///
    /// # Errors
    /// Returns an error if the algorithm is not supported.
    pub fn to_token(&self, algo: u32) -> Result<u64> {
        match &self {
            Identity::PubKey(data) => match algo {
                AssemblyHashAlgorithm::MD5 => {
                    let mut hasher = Md5::new();
                    hasher.update(data);

                    let result = hasher.finalize();

                    read_le_u64(&result[result.len() - 8..])
                }
                AssemblyHashAlgorithm::SHA1 => {
                    let mut hasher = Sha1::new();
                    hasher.update(data);

                    let result = hasher.finalize();

                    read_le_u64(&result[result.len() - 8..])
                }
                _ => Err(malformed_error!(
                    "Unsupported assembly hash algorithm 0x{:04x}",
                    algo
                )),
            },
            Identity::Token(token) => Ok(*token),
        }
    }

    /// Get the token in canonical byte order, as written in
    /// `PublicKeyToken=...` strings and assembly references.
    ///
    /// # Errors
    /// Returns an error if the algorithm is not supported.
    pub fn token_bytes(&self, algo: u32) -> Result<[u8; 8]> {
        Ok(self.to_token(algo)?.to_be_bytes())
    }
}

/// The identity of a declared or referenced assembly.
///
/// Versions are four-part (`major.minor.build.revision`). The identity is
/// optional: unsigned assemblies have none, and name matching alone applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyIdentity {
    /// Simple name, without extension, compared case-insensitively
    pub name: String,
    /// Four-part version
    pub version: [u16; 4],
    /// Public key or token, absent for unsigned assemblies
    pub identity: Option<Identity>,
}

impl AssemblyIdentity {
    /// Creates an unsigned identity with version 0.0.0.0.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: [0; 4],
            identity: None,
        }
    }

    /// Sets the four-part version.
    #[must_use]
    pub fn with_version(mut self, version: [u16; 4]) -> Self {
        self.version = version;
        self
    }

    /// Attaches a full public key.
    #[must_use]
    pub fn with_public_key(mut self, key: Vec<u8>) -> Self {
        self.identity = Some(Identity::PubKey(key));
        self
    }

    /// Attaches a pre-computed public-key token.
    #[must_use]
    pub fn with_public_key_token(mut self, token: u64) -> Self {
        self.identity = Some(Identity::Token(token));
        self
    }

    /// Returns the SHA-1 public-key token, if this identity is signed.
    ///
    /// # Errors
    /// Propagates hashing failures; `Ok(None)` for unsigned identities.
    pub fn public_key_token(&self) -> Result<Option<u64>> {
        match &self.identity {
            Some(identity) => Ok(Some(identity.to_token(AssemblyHashAlgorithm::SHA1)?)),
            None => Ok(None),
        }
    }

    /// Case-insensitive simple-name comparison.
    #[must_use]
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Version={}.{}.{}.{}",
            self.name, self.version[0], self.version[1], self.version[2], self.version[3]
        )?;
        match self.public_key_token() {
            Ok(Some(token)) => write!(f, ", PublicKeyToken={token:016x}"),
            _ => write!(f, ", PublicKeyToken=null"),
        }
    }
}

/// One parsed `InternalsVisibleTo` grant.
///
/// The attribute argument is a display-name fragment: a simple name optionally
/// followed by `PublicKey=<hex>` or `PublicKeyToken=<hex>` properties. Other
/// properties are ignored for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendAssembly {
    /// Simple name of the friend, compared case-insensitively
    pub name: String,
    /// Required public-key token, `None` when the grant names no key
    pub public_key_token: Option<u64>,
}

impl FriendAssembly {
    /// Parses an `InternalsVisibleTo` argument string.
    ///
    /// # Arguments
    /// * `display` - e.g. `"FriendAssembly"` or `"FriendAssembly, PublicKey=0024..."`
    ///
    /// # Errors
    /// Returns an error for an empty name, malformed hex, or a
    /// `PublicKeyToken` that is not exactly 8 bytes.
    pub fn parse(display: &str) -> Result<Self> {
        let mut parts = display.split(',');
        let name = match parts.next() {
            Some(raw) => raw.trim(),
            None => "",
        };
        if name.is_empty() || name.contains('=') {
            return Err(malformed_error!(
                "InternalsVisibleTo declaration '{}' has no assembly name",
                display
            ));
        }

        let mut public_key_token = None;
        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                return Err(malformed_error!(
                    "InternalsVisibleTo property '{}' is not of the form name=value",
                    part.trim()
                ));
            };
            let value = value.trim();
            match key.trim() {
                "PublicKey" => {
                    if !value.eq_ignore_ascii_case("null") {
                        let key_bytes = decode_hex(value)?;
                        let identity = Identity::PubKey(key_bytes);
                        public_key_token =
                            Some(identity.to_token(AssemblyHashAlgorithm::SHA1)?);
                    }
                }
                "PublicKeyToken" => {
                    if !value.eq_ignore_ascii_case("null") {
                        let token_bytes = decode_hex(value)?;
                        if token_bytes.len() != 8 {
                            return Err(malformed_error!(
                                "PublicKeyToken must be 8 bytes, got {}",
                                token_bytes.len()
                            ));
                        }
                        let mut raw = [0u8; 8];
                        raw.copy_from_slice(&token_bytes);
                        public_key_token = Some(u64::from_be_bytes(raw));
                    }
                }
                // Version, Culture and friends carry no weight for friend matching
                _ => {}
            }
        }

        Ok(Self {
            name: name.to_string(),
            public_key_token,
        })
    }

    /// Returns true when this grant admits the given assembly.
    ///
    /// The name must match case-insensitively; when the grant names a key, the
    /// candidate must be signed with a key whose SHA-1 token matches.
    #[must_use]
    pub fn grants(&self, candidate: &AssemblyIdentity) -> bool {
        if !candidate.name_matches(&self.name) {
            return false;
        }
        match self.public_key_token {
            None => true,
            Some(required) => matches!(candidate.public_key_token(), Ok(Some(token)) if token == required),
        }
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>> {
    if text.len() % 2 != 0 {
        return Err(malformed_error!(
            "Hex string has odd length {}",
            text.len()
        ));
    }
    let mut bytes = Vec::with_capacity(text.len() / 2);
    let raw = text.as_bytes();
    for pair in raw.chunks_exact(2) {
        let Ok(digits) = std::str::from_utf8(pair) else {
            return Err(malformed_error!("Hex string '{}' is not ASCII", text));
        };
        match u8::from_str_radix(digits, 16) {
            Ok(byte) => bytes.push(byte),
            Err(_) => {
                return Err(malformed_error!(
                    "Invalid hex digits '{}' in '{}'",
                    digits,
                    text
                ))
            }
        }
    }
    Ok(bytes)
}
