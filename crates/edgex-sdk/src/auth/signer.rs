/*
[INPUT]:  Message bytes and Stark private key material
[OUTPUT]: L2 signatures (r, s) and the signer's public key
[POS]:    Auth layer - pluggable signing seam for request/order authentication
[UPDATE]: When adding signing adapters or changing the signature encoding
*/

use std::fmt;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::http::{EdgexError, Result};

/// Signature pair produced by a signing adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl L2Signature {
    /// Lowercase hex of `r || s`, no `0x` prefix
    pub fn to_hex(&self) -> String {
        let mut out = hex::encode(self.r);
        out.push_str(&hex::encode(self.s));
        out
    }
}

impl fmt::Display for L2Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Trait for Stark-key signing operations
///
/// Real Stark curve signing lives outside this crate; implement this trait
/// to plug it in. The trait is async to support remote signers.
#[async_trait]
pub trait SigningAdapter: Send + Sync + fmt::Debug {
    /// Hex-encoded public key
    fn public_key(&self) -> String;

    /// Sign an arbitrary message
    async fn sign(&self, message: &[u8]) -> Result<L2Signature>;
}

/// Deterministic signer for tests and public-only runs
///
/// `r = sha256(key || message)`, `s = sha256(r || key)`.
#[derive(Clone)]
pub struct MockSigningAdapter {
    key: Vec<u8>,
}

impl MockSigningAdapter {
    /// Build from private key text; a `0x` prefix is optional and hex is
    /// decoded when possible, otherwise the raw bytes are used.
    pub fn new(private_key: &str) -> Result<Self> {
        let trimmed = private_key.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if stripped.is_empty() {
            return Err(EdgexError::Config(
                "stark private key must not be empty".to_string(),
            ));
        }

        let key = hex::decode(stripped).unwrap_or_else(|_| stripped.as_bytes().to_vec());
        Ok(Self { key })
    }
}

impl fmt::Debug for MockSigningAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSigningAdapter")
            .field("public_key", &self.public_key())
            .finish()
    }
}

#[async_trait]
impl SigningAdapter for MockSigningAdapter {
    fn public_key(&self) -> String {
        hex::encode(Sha256::digest(&self.key))
    }

    async fn sign(&self, message: &[u8]) -> Result<L2Signature> {
        let r: [u8; 32] = Sha256::new()
            .chain_update(&self.key)
            .chain_update(message)
            .finalize()
            .into();
        let s: [u8; 32] = Sha256::new()
            .chain_update(r)
            .chain_update(&self.key)
            .finalize()
            .into();
        Ok(L2Signature { r, s })
    }
}
