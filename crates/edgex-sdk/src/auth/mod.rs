/*
[INPUT]:  Account id and signing adapter
[OUTPUT]: Credentials and signatures for private endpoints
[POS]:    Auth layer - handles edgeX API authentication material
[UPDATE]: When auth flow or signature methods change
*/

pub mod signer;

use std::sync::Arc;

pub use signer::{L2Signature, MockSigningAdapter, SigningAdapter};

/// Credentials for authenticated requests
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account_id: u64,
    pub signer: Arc<dyn SigningAdapter>,
}

impl Credentials {
    pub fn new(account_id: u64, signer: Arc<dyn SigningAdapter>) -> Self {
        Self { account_id, signer }
    }

    /// Credentials backed by the deterministic mock adapter
    pub fn mock(account_id: u64, stark_private_key: &str) -> crate::http::Result<Self> {
        let signer = MockSigningAdapter::new(stark_private_key)?;
        Ok(Self::new(account_id, Arc::new(signer)))
    }
}
