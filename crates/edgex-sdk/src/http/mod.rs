/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod account;
pub mod client;
pub mod error;
pub mod order;
pub mod public;
pub mod signature;

pub use error::{EdgexError, Result};
pub use signature::RequestSigner;

pub use client::{ClientConfig, EdgexClient, DEFAULT_BASE_URL, TESTNET_BASE_URL};
