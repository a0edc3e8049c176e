/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public edgeX client crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod contracts;
pub mod http;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::{Credentials, L2Signature, MockSigningAdapter, SigningAdapter};

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    EdgexClient,
    EdgexError,
    RequestSigner,
    Result,
    DEFAULT_BASE_URL,
    TESTNET_BASE_URL,
};

pub use contracts::{contract_id_for, symbol_for, ContractRegistry, KNOWN_CONTRACTS};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{EdgexWebSocket, PrivateEvent, WebSocketManager, WebSocketMessage};
