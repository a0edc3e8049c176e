/*
[INPUT]:  WebSocket base URL, credentials and subscription channels
[OUTPUT]: Real-time market data and private account/order/position events
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new channels or changing connection logic
*/

pub mod client;
pub mod manager;
pub mod message;

pub use client::EdgexWebSocket;
pub use manager::WebSocketManager;
pub use message::{InboundFrame, PrivateEvent, WebSocketMessage};
