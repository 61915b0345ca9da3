use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tessera_common::api::RawChainEvent;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {}", _0)]
    Connect(String),
    #[error("request '{}' failed: {}", method, reason)]
    Request { method: String, reason: String },
    #[error("remote error {}: {}", code, message)]
    Remote { code: i32, message: String },
    #[error("transport is closed")]
    Closed,
}

/// Connection lifecycle of a transport handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Listener registered with the transport for raw event notifications.
///
/// The transport removes listeners by `Arc` pointer identity, so the exact
/// value passed to [`Transport::subscribe`] must be kept around for the
/// matching [`Transport::unsubscribe`] call.
pub type RawEventListener = Arc<dyn Fn(RawChainEvent<'static>) + Send + Sync>;

/// Request/response transport to a remote node.
///
/// Consumed as an abstract capability: the wire protocol, reconnection
/// internals and event delivery threading all belong to the implementation.
/// A client may use two distinct instances, one for submission and one for
/// queries/subscriptions.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Initiate a connection attempt. Called while already connecting, the
    /// implementation is expected to coalesce or no-op.
    async fn connect(&self) -> Result<(), TransportError>;

    fn connection_state(&self) -> ConnectionState;

    /// Send a request and block until the response (or error) arrives
    async fn send(&self, method: &str, params: Value) -> Result<Value, TransportError>;

    async fn subscribe(&self, listener: RawEventListener) -> Result<(), TransportError>;

    /// Remove a previously registered listener, compared by pointer identity
    async fn unsubscribe(&self, listener: &RawEventListener) -> Result<(), TransportError>;
}
