use log::{debug, trace};

use crate::transport::{ConnectionState, Transport, TransportError};

/// Ensure a transport handle is connected before use.
///
/// No-op when auto-reconnect is disabled: callers may then fail downstream
/// against a disconnected transport, which is their configured choice. From
/// any non-connected state a single connect attempt is made and its failure
/// surfaces immediately; no retries happen at this layer.
///
/// Concurrent guarded calls racing on a disconnected handle may both invoke
/// `connect()`; the transport is responsible for coalescing a connect made
/// while already connecting.
pub async fn ensure_connected(
    transport: &dyn Transport,
    auto_reconnect: bool,
) -> Result<(), TransportError> {
    if !auto_reconnect {
        trace!("auto-reconnect disabled, skipping connection check");
        return Ok(());
    }

    match transport.connection_state() {
        ConnectionState::Connected => Ok(()),
        state => {
            if log::log_enabled!(log::Level::Debug) {
                debug!("transport is {:?}, connecting", state);
            }
            transport.connect().await
        }
    }
}
