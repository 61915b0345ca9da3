pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod middleware;
pub mod transport;

pub use client::{ClientBuilder, LedgerClient};
pub use error::ClientError;
pub use events::ChainEventHandler;
pub use middleware::{Middleware, MiddlewareChain};
pub use transport::{ConnectionState, RawEventListener, Transport, TransportError};
