#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::sleep;

use tessera_client::{ConnectionState, RawEventListener, Transport, TransportError};
use tessera_common::api::RawChainEvent;

/// Transport double with scripted responses and recorded requests
pub struct MockTransport {
    state: Mutex<ConnectionState>,
    fail_connect: bool,
    response_delay: Option<Duration>,
    connect_calls: AtomicU32,
    requests: Mutex<Vec<(String, Value)>>,
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    listeners: Mutex<Vec<RawEventListener>>,
    removed: Mutex<Vec<RawEventListener>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Self::with_state(ConnectionState::Connected)
    }

    pub fn with_state(state: ConnectionState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            fail_connect: false,
            response_delay: None,
            connect_calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            listeners: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_connect() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ConnectionState::Disconnected),
            fail_connect: true,
            response_delay: None,
            connect_calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            listeners: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        })
    }

    /// Every `send` stalls this long before answering
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ConnectionState::Connected),
            fail_connect: false,
            response_delay: Some(delay),
            connect_calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
            listeners: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        })
    }

    pub fn push_response(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn connect_calls(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn registered_listeners(&self) -> Vec<RawEventListener> {
        self.listeners.lock().unwrap().clone()
    }

    pub fn removed_listeners(&self) -> Vec<RawEventListener> {
        self.removed.lock().unwrap().clone()
    }

    /// Deliver a raw event to every registered listener
    pub fn emit(&self, event: RawChainEvent<'static>) {
        let listeners = self.registered_listeners();
        for listener in listeners {
            listener(event.clone());
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(TransportError::Connect("connection refused".to_owned()));
        }
        *self.state.lock().unwrap() = ConnectionState::Connected;
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    async fn send(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_owned(), params));
        if let Some(delay) = self.response_delay {
            sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(TransportError::Request {
                method: method.to_owned(),
                reason: "no scripted response".to_owned(),
            })
        })
    }

    async fn subscribe(&self, listener: RawEventListener) -> Result<(), TransportError> {
        self.listeners.lock().unwrap().push(listener);
        Ok(())
    }

    async fn unsubscribe(&self, listener: &RawEventListener) -> Result<(), TransportError> {
        let mut listeners = self.listeners.lock().unwrap();
        let index = listeners
            .iter()
            .position(|registered| Arc::ptr_eq(registered, listener));
        match index {
            Some(index) => {
                let removed = listeners.remove(index);
                self.removed.lock().unwrap().push(removed);
                Ok(())
            }
            None => Err(TransportError::Request {
                method: "unsubscribe".to_owned(),
                reason: "unknown listener".to_owned(),
            }),
        }
    }
}
