use std::borrow::Cow;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

use super::{deserialize_bytes, serialize_bytes};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid block height '{}': {}", height, error)]
    InvalidHeight {
        height: String,
        error: ParseIntError,
    },
}

/// Event notification as delivered by the transport. The block height is
/// decimal text on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChainEvent<'a> {
    pub contract: Cow<'a, str>,
    pub caller: Cow<'a, str>,
    pub height: Cow<'a, str>,
    #[serde(serialize_with = "serialize_bytes")]
    #[serde(deserialize_with = "deserialize_bytes")]
    pub data: Cow<'a, [u8]>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// A chain-emitted event in its domain shape, dispatched to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEvent {
    pub contract: Address,
    pub caller: Address,
    pub height: u64,
    pub data: Vec<u8>,
    pub topics: Vec<String>,
}

impl RawChainEvent<'_> {
    /// Translate the transport shape into the domain shape, parsing the
    /// textual block height. Fails rather than dispatching a half-translated
    /// event.
    pub fn into_event(self) -> Result<ChainEvent, EventError> {
        let height = self
            .height
            .parse::<u64>()
            .map_err(|error| EventError::InvalidHeight {
                height: self.height.into_owned(),
                error,
            })?;

        Ok(ChainEvent {
            contract: Address::from(self.contract.as_ref()),
            caller: Address::from(self.caller.as_ref()),
            height,
            data: self.data.into_owned(),
            topics: self.topics,
        })
    }
}
