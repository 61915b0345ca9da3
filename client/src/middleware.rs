use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::trace;

/// A single byte-transform stage applied to an outgoing transaction payload,
/// e.g. a signer contacting an external key holder.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn process(&self, payload: Vec<u8>) -> Result<Vec<u8>>;
}

/// Ordered, immutable sequence of transform stages. Stage *i*'s output is
/// stage *i+1*'s input; an empty chain is a pass-through.
///
/// The chain is constructed externally and shared by reference; the commit
/// pipeline never owns or mutates individual stages. A stage failure aborts
/// the whole commit attempt and propagates as-is, outside the commit
/// protocol's own error taxonomy.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Arc<[Arc<dyn Middleware>]>,
}

impl MiddlewareChain {
    pub fn new(stages: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            stages: stages.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub async fn run(&self, payload: Vec<u8>) -> Result<Vec<u8>> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("running {} middleware stages", self.stages.len());
        }
        let mut current = payload;
        for stage in self.stages.iter() {
            current = stage.process(current).await?;
        }
        Ok(current)
    }
}
