//! Result sinks: where the scanner pushes finished records.
//!
//! The scanner calls [`ResultSink::emit`] once per record, in table order.
//! A failing sink is fatal to the scan.

use crate::models::PdnResult;
use crate::{PdnScanError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Push-style consumer of scan results.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Accepts one record.
    ///
    /// # Errors
    /// Returns [`PdnScanError::Sink`] when the consumer is gone.
    async fn emit(&self, result: PdnResult) -> Result<()>;
}

/// Forwards records into a bounded channel drained by a report writer.
///
/// A full channel applies backpressure to the scanner.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<PdnResult>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the writer task should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PdnResult>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ResultSink for ChannelSink {
    async fn emit(&self, result: PdnResult) -> Result<()> {
        self.sender
            .send(result)
            .await
            .map_err(|_| PdnScanError::sink_closed("report writer stopped receiving"))
    }
}

/// Collects records in memory, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Mutex<Vec<PdnResult>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything emitted so far, in emission order.
    pub fn results(&self) -> Vec<PdnResult> {
        self.results
            .lock()
            .map(|results| results.clone())
            .unwrap_or_default()
    }

    /// Takes ownership of the collected records.
    pub fn into_results(self) -> Vec<PdnResult> {
        self.results.into_inner().unwrap_or_default()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn emit(&self, result: PdnResult) -> Result<()> {
        self.results
            .lock()
            .map_err(|_| PdnScanError::sink_closed("memory sink lock poisoned"))?
            .push(result);
        Ok(())
    }
}
