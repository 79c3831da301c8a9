//! Remote I/O gateway and channel plumbing.
//!
//! One logical channel exists per (compute-node, memory-node) pair. The
//! gateway owns the sending half of every channel and allocates request
//! ids; completions from all memory nodes funnel into a single stream so
//! the engine resumes whichever operation finishes first.

use crate::message::{Completion, Request, RequestId};
use bytes::Bytes;
use tether_common::{Result, TetherError};
use tokio::sync::mpsc;

/// Server-side endpoints for one memory node: its request receiver and
/// the shared completion sender.
pub struct MemoryEndpoint {
    /// Requests addressed to this memory node.
    pub requests: mpsc::UnboundedReceiver<Request>,
    /// Where completions are pushed back to the compute side.
    pub completions: mpsc::UnboundedSender<Completion>,
}

/// Opens one channel per memory node.
///
/// Returns the compute-side gateway and completion stream plus one
/// endpoint per memory node for the server tasks. Zero channels is a
/// startup-fatal configuration.
pub fn open_channels(
    compute_node: u32,
    num_memory_nodes: u32,
) -> Result<(Gateway, CompletionStream, Vec<MemoryEndpoint>)> {
    if num_memory_nodes == 0 {
        return Err(TetherError::NoChannels);
    }

    let (completion_tx, completion_rx) = mpsc::unbounded_channel();
    let mut senders = Vec::with_capacity(num_memory_nodes as usize);
    let mut endpoints = Vec::with_capacity(num_memory_nodes as usize);

    for _ in 0..num_memory_nodes {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        senders.push(request_tx);
        endpoints.push(MemoryEndpoint {
            requests: request_rx,
            completions: completion_tx.clone(),
        });
    }

    let gateway = Gateway {
        compute_node,
        next_seq: 0,
        channels: senders,
    };
    let stream = CompletionStream {
        inner: completion_rx,
    };

    Ok((gateway, stream, endpoints))
}

/// Compute-side sender for one-sided remote operations.
pub struct Gateway {
    /// Identity of the issuing compute node, packed into request ids.
    compute_node: u32,
    /// Next sequence number to assign.
    next_seq: u64,
    /// One request sender per memory node.
    channels: Vec<mpsc::UnboundedSender<Request>>,
}

impl Gateway {
    /// Number of memory-node channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Issues a one-sided read of `size` bytes at `addr` on the given channel.
    pub fn send_read(&mut self, memory_node: u32, addr: u64, size: u32) -> Result<RequestId> {
        let id = self.allocate_id();
        self.dispatch(memory_node, Request::Read { id, addr, size })?;
        Ok(id)
    }

    /// Issues a one-sided write of `payload` at `addr` on the given channel.
    pub fn send_write(&mut self, memory_node: u32, addr: u64, payload: Bytes) -> Result<RequestId> {
        let id = self.allocate_id();
        self.dispatch(memory_node, Request::Write { id, addr, payload })?;
        Ok(id)
    }

    fn allocate_id(&mut self) -> RequestId {
        let seq = self.next_seq;
        self.next_seq += 1;
        RequestId::new(self.compute_node, seq)
    }

    fn dispatch(&self, memory_node: u32, request: Request) -> Result<()> {
        let channel = self
            .channels
            .get(memory_node as usize)
            .ok_or(TetherError::ChannelClosed { memory_node })?;
        channel
            .send(request)
            .map_err(|_| TetherError::ChannelClosed { memory_node })
    }
}

/// Compute-side receiver for completions from every memory node.
pub struct CompletionStream {
    inner: mpsc::UnboundedReceiver<Completion>,
}

impl CompletionStream {
    /// Waits for the next completion; `None` once every memory node is gone.
    pub async fn recv(&mut self) -> Option<Completion> {
        self.inner.recv().await
    }

    /// Returns an already-delivered completion without waiting.
    pub fn try_recv(&mut self) -> Option<Completion> {
        self.inner.try_recv().ok()
    }
}
