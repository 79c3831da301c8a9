//! Async server task fronting one memory store.

use crate::store::SharedStore;
use tether_net::{Completion, MemoryEndpoint, Request};
use tokio::task::JoinHandle;

/// Serves one-sided requests against a shared store.
///
/// The server is deliberately passive: it applies each request to the
/// store and echoes a completion carrying the request id. It never
/// initiates traffic of its own.
pub struct MemoryServer;

impl MemoryServer {
    /// Spawns the serving loop for one memory node.
    ///
    /// The task exits when the request channel closes (compute side gone)
    /// or when completions can no longer be delivered.
    pub fn spawn(store: SharedStore, mut endpoint: MemoryEndpoint) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(request) = endpoint.requests.recv().await {
                let completion = match request {
                    Request::Read { id, addr, size } => {
                        let payload = store.lock().read(addr, size as usize);
                        Completion::ReadDone { id, payload }
                    }
                    Request::Write { id, addr, payload } => {
                        store.lock().write(addr, &payload);
                        Completion::WriteDone { id }
                    }
                };
                if endpoint.completions.send(completion).is_err() {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use bytes::Bytes;
    use tether_common::MemoryConfig;
    use tether_net::open_channels;

    #[tokio::test]
    async fn test_server_answers_reads_and_writes() {
        let (mut gateway, mut stream, mut endpoints) = open_channels(0, 1).unwrap();
        let store = MemoryStore::shared(0, MemoryConfig::default());
        let handle = MemoryServer::spawn(store.clone(), endpoints.remove(0));

        let base = store.lock().base();
        let write_id = gateway
            .send_write(0, base + 0x100, Bytes::from_static(b"payload"))
            .unwrap();
        let read_id = gateway.send_read(0, base + 0x100, 7).unwrap();

        let first = stream.recv().await.unwrap();
        assert_eq!(first.id(), write_id);
        assert!(matches!(first, Completion::WriteDone { .. }));

        let second = stream.recv().await.unwrap();
        assert_eq!(second.id(), read_id);
        match second {
            Completion::ReadDone { payload, .. } => assert_eq!(&payload[..], b"payload"),
            other => panic!("expected read completion, got {other:?}"),
        }

        drop(gateway);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_exits_when_compute_side_drops() {
        let (gateway, stream, mut endpoints) = open_channels(0, 1).unwrap();
        let store = MemoryStore::shared(0, MemoryConfig::default());
        let handle = MemoryServer::spawn(store, endpoints.remove(0));

        drop(gateway);
        drop(stream);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_read_of_unwritten_region_returns_zeros() {
        let (mut gateway, mut stream, mut endpoints) = open_channels(0, 1).unwrap();
        let store = MemoryStore::shared(0, MemoryConfig::default());
        let _handle = MemoryServer::spawn(store.clone(), endpoints.remove(0));

        let base = store.lock().base();
        gateway.send_read(0, base + 0x4000, 32).unwrap();

        match stream.recv().await.unwrap() {
            Completion::ReadDone { payload, .. } => {
                assert_eq!(payload.len(), 32);
                assert!(payload.iter().all(|&b| b == 0));
            }
            other => panic!("expected read completion, got {other:?}"),
        }
    }
}
