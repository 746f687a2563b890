//! # Signal Sink Module
//!
//! Delivers shaped locomotion values to the OSC receiver.
//!
//! This module handles:
//! - Connecting a UDP socket to the receiver (127.0.0.1:9000 by default)
//! - Encoding each value as an OSC message
//! - Fire-and-forget transmission: no acknowledgement, no retransmission

pub mod sink_trait;

pub use sink_trait::SignalSink;

use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, info};

use crate::error::{BridgeError, Result};
use crate::osc::encoder::encode_float_message;

/// OSC-over-UDP sink
pub struct OscUdpSink {
    /// Socket connected to the receiver
    socket: UdpSocket,
    /// Receiver address (e.g., 127.0.0.1:9000)
    target: String,
}

impl std::fmt::Debug for OscUdpSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OscUdpSink")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl OscUdpSink {
    /// Bind an ephemeral local socket and connect it to `target`
    ///
    /// # Arguments
    ///
    /// * `target` - Receiver address, `host:port`
    ///
    /// # Errors
    ///
    /// Returns `Sink` error if the address cannot be resolved or the socket
    /// cannot be bound or connected
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use locomotion_bridge::sink::OscUdpSink;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let sink = OscUdpSink::connect("127.0.0.1:9000").await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(target: &str) -> Result<Self> {
        let remote = lookup_host(target)
            .await
            .map_err(|e| BridgeError::Sink(format!("Failed to resolve {}: {}", target, e)))?
            .next()
            .ok_or_else(|| BridgeError::Sink(format!("No address found for {}", target)))?;

        let socket = UdpSocket::bind(local_bind_addr(&remote))
            .await
            .map_err(|e| BridgeError::Sink(format!("Failed to bind UDP socket: {}", e)))?;

        socket
            .connect(remote)
            .await
            .map_err(|e| BridgeError::Sink(format!("Failed to connect to {}: {}", target, e)))?;

        info!("Connected to OSC receiver at {} ({})", target, remote);

        Ok(Self {
            socket,
            target: target.to_string(),
        })
    }
}

/// Ephemeral wildcard address in the same family as `remote`
fn local_bind_addr(remote: &SocketAddr) -> SocketAddr {
    match remote {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    }
}

#[async_trait]
impl SignalSink for OscUdpSink {
    async fn send(&mut self, address: &str, value: f32) -> Result<()> {
        let message = encode_float_message(address, value)?;

        self.socket
            .send(&message)
            .await
            .map_err(|e| BridgeError::Sink(format!("Failed to send {} to {}: {}", address, self.target, e)))?;

        debug!("Sent {} = {}", address, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::decoder::decode_message;
    use crate::osc::protocol::{ADDRESS_HORIZONTAL, ADDRESS_VERTICAL};
    use super::sink_trait::mocks::RecordingSink;
    use std::time::Duration;

    async fn receiver() -> (UdpSocket, String) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap().to_string();
        (socket, addr)
    }

    async fn recv_message(socket: &UdpSocket) -> crate::osc::protocol::OscMessage {
        let mut buf = [0u8; 512];
        let len = tokio::time::timeout(Duration::from_secs(2), socket.recv(&mut buf))
            .await
            .expect("timed out waiting for datagram")
            .unwrap();
        decode_message(&buf[..len]).unwrap()
    }

    #[tokio::test]
    async fn test_send_delivers_osc_message() {
        let (rx, addr) = receiver().await;
        let mut sink = OscUdpSink::connect(&addr).await.unwrap();

        // First send right after connect, before the socket was ever polled
        sink.send(ADDRESS_VERTICAL, 0.5).await.unwrap();
        sink.send(ADDRESS_HORIZONTAL, -1.0).await.unwrap();

        let first = recv_message(&rx).await;
        assert_eq!(first.address, ADDRESS_VERTICAL);
        assert_eq!(first.value, 0.5);

        let second = recv_message(&rx).await;
        assert_eq!(second.address, ADDRESS_HORIZONTAL);
        assert_eq!(second.value, -1.0);
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_address() {
        let (_rx, addr) = receiver().await;
        let mut sink = OscUdpSink::connect(&addr).await.unwrap();
        assert!(matches!(sink.send("Vertical", 1.0).await, Err(BridgeError::Osc(_))));
    }

    #[tokio::test]
    async fn test_burst_of_sends_all_arrive() {
        let (rx, addr) = receiver().await;
        let mut sink = OscUdpSink::connect(&addr).await.unwrap();

        for i in 0..20 {
            sink.send(ADDRESS_VERTICAL, i as f32 / 20.0).await.unwrap();
        }

        for i in 0..20 {
            assert_eq!(recv_message(&rx).await.value, i as f32 / 20.0);
        }
    }

    #[test]
    fn test_local_bind_addr_follows_target_family() {
        let v4: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let v6: SocketAddr = "[::1]:9000".parse().unwrap();

        assert_eq!(local_bind_addr(&v4), "0.0.0.0:0".parse::<SocketAddr>().unwrap());
        assert_eq!(local_bind_addr(&v6), "[::]:0".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_connect_ipv6_target() {
        let (rx, addr) = match UdpSocket::bind("[::1]:0").await {
            Ok(socket) => {
                let addr = socket.local_addr().unwrap().to_string();
                (socket, addr)
            }
            // Host without IPv6 loopback
            Err(_) => return,
        };

        let mut sink = OscUdpSink::connect(&addr).await.unwrap();
        sink.send(ADDRESS_HORIZONTAL, 0.25).await.unwrap();

        assert_eq!(recv_message(&rx).await.value, 0.25);
    }

    #[tokio::test]
    async fn test_connect_unresolvable_target() {
        let result = OscUdpSink::connect("not a socket address").await;
        match result {
            Err(BridgeError::Sink(msg)) => assert!(msg.contains("not a socket address")),
            other => panic!("Expected Sink error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recording_sink() {
        let mut sink = RecordingSink::new();
        sink.send(ADDRESS_VERTICAL, 1.0).await.unwrap();
        sink.send(ADDRESS_HORIZONTAL, 0.0).await.unwrap();

        assert_eq!(sink.get_sent().len(), 2);
        assert_eq!(sink.values_for(ADDRESS_VERTICAL), vec![1.0]);

        sink.set_send_error("network down");
        assert!(matches!(sink.send(ADDRESS_VERTICAL, 1.0).await, Err(BridgeError::Sink(_))));

        sink.clear();
        assert!(sink.get_sent().is_empty());
    }
}
