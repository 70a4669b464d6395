//! Client session state.

use protocol::ServerMessage;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::trace;

/// A connected client session.
#[derive(Debug)]
pub struct Client {
    /// Unique client ID.
    pub id: u32,
    /// Remote address.
    pub addr: SocketAddr,
    /// Snake currently controlled by this connection (set on join).
    pub snake_id: Option<String>,
    /// Player name from the last join/respawn.
    pub name: String,
    /// Outbound queue drained by the connection task.
    outbound: mpsc::Sender<ServerMessage>,
    /// Connection timestamp.
    pub connected_at: std::time::Instant,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, outbound: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id,
            addr,
            snake_id: None,
            name: String::new(),
            outbound,
            connected_at: std::time::Instant::now(),
        }
    }

    /// Queue a message without waiting. Full or closed queues drop it.
    pub fn send(&self, message: ServerMessage) -> bool {
        match self.outbound.try_send(message) {
            Ok(()) => true,
            Err(e) => {
                trace!("Dropping message for client {}: {}", self.id, e);
                false
            }
        }
    }

    #[inline]
    pub fn controls(&self, snake_id: &str) -> bool {
        self.snake_id.as_deref() == Some(snake_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:9000".parse().unwrap()
    }

    #[test]
    fn test_send_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        let client = Client::new(1, addr(), tx);
        let msg = ServerMessage::Death { score: 1, length: 21 };
        assert!(client.send(msg.clone()));
        assert!(!client.send(msg.clone()));
        assert_eq!(rx.try_recv().unwrap(), msg);
    }

    #[test]
    fn test_send_to_closed_queue() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let client = Client::new(1, addr(), tx);
        assert!(!client.send(ServerMessage::Death { score: 0, length: 20 }));
    }

    #[test]
    fn test_controls() {
        let (tx, _rx) = mpsc::channel(1);
        let mut client = Client::new(1, addr(), tx);
        assert!(!client.controls("p_1"));
        client.snake_id = Some("p_1".to_string());
        assert!(client.controls("p_1"));
        assert!(!client.controls("p_2"));
    }
}
