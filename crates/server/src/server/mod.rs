//! Game server implementation.

use crate::config::Config;
use futures_util::{SinkExt, StreamExt};
use protocol::ServerMessage;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

pub mod client;
pub mod game;
pub mod view;

pub use game::{GameState, run_game_loop};
pub use view::build_snapshot;

/// Connection tracking state (shared across connection handlers).
struct ConnectionState {
    /// Number of connections per IP address.
    ip_connections: HashMap<IpAddr, usize>,
    /// Total number of connections.
    total_connections: usize,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            ip_connections: HashMap::new(),
            total_connections: 0,
        }
    }

    /// Try to add a connection, returns true if allowed.
    fn try_add_connection(&mut self, ip: IpAddr, max_total: usize, max_per_ip: usize) -> bool {
        if self.total_connections >= max_total {
            return false;
        }
        let current = self.ip_connections.get(&ip).copied().unwrap_or(0);
        if current >= max_per_ip {
            return false;
        }
        *self.ip_connections.entry(ip).or_insert(0) += 1;
        self.total_connections += 1;
        true
    }

    fn remove_connection(&mut self, ip: IpAddr) {
        if let Some(count) = self.ip_connections.get_mut(&ip) {
            if *count > 0 {
                *count -= 1;
                self.total_connections = self.total_connections.saturating_sub(1);
            }
            if *count == 0 {
                self.ip_connections.remove(&ip);
            }
        }
    }
}

/// Run the game server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on ws://{}", addr);
    serve(listener, config).await
}

/// Accept WebSocket connections on `listener` and run the game loop.
pub async fn serve(listener: TcpListener, config: Config) -> anyhow::Result<()> {
    let conn_state = Arc::new(RwLock::new(ConnectionState::new()));
    let game_state = Arc::new(RwLock::new(GameState::new(&config)));

    let game_loop_state = Arc::clone(&game_state);
    let tick_interval = config.tick_interval();
    tokio::spawn(async move {
        run_game_loop(game_loop_state, tick_interval).await;
    });

    let max_connections = config.server.max_connections;
    let ip_limit = config.server.ip_limit;
    let queue_len = config.server.outbound_queue.max(1);

    loop {
        let (stream, addr) = listener.accept().await?;
        let ip = addr.ip();

        if !conn_state
            .write()
            .await
            .try_add_connection(ip, max_connections, ip_limit)
        {
            warn!("Connection rejected (limit reached): {}", addr);
            continue;
        }

        let game_state = Arc::clone(&game_state);
        let conn_state = Arc::clone(&conn_state);
        tokio::spawn(async move {
            let result = handle_connection(stream, addr, game_state, queue_len).await;

            // Always remove from connection tracking when done
            conn_state.write().await.remove_connection(ip);

            if let Err(e) = result {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    game_state: Arc<RwLock<GameState>>,
    queue_len: usize,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    debug!("New connection from {}", addr);

    let (mut write, mut read) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(queue_len);

    let client_id = game_state.write().await.add_client(addr, tx);

    let result = async {
        loop {
            tokio::select! {
                msg = read.next() => {
                    let data = match msg {
                        Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                        Some(Ok(Message::Binary(data))) => data.to_vec(),
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => return Err(e.into()),
                        Some(Ok(_)) => continue,
                    };
                    let mut state = game_state.write().await;
                    if let Err(e) = state.handle_message(client_id, &data) {
                        debug!("Dropping message from {}: {}", addr, e);
                    }
                }
                outbound = rx.recv() => {
                    let Some(message) = outbound else {
                        break;
                    };
                    let json = match message.to_json() {
                        Ok(json) => json,
                        Err(e) => {
                            warn!("Failed to encode message for {}: {}", addr, e);
                            continue;
                        }
                    };
                    if let Err(e) = write.send(Message::Text(json.into())).await {
                        debug!("Failed to send to {}: {}", addr, e);
                        break;
                    }
                }
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    game_state.write().await.remove_client(client_id);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_limits() {
        let mut state = ConnectionState::new();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(state.try_add_connection(a, 3, 2));
        assert!(state.try_add_connection(a, 3, 2));
        assert!(!state.try_add_connection(a, 3, 2));
        assert!(state.try_add_connection(b, 3, 2));
        assert!(!state.try_add_connection(b, 3, 2));

        state.remove_connection(a);
        assert_eq!(state.total_connections, 2);
        assert!(state.try_add_connection(b, 3, 2));
    }

    #[test]
    fn test_remove_unknown_ip() {
        let mut state = ConnectionState::new();
        state.remove_connection("10.0.0.9".parse().unwrap());
        assert_eq!(state.total_connections, 0);
        assert!(state.ip_connections.is_empty());
    }
}
