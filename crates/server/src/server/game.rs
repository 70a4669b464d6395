//! Game state and main loop.

use crate::config::Config;
use crate::entity::palette_table;
use crate::world::{TickReport, World};
use futures_util::FutureExt;
use protocol::{ClientMessage, ServerMessage};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::client::Client;
use super::view::build_snapshot;

/// Name used when a join or respawn carries none.
const DEFAULT_NAME: &str = "Player";

/// Main game state.
pub struct GameState {
    pub config: Config,
    pub world: World,
    pub tick_count: u64,
    pub start_time: std::time::Instant,

    next_client_id: u32,
    /// Connected clients.
    pub clients: HashMap<u32, Client>,

    /// Ticks between state broadcasts.
    send_every: u64,

    /// Average tick duration in milliseconds (exponential moving average).
    pub update_time_avg: f64,
}

impl GameState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            world: World::new(config),
            tick_count: 0,
            start_time: std::time::Instant::now(),
            next_client_id: 1,
            clients: HashMap::new(),
            send_every: config.send_every(),
            update_time_avg: 0.0,
        }
    }

    /// Register a connection; it controls nothing until it joins.
    pub fn add_client(&mut self, addr: SocketAddr, outbound: mpsc::Sender<ServerMessage>) -> u32 {
        let id = self.next_client_id;
        self.next_client_id += 1;
        self.clients.insert(id, Client::new(id, addr, outbound));
        debug!("Client {} connected from {}", id, addr);
        id
    }

    /// Drop a connection. Its snake dies and is reaped on the next tick.
    pub fn remove_client(&mut self, id: u32) {
        let Some(client) = self.clients.remove(&id) else {
            return;
        };
        if let Some(snake_id) = &client.snake_id {
            self.world.kill(snake_id);
            info!(
                "[-] {} left after {}s ({} online)",
                client.name,
                client.connected_at.elapsed().as_secs(),
                self.clients.len()
            );
        } else {
            debug!(
                "Client {} ({}) disconnected after {:?}",
                id,
                client.addr,
                client.connected_at.elapsed()
            );
        }
    }

    /// Handle a message from a client.
    ///
    /// Errors mean the message was unreadable or the client is gone; the
    /// caller drops them without closing the connection.
    pub fn handle_message(&mut self, client_id: u32, data: &[u8]) -> anyhow::Result<()> {
        let client = self
            .clients
            .get(&client_id)
            .ok_or_else(|| anyhow::anyhow!("Client not found"))?;
        let mapped = client.snake_id.is_some();

        match ClientMessage::parse_bytes(data)? {
            ClientMessage::Join { name } => self.handle_join(client_id, name),
            ClientMessage::Input { heading, boost } => self.handle_input(client_id, heading, boost),
            // Respawn needs an existing mapping.
            ClientMessage::Respawn { name } if mapped => self.handle_join(client_id, name),
            ClientMessage::Respawn { .. } => {}
        }
        Ok(())
    }

    /// Spawn a fresh snake for the client and point its mapping at it.
    /// A previously controlled snake dies and is reaped on the next tick.
    fn handle_join(&mut self, client_id: u32, name: Option<String>) {
        let name = player_name(name, self.config.snake.max_name_length);
        let online = self.clients.len();
        let Some(client) = self.clients.get_mut(&client_id) else {
            return;
        };
        let previous = client.snake_id.take();
        if let Some(old) = &previous {
            self.world.kill(old);
        }
        let snake_id = self.world.spawn_player(name.clone());
        client.snake_id = Some(snake_id.clone());
        let rejoin = previous.is_some();
        client.name = name;

        client.send(ServerMessage::Welcome {
            id: snake_id.clone(),
            world_size: self.world.world_size(),
            palettes: palette_table(),
        });

        if rejoin {
            debug!("Client {} respawned as {} ({})", client_id, client.name, snake_id);
        } else {
            info!("[+] {} joined ({} online)", client.name, online);
        }
    }

    fn handle_input(&mut self, client_id: u32, heading: Option<f32>, boost: bool) {
        let Some(snake_id) = self.clients.get(&client_id).and_then(|c| c.snake_id.as_deref()) else {
            return;
        };
        if let Some(snake) = self.world.snake_mut(snake_id) {
            if snake.alive {
                snake.steer(heading, boost);
            }
        }
    }

    /// Run a single game tick: simulate, notify deaths, broadcast state.
    pub fn tick(&mut self) -> TickReport {
        let tick_start = std::time::Instant::now();
        self.tick_count += 1;

        let clients = &self.clients;
        let report = self
            .world
            .step(|snake_id| clients.values().any(|c| c.controls(snake_id)));

        for death in &report.deaths {
            debug!(
                "Snake {} died at length {} (score {})",
                death.snake_id, death.length, death.score
            );
            for client in self.clients.values().filter(|c| c.controls(&death.snake_id)) {
                client.send(ServerMessage::Death {
                    score: death.score,
                    length: death.length,
                });
            }
        }

        let broadcast_start = std::time::Instant::now();
        if self.tick_count % self.send_every == 0 {
            self.broadcast_state();
        }
        let broadcast_time = broadcast_start.elapsed();

        let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;
        self.update_time_avg = smooth(self.update_time_avg, tick_ms);

        // Log performance metrics every 400 ticks
        if self.tick_count % 400 == 0 {
            let t = &report.timings;
            let food = self.world.food_events();
            debug!(
                "Tick #{} (up {}s): {:.2}ms total, {:.2}ms avg | ai={:.2}ms move={:.2}ms collision={:.2}ms upkeep={:.2}ms broadcast={:.2}ms | {} snakes, {} food (+{} -{}), {} eaten, {} deaths, {} clients",
                self.tick_count,
                self.start_time.elapsed().as_secs(),
                tick_ms,
                self.update_time_avg,
                t.ai.as_secs_f64() * 1000.0,
                t.movement.as_secs_f64() * 1000.0,
                t.collisions.as_secs_f64() * 1000.0,
                t.upkeep.as_secs_f64() * 1000.0,
                broadcast_time.as_secs_f64() * 1000.0,
                self.world.snakes().len(),
                self.world.foods().len(),
                food.added.len(),
                food.removed.len(),
                report.eaten,
                report.deaths.len(),
                self.clients.len()
            );
        }

        report
    }

    /// Send each mapped client the world around its snake.
    fn broadcast_state(&self) {
        let view_range = self.config.world.view_range;
        for client in self.clients.values() {
            let Some(snake_id) = client.snake_id.as_deref() else {
                continue;
            };
            if let Some(state) = build_snapshot(&self.world, snake_id, view_range) {
                client.send(state);
            }
        }
    }
}

/// Exponential moving average of tick time.
#[inline]
fn smooth(avg: f64, sample_ms: f64) -> f64 {
    avg * 0.5 + sample_ms * 0.5
}

/// Fall back to the default name and cap the length in characters.
fn player_name(name: Option<String>, max_len: usize) -> String {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => name.chars().take(max_len).collect(),
        None => DEFAULT_NAME.to_string(),
    }
}

/// Run the game loop.
pub async fn run_game_loop(state: Arc<RwLock<GameState>>, tick_interval: Duration) {
    let start = Instant::now() + tick_interval;
    let mut ticker = interval_at(start, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Initial spawn
    {
        let mut game = state.write().await;
        info!("Initial world spawn...");
        game.world.populate();
        info!(
            "World initialized: {} food, {} AI snakes",
            game.world.foods().len(),
            game.world.alive_ai()
        );
    }

    let tick_budget = tick_interval.as_secs_f64() * 1000.0 * 0.9;
    loop {
        let scheduled = ticker.tick().await;

        // Drain any backlog so the tick always runs on fresh input.
        let mut skipped = 0u32;
        while ticker.tick().now_or_never().is_some() {
            skipped += 1;
        }
        if skipped > 0 {
            debug!(
                "Skipped {} ticks to stay current (lag: {:?})",
                skipped,
                Instant::now().saturating_duration_since(scheduled)
            );
        }

        let mut game = state.write().await;
        let tick_start = std::time::Instant::now();
        game.tick();
        let tick_ms = tick_start.elapsed().as_secs_f64() * 1000.0;

        if tick_ms > tick_budget {
            warn!(
                "Slow tick #{}: {:.3}ms (avg {:.3}ms, budget: {:.1}ms) - {} clients, {} snakes",
                game.tick_count,
                tick_ms,
                game.update_time_avg,
                tick_budget,
                game.clients.len(),
                game.world.snakes().len()
            );
        }
    }
}
