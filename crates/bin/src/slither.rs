//! Slither - snake arena game server binary

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Slither - Snake Arena Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = server::Config::load()?;
    info!("Loaded configuration");
    info!("  Port: {}", config.server.port);
    info!("  World: {0}x{0}", config.world.size);
    info!(
        "  Tick rate: {}/s, state every {} ticks",
        config.server.tick_rate,
        config.send_every()
    );
    info!("  AI snakes: {}, food: {}", config.ai.count, config.food.count);

    server::run(config).await?;

    Ok(())
}
