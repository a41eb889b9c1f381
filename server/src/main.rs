use clap::Parser;
use log::{error, info};
use server::config::ServerConfig;
use server::map::MapModel;
use server::network::Server;
use server::service::GameService;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ServerConfig::parse();

    let map = MapModel::load(&config.map).map_err(|e| {
        error!("Failed to load map {}: {}", config.map.display(), e);
        e
    })?;
    info!(
        "Loaded {}x{} map from {}",
        map.width(),
        map.height(),
        config.map.display()
    );

    let service = Arc::new(GameService::new(map));
    let server = Server::bind(&config.address(), service, config.keep_players_on_drop).await?;

    // Handle shutdown gracefully
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
