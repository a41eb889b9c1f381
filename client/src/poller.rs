//! Background snapshot polling.
//!
//! The server never pushes state. The poller asks for a snapshot every
//! `interval` on its own connection and publishes the latest one through a
//! watch channel, so readers see the world as it was at most one interval
//! (plus one round trip) ago. Failures are never fatal: the poller waits
//! `backoff`, reconnects if needed and tries again.

use crate::network::GameClient;
use log::{debug, warn};
use shared::GameSnapshot;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub interval: Duration,
    pub backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            backoff: Duration::from_secs(1),
        }
    }
}

/// Starts polling `server_addr`. The task stops once every receiver has been
/// dropped.
pub fn spawn_poller(
    server_addr: String,
    requester: String,
    config: PollerConfig,
) -> (watch::Receiver<Option<GameSnapshot>>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(None);

    let handle = tokio::spawn(async move {
        let mut connection: Option<GameClient> = None;

        while !tx.is_closed() {
            if connection.is_none() {
                match GameClient::connect(&server_addr, &requester).await {
                    Ok(client) => connection = Some(client),
                    Err(e) => {
                        warn!("Snapshot poller could not connect: {}", e);
                        sleep(config.backoff).await;
                        continue;
                    }
                }
            }

            let Some(client) = connection.as_mut() else {
                continue;
            };

            match client.snapshot().await {
                Ok(snapshot) => {
                    if tx.send(Some(snapshot)).is_err() {
                        break;
                    }
                    sleep(config.interval).await;
                }
                Err(e) => {
                    warn!("Snapshot poll failed, retrying in {:?}: {}", config.backoff, e);
                    connection = None;
                    sleep(config.backoff).await;
                }
            }
        }

        debug!("Snapshot poller stopped");
    });

    (rx, handle)
}
