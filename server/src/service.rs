//! Request handling on top of the player registry.
//!
//! Every operation takes the registry lock once, does all of its work while
//! holding it and releases it before returning, so calls from different
//! connections are applied in some serial order. The lock is never held
//! across network I/O.

use crate::map::MapModel;
use crate::registry::{PlayerRegistry, RegistryError};
use log::{debug, info, trace};
use shared::{GameSnapshot, MoveCommand, Request, Response};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Facade exposed to the transport. Results are reduced to a boolean
/// acknowledgement; the reason for a refusal is only logged.
pub struct GameService {
    registry: Mutex<PlayerRegistry>,
}

impl GameService {
    pub fn new(map: MapModel) -> Self {
        Self {
            registry: Mutex::new(PlayerRegistry::new(Arc::new(map))),
        }
    }

    pub async fn register(&self, id: &str) -> bool {
        self.register_owned(id).await.is_some()
    }

    /// Registers `id` and returns the generation of the new registration,
    /// which [`GameService::release`] later uses to remove exactly this one.
    pub async fn register_owned(&self, id: &str) -> Option<u64> {
        let mut registry = self.registry.lock().await;
        if acknowledge("register", id, registry.register(id)) {
            registry.generation(id)
        } else {
            None
        }
    }

    pub async fn disconnect(&self, id: &str) -> bool {
        let mut registry = self.registry.lock().await;
        acknowledge("disconnect", id, registry.disconnect(id))
    }

    /// Disconnects `id` if its active registration is still `generation`.
    pub async fn release(&self, id: &str, generation: u64) -> bool {
        let mut registry = self.registry.lock().await;
        acknowledge("release", id, registry.disconnect_generation(id, generation))
    }

    pub async fn move_player(&self, cmd: &MoveCommand) -> bool {
        let mut registry = self.registry.lock().await;
        acknowledge("move", &cmd.id, registry.apply_movement(cmd))
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.registry.lock().await.snapshot()
    }

    pub async fn player_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    /// Dispatches one wire request.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Register { id } => Response::Ack(self.register(&id).await),
            Request::Move(cmd) => Response::Ack(self.move_player(&cmd).await),
            Request::Disconnect { id } => Response::Ack(self.disconnect(&id).await),
            Request::Snapshot { requester } => {
                trace!("Snapshot requested by {}", requester);
                Response::Snapshot(self.snapshot().await)
            }
        }
    }
}

fn acknowledge<T>(operation: &str, id: &str, result: Result<T, RegistryError>) -> bool {
    match result {
        Ok(_) => true,
        Err(e @ RegistryError::NoSpawnAvailable) => {
            info!("Refused {} for {}: {}", operation, id, e);
            false
        }
        Err(e) => {
            debug!("Refused {} for {}: {}", operation, id, e);
            false
        }
    }
}
