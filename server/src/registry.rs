//! Authoritative player state for the grid world.
//!
//! The registry is the single source of truth for who is in the world, where
//! they stand and which movement command each of them applied last. It keeps
//! three invariants after every operation:
//! - no two players share a cell
//! - every player stands on an in-bounds, non-tangible cell
//! - a player's last applied sequence number never decreases
//!
//! The registry itself is plain data. Callers that share it between
//! connections wrap it in a single lock (see [`crate::service::GameService`]).

use crate::map::MapModel;
use crate::spawn::find_spawn;
use crate::validation::{check_destination, Rejection};
use log::{debug, info};
use shared::{GameSnapshot, MoveCommand, PlayerState};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Why a registry operation was refused. A refused operation never changes
/// any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Register with an id that is already active.
    DuplicateId(String),
    /// Every free cell of the map is taken.
    NoSpawnAvailable,
    /// Move or disconnect for an id that is not active.
    UnknownPlayer(String),
    /// Release of an id that has since been disconnected and registered again.
    Superseded { id: String, generation: u64 },
    /// Deltas outside {-1, 0, 1} or a diagonal step.
    InvalidStep { delta_x: i32, delta_y: i32 },
    /// A retransmitted or out-of-order command.
    StaleSequence { sequence: u64, last: u64 },
    /// The destination failed validation.
    Blocked(Rejection),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateId(id) => write!(f, "player {} is already registered", id),
            RegistryError::NoSpawnAvailable => write!(f, "no free cell left to spawn in"),
            RegistryError::UnknownPlayer(id) => write!(f, "unknown player {}", id),
            RegistryError::Superseded { id, generation } => {
                write!(f, "registration {} of player {} is no longer active", generation, id)
            }
            RegistryError::InvalidStep { delta_x, delta_y } => {
                write!(f, "({}, {}) is not a unit step", delta_x, delta_y)
            }
            RegistryError::StaleSequence { sequence, last } => write!(
                f,
                "sequence {} is not newer than last applied {}",
                sequence, last
            ),
            RegistryError::Blocked(rejection) => write!(f, "{}", rejection),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Blocked(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<Rejection> for RegistryError {
    fn from(rejection: Rejection) -> Self {
        RegistryError::Blocked(rejection)
    }
}

/// Tracks every active player against a shared, immutable map.
///
/// Each successful registration is stamped with a generation number that is
/// never reused, so a holder of an old registration can tell it apart from a
/// later player with the same id.
#[derive(Debug)]
pub struct PlayerRegistry {
    map: Arc<MapModel>,
    players: HashMap<String, PlayerState>,
    generations: HashMap<String, u64>,
    next_generation: u64,
}

impl PlayerRegistry {
    pub fn new(map: Arc<MapModel>) -> Self {
        Self {
            map,
            players: HashMap::new(),
            generations: HashMap::new(),
            next_generation: 1,
        }
    }

    pub fn map(&self) -> &MapModel {
        &self.map
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PlayerState> {
        self.players.get(id)
    }

    /// Generation of the active registration for `id`.
    pub fn generation(&self, id: &str) -> Option<u64> {
        self.generations.get(id).copied()
    }

    fn occupants(&self) -> impl Iterator<Item = (&str, (i32, i32))> + '_ {
        self.players
            .values()
            .map(|player| (player.id.as_str(), player.position()))
    }

    /// Adds a player at the first free cell and returns that cell.
    ///
    /// The new player starts with sequence 0, so its first move must carry
    /// sequence 1 or higher.
    pub fn register(&mut self, id: &str) -> Result<(i32, i32), RegistryError> {
        if self.players.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }

        let (x, y) = find_spawn(&self.map, self.occupants()).ok_or(RegistryError::NoSpawnAvailable)?;

        info!("Player {} spawned at ({}, {})", id, x, y);
        self.players
            .insert(id.to_string(), PlayerState::new(id, x, y));
        self.generations.insert(id.to_string(), self.next_generation);
        self.next_generation += 1;
        Ok((x, y))
    }

    /// Removes a player. Returns the state it had when it left.
    pub fn disconnect(&mut self, id: &str) -> Result<PlayerState, RegistryError> {
        let player = self
            .players
            .remove(id)
            .ok_or_else(|| RegistryError::UnknownPlayer(id.to_string()))?;
        self.generations.remove(id);

        info!("Player {} left from ({}, {})", id, player.x, player.y);
        Ok(player)
    }

    /// Removes a player only if its active registration is `generation`.
    pub fn disconnect_generation(
        &mut self,
        id: &str,
        generation: u64,
    ) -> Result<PlayerState, RegistryError> {
        match self.generations.get(id).copied() {
            None => Err(RegistryError::UnknownPlayer(id.to_string())),
            Some(active) if active != generation => Err(RegistryError::Superseded {
                id: id.to_string(),
                generation,
            }),
            Some(_) => self.disconnect(id),
        }
    }

    /// Applies one movement step and returns the player's new position.
    ///
    /// A command whose sequence is not strictly newer than the last applied
    /// one is refused without touching state, as is a command whose
    /// destination fails validation. Only an applied step advances the
    /// player's sequence.
    pub fn apply_movement(&mut self, cmd: &MoveCommand) -> Result<(i32, i32), RegistryError> {
        let player = self
            .players
            .get(&cmd.id)
            .ok_or_else(|| RegistryError::UnknownPlayer(cmd.id.clone()))?;

        if !cmd.is_unit_step() {
            return Err(RegistryError::InvalidStep {
                delta_x: cmd.delta_x,
                delta_y: cmd.delta_y,
            });
        }

        if cmd.sequence <= player.sequence {
            return Err(RegistryError::StaleSequence {
                sequence: cmd.sequence,
                last: player.sequence,
            });
        }

        let target = (player.x + cmd.delta_x, player.y + cmd.delta_y);
        check_destination(&self.map, self.occupants(), Some(&cmd.id), target)?;

        if let Some(player) = self.players.get_mut(&cmd.id) {
            player.x = target.0;
            player.y = target.1;
            player.sequence = cmd.sequence;
        }

        debug!(
            "Player {} moved to ({}, {}) at sequence {}",
            cmd.id, target.0, target.1, cmd.sequence
        );
        Ok(target)
    }

    /// Copies every player and the map glyphs into a new snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            map_symbols: self.map.symbols(),
        }
    }
}
