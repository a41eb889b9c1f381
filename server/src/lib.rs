//! # Grid World Server Library
//!
//! Authoritative server for a shared grid world. Clients register a character,
//! step it one cell at a time and poll snapshots of the whole world. The server
//! alone decides where characters stand.
//!
//! ## Module Organization
//!
//! ### Map Module (`map`)
//! The static terrain grid, loaded once from a text file. Answers "does this
//! cell block movement?" in constant time.
//!
//! ### Validation Module (`validation`)
//! The destination check shared by spawning and movement: in bounds, not
//! tangible, not taken by another player.
//!
//! ### Spawn Module (`spawn`)
//! Row-major search for the first cell a new player may occupy.
//!
//! ### Registry Module (`registry`)
//! Player positions and last applied sequence numbers. Enforces the
//! no-overlap rule and sequence ordering.
//!
//! ### Service Module (`service`)
//! The facade the transport calls. Serializes every operation behind one lock
//! and reduces results to boolean acknowledgements.
//!
//! ### Network Module (`network`)
//! TCP listener with one task per connection, length-prefixed bincode frames,
//! and cleanup of a connection's players when it closes.
//!
//! ## Consistency
//!
//! All registry operations are linearizable: each one holds the registry lock
//! for its full duration and never across I/O. There is no push channel, so a
//! client's view of the world is at most one polling interval old.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::map::MapModel;
//! use server::network::Server;
//! use server::service::GameService;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let map = MapModel::load("mapa.txt")?;
//!     let service = Arc::new(GameService::new(map));
//!
//!     let server = Server::bind("0.0.0.0:1234", service, false).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod map;
pub mod network;
pub mod registry;
pub mod service;
pub mod spawn;
pub mod validation;
