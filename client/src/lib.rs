//! # Grid World Client Library
//!
//! Reference client for the grid world server. It registers one character,
//! sends numbered movement steps and keeps a recent copy of the world by
//! polling snapshots.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! A single request/response connection:
//! - Frame encoding and decoding over TCP
//! - Registration, movement and disconnect calls
//! - Client-side sequence numbering, advanced only on acknowledged steps
//! - Optional simulated latency for testing
//!
//! ### Poller Module (`poller`)
//! A background task that fetches snapshots on a fixed interval over its own
//! connection and publishes them on a watch channel. Failed polls back off and
//! retry; they never stop the client.
//!
//! ### Input Module (`input`)
//! Translates typed characters into movement, status and quit commands.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::GameClient;
//! use client::poller::{spawn_poller, PollerConfig};
//! use shared::Direction;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = GameClient::connect("127.0.0.1:1234", "alice").await?;
//!     if !client.register().await? {
//!         return Err("id in use or no free cell".into());
//!     }
//!
//!     let (snapshots, _poller) = spawn_poller(
//!         "127.0.0.1:1234".to_string(),
//!         "alice".to_string(),
//!         PollerConfig::default(),
//!     );
//!
//!     client.step(Direction::Right).await?;
//!     if let Some(snapshot) = snapshots.borrow().as_ref() {
//!         println!("{} players online", snapshot.players.len());
//!     }
//!
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod input;
pub mod network;
pub mod poller;
