//! TCP transport for the game service.
//!
//! Each accepted connection gets its own task. A task reads one request frame,
//! hands it to the shared [`GameService`], writes the response frame and waits
//! for the next request, so a connection has at most one call in flight.

use crate::service::GameService;
use log::{debug, error, info, warn};
use shared::{read_frame, write_frame, Request, Response};
use std::collections::HashMap;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Accepts client connections and serves them against one game service.
pub struct Server {
    listener: TcpListener,
    service: Arc<GameService>,
    keep_players_on_drop: bool,
}

impl Server {
    pub async fn bind(
        addr: &str,
        service: Arc<GameService>,
        keep_players_on_drop: bool,
    ) -> Result<Self, BoxError> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            service,
            keep_players_on_drop,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, BoxError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Accept errors are logged and the loop keeps going.
    pub async fn run(self) -> Result<(), BoxError> {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    continue;
                }
            };

            let service = Arc::clone(&self.service);
            let keep_players = self.keep_players_on_drop;
            tokio::spawn(async move {
                serve_connection(stream, addr, service, keep_players).await;
            });
        }
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    service: Arc<GameService>,
    keep_players: bool,
) {
    info!("Client connected from {}", addr);
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Could not disable Nagle for {}: {}", addr, e);
    }

    let mut session = Session::default();
    if let Err(e) = session.serve(&mut stream, &service).await {
        warn!("Connection from {} closed with error: {}", addr, e);
    } else {
        info!("Client {} disconnected", addr);
    }

    if !keep_players {
        session.release(&service).await;
    }
}

/// Per-connection bookkeeping: the registrations this connection made and
/// has not disconnected yet, keyed by id with their generation.
#[derive(Debug, Default)]
struct Session {
    players: HashMap<String, u64>,
}

impl Session {
    async fn serve<S>(&mut self, stream: &mut S, service: &GameService) -> Result<(), BoxError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        while let Some(request) = read_frame::<_, Request>(stream).await? {
            let response = match request {
                Request::Register { id } => {
                    let generation = service.register_owned(&id).await;
                    if let Some(generation) = generation {
                        self.players.insert(id, generation);
                    }
                    Response::Ack(generation.is_some())
                }
                Request::Disconnect { id } => {
                    let ack = service.disconnect(&id).await;
                    if ack {
                        self.players.remove(&id);
                    }
                    Response::Ack(ack)
                }
                other => service.handle(other).await,
            };

            write_frame(stream, &response).await?;
        }
        Ok(())
    }

    /// Removes every player this connection left behind. A player that was
    /// disconnected elsewhere and registered again is not ours any more and
    /// stays.
    async fn release(self, service: &GameService) {
        for (id, generation) in self.players {
            if service.release(&id, generation).await {
                debug!("Released player {} after connection loss", id);
            }
        }
    }
}
