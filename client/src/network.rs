//! Request/response connection to the game server.

use log::{debug, warn};
use shared::{
    read_frame, write_frame, Direction, FrameError, GameSnapshot, MoveCommand, Request, Response,
};
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::sleep;

#[derive(Debug)]
pub enum ClientError {
    Frame(FrameError),
    /// The server closed the connection before answering.
    Closed,
    /// The server answered with a response of the wrong kind.
    UnexpectedResponse(Response),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Frame(e) => write!(f, "{}", e),
            ClientError::Closed => write!(f, "server closed the connection"),
            ClientError::UnexpectedResponse(response) => {
                write!(f, "unexpected response: {:?}", response)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Frame(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FrameError> for ClientError {
    fn from(e: FrameError) -> Self {
        ClientError::Frame(e)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Frame(FrameError::Io(e))
    }
}

/// One connection, one player.
///
/// The client numbers its own movement commands. A command is sent with the
/// last acknowledged sequence plus one, and the counter only advances when the
/// server accepts the step, so a refused step can be retried with the same
/// number.
pub struct GameClient {
    stream: TcpStream,
    player_id: String,
    sequence: u64,
    fake_ping_ms: u64,
}

impl GameClient {
    pub async fn connect(server_addr: &str, player_id: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(server_addr).await?;
        stream.set_nodelay(true)?;
        debug!("Connected to {}", server_addr);

        Ok(GameClient {
            stream,
            player_id: player_id.to_string(),
            sequence: 0,
            fake_ping_ms: 0,
        })
    }

    /// Simulates network latency: half before each request, half after each
    /// response.
    pub fn with_fake_ping(mut self, fake_ping_ms: u64) -> Self {
        self.fake_ping_ms = fake_ping_ms;
        self
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Last sequence number the server acknowledged.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub async fn call(&mut self, request: &Request) -> Result<Response, ClientError> {
        if self.fake_ping_ms > 0 {
            sleep(Duration::from_millis(self.fake_ping_ms / 2)).await;
        }

        write_frame(&mut self.stream, request).await?;
        let response = read_frame(&mut self.stream)
            .await?
            .ok_or(ClientError::Closed)?;

        if self.fake_ping_ms > 0 {
            sleep(Duration::from_millis(self.fake_ping_ms / 2)).await;
        }
        Ok(response)
    }

    async fn call_ack(&mut self, request: &Request) -> Result<bool, ClientError> {
        match self.call(request).await? {
            Response::Ack(ack) => Ok(ack),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }

    pub async fn register(&mut self) -> Result<bool, ClientError> {
        let request = Request::Register {
            id: self.player_id.clone(),
        };
        let ack = self.call_ack(&request).await?;
        if ack {
            self.sequence = 0;
        }
        Ok(ack)
    }

    /// Sends one step. Returns whether the server applied it.
    pub async fn step(&mut self, direction: Direction) -> Result<bool, ClientError> {
        let cmd = MoveCommand::new(self.player_id.clone(), direction, self.sequence + 1);
        let ack = self.call_ack(&Request::Move(cmd)).await?;
        if ack {
            self.sequence += 1;
        } else {
            debug!("Step {:?} refused at sequence {}", direction, self.sequence + 1);
        }
        Ok(ack)
    }

    pub async fn disconnect(&mut self) -> Result<bool, ClientError> {
        let request = Request::Disconnect {
            id: self.player_id.clone(),
        };
        let ack = self.call_ack(&request).await?;
        if !ack {
            warn!("Server did not know player {}", self.player_id);
        }
        Ok(ack)
    }

    pub async fn snapshot(&mut self) -> Result<GameSnapshot, ClientError> {
        let request = Request::Snapshot {
            requester: self.player_id.clone(),
        };
        match self.call(&request).await? {
            Response::Snapshot(snapshot) => Ok(snapshot),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Answers every request with `Ack(accept)` until the peer hangs up.
    async fn ack_server(accept: bool) -> (String, tokio::task::JoinHandle<Vec<Request>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut seen = Vec::new();
            while let Some(request) = read_frame::<_, Request>(&mut stream).await.unwrap() {
                seen.push(request);
                write_frame(&mut stream, &Response::Ack(accept)).await.unwrap();
            }
            seen
        });

        (addr, handle)
    }

    #[tokio::test]
    async fn test_sequence_advances_only_on_ack() {
        let (addr, server) = ack_server(true).await;
        let mut client = GameClient::connect(&addr, "p1").await.unwrap();

        assert!(client.register().await.unwrap());
        assert!(client.step(Direction::Right).await.unwrap());
        assert!(client.step(Direction::Down).await.unwrap());
        assert_eq!(client.sequence(), 2);
        drop(client);

        let seen = server.await.unwrap();
        let sequences: Vec<u64> = seen
            .iter()
            .filter_map(|request| match request {
                Request::Move(cmd) => Some(cmd.sequence),
                _ => None,
            })
            .collect();
        assert_eq!(sequences, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_refused_step_reuses_sequence() {
        let (addr, server) = ack_server(false).await;
        let mut client = GameClient::connect(&addr, "p1").await.unwrap();

        assert!(!client.step(Direction::Up).await.unwrap());
        assert!(!client.step(Direction::Up).await.unwrap());
        assert_eq!(client.sequence(), 0);
        drop(client);

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 2);
        for request in seen {
            match request {
                Request::Move(cmd) => assert_eq!(cmd.sequence, 1),
                other => panic!("unexpected request {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_snapshot_rejects_wrong_response_kind() {
        let (addr, _server) = ack_server(true).await;
        let mut client = GameClient::connect(&addr, "p1").await.unwrap();

        match client.snapshot().await {
            Err(ClientError::UnexpectedResponse(Response::Ack(true))) => {}
            other => panic!("expected unexpected-response error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_closed_connection_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = read_frame::<_, Request>(&mut stream).await;
            // Hang up without answering
        });

        let mut client = GameClient::connect(&addr, "p1").await.unwrap();
        assert!(matches!(client.register().await, Err(ClientError::Closed)));
    }
}
