//! Wire protocol shared between the grid world server and its clients.
//!
//! Every message travels as a frame: a 4-byte big-endian length followed by the
//! bincode encoding of a [`Request`] or [`Response`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, ErrorKind};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const DEFAULT_PORT: u16 = 1234;
/// Upper bound on a single frame payload, in bytes.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;
/// Length prefix size, in bytes.
pub const FRAME_HEADER_LEN: usize = 4;

/// A request sent by a client. Exactly one is in flight per connection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Request {
    Register { id: String },
    Move(MoveCommand),
    Disconnect { id: String },
    /// The requester is carried for logging only; any value is accepted.
    Snapshot { requester: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Response {
    Ack(bool),
    Snapshot(GameSnapshot),
}

/// A single movement step requested by a player.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MoveCommand {
    pub id: String,
    pub delta_x: i32,
    pub delta_y: i32,
    pub sequence: u64,
}

impl MoveCommand {
    pub fn new(id: impl Into<String>, direction: Direction, sequence: u64) -> Self {
        let (delta_x, delta_y) = direction.delta();
        Self {
            id: id.into(),
            delta_x,
            delta_y,
            sequence,
        }
    }

    /// True when both deltas are in {-1, 0, 1} and at most one of them is non-zero.
    pub fn is_unit_step(&self) -> bool {
        let in_range = |d: i32| (-1..=1).contains(&d);
        in_range(self.delta_x) && in_range(self.delta_y) && (self.delta_x == 0 || self.delta_y == 0)
    }
}

/// The four directions a character can step in.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid delta for this direction. The y axis grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Maps the `w`/`a`/`s`/`d` movement keys, case-insensitively.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            'a' => Some(Direction::Left),
            's' => Some(Direction::Down),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Authoritative view of one player as reported in a snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub id: String,
    pub x: i32,
    pub y: i32,
    /// Sequence number of the last accepted move, 0 before the first one.
    pub sequence: u64,
}

impl PlayerState {
    pub fn new(id: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            sequence: 0,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// A point-in-time copy of every player and of the map glyphs.
///
/// Snapshots are owned by whoever receives them; nothing on the server keeps a
/// reference into one.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub players: HashMap<String, PlayerState>,
    pub map_symbols: Vec<Vec<char>>,
}

impl GameSnapshot {
    pub fn player(&self, id: &str) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn height(&self) -> usize {
        self.map_symbols.len()
    }

    pub fn width(&self) -> usize {
        self.map_symbols.first().map_or(0, Vec::len)
    }

    pub fn symbol_at(&self, x: i32, y: i32) -> Option<char> {
        if x < 0 || y < 0 {
            return None;
        }
        self.map_symbols
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }
}

/// Errors produced while framing or unframing a message.
#[derive(Debug)]
pub enum FrameError {
    TooLarge { len: usize },
    Codec(bincode::Error),
    Io(std::io::Error),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::TooLarge { len } => {
                write!(f, "frame of {} bytes exceeds limit of {}", len, MAX_FRAME_LEN)
            }
            FrameError::Codec(e) => write!(f, "codec error: {}", e),
            FrameError::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Codec(e) => Some(&**e),
            FrameError::Io(e) => Some(e),
            FrameError::TooLarge { .. } => None,
        }
    }
}

impl From<bincode::Error> for FrameError {
    fn from(e: bincode::Error) -> Self {
        FrameError::Codec(e)
    }
}

impl From<std::io::Error> for FrameError {
    fn from(e: std::io::Error) -> Self {
        FrameError::Io(e)
    }
}

/// Serializes `message` and prepends its length.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Vec<u8>, FrameError> {
    let payload = bincode::serialize(message)?;
    check_frame_len(payload.len())?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decodes a frame payload (the bytes after the length prefix).
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, FrameError> {
    Ok(bincode::deserialize(payload)?)
}

/// Validates a length prefix read off the wire.
pub fn check_frame_len(len: usize) -> Result<usize, FrameError> {
    if len > MAX_FRAME_LEN {
        Err(FrameError::TooLarge { len })
    } else {
        Ok(len)
    }
}

/// Reads one frame from `stream`. `Ok(None)` means the peer closed the
/// stream cleanly between frames; closing part way through the length
/// prefix or the payload is an I/O error.
pub async fn read_frame<S, T>(stream: &mut S) -> Result<Option<T>, FrameError>
where
    S: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let mut header = [0u8; FRAME_HEADER_LEN];
    let mut filled = 0;
    while filled < FRAME_HEADER_LEN {
        let n = stream.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "connection closed after {} of {} header bytes",
                    filled, FRAME_HEADER_LEN
                ),
            )
            .into());
        }
        filled += n;
    }
    let len = check_frame_len(u32::from_be_bytes(header) as usize)?;

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    decode_payload(&payload).map(Some)
}

pub async fn write_frame<S, T>(stream: &mut S, message: &T) -> Result<(), FrameError>
where
    S: AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode_frame(message)?;
    stream.write_all(&frame).await?;
    stream.flush().await?;
    Ok(())
}
