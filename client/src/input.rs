//! Line-based command input.
//!
//! Each character of a line is one command, so `ddw` steps right twice and
//! then up. Whitespace and unknown characters are ignored.

use shared::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// Print the latest known state of the world
    Status,
    Quit,
}

pub fn parse_command(key: char) -> Option<Command> {
    if let Some(direction) = Direction::from_key(key) {
        return Some(Command::Move(direction));
    }

    match key.to_ascii_lowercase() {
        'p' => Some(Command::Status),
        'q' => Some(Command::Quit),
        _ => None,
    }
}

/// Commands in a line, stopping after the first quit.
pub fn parse_line(line: &str) -> Vec<Command> {
    let mut commands = Vec::new();
    for command in line.chars().filter_map(parse_command) {
        commands.push(command);
        if command == Command::Quit {
            break;
        }
    }
    commands
}
