//! Destination checks for spawning and movement.
//!
//! Rules, applied in order:
//! - Outside the grid: OutOfBounds
//! - Tangible terrain: BlockedByTerrain
//! - Occupied by another player: BlockedByPlayer
//!
//! These functions only read their inputs, so the registry calls them while
//! holding its lock.

use crate::map::MapModel;
use std::fmt;

/// Why a destination cannot be occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutOfBounds,
    BlockedByTerrain,
    BlockedByPlayer,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutOfBounds => write!(f, "destination is outside the map"),
            Rejection::BlockedByTerrain => write!(f, "destination is blocked by terrain"),
            Rejection::BlockedByPlayer => write!(f, "destination is occupied by another player"),
        }
    }
}

impl std::error::Error for Rejection {}

/// Checks whether `target` may be occupied.
///
/// `occupants` yields `(player id, position)` pairs. The `mover`, when given,
/// is ignored during the occupancy check so a player never blocks itself.
pub fn check_destination<'a, I>(
    map: &MapModel,
    occupants: I,
    mover: Option<&str>,
    target: (i32, i32),
) -> Result<(), Rejection>
where
    I: IntoIterator<Item = (&'a str, (i32, i32))>,
{
    let (x, y) = target;
    if !map.in_bounds(x, y) {
        return Err(Rejection::OutOfBounds);
    }

    if map.is_tangible(x, y) {
        return Err(Rejection::BlockedByTerrain);
    }

    let blocked = occupants
        .into_iter()
        .any(|(id, position)| position == target && Some(id) != mover);
    if blocked {
        return Err(Rejection::BlockedByPlayer);
    }

    Ok(())
}

pub fn can_occupy<'a, I>(map: &MapModel, occupants: I, mover: Option<&str>, target: (i32, i32)) -> bool
where
    I: IntoIterator<Item = (&'a str, (i32, i32))>,
{
    check_destination(map, occupants, mover, target).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOBODY: [(&str, (i32, i32)); 0] = [];

    fn arena() -> MapModel {
        // 5x4, walls on the border, one enemy and one bush inside
        MapModel::parse("▤▤▤▤▤\n▤ ☠ ▤\n▤ ♣ ▤\n▤▤▤▤▤").unwrap()
    }

    #[test]
    fn test_free_cell_accepted() {
        let map = arena();
        assert_eq!(check_destination(&map, NOBODY, None, (1, 1)), Ok(()));
        assert!(can_occupy(&map, NOBODY, None, (3, 2)));
    }

    #[test]
    fn test_out_of_bounds() {
        let map = arena();
        for target in [(-1, 1), (1, -1), (5, 1), (1, 4)] {
            assert_eq!(
                check_destination(&map, NOBODY, None, target),
                Err(Rejection::OutOfBounds),
                "target {:?}",
                target
            );
        }
    }

    #[test]
    fn test_tangible_terrain() {
        let map = arena();
        assert_eq!(
            check_destination(&map, NOBODY, None, (0, 0)),
            Err(Rejection::BlockedByTerrain)
        );
        assert_eq!(
            check_destination(&map, NOBODY, None, (2, 1)),
            Err(Rejection::BlockedByTerrain)
        );
        // Vegetation can be walked through
        assert!(can_occupy(&map, NOBODY, None, (2, 2)));
    }

    #[test]
    fn test_other_player_blocks() {
        let map = arena();
        let occupants = [("p1", (1, 1)), ("p2", (3, 1))];

        assert_eq!(
            check_destination(&map, occupants, Some("p2"), (1, 1)),
            Err(Rejection::BlockedByPlayer)
        );
        assert_eq!(
            check_destination(&map, occupants, None, (3, 1)),
            Err(Rejection::BlockedByPlayer)
        );
    }

    #[test]
    fn test_mover_does_not_block_itself() {
        let map = arena();
        let occupants = [("p1", (1, 1))];
        assert!(can_occupy(&map, occupants, Some("p1"), (1, 1)));
        assert!(!can_occupy(&map, occupants, Some("p2"), (1, 1)));
    }

    #[test]
    fn test_terrain_checked_before_players() {
        let map = arena();
        // A player reported on a wall still yields the terrain rejection
        let occupants = [("ghost", (0, 1))];
        assert_eq!(
            check_destination(&map, occupants, None, (0, 1)),
            Err(Rejection::BlockedByTerrain)
        );
    }

    #[test]
    fn test_same_inputs_same_answer() {
        let map = arena();
        let occupants = [("p1", (1, 2)), ("p2", (3, 2))];
        for y in -1..5 {
            for x in -1..6 {
                let first = check_destination(&map, occupants, None, (x, y));
                let second = check_destination(&map, occupants, None, (x, y));
                assert_eq!(first, second);
            }
        }
    }
}
