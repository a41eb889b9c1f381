//! Spawn placement for newly registered players.

use crate::map::MapModel;
use crate::validation::can_occupy;

/// Returns the first cell, scanning rows top to bottom and each row left to
/// right, that a new player could occupy. `None` means the map is full.
pub fn find_spawn<'a, I>(map: &MapModel, occupants: I) -> Option<(i32, i32)>
where
    I: IntoIterator<Item = (&'a str, (i32, i32))>,
{
    let occupied: Vec<(&str, (i32, i32))> = occupants.into_iter().collect();

    (0..map.height() as i32)
        .flat_map(|y| (0..map.width() as i32).map(move |x| (x, y)))
        .find(|&cell| can_occupy(map, occupied.iter().copied(), None, cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOBODY: [(&str, (i32, i32)); 0] = [];

    #[test]
    fn test_first_free_cell_row_major() {
        let map = MapModel::parse("▤▤▤▤\n▤▤ ▤\n▤  ▤\n▤▤▤▤").unwrap();
        assert_eq!(find_spawn(&map, NOBODY), Some((2, 1)));
    }

    #[test]
    fn test_skips_occupied_cells() {
        let map = MapModel::parse("▤▤▤▤\n▤  ▤\n▤  ▤\n▤▤▤▤").unwrap();

        assert_eq!(find_spawn(&map, [("p1", (1, 1))]), Some((2, 1)));
        assert_eq!(
            find_spawn(&map, [("p1", (1, 1)), ("p2", (2, 1))]),
            Some((1, 2))
        );
    }

    #[test]
    fn test_rows_scanned_before_columns() {
        // A column-major scan would pick (0,1) first
        let map = MapModel::parse("▤ \n  ").unwrap();
        assert_eq!(find_spawn(&map, NOBODY), Some((1, 0)));
        assert_eq!(find_spawn(&map, [("p1", (1, 0))]), Some((0, 1)));
    }

    #[test]
    fn test_full_map_has_no_spawn() {
        let walls = MapModel::parse("▤▤\n▤▤").unwrap();
        assert_eq!(find_spawn(&walls, NOBODY), None);

        let crowded = MapModel::parse("▤ ▤").unwrap();
        assert_eq!(find_spawn(&crowded, [("p1", (1, 0))]), None);
    }

    #[test]
    fn test_deterministic() {
        let map = MapModel::parse("▤♣ ▤\n▤  ▤").unwrap();
        let occupants = [("p1", (1, 0))];
        let first = find_spawn(&map, occupants);
        for _ in 0..10 {
            assert_eq!(find_spawn(&map, occupants), first);
        }
        assert_eq!(first, Some((2, 0)));
    }
}
