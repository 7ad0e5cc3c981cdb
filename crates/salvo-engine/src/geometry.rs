//! Board geometry: which cells a ship covers. Pure functions, no state.

use salvo_protocol::{Coord, Orientation, Ship};

/// The cells `ship` occupies, in order from its origin.
///
/// Steps +1 on x for horizontal ships and +1 on y for vertical ones.
/// Cells that would fall past `u8::MAX` do not exist and are left out,
/// so the result is shorter than `ship.length` only for ships that run
/// off the coordinate space (fleet validation rejects those).
pub fn occupied_cells(ship: &Ship) -> Vec<Coord> {
    let Coord { x, y } = ship.origin;
    (0..ship.length)
        .map_while(|i| match ship.orientation {
            Orientation::Horizontal => x.checked_add(i).map(|x| Coord::new(x, y)),
            Orientation::Vertical => y.checked_add(i).map(|y| Coord::new(x, y)),
        })
        .collect()
}

/// Returns `true` if `coord` is one of `ship`'s cells.
pub fn is_hit(coord: Coord, ship: &Ship) -> bool {
    let Coord { x, y } = ship.origin;
    let len = u16::from(ship.length);
    match ship.orientation {
        Orientation::Horizontal => {
            coord.y == y
                && coord.x >= x
                && u16::from(coord.x - x) < len
        }
        Orientation::Vertical => {
            coord.x == x
                && coord.y >= y
                && u16::from(coord.y - y) < len
        }
    }
}

/// Returns `true` if `coord` lies on a `board_size` × `board_size` board.
pub fn in_bounds(coord: Coord, board_size: u8) -> bool {
    coord.x < board_size && coord.y < board_size
}

/// Every cell of a `board_size` × `board_size` board, row by row.
pub fn board_cells(board_size: u8) -> impl Iterator<Item = Coord> {
    (0..board_size).flat_map(move |y| (0..board_size).map(move |x| Coord::new(x, y)))
}
