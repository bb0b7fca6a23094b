//! Tile kinds
//!
//! Only structural state lives here. Glyphs, colors and lighting belong to
//! whatever presents the grid.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Structural kind of a single grid cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum TileKind {
    #[default]
    Wall = 0,
    Floor = 1,
    /// Maze entrance on the outer border
    Entrance = 2,
    /// Maze exit on the outer border
    Exit = 3,
    /// Marker left by pattern stamping
    Filled = 4,
    DownStairs = 5,
}

impl TileKind {
    pub const fn is_wall(&self) -> bool {
        matches!(self, TileKind::Wall)
    }

    /// Anything that is not a wall. Markers count as floor for walkability
    /// and for every structural algorithm.
    pub const fn is_open(&self) -> bool {
        !self.is_wall()
    }

    /// Character used by [`Grid::to_ascii`](super::Grid::to_ascii) fixtures
    pub const fn ascii(&self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::Entrance => 'E',
            TileKind::Exit => 'X',
            TileKind::Filled => '*',
            TileKind::DownStairs => '>',
        }
    }

    pub const fn from_ascii(c: char) -> Option<TileKind> {
        match c {
            '#' => Some(TileKind::Wall),
            '.' => Some(TileKind::Floor),
            'E' => Some(TileKind::Entrance),
            'X' => Some(TileKind::Exit),
            '*' => Some(TileKind::Filled),
            '>' => Some(TileKind::DownStairs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_wall_is_closed() {
        for kind in TileKind::iter() {
            assert_eq!(kind.is_open(), kind != TileKind::Wall, "{kind}");
        }
    }

    #[test]
    fn test_ascii_roundtrip() {
        for kind in TileKind::iter() {
            assert_eq!(TileKind::from_ascii(kind.ascii()), Some(kind));
        }
        assert_eq!(TileKind::from_ascii('?'), None);
    }

    #[test]
    fn test_default_is_wall() {
        assert_eq!(TileKind::default(), TileKind::Wall);
    }
}
