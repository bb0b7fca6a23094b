//! Named sub-grids placed inside a level

use serde::{Deserialize, Serialize};

use crate::rng::GameRng;

use super::grid::{Coord, Direction, Grid};
use super::maze::Maze;
use super::rect::Rect;
use super::tile::TileKind;

/// A named grid with its placement inside a parent level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub grid: Grid,
}

impl Feature {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }

    /// Move the feature to (x, y) of its parent
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.grid.set_offset(x, y);
        self
    }

    pub fn offset(&self) -> Coord {
        self.grid.offset()
    }

    /// Area covered in parent coordinates
    pub fn footprint(&self) -> Rect {
        self.grid.footprint()
    }
}

impl From<Maze> for Feature {
    fn from(maze: Maze) -> Self {
        Feature::new(format!("{}_maze", maze.kind), maze.grid)
    }
}

/// Concentric open rings two tiles apart, each joined to the next by one
/// passage that is never at a corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pyramid {
    pub grid: Grid,
    pub rings: usize,
}

impl Pyramid {
    pub fn new(width: i32, height: i32, rng: &mut GameRng) -> Self {
        let mut grid = Grid::new(width, height);
        let mut rings = 0;
        let limit = (width / 2).min(height / 2);

        for i in (1..limit).step_by(2) {
            let ring = Rect::new(i, i, width - 2 * i, height - 2 * i);
            for x in ring.x..ring.right() {
                grid.set(x, ring.y, TileKind::Floor);
                grid.set(x, ring.bottom() - 1, TileKind::Floor);
            }
            for y in ring.y..ring.bottom() {
                grid.set(ring.x, y, TileKind::Floor);
                grid.set(ring.right() - 1, y, TileKind::Floor);
            }
            rings += 1;
            carve_passage(&mut grid, i, rng);
        }

        Self { grid, rings }
    }

    /// Place the pyramid at (x, y) of a parent grid
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.grid.set_offset(x, y);
        self
    }
}

impl From<Pyramid> for Feature {
    fn from(pyramid: Pyramid) -> Self {
        Feature::new("pyramid", pyramid.grid)
    }
}

/// Open one wall in the gap just inside ring `i`. Corners of the gap are
/// skipped, and nothing happens once the gap has no straight stretch left.
fn carve_passage(grid: &mut Grid, i: i32, rng: &mut GameRng) {
    let (w, h) = (grid.width(), grid.height());
    let across = w - 2 * i - 4;
    let down = h - 2 * i - 4;
    if across <= 0 || down <= 0 {
        return;
    }

    // top, bottom, left, right: length, first cell, direction along
    let sides = [
        (across, Coord::new(i + 2, i + 1), Direction::Right),
        (across, Coord::new(i + 2, h - i - 2), Direction::Right),
        (down, Coord::new(i + 1, i + 2), Direction::Down),
        (down, Coord::new(w - i - 2, i + 2), Direction::Down),
    ];
    let mut pick = rng.rn2((2 * (across + down)) as u32) as i32;
    for (len, first, along) in sides {
        if pick < len {
            let (dx, dy) = along.offset();
            grid.set_at(first.offset(dx * pick, dy * pick), TileKind::Floor);
            return;
        }
        pick -= len;
    }
}
