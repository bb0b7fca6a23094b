//! Tile grid and its query primitives
//!
//! Origin is the top-left corner, x grows right and y grows down. The outer
//! ring of cells is the border; structural operators never target it.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::tile::TileKind;

/// One of the four axis directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// (dx, dy) of a single step
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// The two directions at right angles to this one
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Left | Direction::Right => [Direction::Up, Direction::Down],
        }
    }
}

/// Grid coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn step(self, dir: Direction) -> Coord {
        let (dx, dy) = dir.offset();
        Coord::new(self.x + dx, self.y + dy)
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Coord {
        Coord::new(self.x + dx, self.y + dy)
    }

    /// The four axis neighbors, in [`Direction::ALL`] order
    pub fn cardinals(self) -> [Coord; 4] {
        Direction::ALL.map(|d| self.step(d))
    }

    pub fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

/// A width x height array of tiles
///
/// `offset` places the grid inside a larger composite grid; it does not
/// affect any coordinate passed to the grid's own methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    offset: Coord,
    tiles: Vec<TileKind>,
}

impl Grid {
    /// Create a grid that is solid wall
    pub fn new(width: i32, height: i32) -> Self {
        Self::filled(width, height, TileKind::Wall)
    }

    pub fn filled(width: i32, height: i32, kind: TileKind) -> Self {
        assert!(
            width > 0 && height > 0,
            "grid dimensions must be positive, got {width}x{height}"
        );
        Self {
            width,
            height,
            offset: Coord::default(),
            tiles: vec![kind; (width * height) as usize],
        }
    }

    /// Build a grid from rows of tile characters (see [`TileKind::ascii`]).
    ///
    /// # Panics
    /// On ragged rows or unknown characters.
    pub fn from_ascii(rows: &[&str]) -> Self {
        assert!(!rows.is_empty(), "no rows given");
        let width = rows[0].chars().count() as i32;
        let mut grid = Self::new(width, rows.len() as i32);
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(
                row.chars().count() as i32,
                width,
                "row {y} has a different width"
            );
            for (x, c) in row.chars().enumerate() {
                let kind = TileKind::from_ascii(c)
                    .unwrap_or_else(|| panic!("unknown tile character {c:?} at ({x}, {y})"));
                grid.set(x as i32, y as i32, kind);
            }
        }
        grid
    }

    /// Rows of tile characters joined by newlines
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.tile(x, y).ascii());
            }
            if y + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn offset(&self) -> Coord {
        self.offset
    }

    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.offset = Coord::new(x, y);
    }

    /// The rectangle this grid covers in its parent's coordinates
    pub fn footprint(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.width, self.height)
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    /// True anywhere on the grid, border included
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// True strictly inside the border ring
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        0 < x && x < self.width - 1 && 0 < y && y < self.height - 1
    }

    fn idx(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.contains(x, y), "({x}, {y}) outside {}x{}", self.width, self.height);
        (y * self.width + x) as usize
    }

    pub fn get(&self, x: i32, y: i32) -> Option<TileKind> {
        if self.contains(x, y) {
            Some(self.tiles[self.idx(x, y)])
        } else {
            None
        }
    }

    /// Tile at (x, y). Panics outside the grid.
    pub fn tile(&self, x: i32, y: i32) -> TileKind {
        assert!(self.contains(x, y), "({x}, {y}) outside {}x{}", self.width, self.height);
        self.tiles[self.idx(x, y)]
    }

    pub fn tile_at(&self, at: Coord) -> TileKind {
        self.tile(at.x, at.y)
    }

    /// Set the tile at (x, y). Panics outside the grid.
    pub fn set(&mut self, x: i32, y: i32, kind: TileKind) {
        assert!(self.contains(x, y), "({x}, {y}) outside {}x{}", self.width, self.height);
        let idx = self.idx(x, y);
        self.tiles[idx] = kind;
    }

    pub fn set_at(&mut self, at: Coord, kind: TileKind) {
        self.set(at.x, at.y, kind);
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|t| t.is_wall())
    }

    pub fn is_open(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(|t| t.is_open())
    }

    pub fn fill(&mut self, kind: TileKind) {
        self.tiles.fill(kind);
    }

    /// Overwrite the outer ring
    pub fn fill_border(&mut self, kind: TileKind) {
        for x in 0..self.width {
            self.set(x, 0, kind);
            self.set(x, self.height - 1, kind);
        }
        for y in 0..self.height {
            self.set(0, y, kind);
            self.set(self.width - 1, y, kind);
        }
    }

    /// Overwrite a rectangle, clipped to the grid
    pub fn fill_rect(&mut self, rect: Rect, kind: TileKind) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = (rect.x + rect.width).min(self.width);
        let y1 = (rect.y + rect.height).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, kind);
            }
        }
    }

    /// Walls among the four axis neighbors. Zero outside the interior.
    pub fn cardinal_walls(&self, x: i32, y: i32) -> u32 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        Coord::new(x, y)
            .cardinals()
            .iter()
            .filter(|c| self.tile(c.x, c.y).is_wall())
            .count() as u32
    }

    /// Count of `kind` in the (2r+1) x (2r+1) block centered on (x, y),
    /// clipped to the grid. The center cell is included.
    pub fn diagonal_tile_count(&self, x: i32, y: i32, r: u32, kind: TileKind) -> u32 {
        let r = r as i32;
        let x0 = (x - r).max(0);
        let y0 = (y - r).max(0);
        let x1 = (x + r).min(self.width - 1);
        let y1 = (y + r).min(self.height - 1);
        let mut count = 0;
        for j in y0..=y1 {
            for i in x0..=x1 {
                if self.tiles[self.idx(i, j)] == kind {
                    count += 1;
                }
            }
        }
        count
    }

    /// Whether (x, y) may become part of a corridor: in bounds, a wall, and
    /// with more than `2 - blobulousness` walls around it.
    pub fn can_corridor(&self, x: i32, y: i32, blobulousness: u32) -> bool {
        self.in_bounds(x, y)
            && self.tile(x, y).is_wall()
            && self.cardinal_walls(x, y) as i64 > 2 - blobulousness as i64
    }

    /// Every coordinate holding `kind`, row by row
    pub fn coords_of_tile_type(&self, kind: TileKind) -> Vec<Coord> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|&(_, t)| *t == kind)
            .map(|(i, _)| Coord::new(i as i32 % self.width, i as i32 / self.width))
            .collect()
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|&&t| t == kind).count()
    }

    /// Number of non-wall tiles
    pub fn open_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_open()).count()
    }

    /// Number of 4-adjacent pairs of non-wall tiles
    pub fn open_adjacencies(&self) -> usize {
        let mut edges = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.tile(x, y).is_open() {
                    continue;
                }
                if self.is_open(x + 1, y) {
                    edges += 1;
                }
                if self.is_open(x, y + 1) {
                    edges += 1;
                }
            }
        }
        edges
    }

    /// Interior walls with exactly three wall neighbors: spots where a
    /// corridor can leave an existing open area.
    pub fn valid_starts(&self) -> Vec<Coord> {
        let mut starts = Vec::new();
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                if self.tile(x, y).is_wall() && self.cardinal_walls(x, y) == 3 {
                    starts.push(Coord::new(x, y));
                }
            }
        }
        starts
    }

    /// Copy `other` into this grid at `other.offset()`, clipping anything
    /// that falls outside.
    pub fn stitch(&mut self, other: &Grid) {
        let origin = other.offset();
        for y in 0..other.height {
            for x in 0..other.width {
                let (px, py) = (origin.x + x, origin.y + y);
                if self.contains(px, py) {
                    self.set(px, py, other.tile(x, y));
                }
            }
        }
    }

    /// Copy of the tiles under `rect`, with its offset set to the rect origin
    pub fn crop(&self, rect: Rect) -> Grid {
        let mut out = Grid::new(rect.width, rect.height);
        out.set_offset(rect.x, rect.y);
        for y in 0..rect.height {
            for x in 0..rect.width {
                if let Some(kind) = self.get(rect.x + x, rect.y + y) {
                    out.set(x, y, kind);
                }
            }
        }
        out
    }
}
