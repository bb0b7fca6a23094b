//! Dungeon generation
//!
//! The tile grid, its query primitives, and every structural operator that
//! carves it: cellular automata, corridors, segment connectivity, mazes and
//! rectangle search, plus the recipes that combine them into a level.

mod automata;
mod corridor;
mod feature;
mod generation;
mod grid;
mod level;
mod maze;
mod rect;
mod segment;
mod tile;

pub use automata::MAX_SMOOTHING_PASSES;
pub use feature::{Feature, Pyramid};
pub use generation::{generate, Egg, LayoutKind};
pub use grid::{Coord, Direction, Grid};
pub use level::{Level, Quadrant};
pub use maze::{Maze, MazeKind};
pub use rect::{max_histogram, HistogramSpan, Rect, MIN_RECT_SIDE};
pub use segment::Segment;
pub use tile::TileKind;
