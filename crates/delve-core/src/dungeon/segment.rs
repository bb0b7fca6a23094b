//! Flood fill and floor segment connectivity
//!
//! A segment is one 4-connected region of open tiles together with the
//! walls directly bordering it. Two segments whose boundaries share a wall
//! can be joined by knocking that wall out.

use hashbrown::HashSet;
use tracing::debug;

use crate::rng::GameRng;

use super::grid::{Coord, Grid};
use super::tile::TileKind;

/// Snapshot of a connected open region and its wall frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub cells: HashSet<Coord>,
    pub boundary: HashSet<Coord>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.cells.contains(&at)
    }

    /// Cells in row-major order
    pub fn sorted_cells(&self) -> Vec<Coord> {
        let mut cells: Vec<Coord> = self.cells.iter().copied().collect();
        cells.sort_unstable_by_key(|c| (c.y, c.x));
        cells
    }

    /// Walls bordering both segments, in row-major order
    pub fn shared_boundary(&self, other: &Segment) -> Vec<Coord> {
        let mut shared: Vec<Coord> = self.boundary.intersection(&other.boundary).copied().collect();
        shared.sort_unstable_by_key(|c| (c.y, c.x));
        shared
    }

    /// Pick one of the segment's cells at random
    pub fn random_cell(&self, rng: &mut GameRng) -> Option<Coord> {
        rng.choose(&self.sorted_cells()).copied()
    }
}

impl Grid {
    /// Flood the open region containing (x, y).
    ///
    /// Returns the open cells reached and the walls met along the way. A
    /// wall start gives an empty region whose boundary is the start itself.
    pub fn flood_fill_floor(&self, x: i32, y: i32) -> (HashSet<Coord>, HashSet<Coord>) {
        let mut filled = HashSet::new();
        let mut boundary = HashSet::new();
        let mut stack = vec![Coord::new(x, y)];

        while let Some(at) = stack.pop() {
            if !self.contains(at.x, at.y) || filled.contains(&at) || boundary.contains(&at) {
                continue;
            }
            if self.tile_at(at).is_wall() {
                boundary.insert(at);
                continue;
            }
            filled.insert(at);
            stack.extend(at.cardinals());
        }

        (filled, boundary)
    }

    /// Partition the open interior cells into segments, in scan order
    pub fn floor_segments(&self) -> Vec<Segment> {
        let mut seen = vec![false; (self.width() * self.height()) as usize];
        let mut segments = Vec::new();

        for y in 1..self.height() - 1 {
            for x in 1..self.width() - 1 {
                let idx = (y * self.width() + x) as usize;
                if seen[idx] || self.tile(x, y).is_wall() {
                    continue;
                }
                let (cells, boundary) = self.flood_fill_floor(x, y);
                for c in &cells {
                    seen[(c.y * self.width() + c.x) as usize] = true;
                }
                segments.push(Segment { cells, boundary });
            }
        }

        segments
    }

    /// For each pair of segments sharing a wall, open one randomly chosen
    /// shared interior wall. Returns the number of walls opened.
    pub fn connect_adjacent_segments(&mut self, rng: &mut GameRng) -> usize {
        let segments = self.floor_segments();
        let mut opened = 0;

        for (i, a) in segments.iter().enumerate() {
            for b in &segments[i + 1..] {
                let mut shared = a.shared_boundary(b);
                shared.retain(|c| self.in_bounds(c.x, c.y));
                if let Some(&door) = rng.choose(&shared) {
                    self.set_at(door, TileKind::Floor);
                    opened += 1;
                }
            }
        }

        debug!(segments = segments.len(), opened, "connected adjacent segments");
        opened
    }

    /// Wall in every segment with fewer than `min_cells` cells. Returns how
    /// many were removed.
    pub fn remove_small_segments(&mut self, min_cells: usize) -> usize {
        let mut removed = 0;
        for segment in self.floor_segments() {
            if segment.len() < min_cells {
                for at in segment.cells {
                    self.set_at(at, TileKind::Wall);
                }
                removed += 1;
            }
        }
        removed
    }
}
