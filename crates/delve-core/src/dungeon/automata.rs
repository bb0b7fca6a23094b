//! Cellular automata operators
//!
//! Bulk passes over the whole grid. Every pass reads from a snapshot of the
//! grid taken before the pass, so the order cells are visited in never
//! matters.

use tracing::trace;

use crate::rng::GameRng;

use super::grid::Grid;
use super::tile::TileKind;

/// Safety stop for `smooth_until_stable`
pub const MAX_SMOOTHING_PASSES: usize = 60;

impl Grid {
    /// Randomize the interior: each cell becomes a wall with probability
    /// `denseness`, otherwise floor. The border is left alone.
    pub fn reset(&mut self, denseness: f64, rng: &mut GameRng) {
        for y in 1..self.height() - 1 {
            for x in 1..self.width() - 1 {
                let kind = if rng.chance(denseness) {
                    TileKind::Wall
                } else {
                    TileKind::Floor
                };
                self.set(x, y, kind);
            }
        }
    }

    /// One smoothing pass. An interior cell becomes a wall iff its 3x3 block
    /// (itself included) holds at least `smoothness` walls. Returns whether
    /// any tile changed.
    pub fn smooth(&mut self, smoothness: u32) -> bool {
        let before = self.clone();
        let mut changed = false;
        for y in 1..self.height() - 1 {
            for x in 1..self.width() - 1 {
                let current = before.tile(x, y);
                let walls = before.diagonal_tile_count(x, y, 1, TileKind::Wall);
                let next = if walls >= smoothness {
                    TileKind::Wall
                } else if current.is_open() {
                    current
                } else {
                    TileKind::Floor
                };
                if next != current {
                    self.set(x, y, next);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Smooth until a pass changes nothing or `max_passes` passes have run.
    /// Returns the number of passes performed.
    pub fn smooth_until_stable(&mut self, smoothness: u32, max_passes: usize) -> usize {
        let mut passes = 0;
        while passes < max_passes {
            passes += 1;
            if !self.smooth(smoothness) {
                break;
            }
        }
        trace!(passes, smoothness, "smoothing settled");
        passes
    }

    /// Turn every floor cell with no wall within Chebyshev distance `radius`
    /// into wall. Thins out wide open areas while leaving anything that
    /// touches a wall intact.
    pub fn fill_caverns(&mut self, radius: u32) {
        let before = self.clone();
        for y in 0..self.height() {
            for x in 0..self.width() {
                if before.tile(x, y) == TileKind::Floor
                    && before.diagonal_tile_count(x, y, radius, TileKind::Wall) == 0
                {
                    self.set(x, y, TileKind::Wall);
                }
            }
        }
    }

    /// One Game of Life step over `live` tiles. A live cell survives with 3
    /// or 4 live cells in its 3x3 block (itself included); a `dead` cell with
    /// exactly 3 becomes live. Other tile kinds are left alone. Returns
    /// whether any tile changed.
    pub fn life_cycle(&mut self, live: TileKind, dead: TileKind) -> bool {
        let before = self.clone();
        let mut changed = false;
        for y in 0..self.height() {
            for x in 0..self.width() {
                let current = before.tile(x, y);
                let count = before.diagonal_tile_count(x, y, 1, live);
                let next = if current == live {
                    if (3..=4).contains(&count) { live } else { dead }
                } else if current == dead && count == 3 {
                    live
                } else {
                    current
                };
                if next != current {
                    self.set(x, y, next);
                    changed = true;
                }
            }
        }
        changed
    }
}
