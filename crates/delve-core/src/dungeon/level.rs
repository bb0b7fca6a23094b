//! A generated level: the composite grid plus the features stitched into it

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::rng::GameRng;

use super::feature::Feature;
use super::grid::{Coord, Grid};
use super::rect::Rect;
use super::tile::TileKind;

/// One quarter of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// The part of a `width` x `height` level this quadrant covers. Odd
    /// sizes give the extra row or column to the right and bottom halves.
    pub fn rect(self, width: i32, height: i32) -> Rect {
        let (hw, hh) = (width / 2, height / 2);
        match self {
            Quadrant::TopLeft => Rect::new(0, 0, hw, hh),
            Quadrant::TopRight => Rect::new(hw, 0, width - hw, hh),
            Quadrant::BottomLeft => Rect::new(0, hh, hw, height - hh),
            Quadrant::BottomRight => Rect::new(hw, hh, width - hw, height - hh),
        }
    }
}

/// A level grid with the features placed on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub grid: Grid,
    pub features: Vec<Feature>,
    /// Index into `features` for each quadrant that holds one
    quadrants: [Option<usize>; 4],
    pub entrance: Option<Coord>,
    pub exit: Option<Coord>,
    pub stairs: Option<Coord>,
}

impl Level {
    /// A solid level
    pub fn new(width: i32, height: i32) -> Self {
        Self::from_grid(Grid::new(width, height))
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            features: Vec::new(),
            quadrants: [None; 4],
            entrance: None,
            exit: None,
            stairs: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    /// Stitch a feature in at its offset and keep it. Returns its index.
    ///
    /// # Panics
    /// If the feature's offset is negative.
    pub fn place(&mut self, feature: Feature) -> usize {
        let at = feature.offset();
        assert!(
            at.x >= 0 && at.y >= 0,
            "feature '{}' placed at negative offset ({}, {})",
            feature.name,
            at.x,
            at.y
        );
        self.grid.stitch(&feature.grid);
        self.features.push(feature);
        self.features.len() - 1
    }

    /// Move a feature to the corner of `quadrant` and place it there. A
    /// feature already holding the quadrant stays in `features` but loses
    /// the slot.
    pub fn place_in(&mut self, quadrant: Quadrant, feature: Feature) -> usize {
        let rect = quadrant.rect(self.width(), self.height());
        let idx = self.place(feature.at(rect.x, rect.y));
        self.quadrants[quadrant.index()] = Some(idx);
        idx
    }

    pub fn quadrant(&self, quadrant: Quadrant) -> Option<&Feature> {
        self.quadrants[quadrant.index()].map(|i| &self.features[i])
    }

    /// Put down stairs on a random floor tile
    pub fn place_stairs(&mut self, rng: &mut GameRng) -> Option<Coord> {
        let floors = self.grid.coords_of_tile_type(TileKind::Floor);
        let at = *rng.choose(&floors)?;
        self.grid.set_at(at, TileKind::DownStairs);
        self.stairs = Some(at);
        Some(at)
    }
}
