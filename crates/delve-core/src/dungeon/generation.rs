//! Level layout recipes
//!
//! Each recipe threads one grid through a fixed sequence of operators:
//! - cavern: random fill, smoothing, joined and tidied segments
//! - winding: smoothed noise threaded with short corridors
//! - egg: a few rounded rooms chained together, then corridors of
//!   decreasing length
//! - maze: one maze filling the level
//! - max maze: a cavern with a maze dropped into its biggest solid block
//! - pyramid: concentric rings

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::config::GenConfig;
use crate::rng::GameRng;

use super::automata::MAX_SMOOTHING_PASSES;
use super::feature::{Feature, Pyramid};
use super::grid::{Coord, Grid};
use super::level::Level;
use super::maze::Maze;
use super::rect::Rect;
use super::tile::TileKind;

/// Wall radius used by the cavern recipe's final fill
const CAVERN_FILL_RADIUS: u32 = 4;

/// Corridors the winding recipe tries to add
const WINDING_CORRIDORS: usize = 20;

/// Placement attempts before the egg recipe settles for fewer eggs
const EGG_ATTEMPTS: usize = 100;

/// Which recipe `generate` runs
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Cavern,
    Winding,
    Egg,
    Maze,
    MaxMaze,
    Pyramid,
}

/// A rounded room: a center, half-extents, and the smoothing passes it will
/// get. Smoothing grows a room by about half a tile per pass, so overlap is
/// checked on the grown bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Egg {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub passes: i32,
}

impl Egg {
    /// The room as first carved, before smoothing
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x - self.width,
            self.y - self.height,
            2 * self.width,
            2 * self.height,
        )
    }

    /// Space the room may take after smoothing
    pub fn bounds(&self) -> Rect {
        let grow = (self.passes + 1) / 2;
        let r = self.rect();
        Rect::new(r.x - grow, r.y - grow, r.width + 2 * grow, r.height + 2 * grow)
    }

    pub fn intersects(&self, other: &Egg) -> bool {
        self.bounds().intersects(&other.bounds())
    }

    pub fn center(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// Build a `width` x `height` level with the given recipe.
///
/// # Panics
/// If either side is 5 or less.
pub fn generate(
    kind: LayoutKind,
    width: i32,
    height: i32,
    config: &GenConfig,
    rng: &mut GameRng,
) -> Level {
    assert!(
        width > 5 && height > 5,
        "level must be larger than 5x5, got {width}x{height}"
    );
    debug!(%kind, width, height, seed = rng.seed(), "generating level");

    let mut level = Level::new(width, height);
    match kind {
        LayoutKind::Cavern => cavern(&mut level.grid, config, rng),
        LayoutKind::Winding => winding(&mut level.grid, config, rng),
        LayoutKind::Egg => eggs(&mut level.grid, config, rng),
        LayoutKind::Maze => {
            let maze = Maze::random(width - 2, height - 2, rng).at(1, 1);
            place_maze(&mut level, maze);
        }
        LayoutKind::MaxMaze => max_maze(&mut level, config, rng),
        LayoutKind::Pyramid => {
            let pyramid = Pyramid::new(width - 2, height - 2, rng).at(1, 1);
            level.place(Feature::from(pyramid));
        }
    }

    let stairs = level.place_stairs(rng);
    debug!(
        %kind,
        open = level.grid.open_count(),
        features = level.features.len(),
        ?stairs,
        "level done"
    );
    level
}

/// Stitch a maze in and carry its doors over in level coordinates
fn place_maze(level: &mut Level, maze: Maze) {
    let origin = maze.grid.offset();
    let shift = |c: Coord| c.offset(origin.x, origin.y);
    level.entrance = maze.entrance.map(shift);
    level.exit = maze.exit.map(shift);
    level.place(Feature::from(maze));
}

fn cavern(grid: &mut Grid, config: &GenConfig, rng: &mut GameRng) {
    grid.reset(config.denseness, rng);
    for _ in 0..config.smoothing_passes {
        grid.smooth(config.smoothness);
    }
    grid.connect_adjacent_segments(rng);

    let area = (grid.width() * grid.height()) as usize;
    let removed = grid.remove_small_segments(area.div_ceil(100));

    let segments = grid.floor_segments();
    debug!(segments = segments.len(), removed, "cavern segments");
    for pair in segments.windows(2) {
        let (Some(from), Some(to)) = (pair[0].random_cell(rng), pair[1].random_cell(rng)) else {
            continue;
        };
        grid.corridor_between(from.x, from.y, to.x, to.y, rng);
    }

    grid.fill_caverns(CAVERN_FILL_RADIUS);
}

fn winding(grid: &mut Grid, config: &GenConfig, rng: &mut GameRng) {
    grid.reset(config.denseness, rng);
    grid.smooth_until_stable(config.smoothness, MAX_SMOOTHING_PASSES);

    let mut carved = 0;
    for _ in 0..WINDING_CORRIDORS {
        let length = winding_length(config, rng);
        if !grid.random_corridor_within(
            length,
            config.blobulousness,
            config.corridor_step_budget,
            rng,
        ) {
            break;
        }
        carved += 1;
    }
    debug!(carved, "winding corridors");

    grid.connect_adjacent_segments(rng);
    grid.fill_caverns(config.fill_radius);
}

/// Between two thirds of `corridor_length` and all of it
fn winding_length(config: &GenConfig, rng: &mut GameRng) -> usize {
    let longest = config.corridor_length.max(1) as i32;
    rng.range((longest * 2 / 3).max(1), longest) as usize
}

/// Try up to `count` corridors with lengths in `lo..=hi`, stopping at the
/// first failure
fn corridor_batch(
    grid: &mut Grid,
    count: (i32, i32),
    lengths: (i32, i32),
    config: &GenConfig,
    rng: &mut GameRng,
) -> usize {
    let wanted = rng.range(count.0, count.1);
    let mut carved = 0;
    for _ in 0..wanted {
        let length = rng.range(lengths.0, lengths.1) as usize;
        if !grid.random_corridor_within(
            length,
            config.blobulousness,
            config.corridor_step_budget,
            rng,
        ) {
            break;
        }
        carved += 1;
    }
    carved
}

fn eggs(grid: &mut Grid, config: &GenConfig, rng: &mut GameRng) {
    let (w, h) = (grid.width(), grid.height());
    grid.reset(1.0, rng);

    let wanted = rng.range(1, 4) as usize;
    let passes = rng.range(3, 8);
    let mut eggs: Vec<Egg> = Vec::with_capacity(wanted);
    for _ in 0..EGG_ATTEMPTS {
        if eggs.len() == wanted {
            break;
        }
        let egg = Egg {
            x: rng.range(w / 4, w * 3 / 4),
            y: rng.range(h / 4, h * 3 / 4),
            width: rng.range(2, 5),
            height: rng.range(2, 5),
            passes,
        };
        if !eggs.iter().any(|e| e.intersects(&egg)) {
            eggs.push(egg);
        }
    }

    let interior = Rect::new(1, 1, w - 2, h - 2);
    for egg in &eggs {
        if let Some(room) = egg.rect().intersection(&interior) {
            grid.fill_rect(room, TileKind::Floor);
        }
    }
    for _ in 0..passes {
        grid.smooth(config.smoothness);
    }
    for pair in eggs.windows(2) {
        let (a, b) = (pair[0].center(), pair[1].center());
        grid.corridor_between(a.x, a.y, b.x, b.y, rng);
    }

    let long = corridor_batch(grid, (3, 8), (20, 30), config, rng);
    let medium = corridor_batch(grid, (5, 12), (15, 20), config, rng);
    let short = corridor_batch(grid, (20, 30), (8, 15), config, rng);
    debug!(eggs = eggs.len(), long, medium, short, "egg layout");
}

fn max_maze(level: &mut Level, config: &GenConfig, rng: &mut GameRng) {
    cavern(&mut level.grid, config, rng);
    let Some(rect) = level.grid.find_rectangle() else {
        debug!("no room for a maze");
        return;
    };

    let width = rect.width.min(config.maze_width as i32);
    let height = rect.height.min(config.maze_height as i32);
    let maze = Maze::random(width, height, rng).at(rect.x, rect.y);
    let footprint = maze.grid.footprint();
    place_maze(level, maze);

    // join each door to the cavern
    let target = level
        .grid
        .floor_segments()
        .into_iter()
        .filter(|s| !s.cells.iter().any(|c| footprint.contains(c.x, c.y)))
        .max_by_key(|s| s.len());
    let Some(target) = target else {
        return;
    };
    for door in [level.entrance, level.exit].into_iter().flatten() {
        let outside = door
            .cardinals()
            .into_iter()
            .find(|c| !footprint.contains(c.x, c.y) && level.grid.in_bounds(c.x, c.y));
        if let (Some(from), Some(to)) = (outside, target.random_cell(rng)) {
            level.grid.corridor_between(from.x, from.y, to.x, to.y, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_layout_kind_names() {
        assert_eq!(LayoutKind::MaxMaze.to_string(), "max_maze");
        assert_eq!(LayoutKind::from_str("winding").unwrap(), LayoutKind::Winding);
        assert!(LayoutKind::from_str("labyrinth").is_err());
        assert_eq!(LayoutKind::iter().count(), 6);
    }

    #[test]
    fn test_egg_intersects_on_grown_bounds() {
        let a = Egg {
            x: 10,
            y: 10,
            width: 2,
            height: 2,
            passes: 4,
        };
        let near = Egg { x: 16, ..a };
        let far = Egg { x: 20, ..a };
        assert!(a.intersects(&near));
        assert!(near.intersects(&a));
        assert!(!a.intersects(&far));
        assert_eq!(a.rect(), Rect::new(8, 8, 4, 4));
    }

    #[test]
    fn test_every_layout_keeps_border() {
        let config = GenConfig::default();
        for kind in LayoutKind::iter() {
            let mut rng = GameRng::new(7);
            let level = generate(kind, 60, 30, &config, &mut rng);
            let grid = &level.grid;
            assert_eq!((grid.width(), grid.height()), (60, 30));
            for x in 0..grid.width() {
                assert!(grid.tile(x, 0).is_wall(), "{kind}");
                assert!(grid.tile(x, grid.height() - 1).is_wall(), "{kind}");
            }
            for y in 0..grid.height() {
                assert!(grid.tile(0, y).is_wall(), "{kind}");
                assert!(grid.tile(grid.width() - 1, y).is_wall(), "{kind}");
            }
            assert!(grid.open_count() > 0, "{kind}");
        }
    }

    #[test]
    fn test_winding_length_follows_config() {
        let mut rng = GameRng::new(11);
        for (corridor_length, lo, hi) in [(1, 1, 1), (15, 10, 15), (40, 26, 40), (70, 46, 70)] {
            let config = GenConfig {
                corridor_length,
                ..GenConfig::default()
            };
            for _ in 0..50 {
                let length = winding_length(&config, &mut rng);
                assert!((lo..=hi).contains(&length), "{corridor_length}: {length}");
            }
        }
    }

    #[test]
    fn test_winding_uses_corridor_length() {
        let short = GenConfig {
            corridor_length: 4,
            ..GenConfig::default()
        };
        let long = GenConfig {
            corridor_length: 40,
            ..GenConfig::default()
        };
        let a = generate(LayoutKind::Winding, 60, 30, &short, &mut GameRng::new(7));
        let b = generate(LayoutKind::Winding, 60, 30, &long, &mut GameRng::new(7));
        assert_ne!(a.grid, b.grid);
    }

    #[test]
    fn test_generate_is_reproducible() {
        let config = GenConfig::default();
        for kind in LayoutKind::iter() {
            let a = generate(kind, 40, 24, &config, &mut GameRng::new(1234));
            let b = generate(kind, 40, 24, &config, &mut GameRng::new(1234));
            assert_eq!(a, b, "{kind}");
        }
    }

    #[test]
    fn test_maze_layout_records_doors() {
        let mut rng = GameRng::new(3);
        let level = generate(LayoutKind::Maze, 30, 20, &GenConfig::default(), &mut rng);
        assert_eq!(level.features.len(), 1);
        let entrance = level.entrance.unwrap();
        assert_eq!(level.grid.tile_at(entrance), TileKind::Entrance);
        assert_eq!(level.grid.tile_at(level.exit.unwrap()), TileKind::Exit);
    }

    #[test]
    fn test_cavern_has_stairs() {
        let mut rng = GameRng::new(5);
        let level = generate(LayoutKind::Cavern, 50, 30, &GenConfig::default(), &mut rng);
        let stairs = level.stairs.unwrap();
        assert_eq!(level.grid.tile_at(stairs), TileKind::DownStairs);
    }

    #[test]
    fn test_max_maze_fits_in_rectangle() {
        let config = GenConfig {
            denseness: 0.6,
            ..GenConfig::default()
        };
        let mut rng = GameRng::new(21);
        let level = generate(LayoutKind::MaxMaze, 80, 45, &config, &mut rng);
        for feature in &level.features {
            let r = feature.footprint();
            assert!(r.width <= config.maze_width as i32);
            assert!(r.height <= config.maze_height as i32);
            assert!(r.x >= 2 && r.y >= 2);
            assert!(r.right() <= 78 && r.bottom() <= 43);
        }
    }

    #[test]
    #[should_panic]
    fn test_generate_too_small() {
        let mut rng = GameRng::new(1);
        generate(LayoutKind::Cavern, 5, 20, &GenConfig::default(), &mut rng);
    }
}
