//! Maze generators
//!
//! Perfect mazes grow walls inward from the border until the open cells form
//! a spanning tree, then tighten leftover 2x2 rooms. Braid mazes drop walls
//! anywhere that does not create a dead end and then join what got cut off.
//! Both kinds finish by opening an entrance and an exit on opposite sides.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::rng::GameRng;

use super::grid::{Coord, Direction, Grid};
use super::tile::TileKind;

/// Which generator built a maze
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MazeKind {
    /// Spanning tree: connected, no loops
    Perfect,
    /// Loops allowed, no dead ends
    Braid,
}

/// A maze grid with its entrance and exit on the border
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    pub kind: MazeKind,
    pub grid: Grid,
    pub entrance: Option<Coord>,
    pub exit: Option<Coord>,
}

impl Maze {
    /// Build a maze of the given kind.
    ///
    /// # Panics
    /// If either side is 3 or less.
    pub fn new(kind: MazeKind, width: i32, height: i32, rng: &mut GameRng) -> Self {
        assert!(
            width > 3 && height > 3,
            "maze must be larger than 3x3, got {width}x{height}"
        );
        let grid = match kind {
            MazeKind::Perfect => perfect_grid(width, height, rng),
            MazeKind::Braid => braid_grid(width, height, rng),
        };
        let mut maze = Self {
            kind,
            grid,
            entrance: None,
            exit: None,
        };
        maze.add_entrances(rng);
        maze
    }

    pub fn perfect(width: i32, height: i32, rng: &mut GameRng) -> Self {
        Self::new(MazeKind::Perfect, width, height, rng)
    }

    pub fn braid(width: i32, height: i32, rng: &mut GameRng) -> Self {
        Self::new(MazeKind::Braid, width, height, rng)
    }

    /// Either kind with equal odds
    pub fn random(width: i32, height: i32, rng: &mut GameRng) -> Self {
        let kind = if rng.one_in(2) {
            MazeKind::Perfect
        } else {
            MazeKind::Braid
        };
        Self::new(kind, width, height, rng)
    }

    /// Place the maze at (x, y) of a parent grid
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.grid.set_offset(x, y);
        self
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// Entrance on a random side, exit on the opposite one. Each goes on a
    /// border cell whose inward neighbor is open; a side without one keeps
    /// its slot empty.
    fn add_entrances(&mut self, rng: &mut GameRng) {
        let side = Direction::ALL[rng.rn2(4) as usize];
        self.entrance = self.open_side(side, TileKind::Entrance, rng);
        self.exit = self.open_side(side.opposite(), TileKind::Exit, rng);
    }

    fn open_side(&mut self, side: Direction, marker: TileKind, rng: &mut GameRng) -> Option<Coord> {
        let (w, h) = (self.grid.width(), self.grid.height());
        let cells: Vec<Coord> = match side {
            Direction::Up => (1..w - 1).map(|x| Coord::new(x, 0)).collect(),
            Direction::Down => (1..w - 1).map(|x| Coord::new(x, h - 1)).collect(),
            Direction::Left => (1..h - 1).map(|y| Coord::new(0, y)).collect(),
            Direction::Right => (1..h - 1).map(|y| Coord::new(w - 1, y)).collect(),
        };
        let inward = side.opposite();
        let candidates: Vec<Coord> = cells
            .into_iter()
            .filter(|c| self.grid.tile_at(c.step(inward)).is_open())
            .collect();
        let door = *rng.choose(&candidates)?;
        self.grid.set_at(door, marker);
        Some(door)
    }
}

/// Open interior inside a wall border
fn open_box(width: i32, height: i32) -> Grid {
    let mut grid = Grid::filled(width, height, TileKind::Floor);
    grid.fill_border(TileKind::Wall);
    grid
}

fn perfect_grid(width: i32, height: i32, rng: &mut GameRng) -> Grid {
    let mut grid = open_box(width, height);
    grow_walls(&mut grid, rng);
    tighten_corners(&mut grid, rng);
    let repaired = repair_blocks(&mut grid, rng);
    debug!(width, height, repaired, "built perfect maze");
    grid
}

/// Grow walls inward from the border. Each candidate carries the direction
/// it grows in; it becomes wall when it touches exactly one wall and the two
/// cells diagonally ahead of it are still open.
fn grow_walls(grid: &mut Grid, rng: &mut GameRng) {
    let (w, h) = (grid.width(), grid.height());
    let mut candidates: Vec<(Coord, Direction)> = Vec::with_capacity((2 * (w + h)) as usize);
    for x in 1..w - 1 {
        candidates.push((Coord::new(x, 1), Direction::Down));
        candidates.push((Coord::new(x, h - 2), Direction::Up));
    }
    for y in 1..h - 1 {
        candidates.push((Coord::new(1, y), Direction::Right));
        candidates.push((Coord::new(w - 2, y), Direction::Left));
    }

    while !candidates.is_empty() {
        let pick = rng.rn2(candidates.len() as u32) as usize;
        let (at, dir) = candidates.swap_remove(pick);
        if !grid.in_bounds(at.x, at.y) {
            continue;
        }
        let ahead = at.step(dir);
        let clear_ahead = dir
            .perpendicular()
            .iter()
            .all(|&p| grid.tile_at(ahead.step(p)).is_open());
        if grid.cardinal_walls(at.x, at.y) == 1 && grid.tile_at(at).is_open() && clear_ahead {
            grid.set_at(at, TileKind::Wall);
            candidates.extend(Direction::ALL.map(|d| (at.step(d), d)));
        }
    }
}

/// The four cells of the 2x2 block whose top-left is (x, y)
fn block_at(x: i32, y: i32) -> [Coord; 4] {
    [
        Coord::new(x, y),
        Coord::new(x, y + 1),
        Coord::new(x + 1, y),
        Coord::new(x + 1, y + 1),
    ]
}

fn block_is_open(grid: &Grid, block: &[Coord; 4]) -> bool {
    block.iter().all(|c| grid.tile_at(*c).is_open())
}

/// Fill one corner of every open 2x2 block where the corner's two outward
/// neighbors are already wall.
fn tighten_corners(grid: &mut Grid, rng: &mut GameRng) {
    let (w, h) = (grid.width(), grid.height());
    for x in 1..w - 1 {
        for y in 1..h - 1 {
            let block = block_at(x, y);
            if !grid.contains(x + 1, y + 1) || !block_is_open(grid, &block) {
                continue;
            }
            // corner, then the two cells that must already be wall
            let corners = [
                (block[0], Coord::new(x - 1, y), Coord::new(x, y - 1)),
                (block[1], Coord::new(x - 1, y + 1), Coord::new(x, y + 2)),
                (block[2], Coord::new(x + 1, y - 1), Coord::new(x + 2, y)),
                (block[3], Coord::new(x + 2, y + 1), Coord::new(x + 1, y + 2)),
            ];
            let eligible: Vec<Coord> = corners
                .iter()
                .filter(|(_, a, b)| grid.is_wall(a.x, a.y) && grid.is_wall(b.x, b.y))
                .map(|(c, _, _)| *c)
                .collect();
            if let Some(&corner) = rng.choose(&eligible) {
                grid.set_at(corner, TileKind::Wall);
            }
        }
    }
}

/// Remove the open 2x2 blocks corner filling could not reach.
///
/// A corner of the block is walled in; any open region that cuts off is
/// reattached through a wall with exactly one open neighbor on each side.
/// If some region has no such wall the corner is put back and the next one
/// is tried. Returns the number of blocks closed.
fn repair_blocks(grid: &mut Grid, rng: &mut GameRng) -> usize {
    let (w, h) = (grid.width(), grid.height());
    let mut closed = 0;
    let mut changed = true;
    while changed {
        changed = false;
        for x in 1..w - 2 {
            for y in 1..h - 2 {
                let block = block_at(x, y);
                if !block_is_open(grid, &block) {
                    continue;
                }
                let mut corners = block;
                rng.shuffle(&mut corners);
                for corner in corners {
                    if close_corner(grid, corner, &block, rng) {
                        closed += 1;
                        changed = true;
                        break;
                    }
                }
            }
        }
    }
    closed
}

fn close_corner(grid: &mut Grid, corner: Coord, block: &[Coord; 4], rng: &mut GameRng) -> bool {
    grid.set_at(corner, TileKind::Wall);
    let Some(&anchor) = block.iter().find(|&&c| c != corner) else {
        return false;
    };
    let (mut main, _) = grid.flood_fill_floor(anchor.x, anchor.y);
    let mut doors = Vec::new();

    for side in corner.cardinals() {
        if !grid.tile_at(side).is_open() || main.contains(&side) {
            continue;
        }
        let (orphan, _) = grid.flood_fill_floor(side.x, side.y);

        let mut candidates: Vec<Coord> = Vec::new();
        for cell in &orphan {
            for wall in cell.cardinals() {
                if wall == corner || !grid.in_bounds(wall.x, wall.y) || !grid.tile_at(wall).is_wall() {
                    continue;
                }
                let open: Vec<Coord> = wall
                    .cardinals()
                    .into_iter()
                    .filter(|c| grid.tile_at(*c).is_open())
                    .collect();
                if open.len() == 2
                    && open.iter().filter(|c| orphan.contains(*c)).count() == 1
                    && open.iter().filter(|c| main.contains(*c)).count() == 1
                {
                    candidates.push(wall);
                }
            }
        }
        candidates.sort_unstable_by_key(|c| (c.y, c.x));
        candidates.dedup();

        let Some(&door) = rng.choose(&candidates) else {
            for door in doors {
                grid.set_at(door, TileKind::Wall);
            }
            grid.set_at(corner, TileKind::Floor);
            return false;
        };
        grid.set_at(door, TileKind::Floor);
        doors.push(door);
        main.extend(orphan);
        main.insert(door);
    }
    true
}

/// Wall in interior cells in random order unless that would leave a
/// neighbor with a dead end, then join whatever got separated.
fn braid_grid(width: i32, height: i32, rng: &mut GameRng) -> Grid {
    let mut grid = open_box(width, height);
    let mut cells: Vec<Coord> = (1..height - 1)
        .flat_map(|y| (1..width - 1).map(move |x| Coord::new(x, y)))
        .collect();
    rng.shuffle(&mut cells);

    for at in cells {
        let makes_dead_end = at.cardinals().iter().any(|n| {
            grid.tile_at(*n) == TileKind::Floor && grid.cardinal_walls(n.x, n.y) > 1
        });
        if !makes_dead_end {
            grid.set_at(at, TileKind::Wall);
        }
    }

    let opened = grid.connect_adjacent_segments(rng);
    let cuts = join_regions(&mut grid, rng);
    debug!(width, height, opened, cuts, "built braid maze");
    grid
}

/// Join regions that no single shared wall can reach (a wall two or more
/// tiles thick) by cutting from the first region to the closest cell of any
/// other. Returns the number of cuts.
fn join_regions(grid: &mut Grid, rng: &mut GameRng) -> usize {
    let mut cuts = 0;
    loop {
        let segments = grid.floor_segments();
        let Some((first, rest)) = segments.split_first() else {
            break;
        };
        let from = first.sorted_cells();
        let closest = rest
            .iter()
            .flat_map(|s| s.sorted_cells())
            .flat_map(|b| from.iter().map(move |a| (*a, b)))
            .min_by_key(|(a, b)| a.manhattan(*b));
        let Some((a, b)) = closest else {
            break;
        };
        carve_elbow(grid, a, b, rng);
        cuts += 1;
    }
    cuts
}

/// Open an L-shaped path from `from` to `to`. Each wall it opens lies
/// between two cells of the path, so none of them becomes a dead end.
fn carve_elbow(grid: &mut Grid, from: Coord, to: Coord, rng: &mut GameRng) {
    let corner = if rng.one_in(2) {
        Coord::new(to.x, from.y)
    } else {
        Coord::new(from.x, to.y)
    };
    for (start, end) in [(from, corner), (corner, to)] {
        let (dx, dy) = ((end.x - start.x).signum(), (end.y - start.y).signum());
        let mut at = start;
        while at != end {
            at = at.offset(dx, dy);
            if grid.tile_at(at).is_wall() {
                grid.set_at(at, TileKind::Floor);
            }
        }
    }
}
