//! Corridor carving
//!
//! Three carvers:
//! - `tunnel` / `random_corridor`: depth-first backtracking that writes tiles
//!   as it goes and reverts them when a branch dies
//! - `fast_corridor`: the same search over a side table, writing tiles only
//!   once a full-length corridor is found
//! - `corridor_between`: a biased random walk between two known points
//!
//! The searches run on explicit stacks and stop after a step budget.

use hashbrown::HashSet;
use tracing::{trace, warn};

use crate::config::DEFAULT_CORRIDOR_STEP_BUDGET;
use crate::rng::GameRng;

use super::grid::{Coord, Direction, Grid};
use super::tile::TileKind;

fn shuffled_directions(rng: &mut GameRng) -> [Direction; 4] {
    let mut dirs = Direction::ALL;
    rng.shuffle(&mut dirs);
    dirs
}

/// One level of the tunnel search
struct TunnelFrame {
    at: Coord,
    remaining: usize,
    dirs: [Direction; 4],
    next: usize,
}

impl TunnelFrame {
    fn new(at: Coord, remaining: usize, rng: &mut GameRng) -> Self {
        Self {
            at,
            remaining,
            dirs: shuffled_directions(rng),
            next: 0,
        }
    }
}

enum Carve {
    Done,
    Failed,
    OutOfBudget,
}

impl Grid {
    /// Carve a corridor of `remaining + 1` tiles starting at (x, y).
    ///
    /// (x, y) becomes floor; each further tile must pass
    /// [`Grid::can_corridor`], with blobulousness loosened by one for the
    /// last tile so a corridor may close onto open space. On failure every
    /// tile touched is back to wall.
    pub fn tunnel(
        &mut self,
        remaining: usize,
        x: i32,
        y: i32,
        blobulousness: u32,
        rng: &mut GameRng,
    ) -> bool {
        self.tunnel_within(remaining, x, y, blobulousness, DEFAULT_CORRIDOR_STEP_BUDGET, rng)
    }

    /// [`Grid::tunnel`] with an explicit step budget
    pub fn tunnel_within(
        &mut self,
        remaining: usize,
        x: i32,
        y: i32,
        blobulousness: u32,
        budget: usize,
        rng: &mut GameRng,
    ) -> bool {
        let mut steps = 0;
        matches!(
            self.carve_tunnel(Coord::new(x, y), remaining, blobulousness, &mut steps, budget, rng),
            Carve::Done
        )
    }

    fn carve_tunnel(
        &mut self,
        start: Coord,
        remaining: usize,
        blobulousness: u32,
        steps: &mut usize,
        budget: usize,
        rng: &mut GameRng,
    ) -> Carve {
        self.set_at(start, TileKind::Floor);
        if remaining == 0 {
            return Carve::Done;
        }

        let mut stack = vec![TunnelFrame::new(start, remaining, rng)];
        while let Some(frame) = stack.last_mut() {
            *steps += 1;
            if *steps > budget {
                for frame in &stack {
                    self.set_at(frame.at, TileKind::Wall);
                }
                warn!(budget, ?start, "tunnel search ran out of steps");
                return Carve::OutOfBudget;
            }

            if frame.next == frame.dirs.len() {
                let at = frame.at;
                stack.pop();
                self.set_at(at, TileKind::Wall);
                continue;
            }

            let dir = frame.dirs[frame.next];
            frame.next += 1;
            let child = frame.at.step(dir);
            let blob = if frame.remaining == 1 {
                blobulousness + 1
            } else {
                blobulousness
            };
            let child_remaining = frame.remaining - 1;

            if self.can_corridor(child.x, child.y, blob) {
                self.set_at(child, TileKind::Floor);
                if child_remaining == 0 {
                    return Carve::Done;
                }
                stack.push(TunnelFrame::new(child, child_remaining, rng));
            }
        }

        Carve::Failed
    }

    /// Carve a corridor of `length` tiles from some wall that touches open
    /// space on exactly one side. Starts are tried in random order until one
    /// works. Returns false, with the grid unchanged, when none does.
    pub fn random_corridor(&mut self, length: usize, blobulousness: u32, rng: &mut GameRng) -> bool {
        self.random_corridor_within(length, blobulousness, DEFAULT_CORRIDOR_STEP_BUDGET, rng)
    }

    /// [`Grid::random_corridor`] with an explicit step budget shared by all
    /// start points
    pub fn random_corridor_within(
        &mut self,
        length: usize,
        blobulousness: u32,
        budget: usize,
        rng: &mut GameRng,
    ) -> bool {
        if length == 0 {
            return true;
        }

        let mut starts = self.valid_starts();
        rng.shuffle(&mut starts);
        let mut steps = 0;
        for start in starts {
            trace!(?start, length, "trying corridor start");
            match self.carve_tunnel(start, length - 1, blobulousness, &mut steps, budget, rng) {
                Carve::Done => return true,
                Carve::Failed => {}
                Carve::OutOfBudget => return false,
            }
        }
        false
    }

    /// Corridor search that keeps the corridor in a side table until it is
    /// complete. Every tile after the first must be surrounded by walls and
    /// touch exactly one tile of the corridor being built.
    pub fn fast_corridor(&mut self, length: usize, rng: &mut GameRng) -> bool {
        self.fast_corridor_within(length, DEFAULT_CORRIDOR_STEP_BUDGET, rng)
    }

    /// [`Grid::fast_corridor`] with an explicit step budget
    pub fn fast_corridor_within(&mut self, length: usize, budget: usize, rng: &mut GameRng) -> bool {
        if length == 0 {
            return true;
        }

        let mut starts = self.valid_starts();
        rng.shuffle(&mut starts);
        let mut steps = 0;
        for start in starts {
            if let Some(path) = self.fast_search(start, length, &mut steps, budget, rng) {
                for at in path {
                    self.set_at(at, TileKind::Floor);
                }
                return true;
            }
            if steps > budget {
                warn!(budget, "fast corridor search ran out of steps");
                return false;
            }
        }
        false
    }

    fn fast_search(
        &self,
        start: Coord,
        length: usize,
        steps: &mut usize,
        budget: usize,
        rng: &mut GameRng,
    ) -> Option<Vec<Coord>> {
        if length == 1 {
            return Some(vec![start]);
        }

        // (cell, directions left to try)
        let mut stack: Vec<(Coord, Vec<Direction>)> = vec![(start, shuffled_directions(rng).to_vec())];
        let mut on_path: HashSet<Coord> = HashSet::new();
        on_path.insert(start);

        while let Some((at, dirs)) = stack.last_mut() {
            let at = *at;
            *steps += 1;
            if *steps > budget {
                return None;
            }

            let Some(dir) = dirs.pop() else {
                on_path.remove(&at);
                stack.pop();
                continue;
            };

            let next = at.step(dir);
            if self.fast_step_allowed(next, &on_path) {
                on_path.insert(next);
                let mut choices = shuffled_directions(rng).to_vec();
                choices.retain(|&d| d != dir.opposite());
                stack.push((next, choices));
                if stack.len() == length {
                    return Some(stack.into_iter().map(|(at, _)| at).collect());
                }
            }
        }
        None
    }

    fn fast_step_allowed(&self, next: Coord, on_path: &HashSet<Coord>) -> bool {
        self.in_bounds(next.x, next.y)
            && self.cardinal_walls(next.x, next.y) == 4
            && !on_path.contains(&next)
            && next.cardinals().iter().filter(|c| on_path.contains(*c)).count() == 1
    }

    /// Random walk from (x1, y1) to (x2, y2) carving floor as it goes.
    ///
    /// Each step picks uniformly among the directions that close the gap,
    /// plus both sideways directions when the points share a row or column
    /// and are more than two apart. Steps never leave the interior. Returns
    /// false without touching the grid if either point is outside the
    /// interior.
    pub fn corridor_between(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, rng: &mut GameRng) -> bool {
        if !self.in_bounds(x1, y1) || !self.in_bounds(x2, y2) {
            return false;
        }

        let target = Coord::new(x2, y2);
        let mut at = Coord::new(x1, y1);
        let mut choices = Vec::with_capacity(6);
        loop {
            if self.tile_at(at).is_wall() {
                self.set_at(at, TileKind::Floor);
            }
            if at == target {
                return true;
            }

            let dx = target.x - at.x;
            let dy = target.y - at.y;
            choices.clear();
            if dy == 0 && dx.abs() > 2 {
                choices.extend([Direction::Up, Direction::Down]);
            }
            if dx == 0 && dy.abs() > 2 {
                choices.extend([Direction::Left, Direction::Right]);
            }
            if dx > 0 {
                choices.push(Direction::Right);
            } else if dx < 0 {
                choices.push(Direction::Left);
            }
            if dy > 0 {
                choices.push(Direction::Down);
            } else if dy < 0 {
                choices.push(Direction::Up);
            }

            let Some(&dir) = rng.choose(&choices) else {
                return false;
            };
            let allowed = match dir {
                Direction::Up => at.y > 1,
                Direction::Right => at.x < self.width() - 2,
                Direction::Down => at.y < self.height() - 2,
                Direction::Left => at.x > 1,
            };
            if allowed {
                at = at.step(dir);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Rect;

    fn room_with_walls() -> Grid {
        // open room on the left, solid rock on the right
        let mut grid = Grid::new(30, 15);
        grid.fill_rect(Rect::new(1, 1, 5, 13), TileKind::Floor);
        grid
    }

    #[test]
    fn test_tunnel_zero_marks_start() {
        let mut rng = GameRng::new(1);
        let mut grid = Grid::new(10, 10);
        assert!(grid.tunnel(0, 4, 4, 0, &mut rng));
        assert_eq!(grid.open_count(), 1);
        assert_eq!(grid.tile(4, 4), TileKind::Floor);
    }

    #[test]
    fn test_tunnel_carves_remaining_plus_one() {
        let mut rng = GameRng::new(2);
        let mut grid = Grid::new(20, 20);
        assert!(grid.tunnel(9, 10, 10, 0, &mut rng));
        assert_eq!(grid.open_count(), 10);
    }

    #[test]
    fn test_tunnel_failure_reverts() {
        let mut rng = GameRng::new(3);
        // a 3x3 grid has a single interior cell
        let mut grid = Grid::new(3, 3);
        assert!(!grid.tunnel(4, 1, 1, 0, &mut rng));
        assert_eq!(grid.open_count(), 0);
    }

    #[test]
    fn test_tunnel_budget_reverts() {
        let mut rng = GameRng::new(4);
        let mut grid = Grid::new(40, 40);
        assert!(!grid.tunnel_within(500, 20, 20, 0, 10, &mut rng));
        assert_eq!(grid.open_count(), 0);
    }

    #[test]
    fn test_random_corridor_length() {
        for seed in 0..10 {
            let mut rng = GameRng::new(seed);
            let mut grid = room_with_walls();
            let before = grid.open_count();
            assert!(grid.random_corridor(12, 0, &mut rng));
            assert_eq!(grid.open_count(), before + 12);
        }
    }

    #[test]
    fn test_default_budget_matches_config() {
        let budget = crate::GenConfig::default().corridor_step_budget;
        assert_eq!(budget, DEFAULT_CORRIDOR_STEP_BUDGET);
        for seed in 0..5 {
            let mut a = room_with_walls();
            let mut b = room_with_walls();
            let carved = a.random_corridor(9, 0, &mut GameRng::new(seed));
            let within = b.random_corridor_within(9, 0, budget, &mut GameRng::new(seed));
            assert_eq!(carved, within);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_random_corridor_no_starts() {
        let mut rng = GameRng::new(5);
        let mut grid = Grid::new(12, 12);
        assert!(!grid.random_corridor(5, 0, &mut rng));
        assert_eq!(grid.open_count(), 0);
        assert!(grid.random_corridor(0, 0, &mut rng));
    }

    #[test]
    fn test_random_corridor_impossible_restores_grid() {
        let mut rng = GameRng::new(6);
        let mut grid = room_with_walls();
        let before = grid.clone();
        assert!(!grid.random_corridor(500, 0, &mut rng));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_fast_corridor_length_and_shape() {
        for seed in 0..10 {
            let mut rng = GameRng::new(seed);
            let mut grid = room_with_walls();
            let before = grid.clone();
            assert!(grid.fast_corridor(10, &mut rng));
            assert_eq!(grid.open_count(), before.open_count() + 10);
            // new tiles form a path: every one has at most two new neighbors
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    if grid.is_open(x, y) && !before.is_open(x, y) {
                        let fresh = Coord::new(x, y)
                            .cardinals()
                            .iter()
                            .filter(|c| grid.is_open(c.x, c.y) && !before.is_open(c.x, c.y))
                            .count();
                        assert!((1..=2).contains(&fresh));
                    }
                }
            }
        }
    }

    #[test]
    fn test_fast_corridor_budget() {
        let mut rng = GameRng::new(7);
        let mut grid = room_with_walls();
        let before = grid.clone();
        assert!(!grid.fast_corridor_within(200, 50, &mut rng));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_corridor_between_same_point() {
        let mut rng = GameRng::new(8);
        let mut grid = Grid::new(10, 10);
        assert!(grid.corridor_between(2, 2, 2, 2, &mut rng));
        assert_eq!(grid.open_count(), 1);
        assert_eq!(grid.tile(2, 2), TileKind::Floor);
    }

    #[test]
    fn test_corridor_between_connects() {
        for seed in 0..20 {
            let mut rng = GameRng::new(seed);
            let mut grid = Grid::new(40, 25);
            assert!(grid.corridor_between(2, 3, 35, 20, &mut rng));
            let filled = grid.flood_fill_floor(2, 3).0;
            assert!(filled.contains(&Coord::new(35, 20)));
            // border stays solid
            for x in 0..grid.width() {
                assert!(grid.tile(x, 0).is_wall());
                assert!(grid.tile(x, grid.height() - 1).is_wall());
            }
        }
    }

    #[test]
    fn test_corridor_between_keeps_markers() {
        let mut rng = GameRng::new(9);
        let mut grid = Grid::new(10, 5);
        grid.set(5, 2, TileKind::DownStairs);
        assert!(grid.corridor_between(1, 2, 8, 2, &mut rng));
        assert_eq!(grid.tile(5, 2), TileKind::DownStairs);
    }

    #[test]
    fn test_corridor_between_rejects_border() {
        let mut rng = GameRng::new(10);
        let mut grid = Grid::new(10, 10);
        assert!(!grid.corridor_between(0, 0, 5, 5, &mut rng));
        assert_eq!(grid.open_count(), 0);
    }
}
