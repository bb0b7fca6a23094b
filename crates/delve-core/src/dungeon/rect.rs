//! Rectangles and the largest solid-wall rectangle search
//!
//! `find_rectangle` runs the largest-rectangle-in-histogram technique row by
//! row: each column keeps the run of walls ending at the current row, and a
//! monotonic stack finds the best rectangle under that skyline.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::grid::Grid;

/// Rectangles narrower or shorter than this are not reported
pub const MIN_RECT_SIDE: usize = 5;

/// An axis-aligned rectangle; `x`/`y` is the top-left cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// One past the last column
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the last row
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(Rect::new(
            x,
            y,
            self.right().min(other.right()) - x,
            self.bottom().min(other.bottom()) - y,
        ))
    }

    /// Shrink by `by` cells on every side
    pub fn inset(&self, by: i32) -> Rect {
        Rect::new(
            self.x + by,
            self.y + by,
            (self.width - 2 * by).max(0),
            (self.height - 2 * by).max(0),
        )
    }
}

/// Best rectangle under a histogram: columns `start..start + width`, all at
/// least `height` tall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramSpan {
    pub start: usize,
    pub width: usize,
    pub height: usize,
}

impl HistogramSpan {
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Largest rectangle under `heights` whose width and height are both at
/// least `min_side`. Ties keep the leftmost span found first.
pub fn max_histogram(heights: &[usize], min_side: usize) -> Option<HistogramSpan> {
    let n = heights.len();
    let mut stack: Vec<usize> = Vec::with_capacity(n);
    let mut best: Option<HistogramSpan> = None;

    for i in 0..=n {
        let current = if i < n { heights[i] } else { 0 };
        while let Some(&top) = stack.last() {
            if heights[top] < current {
                break;
            }
            stack.pop();
            let height = heights[top];
            let start = stack.last().map_or(0, |&s| s + 1);
            let span = HistogramSpan {
                start,
                width: i - start,
                height,
            };
            if span.width >= min_side
                && span.height >= min_side
                && best.is_none_or(|b| span.area() > b.area())
            {
                best = Some(span);
            }
        }
        if i < n {
            stack.push(i);
        }
    }

    best
}

impl Grid {
    /// Largest all-wall rectangle that keeps a wall ring of at least two
    /// cells from the grid edge, or `None` if nothing reaches
    /// [`MIN_RECT_SIDE`] in both directions.
    pub fn find_rectangle(&self) -> Option<Rect> {
        let (x0, x1) = (2, self.width() - 2);
        let (y0, y1) = (2, self.height() - 2);
        if x1 - x0 < MIN_RECT_SIDE as i32 || y1 - y0 < MIN_RECT_SIDE as i32 {
            return None;
        }

        let mut heights = vec![0usize; (x1 - x0) as usize];
        let mut best: Option<Rect> = None;
        for y in y0..y1 {
            for (col, h) in heights.iter_mut().enumerate() {
                if self.tile(x0 + col as i32, y).is_wall() {
                    *h += 1;
                } else {
                    *h = 0;
                }
            }
            if let Some(span) = max_histogram(&heights, MIN_RECT_SIDE) {
                let found = Rect::new(
                    x0 + span.start as i32,
                    y - span.height as i32 + 1,
                    span.width as i32,
                    span.height as i32,
                );
                if best.is_none_or(|b| found.area() > b.area()) {
                    best = Some(found);
                }
            }
        }

        if let Some(rect) = best {
            debug!(
                x = rect.x,
                y = rect.y,
                width = rect.width,
                height = rect.height,
                "found wall rectangle"
            );
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::TileKind;

    #[test]
    fn test_max_histogram_classic() {
        let span = max_histogram(&[2, 1, 5, 6, 2, 3], 1).unwrap();
        assert_eq!(span.area(), 10);
        assert_eq!(span.start, 2);
        assert_eq!(span.width, 2);
        assert_eq!(span.height, 5);
    }

    #[test]
    fn test_max_histogram_min_side() {
        // widest block is only 4 tall
        assert!(max_histogram(&[4, 4, 4, 4, 4, 4], 5).is_none());
        let span = max_histogram(&[9, 9, 9, 9, 9, 1, 1], 5).unwrap();
        assert_eq!(span.width, 5);
        assert_eq!(span.height, 9);
    }

    #[test]
    fn test_max_histogram_equal_heights() {
        let span = max_histogram(&[3, 3, 3], 1).unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(span.width, 3);
    }

    #[test]
    fn test_max_histogram_empty() {
        assert!(max_histogram(&[], 1).is_none());
        assert!(max_histogram(&[0, 0], 1).is_none());
    }

    #[test]
    fn test_find_rectangle_solid() {
        let grid = Grid::new(20, 20);
        let rect = grid.find_rectangle().unwrap();
        assert_eq!(rect, Rect::new(2, 2, 16, 16));
    }

    #[test]
    fn test_find_rectangle_avoids_floor() {
        let mut grid = Grid::new(20, 20);
        grid.fill_rect(Rect::new(1, 1, 18, 9), TileKind::Floor);
        let rect = grid.find_rectangle().unwrap();
        assert_eq!(rect, Rect::new(2, 10, 16, 8));
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                assert!(grid.tile(x, y).is_wall());
            }
        }
    }

    #[test]
    fn test_find_rectangle_none() {
        let grid = Grid::filled(20, 20, TileKind::Floor);
        assert!(grid.find_rectangle().is_none());
        assert!(Grid::new(8, 8).find_rectangle().is_none());
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 3, 4, 4);
        assert!(a.intersects(&b));
        assert_eq!(a.intersection(&b), Some(Rect::new(2, 3, 2, 1)));
        assert!(!a.intersects(&Rect::new(4, 0, 2, 2)));
        assert!(a.contains(3, 3));
        assert!(!a.contains(4, 3));
        assert_eq!(a.inset(1), Rect::new(1, 1, 2, 2));
    }
}
