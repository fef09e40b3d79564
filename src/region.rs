//! Boolean cell masks, used for the "noticeable" region that culls far-away lights.

use crate::grid::{Grid, Position};

/// A set of cells on a fixed-size grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    cells: Grid<bool>,
}

impl Region {
    /// An empty region of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Region {
            cells: Grid::new(width, height, false),
        }
    }

    /// Replace the contents with every cell of `values` strictly above `threshold`.
    ///
    /// `values` must have the same dimensions as this region.
    pub fn refill(&mut self, values: &Grid<f64>, threshold: f64) -> &mut Self {
        debug_assert_eq!(values.dimensions(), self.cells.dimensions());
        for (cell, &v) in self.cells.as_mut_slice().iter_mut().zip(values.iter()) {
            *cell = v > threshold;
        }
        self
    }

    /// Grow the region outward by `amount` cells in all eight directions, so that every
    /// cell within Chebyshev distance `amount` of a member becomes a member.
    pub fn expand_8way(&mut self, amount: usize) -> &mut Self {
        if amount == 0 {
            return self;
        }
        let (w, h) = self.cells.dimensions();
        let mut prefix = vec![0usize; w.max(h) + 1];
        let mut line = vec![false; w.max(h)];

        // Rows, then columns: a square dilation is separable.
        for y in 0..h {
            for x in 0..w {
                line[x] = self.cells[(x, y)];
            }
            dilate_line(&line[..w], &mut prefix, amount, |x, v| self.cells[(x, y)] = v);
        }
        for x in 0..w {
            for y in 0..h {
                line[y] = self.cells[(x, y)];
            }
            dilate_line(&line[..h], &mut prefix, amount, |y, v| self.cells[(x, y)] = v);
        }
        self
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.get(pos.x, pos.y).copied().unwrap_or(false)
    }

    /// Number of member cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }
}

/// 1D dilation through a running prefix count of set cells.
fn dilate_line(line: &[bool], prefix: &mut [usize], amount: usize, mut set: impl FnMut(usize, bool)) {
    let len = line.len();
    prefix[0] = 0;
    for i in 0..len {
        prefix[i + 1] = prefix[i] + usize::from(line[i]);
    }
    for i in 0..len {
        let lo = i.saturating_sub(amount);
        let hi = i.saturating_add(amount).saturating_add(1).min(len);
        set(i, prefix[hi] - prefix[lo] > 0);
    }
}
