//! Layer 2: Colored light accumulation
//!
//! A [`LightLayer`] holds, per cell, how strongly lit the cell is and with what tint.
//! Lights are composited one at a time; overlapping tints are interpolated with a weight
//! that favors the brighter contribution.

use crate::color::Color;
use crate::grid::Grid;
use crate::visibility::blocks_light;

/// Neighbor scan order for light bleeding onto opaque cells. The first strictly
/// brightest neighbor in this order wins ties.
const NEIGHBOR_SCAN: [(i64, i64); 8] = [
    (0, -1),
    (-1, -1),
    (1, -1),
    (0, 1),
    (-1, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
];

/// Per-cell light strength (`0.0..=1.0`) and tint. A `None` tint means no color has been
/// laid down yet, or only untinted light has.
#[derive(Debug, Clone, PartialEq)]
pub struct LightLayer {
    pub strength: Grid<f32>,
    pub color: Grid<Option<Color>>,
}

impl LightLayer {
    pub fn new(width: usize, height: usize) -> Self {
        LightLayer {
            strength: Grid::new(width, height, 0.0),
            color: Grid::new(width, height, None),
        }
    }

    /// A layer holding a single light: `strength` scaled to f32, every lit cell tinted `tint`.
    pub fn paint(strength: &Grid<f64>, tint: Option<Color>) -> Self {
        let (w, h) = strength.dimensions();
        LightLayer {
            strength: Grid::from_fn(w, h, |x, y| strength[(x, y)].clamp(0.0, 1.0) as f32),
            color: Grid::from_fn(w, h, |x, y| if strength[(x, y)] > 0.0 { tint } else { None }),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.strength.dimensions()
    }

    /// Back to unlit and untinted.
    pub fn clear(&mut self) {
        self.strength.fill(0.0);
        self.color.fill(None);
    }

    /// Composite one contribution of `source` strength and `tint` into cell `(x, y)`.
    pub fn mix(&mut self, x: usize, y: usize, source: f32, tint: Option<Color>) {
        let existing = self.strength[(x, y)];
        match (self.color[(x, y)], tint) {
            (None, _) => {
                self.color[(x, y)] = tint;
                self.strength[(x, y)] = (existing + source).min(1.0);
            }
            (Some(_), None) => {
                self.strength[(x, y)] = (existing + source).min(1.0);
            }
            (Some(base), Some(tint)) => {
                let t = ((source - existing) * 0.5 + 0.5).clamp(0.0, 1.0) * tint.alpha_fraction();
                self.color[(x, y)] = Some(base.lerp_channels(tint, t));
                self.strength[(x, y)] = (existing + source * t).min(1.0);
            }
        }
    }
}

/// Blend one light's visibility field, tinted `tint`, into `layer`.
///
/// Only cells with line of sight are touched. Opaque cells have no strength of their own
/// and instead borrow from their brightest visible, non-opaque neighbor.
pub(crate) fn mix_light(
    layer: &mut LightLayer,
    strength: &Grid<f64>,
    tint: Option<Color>,
    flare: f32,
    los: &Grid<f64>,
    resistance: &Grid<f64>,
) {
    let boost = 1.0 + flare;
    let (w, h) = layer.dimensions();
    for y in 0..h {
        for x in 0..w {
            if los[(x, y)] <= 0.0 {
                continue;
            }
            let raw = if blocks_light(resistance[(x, y)]) {
                match brightest_neighbor(x, y, los, resistance, |nx, ny| strength[(nx, ny)] as f32) {
                    Some((nx, ny)) => strength[(nx, ny)] as f32,
                    None => continue,
                }
            } else {
                strength[(x, y)] as f32
            };
            let source = raw * boost;
            if source <= 0.0 {
                continue;
            }
            layer.mix(x, y, source, tint);
        }
    }
}

/// Blend a pre-colored layer into `layer`. Opaque cells take both strength and tint from
/// the brightest neighbor in `other`.
pub(crate) fn mix_layer(
    layer: &mut LightLayer,
    other: &LightLayer,
    flare: f32,
    los: &Grid<f64>,
    resistance: &Grid<f64>,
) {
    let boost = 1.0 + flare;
    let (w, h) = layer.dimensions();
    for y in 0..h {
        for x in 0..w {
            if los[(x, y)] <= 0.0 {
                continue;
            }
            let (sx, sy) = if blocks_light(resistance[(x, y)]) {
                match brightest_neighbor(x, y, los, resistance, |nx, ny| other.strength[(nx, ny)]) {
                    Some(cell) => cell,
                    None => continue,
                }
            } else {
                (x, y)
            };
            let source = other.strength[(sx, sy)] * boost;
            if source <= 0.0 {
                continue;
            }
            layer.mix(x, y, source, other.color[(sx, sy)]);
        }
    }
}

/// The visible, non-opaque neighbor of `(x, y)` with the largest positive `value`.
fn brightest_neighbor(
    x: usize,
    y: usize,
    los: &Grid<f64>,
    resistance: &Grid<f64>,
    value: impl Fn(usize, usize) -> f32,
) -> Option<(usize, usize)> {
    let (w, h) = los.dimensions();
    let mut best = 0.0f32;
    let mut found = None;
    for (dx, dy) in NEIGHBOR_SCAN {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
            continue;
        }
        let (nx, ny) = (nx as usize, ny as usize);
        if los[(nx, ny)] <= 0.0 || blocks_light(resistance[(nx, ny)]) {
            continue;
        }
        let v = value(nx, ny);
        if v > best {
            best = v;
            found = Some((nx, ny));
        }
    }
    found
}
