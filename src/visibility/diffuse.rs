//! Sweeping neighbor propagation for soft, corner-bending light.
//!
//! Light spreads from the origin by four directional sweeps, each cell taking the best
//! value offered by its already-processed neighbors. A step costs `1 / radius` (scaled
//! by the shape's diagonal length for diagonal steps) plus the resistance of the cell
//! being left, so partially resistant cells dim light instead of cutting it off.
//!
//! Unlike [`super::Shadowcast`], light here flows around corners; line of sight is
//! "reachable without passing through an opaque cell".

use super::{blocks_light, Radius, VisibilityService};
use crate::grid::{Grid, Position};

/// Sweeping neighbor visibility.
///
/// Uses bidirectional sweeping for symmetric propagation:
/// - Forward pass: TL→BR, BR→TL, Down, Up
/// - Reverse pass: Up, Down, BR→TL, TL→BR
#[derive(Debug, Clone, Copy, Default)]
pub struct Diffuse;

impl Diffuse {
    pub fn new() -> Self {
        Diffuse
    }
}

impl VisibilityService for Diffuse {
    fn fov(&self, resistance: &Grid<f64>, light: &mut Grid<f64>, origin: Position, radius: f64, shape: Radius) {
        light.fill(0.0);
        if !light.in_bounds(origin.x, origin.y) {
            return;
        }
        // The origin always sees itself, even at radius 0.
        light[origin] = 1.0;
        if radius <= 0.0 {
            return;
        }
        let (w, h) = light.dimensions();
        let steps = Steps {
            straight: 1.0 / radius,
            diagonal: shape.diagonal_step() / radius,
        };
        let res = resistance.as_slice();
        let att = light.as_mut_slice();
        run_forward_sweeps(res, att, w, h, steps);
        run_reverse_sweeps(res, att, w, h, steps);
    }

    fn los(&self, resistance: &Grid<f64>, los: &mut Grid<f64>, origin: Position) {
        los.fill(0.0);
        if !los.in_bounds(origin.x, origin.y) {
            return;
        }
        let (w, h) = los.dimensions();
        let mut stack = vec![origin];
        los[origin] = 1.0;
        while let Some(p) = stack.pop() {
            // Opaque cells are seen but don't let sight through.
            if p != origin && blocks_light(resistance[p]) {
                continue;
            }
            for (nx, ny) in neighbors8(p.x, p.y, w, h) {
                if los[(nx, ny)] == 0.0 {
                    los[(nx, ny)] = 1.0;
                    stack.push(Position::new(nx, ny));
                }
            }
        }
    }
}

fn neighbors8(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    (-1i64..=1)
        .flat_map(|dy| (-1i64..=1).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .filter_map(move |(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            (nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64).then_some((nx as usize, ny as usize))
        })
}

#[derive(Debug, Clone, Copy)]
struct Steps {
    straight: f64,
    diagonal: f64,
}

// ============================================================================
// Propagation helper
// ============================================================================

/// Light arriving from neighbor `ni` after a step of cost `step`.
#[inline]
fn propagate(att: &[f64], res: &[f64], ni: usize, step: f64) -> f64 {
    att[ni] - step - res[ni]
}

// ============================================================================
// Four sweep patterns
// ============================================================================

/// Sweep from top-left to bottom-right, checking left/up/up-left neighbors
#[inline]
fn sweep_tl_to_br(res: &[f64], att: &mut [f64], w: usize, h: usize, s: Steps) {
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let mut best = att[idx];
            if x > 0 {
                best = best.max(propagate(att, res, idx - 1, s.straight));
            }
            if y > 0 {
                best = best.max(propagate(att, res, idx - w, s.straight));
            }
            if x > 0 && y > 0 {
                best = best.max(propagate(att, res, idx - w - 1, s.diagonal));
            }
            att[idx] = best;
        }
    }
}

/// Sweep from bottom-right to top-left, checking right/down/down-right neighbors
#[inline]
fn sweep_br_to_tl(res: &[f64], att: &mut [f64], w: usize, h: usize, s: Steps) {
    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let idx = y * w + x;
            let mut best = att[idx];
            if x + 1 < w {
                best = best.max(propagate(att, res, idx + 1, s.straight));
            }
            if y + 1 < h {
                best = best.max(propagate(att, res, idx + w, s.straight));
            }
            if x + 1 < w && y + 1 < h {
                best = best.max(propagate(att, res, idx + w + 1, s.diagonal));
            }
            att[idx] = best;
        }
    }
}

/// Sweep top-down, checking left/up and both upper diagonals
#[inline]
fn sweep_down(res: &[f64], att: &mut [f64], w: usize, h: usize, s: Steps) {
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let mut best = att[idx];
            if x > 0 {
                best = best.max(propagate(att, res, idx - 1, s.straight));
            }
            if y > 0 {
                best = best.max(propagate(att, res, idx - w, s.straight));
                if x > 0 {
                    best = best.max(propagate(att, res, idx - w - 1, s.diagonal));
                }
                if x + 1 < w {
                    best = best.max(propagate(att, res, idx - w + 1, s.diagonal));
                }
            }
            att[idx] = best;
        }
    }
}

/// Sweep bottom-up, checking right/down and both lower diagonals
#[inline]
fn sweep_up(res: &[f64], att: &mut [f64], w: usize, h: usize, s: Steps) {
    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let idx = y * w + x;
            let mut best = att[idx];
            if x + 1 < w {
                best = best.max(propagate(att, res, idx + 1, s.straight));
            }
            if y + 1 < h {
                best = best.max(propagate(att, res, idx + w, s.straight));
                if x > 0 {
                    best = best.max(propagate(att, res, idx + w - 1, s.diagonal));
                }
                if x + 1 < w {
                    best = best.max(propagate(att, res, idx + w + 1, s.diagonal));
                }
            }
            att[idx] = best;
        }
    }
}

// ============================================================================
// Forward and reverse pass orchestration
// ============================================================================

/// Forward sweeps: TL→BR, BR→TL, Down, Up
#[inline]
fn run_forward_sweeps(res: &[f64], att: &mut [f64], w: usize, h: usize, s: Steps) {
    sweep_tl_to_br(res, att, w, h, s);
    sweep_br_to_tl(res, att, w, h, s);
    sweep_down(res, att, w, h, s);
    sweep_up(res, att, w, h, s);
}

/// Reverse sweeps: Up, Down, BR→TL, TL→BR (opposite order)
#[inline]
fn run_reverse_sweeps(res: &[f64], att: &mut [f64], w: usize, h: usize, s: Steps) {
    sweep_up(res, att, w, h, s);
    sweep_down(res, att, w, h, s);
    sweep_br_to_tl(res, att, w, h, s);
    sweep_tl_to_br(res, att, w, h, s);
}
