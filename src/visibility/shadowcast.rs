//! Recursive shadowcasting.
//!
//! Each of the eight octants is scanned row by row outward from the origin, tracking the
//! slope interval still unobstructed; an opaque cell splits the interval and the part
//! before it is recursed into. Opaque cells themselves are lit, so walls facing the
//! origin show up.

use super::{blocks_light, Radius, VisibilityService};
use crate::grid::{Grid, Position};

/// Octant transforms as `(xx, xy, yx, yy)`.
const OCTANTS: [(i64, i64, i64, i64); 8] = [
    (0, 1, 1, 0),
    (1, 0, 0, 1),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
    (0, -1, -1, 0),
    (-1, 0, 0, -1),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
];

/// Shadowcasting FOV with linear falloff `1 - distance / radius`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shadowcast;

impl Shadowcast {
    pub fn new() -> Self {
        Shadowcast
    }
}

impl VisibilityService for Shadowcast {
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
        let falloff = Falloff::Linear {
            decay: 1.0 / radius,
            shape,
        };
        for transform in OCTANTS {
            let octant = Octant::new(resistance, origin, radius, transform, falloff);
            octant.cast(light, 1, 1.0, 0.0);
        }
    }

    fn los(&self, resistance: &Grid<f64>, los: &mut Grid<f64>, origin: Position) {
        los.fill(0.0);
        if !los.in_bounds(origin.x, origin.y) {
            return;
        }
        los[origin] = 1.0;
        let radius = (los.width() + los.height()) as f64;
        for transform in OCTANTS {
            let octant = Octant::new(resistance, origin, radius, transform, Falloff::Binary);
            octant.cast(los, 1, 1.0, 0.0);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Falloff {
    Binary,
    Linear { decay: f64, shape: Radius },
}

struct Octant<'a> {
    resistance: &'a Grid<f64>,
    ox: i64,
    oy: i64,
    radius: f64,
    transform: (i64, i64, i64, i64),
    falloff: Falloff,
}

impl<'a> Octant<'a> {
    fn new(
        resistance: &'a Grid<f64>,
        origin: Position,
        radius: f64,
        transform: (i64, i64, i64, i64),
        falloff: Falloff,
    ) -> Self {
        Octant {
            resistance,
            ox: origin.x as i64,
            oy: origin.y as i64,
            radius,
            transform,
            falloff,
        }
    }

    fn cast(&self, light: &mut Grid<f64>, row: i64, mut start: f64, end: f64) {
        if start < end {
            return;
        }
        let (w, h) = (light.width() as i64, light.height() as i64);
        let (xx, xy, yx, yy) = self.transform;
        let mut new_start = 0.0;
        let mut blocked = false;
        let mut distance = row;

        while distance as f64 <= self.radius && distance < w + h && !blocked {
            let dy = -distance;
            for dx in -distance..=0 {
                let cx = self.ox + dx * xx + dy * xy;
                let cy = self.oy + dx * yx + dy * yy;
                let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
                let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

                if cx < 0 || cy < 0 || cx >= w || cy >= h || start < right_slope {
                    continue;
                } else if end > left_slope {
                    break;
                }
                let cell = (cx as usize, cy as usize);

                match self.falloff {
                    Falloff::Binary => light[cell] = 1.0,
                    Falloff::Linear { decay, shape } => {
                        let delta = shape.radius(dx as f64, dy as f64);
                        if delta <= self.radius {
                            light[cell] = 1.0 - decay * delta;
                        }
                    }
                }

                let opaque = blocks_light(self.resistance[cell]);
                if blocked {
                    if opaque {
                        new_start = right_slope;
                    } else {
                        blocked = false;
                        start = new_start;
                    }
                } else if opaque && (distance as f64) < self.radius {
                    blocked = true;
                    self.cast(light, distance + 1, start, left_slope);
                    new_start = right_slope;
                }
            }
            distance += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_room_falloff() {
        let resistance = Grid::new(5, 5, 0.0);
        let mut light = Grid::new(5, 5, 0.0);
        Shadowcast.fov(&resistance, &mut light, Position::new(2, 2), 3.0, Radius::Circle);

        assert_eq!(light[(2, 2)], 1.0);
        assert!((light[(2, 1)] - (1.0 - 1.0 / 3.0)).abs() < 1e-9);
        let corner = light[(0, 0)];
        assert!(corner > 0.0 && corner < light[(1, 1)]);
    }

    #[test]
    fn test_zero_outside_radius() {
        let resistance = Grid::new(11, 11, 0.0);
        let mut light = Grid::new(11, 11, 0.0);
        Shadowcast.fov(&resistance, &mut light, Position::new(5, 5), 2.0, Radius::Circle);
        assert_eq!(light[(5, 8)], 0.0);
        assert_eq!(light[(0, 0)], 0.0);
        assert!(light.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_wall_casts_shadow() {
        //  . . . . . . .
        //  . . . # . . .   wall at (3,1)
        //  . . . @ . . .   origin at (3,2)
        let mut resistance = Grid::new(7, 5, 0.0);
        resistance[(3, 1)] = 1.0;
        let mut light = Grid::new(7, 5, 0.0);
        Shadowcast.fov(&resistance, &mut light, Position::new(3, 2), 5.0, Radius::Circle);

        assert!(light[(3, 1)] > 0.0, "the wall face itself is lit");
        assert_eq!(light[(3, 0)], 0.0, "cell behind the wall is shadowed");
        assert!(light[(1, 2)] > 0.0);
    }

    #[test]
    fn test_los_is_binary_and_unlimited() {
        let mut resistance = Grid::new(20, 3, 0.0);
        resistance[(10, 0)] = 1.0;
        resistance[(10, 1)] = 1.0;
        resistance[(10, 2)] = 1.0;
        let mut los = Grid::new(20, 3, 0.0);
        Shadowcast.los(&resistance, &mut los, Position::new(0, 1));

        assert_eq!(los[(9, 1)], 1.0);
        assert_eq!(los[(10, 1)], 1.0);
        assert_eq!(los[(11, 1)], 0.0);
        assert!(los.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_zero_radius_lights_only_origin() {
        let resistance = Grid::new(3, 3, 0.0);
        let mut light = Grid::new(3, 3, 0.5);
        Shadowcast.fov(&resistance, &mut light, Position::new(1, 1), 0.0, Radius::Square);
        assert_eq!(light[(1, 1)], 1.0);
        assert_eq!(light.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn test_square_radius_cuts_off_by_chebyshev_distance() {
        let resistance = Grid::new(9, 9, 0.0);
        let mut light = Grid::new(9, 9, 0.0);
        Shadowcast.fov(&resistance, &mut light, Position::new(4, 4), 2.0, Radius::Square);

        // Corners of the 5x5 square are in range; its diagonal is not penalised.
        assert!((light[(6, 6)] - 0.0).abs() < 1e-9);
        assert!((light[(5, 5)] - 0.5).abs() < 1e-9);
        assert!((light[(5, 3)] - light[(4, 3)]).abs() < 1e-9);
        assert_eq!(light[(7, 4)], 0.0);
        assert_eq!(light[(7, 7)], 0.0);
        assert_eq!(light[(1, 4)], 0.0);
    }

    #[test]
    fn test_diamond_radius_cuts_off_by_manhattan_distance() {
        let resistance = Grid::new(9, 9, 0.0);
        let mut light = Grid::new(9, 9, 0.0);
        Shadowcast.fov(&resistance, &mut light, Position::new(4, 4), 3.0, Radius::Diamond);

        assert!((light[(4, 2)] - (1.0 - 2.0 / 3.0)).abs() < 1e-9);
        assert!((light[(5, 3)] - (1.0 - 2.0 / 3.0)).abs() < 1e-9);
        // Manhattan 4: beyond the diamond even though Euclidean is under 3.
        assert_eq!(light[(6, 6)], 0.0);
        assert_eq!(light[(6, 2)], 0.0);
        assert!(light[(4, 1)].abs() < 1e-9);
        assert_eq!(light[(8, 4)], 0.0);
    }
}
