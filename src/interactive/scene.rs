//! A small two-room map with a handful of animated lights, shared by the viewer,
//! the benchmark and snapshots.

use crate::color::Color;
use crate::grid::{Grid, Position};
use crate::radiance::Radiance;

/// Map resistance plus the lights placed on it.
pub struct Scene {
    pub resistance: Grid<f64>,
    pub lights: Vec<(Position, Radiance)>,
}

/// Two rooms split by a wall with a doorway, pillars in the west room, torches in
/// both rooms and a strobing chain along the south of the east room.
///
/// Sizes below 12x12 are rounded up.
pub fn demo_scene(width: usize, height: usize) -> Scene {
    let (w, h) = (width.max(12), height.max(12));
    let split = w / 2;
    let door = h / 2;
    let resistance = Grid::from_fn(w, h, |x, y| {
        let border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
        let divider = x == split && !(door.saturating_sub(1)..=door + 1).contains(&y);
        let pillar = x < split && x % 6 == 3 && y % 6 == 3;
        if border || divider || pillar { 1.0 } else { 0.0 }
    });

    let mut lights = vec![
        (
            Position::new(w / 4, h / 4),
            Radiance::new(6.0).with_color(Color::TORCH).with_flicker(2.0),
        ),
        (
            Position::new(w / 4, 3 * h / 4),
            Radiance::new(5.0).with_color(Color::EMBER).with_flicker(3.0),
        ),
        (
            Position::new(3 * w / 4, h / 4),
            Radiance::new(7.0).with_color(Color::FROST),
        ),
    ];
    let chain_y = (3 * h / 4).min(h - 2);
    let chain = Radiance::chain(5, 3.0, Color::rgb(180, 80, 255), 1.5);
    for (i, light) in chain.into_iter().enumerate() {
        let x = split + 2 + i * 3;
        if x < w - 1 {
            lights.push((Position::new(x, chain_y), light));
        }
    }
    // On small maps a light can land on a pillar.
    lights.retain(|(pos, _)| resistance[*pos] < 1.0);

    Scene { resistance, lights }
}
