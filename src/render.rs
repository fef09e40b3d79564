//! PPM snapshots of a drawn color buffer, for inspecting lighting without a window.

use crate::color::Color;
use crate::grid::Grid;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Save a color grid to a PPM file, each cell as a `scale` x `scale` block.
pub fn save_ppm(grid: &Grid<Color>, filename: impl AsRef<Path>, scale: usize) -> io::Result<()> {
    save_ppm_with_walls(grid, None, filename, scale)
}

/// Save a color grid to a PPM file, marking opaque cells of `resistance` in gray so they
/// stay visible when unlit.
pub fn save_ppm_with_walls(
    grid: &Grid<Color>,
    resistance: Option<&Grid<f64>>,
    filename: impl AsRef<Path>,
    scale: usize,
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    write_ppm(&mut file, grid, resistance, scale)?;
    file.flush()
}

/// Write a plain (P3) PPM image to any writer.
pub fn write_ppm(
    out: &mut impl Write,
    grid: &Grid<Color>,
    resistance: Option<&Grid<f64>>,
    scale: usize,
) -> io::Result<()> {
    let scale = scale.max(1);
    let (width, height) = grid.dimensions();
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", width * scale, height * scale)?;
    writeln!(out, "255")?;

    for img_y in 0..height * scale {
        for img_x in 0..width * scale {
            let (x, y) = (img_x / scale, img_y / scale);
            let color = grid[(x, y)];
            let is_wall = resistance.is_some_and(|r| r[(x, y)] >= 1.0);
            let (r, g, b) = if is_wall {
                (color.r().max(64), color.g().max(64), color.b().max(64))
            } else {
                (color.r(), color.g(), color.b())
            };
            write!(out, "{} {} {} ", r, g, b)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
